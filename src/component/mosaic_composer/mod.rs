//! 合成圖元件
//!
//! 把時間軸上的取樣幀依區塊拼成合成圖（橫列或網格版面），
//! 受最大尺寸約束，每個區塊套用單一縮放係數。

mod layout;
mod main;

pub use layout::{compose_grid, compose_strip, grid_dimensions};
pub use main::{MosaicComposer, MosaicOutcome};
