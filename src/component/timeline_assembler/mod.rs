//! 時間軸合併元件
//!
//! 把各片段的幀列表合併成全域排序、可重現的單一時間軸。

mod main;

pub use main::{Timeline, assemble};
