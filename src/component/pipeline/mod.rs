//! 場景取樣管線
//!
//! 串接各元件：探測 -> 場景切分 -> 片段切割 -> 幀取樣 ->
//! 時間軸合併 -> 合成 ->（可選）摘要。

mod main;

pub use main::{ProcessOutcome, ScenePipeline};
