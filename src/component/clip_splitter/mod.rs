//! 片段切割元件
//!
//! 以單次 ffmpeg segment 呼叫把每個場景實體化為獨立片段檔案，
//! 並以目錄列舉驗證切割結果；無法切割時回退為單一片段。

mod clip_enumerator;
mod main;

pub use clip_enumerator::enumerate_scene_clips;
pub use main::{Clip, ClipSplitter, SplitOutcome};
