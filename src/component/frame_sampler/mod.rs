//! 幀取樣元件
//!
//! 對單一片段決定取樣位置（張數或間隔模式，單次呼叫擇一）、
//! 逐位置解碼並落地為 `<clip-basename>_frames/frame_<NNNN>.jpg`。
//! 單一位置失敗只跳過該位置；片段之間互不影響。

mod main;
mod position_selector;

pub use main::{Frame, FrameSampler, SampleResult, frames_dir_for};
pub use position_selector::select_positions;
