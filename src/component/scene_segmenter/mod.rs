//! 場景切分元件
//!
//! 以外部鏡頭邊界偵測（scdet）為訊號，輸出完整覆蓋影片長度、
//! 不重疊的場景範圍列表。

mod main;

pub use main::{Scene, SceneSegmenter, build_scenes};
