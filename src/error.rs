//! 錯誤分類
//!
//! 影片層級錯誤（取得、場景偵測、切割）會中止整個請求；
//! 片段與區塊層級的問題則以警告記錄，局部回復後繼續處理。

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 影片層級的致命錯誤，任一發生即中止整個請求
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 無法讀取來源影片（檔案不存在、ffprobe 失敗等）
    #[error("影片取得失敗 ({path}): {detail}")]
    Acquisition { path: PathBuf, detail: String },

    /// 場景偵測器執行失敗，無法推導任何片段
    #[error("場景偵測失敗 ({path}): {detail}")]
    Segmentation { path: PathBuf, detail: String },

    /// 切割工具執行失敗，且無法套用回退方案
    #[error("影片切割失敗 ({path}): {detail}")]
    Splitting { path: PathBuf, detail: String },

    /// 摘要服務失敗，與影片處理錯誤區分，呼叫端可分辨
    /// 「影片處理失敗」與「分析步驟失敗」
    #[error("摘要服務失敗: {detail}")]
    Summarization { detail: String },

    /// 請求已被取消，已寫入的檔案保留給外部清理端回收
    #[error("處理已取消")]
    Cancelled,
}

/// 片段／區塊層級的警告，不中止請求，但每一筆遺漏都必須可觀察
#[derive(Debug, Clone)]
pub enum ProcessingWarning {
    /// 單一幀位置無法解碼，已跳過
    SamplingSkip {
        clip: String,
        position: u64,
        detail: String,
    },
    /// 整個片段取樣失敗，該片段回報為零幀
    ClipProcessing { clip: String, detail: String },
    /// 合成階段無法解碼某個幀檔案
    FrameDecode { path: PathBuf, detail: String },
    /// 某個合成區塊沒有任何可用的幀，已自輸出省略
    Composition { chunk_index: usize, detail: String },
}

impl fmt::Display for ProcessingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SamplingSkip {
                clip,
                position,
                detail,
            } => {
                write!(f, "片段 {clip} 位置 {position} 取樣失敗: {detail}")
            }
            Self::ClipProcessing { clip, detail } => {
                write!(f, "片段 {clip} 處理失敗: {detail}")
            }
            Self::FrameDecode { path, detail } => {
                write!(f, "幀檔案無法解碼 {}: {detail}", path.display())
            }
            Self::Composition {
                chunk_index,
                detail,
            } => {
                write!(f, "合成區塊 {chunk_index} 已省略: {detail}")
            }
        }
    }
}
