//! 摘要服務邊界
//!
//! 核心不依賴任何特定的視覺／語言模型供應商；呼叫端注入一個
//! `SummaryService` 實作，管線把合成圖、個別幀與逐字稿交給它。
//! 服務失敗以 `PipelineError::Summarization` 呈現，與影片處理
//! 錯誤明確區分。

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// 摘要服務的回覆
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub visual_description: Option<String>,
}

/// 摘要服務介面
///
/// 輸入為 JPEG 編碼的合成圖與個別幀位元組，加上可選的 UTF-8
/// 逐字稿；除此之外不對服務內部做任何假設。
pub trait SummaryService: Send + Sync {
    fn summarize(
        &self,
        mosaics: &[Vec<u8>],
        frames: &[Vec<u8>],
        transcript: Option<&str>,
    ) -> Result<SummaryResult, PipelineError>;
}
