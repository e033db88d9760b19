use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// 取樣策略（單次呼叫只能擇一）
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStrategy {
    /// 每個片段取固定張數
    Count(usize),
    /// 每 K 張解碼幀取一張
    EveryNthFrame(u64),
    /// 依固定秒數間隔取樣
    IntervalSeconds(f64),
}

/// 合成圖版面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MosaicLayout {
    /// 由左至右排成一列
    Strip,
    /// 近方形網格，空格保留黑底
    Grid,
}

/// 合成圖設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosaicSettings {
    pub layout: MosaicLayout,
    pub max_width: u32,
    pub max_height: u32,
    /// 每張合成圖包含的幀數（None = 全部合成一張）
    pub frames_per_mosaic: Option<usize>,
    /// JPEG 品質 (1-100)
    pub jpeg_quality: u8,
}

impl Default for MosaicSettings {
    fn default() -> Self {
        Self {
            layout: MosaicLayout::Grid,
            max_width: 4096,
            max_height: 4096,
            frames_per_mosaic: None,
            jpeg_quality: 85,
        }
    }
}

/// 場景偵測設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorSettings {
    /// 場景變換閾值 (0-100)，越低越敏感
    pub threshold: f64,
    /// 分析用的 FPS，越低越快但可能漏掉短鏡頭
    pub analyze_fps: f64,
    /// 縮放到的寬度（加速分析）
    pub scale_width: u32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            threshold: 12.0,
            analyze_fps: 2.0,
            scale_width: 320,
        }
    }
}

/// 整條管線的設定，程式啟動時載入並驗證一次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub sampling: SamplingStrategy,
    pub mosaic: MosaicSettings,
    pub detector: DetectorSettings,
    /// 外部工具單次執行的逾時（秒）
    pub tool_timeout_seconds: u64,
    /// 幀擷取的 ffmpeg -q:v 品質 (1-31，數字越小品質越高)
    pub frame_jpeg_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sampling: SamplingStrategy::Count(10),
            mosaic: MosaicSettings::default(),
            detector: DetectorSettings::default(),
            tool_timeout_seconds: 600,
            frame_jpeg_quality: 2,
        }
    }
}

impl Settings {
    /// 驗證設定值，啟動時呼叫一次，業務邏輯內不再檢查
    pub fn validate(&self) -> Result<()> {
        match self.sampling {
            SamplingStrategy::Count(0) => bail!("取樣張數必須大於 0"),
            SamplingStrategy::EveryNthFrame(0) => bail!("取樣幀間隔必須大於 0"),
            SamplingStrategy::IntervalSeconds(s) if s <= 0.0 => {
                bail!("取樣秒數間隔必須大於 0")
            }
            _ => {}
        }

        if self.mosaic.max_width == 0 || self.mosaic.max_height == 0 {
            bail!("合成圖尺寸上限必須大於 0");
        }
        if self.mosaic.frames_per_mosaic == Some(0) {
            bail!("每張合成圖的幀數必須大於 0");
        }
        if self.mosaic.jpeg_quality == 0 || self.mosaic.jpeg_quality > 100 {
            bail!("合成圖 JPEG 品質必須在 1-100 之間");
        }
        if self.frame_jpeg_quality == 0 || self.frame_jpeg_quality > 31 {
            bail!("幀擷取品質必須在 1-31 之間");
        }
        if self.tool_timeout_seconds == 0 {
            bail!("外部工具逾時必須大於 0");
        }
        if self.detector.threshold <= 0.0 || self.detector.analyze_fps <= 0.0 {
            bail!("場景偵測參數必須大於 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_zero_sample_count_rejected() {
        let settings = Settings {
            sampling: SamplingStrategy::Count(0),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_negative_interval_rejected() {
        let settings = Settings {
            sampling: SamplingStrategy::IntervalSeconds(-1.0),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_mosaic_bounds_rejected() {
        let mut settings = Settings::default();
        settings.mosaic.max_width = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_roundtrip_json() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert!(parsed.validate().is_ok());
    }
}
