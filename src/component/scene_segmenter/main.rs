use anyhow::Result;
use log::{debug, info};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::config::DetectorSettings;
use crate::error::PipelineError;
use crate::tools::{VideoInfo, detect_scene_changes};

/// 一段連續的時間範圍，對應兩個鏡頭邊界之間的內容
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    /// 0 起算的場景索引
    pub index: usize,
    pub start_time: f64,
    /// None 表示開放結尾（直到影片結束）
    pub end_time: Option<f64>,
}

impl Scene {
    #[must_use]
    pub fn is_open_ended(&self) -> bool {
        self.end_time.is_none()
    }
}

/// 場景切分器：把影片切成無縫隙、不重疊、依序排列的場景範圍
pub struct SceneSegmenter {
    detector: DetectorSettings,
    timeout: Duration,
}

impl SceneSegmenter {
    #[must_use]
    pub const fn new(detector: DetectorSettings, timeout: Duration) -> Self {
        Self { detector, timeout }
    }

    /// 執行偵測並組出完整覆蓋 `[0, duration]` 的場景列表
    ///
    /// 偵測器失敗即中止整個請求：沒有場景就無法推導任何片段。
    pub fn segment(&self, path: &Path, info: &VideoInfo) -> Result<Vec<Scene>, PipelineError> {
        let cuts = detect_scene_changes(path, info, &self.detector, self.timeout).map_err(|e| {
            PipelineError::Segmentation {
                path: path.to_path_buf(),
                detail: format!("{e:#}"),
            }
        })?;

        let scenes = build_scenes(info.duration_seconds, &cuts);
        info!(
            "場景切分完成: {} 個切換點 -> {} 個場景",
            cuts.len(),
            scenes.len()
        );
        Ok(scenes)
    }
}

/// 從切換時間點組出場景範圍
///
/// 最後一個場景一律開放結尾，即使偵測器只回報單一場景也不信任其
/// 回報的結束時間，確保完整覆蓋到檔案結尾。
#[must_use]
pub fn build_scenes(duration: f64, cuts: &[f64]) -> Vec<Scene> {
    let mut boundaries = vec![0.0];
    boundaries.extend(cuts.iter().copied().filter(|&c| c > 0.0 && c < duration));
    boundaries.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    boundaries.dedup_by(|a, b| (*a - *b).abs() < 0.001);

    if boundaries.len() == 1 {
        debug!("沒有可用的切換點，整部影片視為單一開放場景");
    }

    let count = boundaries.len();
    boundaries
        .iter()
        .enumerate()
        .map(|(index, &start_time)| Scene {
            index,
            start_time,
            end_time: if index + 1 < count {
                Some(boundaries[index + 1])
            } else {
                None
            },
        })
        .collect()
}
