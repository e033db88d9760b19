use anyhow::{Context, Result, bail};
use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::position_selector::select_positions;
use crate::component::clip_splitter::Clip;
use crate::config::SamplingStrategy;
use crate::error::ProcessingWarning;
use crate::tools::{ensure_directory_exists, run_tool};

/// 兩段式 seek 的前置緩衝時間（秒）
const SEEK_MARGIN: f64 = 2.0;

/// 從片段取樣出的單一靜態幀，建立後不再變動
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// 所屬片段檔名
    pub clip_name: String,
    /// 所屬場景順序，跨片段排序的決勝鍵
    pub scene_index: usize,
    /// 片段內的序號（0 起算），同時是檔名編號
    pub index: usize,
    /// 來源幀位置
    pub position: u64,
    pub timestamp_seconds: f64,
    pub path: PathBuf,
}

/// 單一片段的取樣結果
#[derive(Debug, Default)]
pub struct SampleResult {
    pub frames: Vec<Frame>,
    pub warnings: Vec<ProcessingWarning>,
}

/// 幀取樣器：對單一片段決定取樣位置、解碼並落地為 JPEG
pub struct FrameSampler {
    strategy: SamplingStrategy,
    jpeg_quality: u8,
    timeout: Duration,
}

impl FrameSampler {
    #[must_use]
    pub const fn new(strategy: SamplingStrategy, jpeg_quality: u8, timeout: Duration) -> Self {
        Self {
            strategy,
            jpeg_quality,
            timeout,
        }
    }

    /// 取樣一個片段
    ///
    /// 單一位置解碼失敗只記一筆警告並跳過，片段內其餘位置照常處理；
    /// 整個片段無法處理（例如輸出目錄建不起來）才回傳錯誤，由管線
    /// 把該片段記為零幀。每次擷取都是獨立子程序，解碼資源在任何
    /// 結束路徑上都會釋放。
    pub fn sample(&self, clip: &Clip, shutdown_signal: &AtomicBool) -> Result<SampleResult> {
        let positions = select_positions(clip.total_frames, clip.frame_rate, self.strategy);
        if positions.is_empty() {
            debug!("片段 {} 沒有可取樣的幀", clip.name());
            return Ok(SampleResult::default());
        }

        let frames_dir = frames_dir_for(&clip.path);
        ensure_directory_exists(&frames_dir)
            .with_context(|| format!("無法建立幀輸出目錄: {}", frames_dir.display()))?;

        let clip_name = clip.name();
        let mut result = SampleResult::default();

        for (index, &position) in positions.iter().enumerate() {
            if shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷信號，片段 {clip_name} 停止取樣");
                break;
            }

            let timestamp_seconds = if clip.frame_rate > 0.0 {
                position as f64 / clip.frame_rate
            } else {
                0.0
            };
            let frame_path = frames_dir.join(format!("frame_{index:04}.jpg"));

            match self.extract_frame(&clip.path, timestamp_seconds, &frame_path) {
                Ok(()) => result.frames.push(Frame {
                    clip_name: clip_name.clone(),
                    scene_index: clip.scene_index,
                    index,
                    position,
                    timestamp_seconds,
                    path: frame_path,
                }),
                Err(e) => {
                    warn!("片段 {clip_name} 位置 {position} 取樣失敗: {e:#}");
                    result.warnings.push(ProcessingWarning::SamplingSkip {
                        clip: clip_name.clone(),
                        position,
                        detail: format!("{e:#}"),
                    });
                }
            }
        }

        debug!(
            "片段 {clip_name} 取樣完成: {} 幀, {} 筆警告",
            result.frames.len(),
            result.warnings.len()
        );
        Ok(result)
    }

    /// 擷取單一幀（兩段式 seek：先快速跳轉關鍵幀，再精準定位）
    fn extract_frame(&self, clip_path: &Path, timestamp: f64, output_path: &Path) -> Result<()> {
        let args = build_extract_args(clip_path, timestamp, output_path, self.jpeg_quality);

        let output = run_tool("ffmpeg", &args, self.timeout)
            .with_context(|| format!("無法執行 ffmpeg 擷取幀: {}", clip_path.display()))?;

        if !output.success {
            bail!("ffmpeg 擷取幀失敗: {}", output.stderr_text());
        }

        if !output_path.exists() {
            bail!("幀檔案未建立: {}", output_path.display());
        }

        Ok(())
    }
}

/// 幀輸出目錄：片段同層的 `<clip-basename>_frames/`
#[must_use]
pub fn frames_dir_for(clip_path: &Path) -> PathBuf {
    let stem = clip_path
        .file_stem()
        .map_or_else(|| "clip".to_string(), |s| s.to_string_lossy().to_string());
    let parent = clip_path.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_frames"))
}

fn build_extract_args(
    clip_path: &Path,
    timestamp: f64,
    output_path: &Path,
    quality: u8,
) -> Vec<String> {
    let t0 = (timestamp - SEEK_MARGIN).max(0.0);
    let delta = timestamp - t0;

    let mut args = vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
    ];

    // 第一個 -ss（在 -i 前）：快速跳轉到最近的關鍵幀
    if t0 > 0.0 {
        args.push("-ss".to_string());
        args.push(format!("{t0:.3}"));
    }

    args.push("-i".to_string());
    args.push(clip_path.to_string_lossy().to_string());

    // 第二個 -ss（在 -i 後）：精準解碼到目標時間點
    if delta > 0.0 {
        args.push("-ss".to_string());
        args.push(format!("{delta:.3}"));
    }

    args.extend([
        "-frames:v".to_string(),
        "1".to_string(),
        "-an".to_string(),
        "-sn".to_string(),
        "-dn".to_string(),
        "-threads".to_string(),
        "1".to_string(),
        "-q:v".to_string(),
        quality.to_string(),
        "-y".to_string(),
        output_path.to_string_lossy().to_string(),
    ]);

    args
}
