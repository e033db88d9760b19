use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::component::clip_splitter::{Clip, ClipSplitter, SplitOutcome};
use crate::component::frame_sampler::{Frame, FrameSampler, SampleResult};
use crate::component::mosaic_composer::{MosaicComposer, MosaicOutcome};
use crate::component::scene_segmenter::{Scene, SceneSegmenter};
use crate::component::summarizer::{SummaryResult, SummaryService};
use crate::component::timeline_assembler::{Timeline, assemble};
use crate::config::Settings;
use crate::error::{PipelineError, ProcessingWarning};
use crate::tools::{VideoInfo, get_video_info};

/// 單一請求的完整處理結果
///
/// 片段與幀檔案保留在磁碟上作為請求產物，由外部清理端回收；
/// 時間軸與合成圖是可重算的衍生資料。
pub struct ProcessOutcome {
    pub request_id: Uuid,
    pub video_path: PathBuf,
    pub video: VideoInfo,
    pub scenes: Vec<Scene>,
    pub clips: Vec<Clip>,
    pub timeline: Timeline,
    pub mosaics: Vec<Vec<u8>>,
    pub warnings: Vec<ProcessingWarning>,
    pub summary: Option<SummaryResult>,
}

/// 場景取樣管線
///
/// 五階段依序執行：探測 -> 場景切分 -> 片段切割 -> 幀取樣（片段
/// 平行）-> 時間軸合併 -> 合成。片段層級的失敗局部回復；影片層級
/// 的失敗中止整個請求。
pub struct ScenePipeline {
    settings: Settings,
    shutdown_signal: Arc<AtomicBool>,
    summarizer: Option<Arc<dyn SummaryService>>,
}

impl ScenePipeline {
    #[must_use]
    pub fn new(settings: Settings, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            settings,
            shutdown_signal,
            summarizer: None,
        }
    }

    /// 注入摘要服務；未注入時管線止於合成圖
    #[must_use]
    pub fn with_summarizer(mut self, summarizer: Arc<dyn SummaryService>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// 處理一部影片
    pub fn process(
        &self,
        video_path: &Path,
        transcript: Option<&str>,
    ) -> Result<ProcessOutcome, PipelineError> {
        let request_id = Uuid::new_v4();
        let timeout = Duration::from_secs(self.settings.tool_timeout_seconds);

        info!("[{request_id}] 開始處理: {}", video_path.display());

        // 階段 A: 影片資訊
        let video = get_video_info(video_path, timeout).map_err(|e| {
            PipelineError::Acquisition {
                path: video_path.to_path_buf(),
                detail: format!("{e:#}"),
            }
        })?;
        info!(
            "[{request_id}] 影片資訊: {:.1}s, {}x{}, {:.2} fps, {} 幀",
            video.duration_seconds, video.width, video.height, video.frame_rate, video.total_frames
        );
        self.ensure_not_cancelled()?;

        // 階段 B: 場景切分
        let segmenter = SceneSegmenter::new(self.settings.detector.clone(), timeout);
        let scenes = segmenter.segment(video_path, &video)?;
        self.ensure_not_cancelled()?;

        // 階段 C: 片段切割
        let splitter = ClipSplitter::new(timeout);
        let SplitOutcome {
            clips,
            mut warnings,
        } = splitter.split(video_path, &video, &scenes)?;
        self.ensure_not_cancelled()?;

        // 階段 D: 幀取樣（片段平行，結果於收集後依片段順序循序合併）
        let all_frames = self.sample_clips(&clips, timeout, &mut warnings);
        self.ensure_not_cancelled()?;

        // 階段 E: 時間軸合併
        let timeline = assemble(all_frames);
        info!(
            "[{request_id}] 時間軸: {} 幀（{} 個片段）",
            timeline.len(),
            clips.len()
        );

        // 階段 F: 合成
        let composer = MosaicComposer::new(self.settings.mosaic.clone());
        let MosaicOutcome {
            composites,
            warnings: compose_warnings,
        } = composer.compose(&timeline.frames);
        warnings.extend(compose_warnings);

        for warning in &warnings {
            warn!("[{request_id}] {warning}");
        }

        // 階段 G: 摘要（可選，錯誤與影片處理錯誤區分）
        let summary = match &self.summarizer {
            Some(service) => Some(self.run_summarizer(
                service.as_ref(),
                &composites,
                &timeline,
                transcript,
                &mut warnings,
            )?),
            None => None,
        };

        info!(
            "[{request_id}] 處理完成: {} 場景, {} 片段, {} 幀, {} 合成圖, {} 警告",
            scenes.len(),
            clips.len(),
            timeline.len(),
            composites.len(),
            warnings.len()
        );

        Ok(ProcessOutcome {
            request_id,
            video_path: video_path.to_path_buf(),
            video,
            scenes,
            clips,
            timeline,
            mosaics: composites,
            warnings,
            summary,
        })
    }

    /// 平行取樣所有片段
    ///
    /// 每個片段擁有獨占的輸出目錄與子程序，任務各自回傳結果，
    /// 收集完成後才循序合併，不對共享列表做並行寫入。
    fn sample_clips(
        &self,
        clips: &[Clip],
        timeout: Duration,
        warnings: &mut Vec<ProcessingWarning>,
    ) -> Vec<Frame> {
        let sampler = FrameSampler::new(
            self.settings.sampling,
            self.settings.frame_jpeg_quality,
            timeout,
        );

        let progress = ProgressBar::new(clips.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("取樣片段 [{bar:30}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let results: Vec<anyhow::Result<SampleResult>> = clips
            .par_iter()
            .map(|clip| {
                let result = if self.shutdown_signal.load(Ordering::SeqCst) {
                    Ok(SampleResult::default())
                } else {
                    sampler.sample(clip, &self.shutdown_signal)
                };
                progress.inc(1);
                result
            })
            .collect();
        progress.finish_and_clear();

        let mut all_frames = Vec::new();
        for (clip, result) in clips.iter().zip(results) {
            match result {
                Ok(sample) => {
                    all_frames.extend(sample.frames);
                    warnings.extend(sample.warnings);
                }
                Err(e) => {
                    error!("片段 {} 處理失敗: {e:#}", clip.name());
                    warnings.push(ProcessingWarning::ClipProcessing {
                        clip: clip.name(),
                        detail: format!("{e:#}"),
                    });
                }
            }
        }

        all_frames
    }

    /// 呼叫注入的摘要服務
    fn run_summarizer(
        &self,
        service: &dyn SummaryService,
        mosaics: &[Vec<u8>],
        timeline: &Timeline,
        transcript: Option<&str>,
        warnings: &mut Vec<ProcessingWarning>,
    ) -> Result<SummaryResult, PipelineError> {
        let mut frame_bytes = Vec::with_capacity(timeline.len());
        for frame in &timeline.frames {
            match std::fs::read(&frame.path) {
                Ok(bytes) => frame_bytes.push(bytes),
                Err(e) => {
                    warn!("無法讀取幀檔案 {}: {e}", frame.path.display());
                    warnings.push(ProcessingWarning::FrameDecode {
                        path: frame.path.clone(),
                        detail: e.to_string(),
                    });
                }
            }
        }

        service.summarize(mosaics, &frame_bytes, transcript)
    }

    /// 取消只阻止後續處理，已寫入的片段／幀檔案保留給清理端
    fn ensure_not_cancelled(&self) -> Result<(), PipelineError> {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_before_start() {
        let shutdown = Arc::new(AtomicBool::new(true));
        let pipeline = ScenePipeline::new(Settings::default(), shutdown);

        // 探測之前就已取消也必須以 Cancelled 中止（探測不存在的
        // 檔案會先失敗，因此用存在的路徑不可行，直接驗證旗標檢查）
        assert!(matches!(
            pipeline.ensure_not_cancelled(),
            Err(PipelineError::Cancelled)
        ));
    }

    #[test]
    fn test_process_missing_video_is_acquisition_error() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let pipeline = ScenePipeline::new(Settings::default(), shutdown);

        let result = pipeline.process(Path::new("/nonexistent/video.mp4"), None);
        assert!(matches!(
            result,
            Err(PipelineError::Acquisition { .. })
        ));
    }
}
