use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::clip_enumerator::enumerate_scene_clips;
use crate::component::scene_segmenter::Scene;
use crate::error::{PipelineError, ProcessingWarning};
use crate::tools::{VideoInfo, get_video_info, run_tool};

/// 一個場景實體化後的片段檔案
#[derive(Debug, Clone, Serialize)]
pub struct Clip {
    pub path: PathBuf,
    /// 所屬場景索引（0 起算）
    pub scene_index: usize,
    pub frame_rate: f64,
    pub total_frames: u64,
}

impl Clip {
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.to_string_lossy().to_string(), |n| {
                n.to_string_lossy().to_string()
            })
    }
}

/// 切割結果：片段列表加上探測階段產生的警告
#[derive(Debug)]
pub struct SplitOutcome {
    pub clips: Vec<Clip>,
    pub warnings: Vec<ProcessingWarning>,
}

/// 片段切割器：依場景列表把影片切成獨立的片段檔案
pub struct ClipSplitter {
    timeout: Duration,
}

impl ClipSplitter {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// 切割影片，回傳依場景順序排列的片段
    ///
    /// 0 或 1 個場景時不切割，直接把來源影片原地當作唯一片段；
    /// 切割後列舉不到任何檔案時同樣回退到來源影片，讓短片也能繼續
    /// 走完整條管線。
    pub fn split(
        &self,
        video_path: &Path,
        info: &VideoInfo,
        scenes: &[Scene],
    ) -> Result<SplitOutcome, PipelineError> {
        if scenes.len() <= 1 {
            info!("場景數 <= 1，來源影片直接作為唯一片段");
            return Ok(SplitOutcome {
                clips: vec![source_as_clip(video_path, info)],
                warnings: Vec::new(),
            });
        }

        let stem = file_stem(video_path);
        let extension = file_extension(video_path);
        let directory = video_path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let output_pattern = directory.join(format!("{stem}_scene_%03d.{extension}"));
        let args = build_segment_args(video_path, scenes, &output_pattern);

        let output = run_tool("ffmpeg", &args, self.timeout).map_err(|e| {
            PipelineError::Splitting {
                path: video_path.to_path_buf(),
                detail: format!("{e:#}"),
            }
        })?;

        if !output.success {
            return Err(PipelineError::Splitting {
                path: video_path.to_path_buf(),
                detail: output.stderr_text(),
            });
        }

        // 工具輸出不可信，以目錄列舉為準
        let found =
            enumerate_scene_clips(&directory, &stem, &extension).map_err(|e| {
                PipelineError::Splitting {
                    path: video_path.to_path_buf(),
                    detail: format!("{e:#}"),
                }
            })?;

        if found.is_empty() {
            warn!(
                "切割工具未產生任何片段檔案，回退為單一片段: {}",
                video_path.display()
            );
            return Ok(SplitOutcome {
                clips: vec![source_as_clip(video_path, info)],
                warnings: Vec::new(),
            });
        }

        info!("切割完成: {} 個場景 -> {} 個片段", scenes.len(), found.len());
        Ok(self.probe_clips(found, info))
    }

    /// 逐一探測片段資訊；探測失敗的片段以零幀記錄並附上警告
    fn probe_clips(&self, found: Vec<(usize, PathBuf)>, info: &VideoInfo) -> SplitOutcome {
        let mut clips = Vec::with_capacity(found.len());
        let mut warnings = Vec::new();

        for (scene_index, path) in found {
            match get_video_info(&path, self.timeout) {
                Ok(clip_info) => clips.push(Clip {
                    path,
                    scene_index,
                    frame_rate: clip_info.frame_rate,
                    total_frames: clip_info.total_frames,
                }),
                Err(e) => {
                    let name = path
                        .file_name()
                        .map_or_else(String::new, |n| n.to_string_lossy().to_string());
                    warn!("片段探測失敗 {name}: {e:#}");
                    warnings.push(ProcessingWarning::ClipProcessing {
                        clip: name,
                        detail: format!("{e:#}"),
                    });
                    clips.push(Clip {
                        path,
                        scene_index,
                        frame_rate: info.frame_rate,
                        total_frames: 0,
                    });
                }
            }
        }

        SplitOutcome { clips, warnings }
    }
}

/// 來源影片原地作為唯一片段（不複製、不改名）
fn source_as_clip(video_path: &Path, info: &VideoInfo) -> Clip {
    Clip {
        path: video_path.to_path_buf(),
        scene_index: 0,
        frame_rate: info.frame_rate,
        total_frames: info.total_frames,
    }
}

/// 單次 ffmpeg segment 呼叫的參數：以場景起點作為切割時間
fn build_segment_args(video_path: &Path, scenes: &[Scene], output_pattern: &Path) -> Vec<String> {
    let segment_times: Vec<String> = scenes
        .iter()
        .skip(1)
        .map(|scene| format!("{:.3}", scene.start_time))
        .collect();

    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        video_path.to_string_lossy().to_string(),
        "-map".to_string(),
        "0".to_string(),
        "-c".to_string(),
        "copy".to_string(),
        "-f".to_string(),
        "segment".to_string(),
        "-segment_times".to_string(),
        segment_times.join(","),
        "-reset_timestamps".to_string(),
        "1".to_string(),
        "-y".to_string(),
        output_pattern.to_string_lossy().to_string(),
    ]
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string())
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .map_or_else(|| "mp4".to_string(), |e| e.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::scene_segmenter::build_scenes;

    fn sample_info() -> VideoInfo {
        VideoInfo {
            duration_seconds: 60.0,
            width: 1280,
            height: 720,
            frame_rate: 30.0,
            total_frames: 1800,
        }
    }

    #[test]
    fn test_build_segment_args_uses_scene_starts() {
        let scenes = build_scenes(60.0, &[10.0, 25.5]);
        let args = build_segment_args(
            Path::new("/videos/demo.mp4"),
            &scenes,
            Path::new("/videos/demo_scene_%03d.mp4"),
        );

        let joined = args.join(" ");
        assert!(joined.contains("-segment_times 10.000,25.500"));
        assert!(joined.contains("-c copy"));
        assert!(joined.contains("demo_scene_%03d.mp4"));
        // 參數向量執行，路徑不應被引號包裹
        assert!(args.contains(&"/videos/demo.mp4".to_string()));
    }

    #[test]
    fn test_single_scene_uses_source_as_clip() {
        let splitter = ClipSplitter::new(Duration::from_secs(10));
        let scenes = build_scenes(60.0, &[]);
        let outcome = splitter
            .split(Path::new("/videos/demo.mp4"), &sample_info(), &scenes)
            .unwrap();

        assert_eq!(outcome.clips.len(), 1);
        assert_eq!(outcome.clips[0].scene_index, 0);
        assert_eq!(outcome.clips[0].path, PathBuf::from("/videos/demo.mp4"));
        assert_eq!(outcome.clips[0].total_frames, 1800);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_clip_name() {
        let clip = Clip {
            path: PathBuf::from("/videos/demo_scene_001.mp4"),
            scene_index: 1,
            frame_rate: 30.0,
            total_frames: 100,
        };
        assert_eq!(clip.name(), "demo_scene_001.mp4");
    }

    #[test]
    fn test_file_stem_and_extension_fallbacks() {
        assert_eq!(file_stem(Path::new("/v/demo.mkv")), "demo");
        assert_eq!(file_extension(Path::new("/v/demo.mkv")), "mkv");
        assert_eq!(file_extension(Path::new("/v/demo")), "mp4");
    }
}
