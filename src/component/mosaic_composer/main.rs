use anyhow::{Context, Result};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use log::{debug, info, warn};

use super::layout::{compose_grid, compose_strip};
use crate::component::frame_sampler::Frame;
use crate::config::{MosaicLayout, MosaicSettings};
use crate::error::ProcessingWarning;

/// 合成結果：依區塊順序排列的 JPEG 位元組，加上被省略項目的警告
#[derive(Debug, Default)]
pub struct MosaicOutcome {
    pub composites: Vec<Vec<u8>>,
    pub warnings: Vec<ProcessingWarning>,
}

/// 合成器：把取樣幀拼成受尺寸上限約束的合成圖
pub struct MosaicComposer {
    settings: MosaicSettings,
}

impl MosaicComposer {
    #[must_use]
    pub const fn new(settings: MosaicSettings) -> Self {
        Self { settings }
    }

    /// 依時間軸順序把幀分塊合成
    ///
    /// 區塊之間互不影響：無法解碼的幀跳過並記警告；整個區塊
    /// 都解碼失敗時自輸出省略該區塊，其餘區塊照常產出。
    #[must_use]
    pub fn compose(&self, frames: &[Frame]) -> MosaicOutcome {
        let mut outcome = MosaicOutcome::default();
        if frames.is_empty() {
            debug!("沒有任何幀可合成");
            return outcome;
        }

        let chunk_size = self
            .settings
            .frames_per_mosaic
            .unwrap_or(frames.len())
            .max(1);

        for (chunk_index, chunk) in frames.chunks(chunk_size).enumerate() {
            let images = self.load_chunk(chunk, &mut outcome.warnings);

            if images.is_empty() {
                warn!("合成區塊 {chunk_index} 沒有任何可解碼的幀，已省略");
                outcome.warnings.push(ProcessingWarning::Composition {
                    chunk_index,
                    detail: format!("區塊內 {} 張幀全數無法解碼", chunk.len()),
                });
                continue;
            }

            match self.compose_chunk(&images) {
                Ok(bytes) => outcome.composites.push(bytes),
                Err(e) => {
                    warn!("合成區塊 {chunk_index} 失敗: {e:#}");
                    outcome.warnings.push(ProcessingWarning::Composition {
                        chunk_index,
                        detail: format!("{e:#}"),
                    });
                }
            }
        }

        info!(
            "合成完成: {} 張合成圖, {} 筆警告",
            outcome.composites.len(),
            outcome.warnings.len()
        );
        outcome
    }

    /// 讀入一個區塊的幀影像，跳過無法解碼的檔案
    fn load_chunk(
        &self,
        chunk: &[Frame],
        warnings: &mut Vec<ProcessingWarning>,
    ) -> Vec<DynamicImage> {
        let mut images = Vec::with_capacity(chunk.len());

        for frame in chunk {
            match image::open(&frame.path) {
                Ok(img) => images.push(img),
                Err(e) => {
                    warn!("幀無法解碼 {}: {e}", frame.path.display());
                    warnings.push(ProcessingWarning::FrameDecode {
                        path: frame.path.clone(),
                        detail: e.to_string(),
                    });
                }
            }
        }

        images
    }

    fn compose_chunk(&self, images: &[DynamicImage]) -> Result<Vec<u8>> {
        let canvas = match self.settings.layout {
            MosaicLayout::Strip => {
                compose_strip(images, self.settings.max_width, self.settings.max_height)?
            }
            MosaicLayout::Grid => {
                compose_grid(images, self.settings.max_width, self.settings.max_height)?
            }
        };

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.settings.jpeg_quality)
            .encode_image(&canvas)
            .with_context(|| "無法編碼合成圖為 JPEG")?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::{Path, PathBuf};

    fn settings(layout: MosaicLayout, frames_per_mosaic: Option<usize>) -> MosaicSettings {
        MosaicSettings {
            layout,
            max_width: 4096,
            max_height: 4096,
            frames_per_mosaic,
            jpeg_quality: 85,
        }
    }

    fn write_frame(dir: &Path, index: usize) -> Frame {
        let path = dir.join(format!("frame_{index:04}.jpg"));
        let img = RgbImage::from_pixel(32, 16, Rgb([(index * 40) as u8, 0, 0]));
        img.save(&path).unwrap();

        Frame {
            clip_name: "demo_scene_000.mp4".to_string(),
            scene_index: 0,
            index,
            position: index as u64,
            timestamp_seconds: index as f64,
            path,
        }
    }

    fn broken_frame(dir: &Path, index: usize) -> Frame {
        let path = dir.join(format!("frame_{index:04}.jpg"));
        std::fs::write(&path, b"not a jpeg").unwrap();

        Frame {
            clip_name: "demo_scene_000.mp4".to_string(),
            scene_index: 0,
            index,
            position: index as u64,
            timestamp_seconds: index as f64,
            path,
        }
    }

    #[test]
    fn test_compose_default_single_composite() {
        let dir = tempfile::tempdir().unwrap();
        let frames: Vec<Frame> = (0..4).map(|i| write_frame(dir.path(), i)).collect();

        let composer = MosaicComposer::new(settings(MosaicLayout::Grid, None));
        let outcome = composer.compose(&frames);

        assert_eq!(outcome.composites.len(), 1);
        assert!(outcome.warnings.is_empty());
        // 產出是合法的 JPEG
        let decoded = image::load_from_memory(&outcome.composites[0]).unwrap();
        assert_eq!(decoded.width(), 64);
        assert_eq!(decoded.height(), 32);
    }

    #[test]
    fn test_compose_chunked() {
        let dir = tempfile::tempdir().unwrap();
        let frames: Vec<Frame> = (0..5).map(|i| write_frame(dir.path(), i)).collect();

        let composer = MosaicComposer::new(settings(MosaicLayout::Strip, Some(2)));
        let outcome = composer.compose(&frames);

        // 5 幀、每塊 2 幀 -> 3 張合成圖
        assert_eq!(outcome.composites.len(), 3);
    }

    #[test]
    fn test_compose_skips_undecodable_frame() {
        let dir = tempfile::tempdir().unwrap();
        let frames = vec![
            write_frame(dir.path(), 0),
            broken_frame(dir.path(), 1),
            write_frame(dir.path(), 2),
        ];

        let composer = MosaicComposer::new(settings(MosaicLayout::Strip, None));
        let outcome = composer.compose(&frames);

        assert_eq!(outcome.composites.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            outcome.warnings[0],
            ProcessingWarning::FrameDecode { .. }
        ));
    }

    #[test]
    fn test_compose_omits_fully_broken_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let frames = vec![
            write_frame(dir.path(), 0),
            write_frame(dir.path(), 1),
            broken_frame(dir.path(), 2),
            broken_frame(dir.path(), 3),
        ];

        let composer = MosaicComposer::new(settings(MosaicLayout::Grid, Some(2)));
        let outcome = composer.compose(&frames);

        // 第二塊整塊省略，第一塊照常產出
        assert_eq!(outcome.composites.len(), 1);
        let chunk_warnings: Vec<_> = outcome
            .warnings
            .iter()
            .filter(|w| matches!(w, ProcessingWarning::Composition { chunk_index: 1, .. }))
            .collect();
        assert_eq!(chunk_warnings.len(), 1);
    }

    #[test]
    fn test_compose_empty_timeline() {
        let composer = MosaicComposer::new(settings(MosaicLayout::Grid, None));
        let outcome = composer.compose(&[]);
        assert!(outcome.composites.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_missing_file_records_warning() {
        let composer = MosaicComposer::new(settings(MosaicLayout::Grid, None));
        let frames = vec![Frame {
            clip_name: "demo.mp4".to_string(),
            scene_index: 0,
            index: 0,
            position: 0,
            timestamp_seconds: 0.0,
            path: PathBuf::from("/nonexistent/frame_0000.jpg"),
        }];

        let outcome = composer.compose(&frames);
        assert!(outcome.composites.is_empty());
        // 一筆解碼警告 + 一筆區塊省略警告
        assert_eq!(outcome.warnings.len(), 2);
    }
}
