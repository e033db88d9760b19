use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::media_runner::run_tool;

/// 來源影片的基本資訊，取得後唯讀
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub total_frames: u64,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    nb_frames: Option<String>,
}

/// 使用 ffprobe 取得影片資訊
pub fn get_video_info(path: &Path, timeout: Duration) -> Result<VideoInfo> {
    let args = vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        path.to_string_lossy().to_string(),
    ];

    let output = run_tool("ffprobe", &args, timeout)
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.success {
        bail!("ffprobe 執行失敗: {}", output.stderr_text());
    }

    parse_probe_output(&output.stdout_text(), path)
}

/// 解析 ffprobe 的 JSON 輸出
fn parse_probe_output(stdout: &str, path: &Path) -> Result<VideoInfo> {
    let probe: FfprobeOutput =
        serde_json::from_str(stdout).with_context(|| "無法解析 ffprobe 輸出")?;

    // 找到視訊串流
    let video_stream = probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })
        .ok_or_else(|| anyhow::anyhow!("找不到視訊串流: {}", path.display()))?;

    let width = video_stream
        .width
        .ok_or_else(|| anyhow::anyhow!("無法取得影片寬度"))?;
    let height = video_stream
        .height
        .ok_or_else(|| anyhow::anyhow!("無法取得影片高度"))?;

    // 取得影片長度（優先從 format，其次從 stream）
    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or(video_stream.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| anyhow::anyhow!("無法取得影片長度"))?;

    let frame_rate = video_stream
        .r_frame_rate
        .as_ref()
        .and_then(|r| parse_frame_rate(r))
        .unwrap_or(30.0);

    // 總幀數優先採用 nb_frames，缺少時以長度乘幀率估算
    let total_frames = video_stream
        .nb_frames
        .as_ref()
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or_else(|| (duration_seconds * frame_rate).round().max(0.0) as u64);

    Ok(VideoInfo {
        duration_seconds,
        width,
        height,
        frame_rate,
        total_frames,
    })
}

/// 解析幀率字串（例如 "30/1" 或 "30000/1001"）
fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num_str, den_str)) = rate.split_once('/') {
        let num: f64 = num_str.parse().ok()?;
        let den: f64 = den_str.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    rate.parse().ok()
}
