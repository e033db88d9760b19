//! 鏡頭邊界偵測
//!
//! 以 ffmpeg 的 scdet 濾鏡作為外部偵測能力，輸出切換時間點（秒）。
//! 偵測結果只是訊號，片段範圍的組裝由 `SceneSegmenter` 負責。

use anyhow::{Context, Result, bail};
use log::debug;
use regex::Regex;
use std::path::Path;
use std::time::Duration;

use super::ffprobe_info::VideoInfo;
use super::media_runner::run_tool;
use crate::config::DetectorSettings;

/// 使用 ffmpeg scdet 濾鏡偵測場景切換時間點
///
/// 回傳遞增排序、去重後的切換時間（秒）；找不到切換點時回傳空列表。
pub fn detect_scene_changes(
    path: &Path,
    video_info: &VideoInfo,
    settings: &DetectorSettings,
    timeout: Duration,
) -> Result<Vec<f64>> {
    let analyze_fps = effective_analyze_fps(video_info.duration_seconds, settings.analyze_fps);

    debug!(
        "場景偵測設定: threshold={}, analyze_fps={}, scale_width={}",
        settings.threshold, analyze_fps, settings.scale_width
    );

    // scdet 濾鏡將場景切換資訊輸出到 stderr
    let filter = format!(
        "scale={}:-1,fps={},scdet=s=1:t={}",
        settings.scale_width, analyze_fps, settings.threshold
    );

    let args = vec![
        "-hide_banner".to_string(),
        "-i".to_string(),
        path.to_string_lossy().to_string(),
        "-an".to_string(),
        "-sn".to_string(),
        "-dn".to_string(),
        "-threads".to_string(),
        "1".to_string(),
        "-vf".to_string(),
        filter,
        "-f".to_string(),
        "null".to_string(),
        "-".to_string(),
    ];

    let output = run_tool("ffmpeg", &args, timeout)
        .with_context(|| format!("無法執行 ffmpeg 場景偵測: {}", path.display()))?;

    if !output.success {
        bail!("ffmpeg 場景偵測失敗: {}", output.stderr_text());
    }

    parse_scdet_output(&output.stderr_text(), video_info.duration_seconds)
}

/// 長片自動降低分析 FPS，避免偵測時間過長
fn effective_analyze_fps(duration: f64, configured: f64) -> f64 {
    let ceiling = if duration > 7200.0 {
        0.5
    } else if duration > 3600.0 {
        1.0
    } else {
        configured
    };
    configured.min(ceiling)
}

/// 解析 ffmpeg scdet 輸出
///
/// 格式可能是 `t:NN.NNNN pts_time:NN.NNNN` 或 `lavfi.scd.time=NN.NNNN`
fn parse_scdet_output(output: &str, duration: f64) -> Result<Vec<f64>> {
    let time_regex = Regex::new(r"t:([0-9.]+)")?;
    let scd_time_regex = Regex::new(r"lavfi\.scd\.time=([0-9.]+)")?;

    let mut cuts = Vec::new();

    for line in output.lines() {
        let timestamp = time_regex
            .captures(line)
            .or_else(|| scd_time_regex.captures(line))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|&t| t > 0.0 && t < duration);

        if let Some(timestamp) = timestamp {
            cuts.push(timestamp);
        }
    }

    // 去重並排序
    cuts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    cuts.dedup_by(|a, b| (*a - *b).abs() < 0.1);

    debug!("偵測到 {} 個場景切換點", cuts.len());

    Ok(cuts)
}
