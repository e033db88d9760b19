//! 影片修剪工具
//!
//! 供影片取得端在處理前先裁切時間範圍。輸出檔案與切割片段共用
//! 同一目錄；輸出檔案是否存在是唯一的成功訊號。

use anyhow::{Context, Result, bail};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::media_runner::run_tool;

/// 修剪影片到 `[start, end]` 範圍
///
/// `precise = false` 時以串流複製裁切（快速，切點對齊關鍵幀）；
/// `precise = true` 時重新編碼（較慢，切點精確）。
pub fn trim_video(
    input: &Path,
    start: Option<f64>,
    end: Option<f64>,
    precise: bool,
    timeout: Duration,
) -> Result<PathBuf> {
    if !input.exists() {
        bail!("來源影片不存在: {}", input.display());
    }

    let output = trimmed_output_path(input);
    let args = build_trim_args(input, &output, start, end, precise);

    let result = run_tool("ffmpeg", &args, timeout)
        .with_context(|| format!("無法執行 ffmpeg 修剪: {}", input.display()))?;

    if !result.success {
        bail!("ffmpeg 修剪失敗: {}", result.stderr_text());
    }

    if !output.exists() {
        bail!("修剪後的檔案未建立: {}", output.display());
    }

    info!("已修剪影片: {}", output.display());
    Ok(output)
}

/// 輸出檔名：同目錄下的 `trimmed_<原始檔名>`
fn trimmed_output_path(input: &Path) -> PathBuf {
    let file_name = input
        .file_name()
        .map_or_else(|| "output.mp4".to_string(), |n| n.to_string_lossy().to_string());
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("trimmed_{file_name}"))
}

fn build_trim_args(
    input: &Path,
    output: &Path,
    start: Option<f64>,
    end: Option<f64>,
    precise: bool,
) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
    ];

    if let Some(start) = start {
        args.push("-ss".to_string());
        args.push(format!("{start:.3}"));
    }
    if let Some(end) = end {
        args.push("-to".to_string());
        args.push(format!("{end:.3}"));
    }

    if precise {
        args.extend([
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "veryfast".to_string(),
            "-crf".to_string(),
            "20".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
        ]);
    } else {
        args.extend(["-c".to_string(), "copy".to_string()]);
    }

    args.push("-y".to_string());
    args.push(output.to_string_lossy().to_string());
    args
}
