use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use log::{info, warn};
use std::path::{Path, PathBuf};

use video_scene_sampler::component::pipeline::{ProcessOutcome, ScenePipeline};
use video_scene_sampler::config::load_settings;
use video_scene_sampler::error::PipelineError;
use video_scene_sampler::init;
use video_scene_sampler::signal::setup_shutdown_signal;
use video_scene_sampler::tools::validate_file_exists;

fn main() -> Result<()> {
    init::init();
    let shutdown_signal = setup_shutdown_signal();

    // 第一個參數可指定設定檔，省略時用預設值
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = load_settings(config_path.as_deref())?;

    let input: String = Input::new()
        .with_prompt("請輸入影片路徑")
        .interact_text()
        .context("讀取輸入失敗")?;
    let video_path = PathBuf::from(input.trim());
    validate_file_exists(&video_path)?;

    let pipeline = ScenePipeline::new(settings, shutdown_signal);
    match pipeline.process(&video_path, None) {
        Ok(outcome) => {
            report_outcome(&outcome);
            write_mosaics(&outcome)?;
        }
        Err(PipelineError::Cancelled) => {
            warn!("使用者中斷，處理未完成");
            println!("\n{}", style("已中斷").yellow().bold());
        }
        Err(e) => {
            eprintln!("{} {e}", style("錯誤:").red().bold());
            return Err(e.into());
        }
    }

    Ok(())
}

fn report_outcome(outcome: &ProcessOutcome) {
    println!(
        "\n{} {}",
        style("處理完成:").green().bold(),
        outcome.video_path.display()
    );
    println!(
        "  場景 {} 個, 片段 {} 個, 取樣 {} 幀, 合成圖 {} 張",
        outcome.scenes.len(),
        outcome.clips.len(),
        outcome.timeline.len(),
        outcome.mosaics.len()
    );

    if !outcome.warnings.is_empty() {
        println!(
            "  {} {} 筆（詳見日誌）",
            style("警告").yellow(),
            outcome.warnings.len()
        );
    }

    if let Some(summary) = &outcome.summary {
        println!("\n{}", style("摘要:").cyan().bold());
        println!("{}", summary.summary);
    }
}

/// 把合成圖寫到影片旁邊，命名為 `<主檔名>_mosaic_<NN>.jpg`
fn write_mosaics(outcome: &ProcessOutcome) -> Result<()> {
    if outcome.mosaics.is_empty() {
        return Ok(());
    }

    let stem = outcome
        .video_path
        .file_stem()
        .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string());
    let parent = outcome
        .video_path
        .parent()
        .unwrap_or_else(|| Path::new("."));

    for (index, bytes) in outcome.mosaics.iter().enumerate() {
        let output = parent.join(format!("{stem}_mosaic_{index:02}.jpg"));
        std::fs::write(&output, bytes)
            .with_context(|| format!("無法寫入合成圖: {}", output.display()))?;
        info!("合成圖已寫入: {}", output.display());
        println!("  -> {}", output.display());
    }

    Ok(())
}
