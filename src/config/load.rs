use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::Path;

use super::types::Settings;

/// 載入設定檔；未指定路徑時使用預設值
///
/// 設定檔為 JSON 格式，載入後立即驗證，驗證失敗即中止啟動。
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("無法讀取設定檔: {}", path.display()))?;
            let settings: Settings = serde_json::from_str(&content)
                .with_context(|| format!("無法解析設定檔: {}", path.display()))?;
            info!("已載入設定檔: {}", path.display());
            settings
        }
        None => {
            debug!("未指定設定檔，使用預設設定");
            Settings::default()
        }
    };

    settings.validate()?;
    Ok(settings)
}
