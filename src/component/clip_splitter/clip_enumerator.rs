use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 依命名規則列舉切割出的片段檔案
///
/// 切割工具的回傳值不可信（部分呼叫是射後不理），唯一的驗證方式
/// 是比對目錄內容與命名規則 `<basename>_scene_<NNN>.<ext>`。
/// 回傳 (場景索引, 路徑)，依場景索引遞增排序。
pub fn enumerate_scene_clips(
    dir: &Path,
    stem: &str,
    extension: &str,
) -> Result<Vec<(usize, PathBuf)>> {
    let pattern = format!(
        r"^{}_scene_(\d{{3}})\.{}$",
        regex::escape(stem),
        regex::escape(extension)
    );
    let clip_regex = Regex::new(&pattern).with_context(|| "無法建立片段命名規則")?;

    let mut clips = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("無法列舉目錄: {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if let Some(caps) = clip_regex.captures(&file_name) {
            if let Some(index) = caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) {
                clips.push((index, entry.path().to_path_buf()));
            }
        }
    }

    clips.sort_by_key(|(index, _)| *index);
    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_enumerate_scene_clips_sorted_by_index() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "demo_scene_002.mp4",
            "demo_scene_000.mp4",
            "demo_scene_001.mp4",
        ] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let clips = enumerate_scene_clips(dir.path(), "demo", "mp4").unwrap();
        assert_eq!(clips.len(), 3);
        assert_eq!(clips[0].0, 0);
        assert_eq!(clips[2].0, 2);
        assert!(clips[1].1.ends_with("demo_scene_001.mp4"));
    }

    #[test]
    fn test_enumerate_scene_clips_ignores_non_matching() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "demo_scene_000.mp4",
            "demo_scene_01.mp4",
            "demo_scene_000.mkv",
            "other_scene_000.mp4",
            "demo.mp4",
        ] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let clips = enumerate_scene_clips(dir.path(), "demo", "mp4").unwrap();
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].0, 0);
    }

    #[test]
    fn test_enumerate_scene_clips_escapes_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a+b_scene_000.mp4"), b"x").unwrap();
        fs::write(dir.path().join("aXb_scene_001.mp4"), b"x").unwrap();

        let clips = enumerate_scene_clips(dir.path(), "a+b", "mp4").unwrap();
        assert_eq!(clips.len(), 1);
    }

    #[test]
    fn test_enumerate_scene_clips_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let clips = enumerate_scene_clips(dir.path(), "demo", "mp4").unwrap();
        assert!(clips.is_empty());
    }
}
