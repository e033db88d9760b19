mod ffprobe_info;
mod media_runner;
mod path_validator;
mod scene_detector;
mod trim_tool;

pub use ffprobe_info::{VideoInfo, get_video_info};
pub use media_runner::{ToolOutput, run_tool};
pub use path_validator::{ensure_directory_exists, validate_file_exists};
pub use scene_detector::detect_scene_changes;
pub use trim_tool::trim_video;
