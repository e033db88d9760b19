mod load;
mod types;

pub use load::load_settings;
pub use types::{DetectorSettings, MosaicLayout, MosaicSettings, SamplingStrategy, Settings};
