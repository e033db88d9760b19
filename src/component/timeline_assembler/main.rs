use std::cmp::Ordering;

use crate::component::frame_sampler::Frame;

/// 全域時間排序後的幀序列
#[derive(Debug, Default)]
pub struct Timeline {
    pub frames: Vec<Frame>,
}

impl Timeline {
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// 把所有片段的幀合併成單一時間軸
///
/// 排序鍵：時間戳遞增，時間相同時依場景順序，再依片段內序號。
/// 這是全序，因此結果與片段的處理順序無關（片段可能平行處理）。
/// 不丟棄也不去重任何幀；切割邊界造成的相同時間戳是合法情況。
#[must_use]
pub fn assemble(mut frames: Vec<Frame>) -> Timeline {
    frames.sort_by(|a, b| {
        a.timestamp_seconds
            .partial_cmp(&b.timestamp_seconds)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.scene_index.cmp(&b.scene_index))
            .then_with(|| a.index.cmp(&b.index))
    });

    Timeline { frames }
}
