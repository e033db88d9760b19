use crate::config::SamplingStrategy;

/// 依取樣策略計算要讀取的幀位置
///
/// 回傳嚴格遞增的位置列表，範圍為 `[0, total_frames)`（尾端不含）。
/// `total_frames == 0` 時回傳空列表，這是合法的退化片段而非錯誤。
///
/// 張數模式：取 `m = min(n, total_frames)`，位置為
/// `i * total_frames / m`（整數除法），保證無重複且不因 n 過大而失敗。
#[must_use]
pub fn select_positions(
    total_frames: u64,
    frame_rate: f64,
    strategy: SamplingStrategy,
) -> Vec<u64> {
    if total_frames == 0 {
        return Vec::new();
    }

    match strategy {
        SamplingStrategy::Count(n) => {
            if n == 0 {
                return Vec::new();
            }
            let count = (n as u64).min(total_frames);
            (0..count).map(|i| i * total_frames / count).collect()
        }
        SamplingStrategy::EveryNthFrame(k) => every_nth(total_frames, k.max(1)),
        SamplingStrategy::IntervalSeconds(seconds) => {
            let step = if seconds > 0.0 && frame_rate > 0.0 {
                ((seconds * frame_rate).round() as u64).max(1)
            } else {
                1
            };
            every_nth(total_frames, step)
        }
    }
}

fn every_nth(total_frames: u64, step: u64) -> Vec<u64> {
    (0..)
        .map(|i| i * step)
        .take_while(|&position| position < total_frames)
        .collect()
}
