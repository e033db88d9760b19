use anyhow::{Context, Result, bail};
use image::{DynamicImage, GenericImage, RgbImage, imageops::FilterType};

/// 橫列版面：幀由左至右排列
///
/// 合成高度 = 區塊內最高的幀，寬度 = 各幀寬度總和。超出上限時
/// 以單一縮放係數套用到每一幀，保留個別長寬比與幀之間的相對大小。
pub fn compose_strip(
    images: &[DynamicImage],
    max_width: u32,
    max_height: u32,
) -> Result<RgbImage> {
    if images.is_empty() {
        bail!("橫列版面需要至少一張幀");
    }

    let total_width: u32 = images.iter().map(DynamicImage::width).sum();
    let max_frame_height = images.iter().map(DynamicImage::height).max().unwrap_or(1);

    let scale = uniform_scale_factor(total_width, max_frame_height, max_width, max_height);

    let scaled: Vec<RgbImage> = images
        .iter()
        .map(|img| {
            if scale < 1.0 {
                let width = scale_dimension(img.width(), scale);
                let height = scale_dimension(img.height(), scale);
                img.resize_exact(width, height, FilterType::Triangle).to_rgb8()
            } else {
                img.to_rgb8()
            }
        })
        .collect();

    let canvas_width: u32 = scaled.iter().map(RgbImage::width).sum();
    let canvas_height = scaled.iter().map(RgbImage::height).max().unwrap_or(1);
    let mut canvas = RgbImage::new(canvas_width.max(1), canvas_height.max(1));

    let mut x = 0;
    for frame in &scaled {
        canvas
            .copy_from(frame, x, 0)
            .with_context(|| "無法把幀貼入橫列合成圖")?;
        x += frame.width();
    }

    Ok(canvas)
}

/// 網格版面：`rows = ceil(sqrt(count))`，`cols = ceil(count / rows)`
///
/// 每個儲存格使用第一幀的像素尺寸；幀以列優先順序放置，
/// 沒有對應幀的儲存格保留零值背景。
pub fn compose_grid(images: &[DynamicImage], max_width: u32, max_height: u32) -> Result<RgbImage> {
    if images.is_empty() {
        bail!("網格版面需要至少一張幀");
    }

    let (rows, cols) = grid_dimensions(images.len());
    let mut cell_width = images[0].width().max(1);
    let mut cell_height = images[0].height().max(1);

    // 網格整體超出上限時，同樣以單一縮放係數縮小儲存格
    let scale = uniform_scale_factor(
        cell_width * cols as u32,
        cell_height * rows as u32,
        max_width,
        max_height,
    );
    if scale < 1.0 {
        cell_width = scale_dimension(cell_width, scale);
        cell_height = scale_dimension(cell_height, scale);
    }

    let mut canvas = RgbImage::new(cell_width * cols as u32, cell_height * rows as u32);

    for (i, img) in images.iter().enumerate() {
        let col = (i % cols) as u32;
        let row = (i / cols) as u32;
        let cell = img
            .resize_exact(cell_width, cell_height, FilterType::Triangle)
            .to_rgb8();
        canvas
            .copy_from(&cell, col * cell_width, row * cell_height)
            .with_context(|| "無法把幀貼入網格合成圖")?;
    }

    Ok(canvas)
}

/// 網格尺寸：(rows, cols)
#[must_use]
pub fn grid_dimensions(count: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let rows = (count as f64).sqrt().ceil() as usize;
    let cols = count.div_ceil(rows);
    (rows, cols)
}

/// 區塊的統一縮放係數 `min(max_w / w, max_h / h, 1.0)`
fn uniform_scale_factor(width: u32, height: u32, max_width: u32, max_height: u32) -> f64 {
    let width_ratio = f64::from(max_width) / f64::from(width.max(1));
    let height_ratio = f64::from(max_height) / f64::from(height.max(1));
    width_ratio.min(height_ratio).min(1.0)
}

fn scale_dimension(value: u32, scale: f64) -> u32 {
    ((f64::from(value) * scale).floor() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid_frame(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value, value, value])))
    }

    #[test]
    fn test_grid_dimensions() {
        assert_eq!(grid_dimensions(1), (1, 1));
        assert_eq!(grid_dimensions(2), (2, 1));
        assert_eq!(grid_dimensions(4), (2, 2));
        assert_eq!(grid_dimensions(5), (3, 2));
        assert_eq!(grid_dimensions(9), (3, 3));
        assert_eq!(grid_dimensions(10), (4, 3));
    }

    #[test]
    fn test_grid_four_same_sized_frames_is_2w_by_2h() {
        let frames: Vec<DynamicImage> = (0..4).map(|i| solid_frame(100, 50, i * 60)).collect();
        let grid = compose_grid(&frames, 4096, 4096).unwrap();
        assert_eq!(grid.width(), 200);
        assert_eq!(grid.height(), 100);
    }

    #[test]
    fn test_grid_empty_cell_stays_black() {
        // 3 張幀 -> 2x2 網格，最後一格保留零值背景
        let frames: Vec<DynamicImage> = (0..3).map(|_| solid_frame(10, 10, 255)).collect();
        let grid = compose_grid(&frames, 4096, 4096).unwrap();

        assert_eq!(grid.width(), 20);
        assert_eq!(grid.height(), 20);
        assert_eq!(grid.get_pixel(15, 15), &Rgb([0, 0, 0]));
        assert_eq!(grid.get_pixel(5, 5), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_strip_dimensions_without_scaling() {
        let frames = vec![
            solid_frame(100, 50, 10),
            solid_frame(80, 60, 20),
            solid_frame(120, 40, 30),
        ];
        let strip = compose_strip(&frames, 4096, 4096).unwrap();
        assert_eq!(strip.width(), 300);
        assert_eq!(strip.height(), 60);
    }

    #[test]
    fn test_strip_scales_uniformly_within_bounds() {
        // 總寬 1000 超過上限 500 -> 縮放係數 0.5，高度跟著縮
        let frames: Vec<DynamicImage> = (0..10).map(|_| solid_frame(100, 80, 128)).collect();
        let strip = compose_strip(&frames, 500, 4096).unwrap();

        assert!(strip.width() <= 500);
        assert_eq!(strip.height(), 40);
        // 幀之間的相對大小不變：每幀等寬
        assert_eq!(strip.width() % 10, 0);
    }

    #[test]
    fn test_strip_never_upscales() {
        let frames = vec![solid_frame(100, 50, 128)];
        let strip = compose_strip(&frames, 4096, 4096).unwrap();
        assert_eq!(strip.width(), 100);
        assert_eq!(strip.height(), 50);
    }

    #[test]
    fn test_grid_scales_when_exceeding_bounds() {
        let frames: Vec<DynamicImage> = (0..4).map(|_| solid_frame(400, 400, 128)).collect();
        let grid = compose_grid(&frames, 400, 400).unwrap();
        assert!(grid.width() <= 400);
        assert!(grid.height() <= 400);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(compose_strip(&[], 100, 100).is_err());
        assert!(compose_grid(&[], 100, 100).is_err());
    }
}
