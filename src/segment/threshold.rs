// Phase 2: binarization: grayscale -> 0/255 foreground mask

use image::{GrayImage, Luma};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::integral_image::integral_image;
use imageproc::map::map_colors2;

/// Mask pixel value for foreground.
pub const FOREGROUND: u8 = 255;

/// Binarize against the variance-maximizing (Otsu) level of the image.
///
/// `Binary` marks pixels above the level, `BinaryInverted` the ones at or below it.
pub fn binarize_otsu(gray: &GrayImage, kind: ThresholdType) -> GrayImage {
    threshold(gray, otsu_level(gray), kind)
}

/// Inverted local-mean threshold with an offset.
///
/// A pixel is foreground when it is at most `mean - c`, where `mean` is taken
/// over the `(2 * block_radius + 1)` square window clipped to the image.
pub fn adaptive_mean_inverted(gray: &GrayImage, block_radius: u32, c: i32) -> GrayImage {
    let (w, h) = gray.dimensions();
    // (w + 1) x (h + 1), zero first row and column.
    let integral = integral_image::<_, u64>(gray);
    let at = |x: u32, y: u32| integral.get_pixel(x, y).0[0];

    GrayImage::from_fn(w, h, |x, y| {
        let x0 = x.saturating_sub(block_radius);
        let y0 = y.saturating_sub(block_radius);
        let x1 = (x + block_radius + 1).min(w);
        let y1 = (y + block_radius + 1).min(h);
        let sum = at(x1, y1) + at(x0, y0) - at(x1, y0) - at(x0, y1);
        let count = ((x1 - x0) * (y1 - y0)) as i64;
        let mean = (sum as i64 + count / 2) / count;
        let v = gray.get_pixel(x, y).0[0] as i64;
        Luma([if v <= mean - c as i64 { FOREGROUND } else { 0 }])
    })
}

/// Pixel-wise OR of two equally sized masks.
pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_colors2(a, b, |p: Luma<u8>, q: Luma<u8>| Luma([p.0[0].max(q.0[0])]))
}

/// Share of mask pixels that are foreground, in `[0, 1]`.
pub fn foreground_fraction(mask: &GrayImage) -> f64 {
    let total = mask.width() as u64 * mask.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let on = mask.pixels().filter(|p| p.0[0] != 0).count() as u64;
    on as f64 / total as f64
}

/// Keep a global-threshold mask only when its foreground is the minority class.
///
/// A global pass whose foreground covers most of the page has picked up the
/// paper rather than ink, so it is replaced by an empty mask.
pub fn minority_only(mask: GrayImage) -> GrayImage {
    if foreground_fraction(&mask) < 0.5 {
        mask
    } else {
        GrayImage::new(mask.width(), mask.height())
    }
}

/// Mean intensity of a grayscale image.
pub fn mean_intensity(gray: &GrayImage) -> f64 {
    let total = gray.width() as u64 * gray.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    sum as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otsu_polarities_partition_pixels() {
        let gray = GrayImage::from_fn(4, 1, |x, _| Luma([(x * 80) as u8]));
        let normal = binarize_otsu(&gray, ThresholdType::Binary);
        let inverted = binarize_otsu(&gray, ThresholdType::BinaryInverted);
        for x in 0..4 {
            assert_ne!(
                normal.get_pixel(x, 0).0[0],
                inverted.get_pixel(x, 0).0[0],
                "pixel {x} must land on exactly one side"
            );
        }
    }

    #[test]
    fn adaptive_mean_ignores_flat_regions() {
        let gray = GrayImage::from_pixel(20, 20, Luma([200]));
        let mask = adaptive_mean_inverted(&gray, 5, 2);
        assert_eq!(foreground_fraction(&mask), 0.0);
    }

    #[test]
    fn adaptive_mean_marks_dark_dot() {
        let mut gray = GrayImage::from_pixel(21, 21, Luma([255]));
        gray.put_pixel(10, 10, Luma([0]));
        let mask = adaptive_mean_inverted(&gray, 5, 2);
        assert_eq!(mask.get_pixel(10, 10).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn minority_only_drops_majority_masks() {
        let full = GrayImage::from_pixel(10, 10, Luma([FOREGROUND]));
        assert_eq!(foreground_fraction(&minority_only(full)), 0.0);

        let mut sparse = GrayImage::new(10, 10);
        sparse.put_pixel(1, 1, Luma([FOREGROUND]));
        assert!(foreground_fraction(&minority_only(sparse)) > 0.0);
    }

    #[test]
    fn mean_of_half_black_half_white() {
        let gray = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        assert!((mean_intensity(&gray) - 127.5).abs() < 1e-9);
    }
}
