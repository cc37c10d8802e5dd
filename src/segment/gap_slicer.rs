// Phase 3: gap slicing: grayscale -> edges -> outline rows -> full-width bands

use std::sync::LazyLock;

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{Mask, grayscale_close};
use tracing::debug;

use super::contours::outline_rows;
use super::{
    PageImage, Rect, RegionCandidate, RegionDetector, RegionKind, brick, ensure_non_empty,
};

/// Sigma of a 3x3 Gaussian kernel.
const BLUR_SIGMA: f32 = 0.8;
const CANNY_LOW: f32 = 10.0;
const CANNY_HIGH: f32 = 250.0;
/// 7x7 closing element bridging breaks in panel borders.
static BORDER_CLOSE: LazyLock<Mask> = LazyLock::new(|| brick(7, 7));

/// A vertical span `[start, end]` before clipping; may extend past the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub start: i64,
    pub end: i64,
}

/// Split outline row coordinates into bands wherever consecutive rows are
/// more than `gap` apart.
///
/// The first band opens at the smallest row. Each band closes `indent` below
/// its last row; the next one opens `indent` above its first row.
pub fn slice_bands(rows: &[u32], gap: u32, indent: u32) -> Vec<Band> {
    let mut ys: Vec<i64> = rows.iter().map(|&y| y as i64).collect();
    ys.sort_unstable();

    let Some(&first) = ys.first() else {
        return Vec::new();
    };
    let (gap, indent) = (gap as i64, indent as i64);

    let mut bands = Vec::new();
    let mut start = first;
    for pair in ys.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next - prev > gap {
            bands.push(Band {
                start,
                end: prev + indent,
            });
            start = next - indent;
        }
    }
    bands.push(Band {
        start,
        end: ys[ys.len() - 1] + indent,
    });
    bands
}

/// Clip bands to `[0, height]`, dropping empty or inverted ones.
pub fn clip_bands(bands: &[Band], height: u32) -> Vec<(u32, u32)> {
    bands
        .iter()
        .filter_map(|b| {
            let start = b.start.clamp(0, height as i64) as u32;
            let end = b.end.clamp(0, height as i64) as u32;
            (end > start).then_some((start, end))
        })
        .collect()
}

/// Edge map closed so panel borders form continuous outlines.
fn closed_edges(gray: &GrayImage) -> GrayImage {
    // 1. Blur, then Canny
    let blurred = gaussian_blur_f32(gray, BLUR_SIGMA);
    let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);

    // 2. Close small breaks in the borders
    grayscale_close(&edges, &BORDER_CLOSE)
}

/// Detector for vertically stacked panels separated by whitespace.
#[derive(Debug, Clone)]
pub struct GapSlicer {
    gap: u32,
    indent: u32,
}

impl GapSlicer {
    pub fn new(gap: u32, indent: u32) -> Self {
        Self { gap, indent }
    }
}

impl Default for GapSlicer {
    fn default() -> Self {
        Self::new(120, 30)
    }
}

impl RegionDetector for GapSlicer {
    fn name(&self) -> &'static str {
        "gap_slice"
    }

    fn detect(&self, page: &PageImage) -> crate::error::Result<Vec<RegionCandidate>> {
        let gray = page.to_gray();
        ensure_non_empty(&gray)?;

        // 1. Rows of every outline point on the closed edge map
        let rows = outline_rows(&closed_edges(&gray));

        // 2. Split rows at large gaps
        let bands = slice_bands(&rows, self.gap, self.indent);
        debug!(
            outline_points = rows.len(),
            bands = bands.len(),
            "gap slicing"
        );

        // 3. Clip to the page and emit full-width boxes
        let width = gray.width();
        Ok(clip_bands(&bands, gray.height())
            .into_iter()
            .map(|(start, end)| {
                let bbox = Rect::new(0, start, width, end - start);
                RegionCandidate {
                    bbox,
                    area: bbox.width as f64 * bbox.height as f64,
                    kind: RegionKind::Unclassified,
                }
            })
            .collect())
    }
}
