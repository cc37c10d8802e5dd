// Phase 4: dual-mask detection: grayscale -> text mask + illustration mask -> candidates

use std::sync::LazyLock;

use image::GrayImage;
use imageproc::contrast::ThresholdType;
use imageproc::filter::median_filter;
use imageproc::morphology::{Mask, grayscale_close, grayscale_open};
use tracing::debug;

use super::contours::outer_outlines;
use super::threshold::{adaptive_mean_inverted, binarize_otsu, minority_only, union};
use super::{PageImage, RegionCandidate, RegionDetector, RegionKind, brick, ensure_non_empty};

/// Local-mean window radius for the illustration mask (11x11 window).
const ADAPTIVE_RADIUS: u32 = 5;
/// Offset subtracted from the local mean.
const ADAPTIVE_C: i32 = 2;

static TEXT_ROW: LazyLock<Mask> = LazyLock::new(|| brick(15, 1));
static TEXT_COLUMN: LazyLock<Mask> = LazyLock::new(|| brick(1, 5));
static SMOOTH: LazyLock<Mask> = LazyLock::new(|| brick(3, 3));

/// Merge glyph strokes into blobs so each bubble or caption is one outline.
pub fn text_mask(gray: &GrayImage) -> GrayImage {
    // 1. 3x3 median to drop isolated noise
    let denoised = median_filter(gray, 1, 1);

    // 2. Otsu split in both polarities; keep whichever side is the minority
    let dark_ink = minority_only(binarize_otsu(&denoised, ThresholdType::BinaryInverted));
    let light_ink = minority_only(binarize_otsu(&denoised, ThresholdType::Binary));
    let combined = union(&dark_ink, &light_ink);

    // 3. Close along rows (15x1), then columns (1x5)
    let horizontal = grayscale_close(&combined, &TEXT_ROW);
    grayscale_close(&horizontal, &TEXT_COLUMN)
}

/// Drawn content, including artwork on uneven or tinted backgrounds.
pub fn illustration_mask(gray: &GrayImage) -> GrayImage {
    // 1. Local-mean threshold picks up ink against shading
    let local = adaptive_mean_inverted(gray, ADAPTIVE_RADIUS, ADAPTIVE_C);

    // 2. Global inverted Otsu picks up large dark areas
    let global = minority_only(binarize_otsu(gray, ThresholdType::BinaryInverted));

    // 3. Union, then 3x3 open (specks) and 3x3 close (pinholes)
    let combined = union(&local, &global);
    grayscale_close(&grayscale_open(&combined, &SMOOTH), &SMOOTH)
}

fn candidates(mask: &GrayImage, kind: RegionKind) -> Vec<RegionCandidate> {
    outer_outlines(mask)
        .into_iter()
        .map(|o| RegionCandidate {
            bbox: o.bbox,
            area: o.area,
            kind,
        })
        .collect()
}

/// Detector for isolated panels and speech bubbles on varied backgrounds.
///
/// Emits every text candidate before any illustration candidate.
#[derive(Debug, Clone, Default)]
pub struct DualMaskDetector;

impl DualMaskDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RegionDetector for DualMaskDetector {
    fn name(&self) -> &'static str {
        "dual_mask"
    }

    fn detect(&self, page: &PageImage) -> crate::error::Result<Vec<RegionCandidate>> {
        let gray = page.to_gray();
        ensure_non_empty(&gray)?;

        let (text, illustration) = rayon::join(|| text_mask(&gray), || illustration_mask(&gray));

        let mut found = candidates(&text, RegionKind::Text);
        let text_count = found.len();
        found.extend(candidates(&illustration, RegionKind::Illustration));
        debug!(
            text = text_count,
            illustration = found.len() - text_count,
            "dual-mask contours"
        );
        Ok(found)
    }

    fn rejects_slivers(&self) -> bool {
        true
    }
}
