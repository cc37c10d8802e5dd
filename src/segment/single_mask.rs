// Phase 4: single-mask detection: grayscale -> background-aware mask -> candidates

use std::sync::LazyLock;

use image::GrayImage;
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::morphology::{Mask, grayscale_close, grayscale_open};
use tracing::debug;

use super::contours::outer_outlines;
use super::threshold::mean_intensity;
use super::{PageImage, RegionCandidate, RegionDetector, RegionKind, brick, ensure_non_empty};

/// Mean intensity above which a page counts as light.
const LIGHT_BACKGROUND_MEAN: f64 = 127.0;
/// On light pages, anything not near-white is foreground.
const LIGHT_PAPER_LEVEL: u8 = 240;
/// On dark pages, anything not near-black is foreground.
const DARK_PAPER_LEVEL: u8 = 15;

static SMOOTH: LazyLock<Mask> = LazyLock::new(|| brick(3, 3));

pub fn foreground_mask(gray: &GrayImage) -> GrayImage {
    // 1. Page brightness decides which side is paper
    let mean = mean_intensity(gray);

    // 2. Fixed-level threshold against the paper
    let raw = if mean > LIGHT_BACKGROUND_MEAN {
        threshold(gray, LIGHT_PAPER_LEVEL, ThresholdType::BinaryInverted)
    } else {
        threshold(gray, DARK_PAPER_LEVEL, ThresholdType::Binary)
    };
    debug!(mean, light = mean > LIGHT_BACKGROUND_MEAN, "single-mask background");

    // 3. 3x3 open then close
    grayscale_close(&grayscale_open(&raw, &SMOOTH), &SMOOTH)
}

#[derive(Debug, Clone, Default)]
pub struct SingleMaskDetector;

impl SingleMaskDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RegionDetector for SingleMaskDetector {
    fn name(&self) -> &'static str {
        "single_mask"
    }

    fn detect(&self, page: &PageImage) -> crate::error::Result<Vec<RegionCandidate>> {
        let gray = page.to_gray();
        ensure_non_empty(&gray)?;

        Ok(outer_outlines(&foreground_mask(&gray))
            .into_iter()
            .map(|o| RegionCandidate {
                bbox: o.bbox,
                area: o.area,
                kind: RegionKind::Unclassified,
            })
            .collect())
    }
}
