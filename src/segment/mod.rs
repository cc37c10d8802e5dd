//! Page segmentation: candidate region detection and filtering.
//!
//! A [`RegionDetector`] turns one decoded page into unfiltered
//! [`RegionCandidate`]s. Three strategies implement it:
//! - [`gap_slicer::GapSlicer`]: full-width bands split at whitespace gaps
//! - [`dual_mask::DualMaskDetector`]: text and illustration masks
//! - [`single_mask::SingleMaskDetector`]: one brightness-adaptive mask
//!
//! [`filter::RegionFilter`] then drops small or degenerate candidates and
//! pads the survivors.

pub mod contours;
pub mod dual_mask;
pub mod filter;
pub mod gap_slicer;
pub mod single_mask;
pub mod threshold;

use std::fmt;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, Luma};
use imageproc::morphology::Mask;
use serde::Serialize;

use crate::config::job::Strategy;
use crate::config::merged::MergedConfig;

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Grow by `padding` on every side, clamped to a `bounds_w` x `bounds_h` image.
    pub fn padded(&self, padding: u32, bounds_w: u32, bounds_h: u32) -> Rect {
        let x = self.x.saturating_sub(padding);
        let y = self.y.saturating_sub(padding);
        let right = self.right().saturating_add(padding).min(bounds_w);
        let bottom = self.bottom().saturating_add(padding).min(bounds_h);
        Rect {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }
}

/// What a candidate region is believed to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Text,
    Illustration,
    Unclassified,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RegionKind::Text => "text",
            RegionKind::Illustration => "illustration",
            RegionKind::Unclassified => "unclassified",
        })
    }
}

/// An unfiltered detected region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionCandidate {
    pub bbox: Rect,
    pub area: f64,
    pub kind: RegionKind,
}

/// Identifies where a page came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub path: PathBuf,
    /// 1-based chapter position in the run.
    pub chapter: usize,
    /// 1-based page position within the chapter.
    pub page: usize,
}

impl PageRef {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A decoded page image. Immutable once loaded.
pub struct PageImage {
    pub source: PageRef,
    pub image: DynamicImage,
}

impl PageImage {
    /// Decode a page from disk.
    pub fn open(path: &Path, chapter: usize, page: usize) -> crate::error::Result<Self> {
        let image = image::open(path).map_err(|e| {
            crate::error::FrameError::image_decode(format!("{}: {e}", path.display()))
        })?;
        Ok(Self {
            source: PageRef {
                path: path.to_path_buf(),
                chapter,
                page,
            },
            image,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub fn to_gray(&self) -> GrayImage {
        self.image.to_luma8()
    }
}

/// Candidate region detection over a decoded page.
pub trait RegionDetector: Send + Sync {
    /// Strategy name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Produce candidates in emission order.
    fn detect(&self, page: &PageImage) -> crate::error::Result<Vec<RegionCandidate>>;

    /// Whether padded candidates with extreme aspect ratios are dropped.
    fn rejects_slivers(&self) -> bool {
        false
    }
}

/// Build the detector for the configured strategy.
pub fn detector_for(config: &MergedConfig) -> Box<dyn RegionDetector> {
    match config.strategy {
        Strategy::DualMask => Box::new(dual_mask::DualMaskDetector::new()),
        Strategy::GapSlice => Box::new(gap_slicer::GapSlicer::new(config.gap, config.indent)),
        Strategy::SingleMask => Box::new(single_mask::SingleMaskDetector::new()),
    }
}

/// Rectangular structuring element anchored at its centre.
///
/// Used with `imageproc::morphology::{grayscale_open, grayscale_close}`, which
/// ignore pixels outside the image.
pub(crate) fn brick(width: u8, height: u8) -> Mask {
    let element = GrayImage::from_pixel(width as u32, height as u32, Luma([255]));
    Mask::from_image(&element, width / 2, height / 2)
}

/// Fail fast on images no detector can work with.
pub(crate) fn ensure_non_empty(gray: &GrayImage) -> crate::error::Result<()> {
    if gray.width() == 0 || gray.height() == 0 {
        return Err(crate::error::FrameError::segmentation(format!(
            "cannot segment an empty {}x{} image",
            gray.width(),
            gray.height()
        )));
    }
    Ok(())
}
