// Phase 5: region filter: candidates -> area check -> padding -> aspect check -> regions

use serde::Serialize;
use tracing::trace;

use super::{Rect, RegionCandidate, RegionKind};

pub const TEXT_MIN_AREA: f64 = 50.0;
pub const ILLUSTRATION_MIN_AREA: f64 = 100.0;
pub const DEFAULT_UNCLASSIFIED_MIN_AREA: f64 = 500.0;

pub const TEXT_PADDING: u32 = 10;
pub const DEFAULT_PADDING: u32 = 5;

/// Widest accepted `width / height` of a padded box.
pub const MAX_ASPECT_RATIO: f64 = 10.0;
/// Narrowest accepted `width / height` of a padded box.
pub const MIN_ASPECT_RATIO: f64 = 0.1;

/// Candidates rejected for being below their kind's minimum area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SmallSkips {
    pub text: u64,
    pub illustration: u64,
    pub unclassified: u64,
}

impl SmallSkips {
    pub fn record(&mut self, kind: RegionKind) {
        match kind {
            RegionKind::Text => self.text += 1,
            RegionKind::Illustration => self.illustration += 1,
            RegionKind::Unclassified => self.unclassified += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.text + self.illustration + self.unclassified
    }

    pub fn add(&mut self, other: &SmallSkips) {
        self.text += other.text;
        self.illustration += other.illustration;
        self.unclassified += other.unclassified;
    }
}

/// A candidate that survived filtering, with its padded box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub bbox: Rect,
    pub kind: RegionKind,
}

/// Outcome of filtering one page's candidates.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub kept: Vec<Region>,
    pub skipped_small: SmallSkips,
}

/// `true` when `width / height` lies within the accepted range, bounds inclusive.
pub fn aspect_ratio_ok(width: u32, height: u32) -> bool {
    if width == 0 || height == 0 {
        return false;
    }
    let ratio = width as f64 / height as f64;
    (MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO).contains(&ratio)
}

#[derive(Debug, Clone)]
pub struct RegionFilter {
    unclassified_min_area: f64,
    reject_slivers: bool,
}

impl RegionFilter {
    pub fn new(unclassified_min_area: u32, reject_slivers: bool) -> Self {
        Self {
            unclassified_min_area: unclassified_min_area as f64,
            reject_slivers,
        }
    }

    pub fn min_area(&self, kind: RegionKind) -> f64 {
        match kind {
            RegionKind::Text => TEXT_MIN_AREA,
            RegionKind::Illustration => ILLUSTRATION_MIN_AREA,
            RegionKind::Unclassified => self.unclassified_min_area,
        }
    }

    pub fn padding(kind: RegionKind) -> u32 {
        match kind {
            RegionKind::Text => TEXT_PADDING,
            RegionKind::Illustration | RegionKind::Unclassified => DEFAULT_PADDING,
        }
    }

    /// Filter candidates of a `width` x `height` page, preserving their order.
    pub fn apply(&self, candidates: &[RegionCandidate], width: u32, height: u32) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();
        for candidate in candidates {
            // 1. Per-kind minimum area
            if candidate.area < self.min_area(candidate.kind) {
                outcome.skipped_small.record(candidate.kind);
                continue;
            }

            // 2. Per-kind padding, clamped to the page
            let bbox = candidate
                .bbox
                .padded(Self::padding(candidate.kind), width, height);
            if bbox.is_empty() {
                continue;
            }
            // 3. Sliver rejection
            if self.reject_slivers && !aspect_ratio_ok(bbox.width, bbox.height) {
                trace!(?bbox, kind = %candidate.kind, "sliver dropped");
                continue;
            }

            outcome.kept.push(Region {
                bbox,
                kind: candidate.kind,
            });
        }
        outcome
    }
}

impl Default for RegionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_UNCLASSIFIED_MIN_AREA as u32, true)
    }
}
