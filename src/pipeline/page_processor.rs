// Phase 7: per-image processing: decode -> detect -> filter -> persist
//
// Falls back to placeholders when nothing usable survives.

use std::path::Path;

use tracing::{debug, trace, warn};

use crate::output::FrameKind;
use crate::output::fallback::FallbackGenerator;
use crate::output::persister::{ExtractedFrame, FramePersister, PersistOutcome};
use crate::segment::filter::{RegionFilter, SmallSkips};
use crate::segment::{PageImage, PageRef, RegionDetector};

/// Lifecycle of one source image.
///
/// Success runs `Pending -> Loaded -> Detected -> Filtered -> Persisted`.
/// An empty filter result ends in `FallbackPersisted`; a decode error ends in
/// `LoadFailed`; a panic anywhere in between ends in `Faulted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Pending,
    Loaded,
    Detected,
    Filtered,
    Persisted,
    FallbackPersisted,
    LoadFailed,
    Faulted,
}

impl ImageState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ImageState::Persisted
                | ImageState::FallbackPersisted
                | ImageState::LoadFailed
                | ImageState::Faulted
        )
    }

    pub fn is_failure(self) -> bool {
        matches!(self, ImageState::LoadFailed | ImageState::Faulted)
    }
}

/// What happened to one source image.
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub source: PageRef,
    pub state: ImageState,
    pub candidates: usize,
    pub kept: usize,
    pub skipped_small: SmallSkips,
    pub frames: Vec<ExtractedFrame>,
    pub write_failures: u64,
}

impl ImageReport {
    fn new(source: PageRef) -> Self {
        Self {
            source,
            state: ImageState::Pending,
            candidates: 0,
            kept: 0,
            skipped_small: SmallSkips::default(),
            frames: Vec::new(),
            write_failures: 0,
        }
    }

    /// Terminal report for an image that panicked mid-processing, carrying
    /// whatever frames reached disk before the panic.
    pub fn faulted(source: PageRef, frames: Vec<ExtractedFrame>) -> Self {
        let mut report = Self::new(source);
        report.state = ImageState::Faulted;
        report.frames = frames;
        report
    }

    fn advance(&mut self, next: ImageState) {
        trace!(source = %self.source.path.display(), from = ?self.state, to = ?next, "image state");
        self.state = next;
    }

    fn absorb(&mut self, outcome: PersistOutcome) {
        self.frames.extend(outcome.frames);
        self.write_failures += outcome.failures;
    }

    pub fn placeholder_frames(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| f.kind == FrameKind::Placeholder)
            .count()
    }
}

/// Collaborators shared by every image of a run.
pub struct PageContext<'a> {
    pub detector: &'a dyn RegionDetector,
    pub filter: &'a RegionFilter,
    pub fallback: &'a FallbackGenerator,
    /// Emit placeholders for undecodable images too.
    pub fallback_on_decode_failure: bool,
}

/// Process one source image to a terminal state.
///
/// Errors never escape: decode failures end in `LoadFailed`, detection errors
/// are treated as an empty result, and write failures are counted per frame.
pub fn process_image(
    path: &Path,
    chapter: usize,
    page: usize,
    ctx: &PageContext<'_>,
    persister: &mut FramePersister,
) -> ImageReport {
    let source = PageRef {
        path: path.to_path_buf(),
        chapter,
        page,
    };
    let mut report = ImageReport::new(source.clone());

    // 1. Decode
    let image = match PageImage::open(path, chapter, page) {
        Ok(image) => image,
        Err(e) => {
            warn!(source = %path.display(), error = %e, "image decode failed");
            report.advance(ImageState::LoadFailed);
            if ctx.fallback_on_decode_failure {
                report.absorb(ctx.fallback.generate(&source, persister));
            }
            return report;
        }
    };
    report.advance(ImageState::Loaded);
    debug!(
        source = %path.display(),
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        "page loaded"
    );

    // 2. Detect
    let candidates = match ctx.detector.detect(&image) {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(source = %path.display(), detector = ctx.detector.name(), error = %e, "detection failed");
            Vec::new()
        }
    };
    report.candidates = candidates.len();
    report.advance(ImageState::Detected);

    // 3. Filter
    let filtered = ctx.filter.apply(&candidates, image.width(), image.height());
    report.kept = filtered.kept.len();
    report.skipped_small = filtered.skipped_small;
    report.advance(ImageState::Filtered);

    // 4. Persist kept regions
    if !filtered.kept.is_empty() {
        report.absorb(persister.persist_regions(&image, &filtered.kept));
        if !report.frames.is_empty() {
            report.advance(ImageState::Persisted);
            return report;
        }
    }

    // 5. Placeholders when nothing was written
    debug!(source = %path.display(), "no usable regions; emitting placeholders");
    report.absorb(ctx.fallback.generate(&source, persister));
    report.advance(ImageState::FallbackPersisted);
    report
}
