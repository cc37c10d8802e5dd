// Phase 6: frame persistence: region -> crop -> frame_<NNNNNN>.png
//
// Frames land in one flat directory as `frame_<NNNNNN>.png`. The index
// counter advances only after a write succeeds, so a failed write leaves
// no gap in the sequence.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use tracing::{debug, warn};

use super::FrameKind;
use crate::error::FrameError;
use crate::segment::filter::Region;
use crate::segment::{PageImage, PageRef, Rect};

pub const FRAME_PREFIX: &str = "frame_";
pub const FRAME_EXTENSION: &str = "png";

/// File name for the frame with the given global index.
pub fn frame_file_name(index: u64) -> String {
    format!("{FRAME_PREFIX}{index:06}.{FRAME_EXTENSION}")
}

/// Record of one frame written to disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedFrame {
    pub global_index: u64,
    pub source: PageRef,
    pub bbox: Rect,
    pub kind: FrameKind,
    pub path: PathBuf,
}

/// Frames written for one page plus the writes that failed.
#[derive(Debug, Default)]
pub struct PersistOutcome {
    pub frames: Vec<ExtractedFrame>,
    pub failures: u64,
}

/// Create the output directory and, when `clear` is set, delete every `*.png`
/// already in it. Returns the number of files removed.
pub fn prepare_output_dir(dir: &Path, clear: bool) -> crate::error::Result<usize> {
    fs::create_dir_all(dir)?;
    if !clear {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(FRAME_EXTENSION));
        if is_png && path.is_file() {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    debug!(dir = %dir.display(), removed, "cleared output directory");
    Ok(removed)
}

/// Owns the run-wide frame counter.
pub struct FramePersister {
    output_dir: PathBuf,
    next_index: u64,
    /// Every frame written so far; `written[i].global_index == i`.
    written: Vec<ExtractedFrame>,
}

impl FramePersister {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            next_index: 0,
            written: Vec::new(),
        }
    }

    /// Index the next successful write will receive.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Frames written from global index `start` onward.
    pub fn written_since(&self, start: u64) -> &[ExtractedFrame] {
        let from = (start as usize).min(self.written.len());
        &self.written[from..]
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write one image as the next frame.
    pub fn persist(
        &mut self,
        image: &DynamicImage,
        source: &PageRef,
        bbox: Rect,
        kind: FrameKind,
    ) -> crate::error::Result<ExtractedFrame> {
        let index = self.next_index;
        let path = self.output_dir.join(frame_file_name(index));

        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| FrameError::persist_write(format!("{}: {e}", path.display())))?;

        self.next_index += 1;
        let frame = ExtractedFrame {
            global_index: index,
            source: source.clone(),
            bbox,
            kind,
            path,
        };
        self.written.push(frame.clone());
        Ok(frame)
    }

    /// Crop and write every region of a page in order.
    ///
    /// Failed writes are logged and counted; they never abort the page.
    pub fn persist_regions(&mut self, page: &PageImage, regions: &[Region]) -> PersistOutcome {
        let mut outcome = PersistOutcome::default();
        for region in regions {
            let b = region.bbox;
            let crop = page.image.crop_imm(b.x, b.y, b.width, b.height);
            match self.persist(&crop, &page.source, b, region.kind.into()) {
                Ok(frame) => outcome.frames.push(frame),
                Err(e) => {
                    warn!(source = %page.source.path.display(), error = %e, "frame write failed");
                    outcome.failures += 1;
                }
            }
        }
        outcome
    }
}
