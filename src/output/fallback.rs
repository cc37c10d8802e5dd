// Phase 6: placeholder frames: page name -> SHA-256 -> solid canvases
//
// Every attempted page must yield frames, so when the detector and filter
// leave nothing behind (or the page could not be decoded) two or three solid
// canvases stand in for it. The count and colour come from a SHA-256 digest
// of the source file name, so identical inputs always produce identical
// placeholder sequences.

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::FrameKind;
use super::persister::{FramePersister, PersistOutcome};
use crate::segment::{PageRef, Rect};

pub const PLACEHOLDER_WIDTH: u32 = 600;
pub const PLACEHOLDER_HEIGHT: u32 = 400;
pub const MIN_PLACEHOLDERS: usize = 2;
pub const MAX_PLACEHOLDERS: usize = 3;

const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

fn digest_of(name: &str) -> [u8; 32] {
    Sha256::digest(name.as_bytes()).into()
}

/// Number of placeholders for a source file, in `2..=3`.
pub fn placeholder_count(source_name: &str) -> usize {
    let span = (MAX_PLACEHOLDERS - MIN_PLACEHOLDERS + 1) as u8;
    MIN_PLACEHOLDERS + (digest_of(source_name)[0] % span) as usize
}

/// Fill colour for the `ordinal`-th placeholder of a source, each channel in `50..=200`.
pub fn placeholder_color(source_name: &str, ordinal: usize) -> Rgb<u8> {
    let digest = digest_of(source_name);
    let channel = |i: usize| 50 + digest[(1 + ordinal * 3 + i) % digest.len()] % 151;
    Rgb([channel(0), channel(1), channel(2)])
}

/// Look up a sans-serif system font for labels.
fn load_system_font() -> Option<FontVec> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let query = fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        ..Default::default()
    };
    let id = db.query(&query)?;
    db.with_face_data(id, |data, index| {
        FontVec::try_from_vec_and_index(data.to_vec(), index).ok()
    })
    .flatten()
}

pub struct FallbackGenerator {
    font: Option<FontVec>,
}

impl FallbackGenerator {
    /// Generator labelling placeholders with a system font when one exists.
    pub fn new() -> Self {
        let font = load_system_font();
        if font.is_none() {
            debug!("no system font found; placeholders will be unlabeled");
        }
        Self { font }
    }

    /// Generator that draws plain canvases.
    pub fn unlabeled() -> Self {
        Self { font: None }
    }

    /// Render one placeholder canvas.
    pub fn render(&self, source_name: &str, frame_index: u64, ordinal: usize) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(
            PLACEHOLDER_WIDTH,
            PLACEHOLDER_HEIGHT,
            placeholder_color(source_name, ordinal),
        );
        if let Some(font) = &self.font {
            draw_text_mut(
                &mut canvas,
                LABEL_COLOR,
                50,
                80,
                PxScale::from(32.0),
                font,
                &format!("Frame {frame_index}"),
            );
            draw_text_mut(
                &mut canvas,
                LABEL_COLOR,
                50,
                130,
                PxScale::from(24.0),
                font,
                &format!("From {source_name}"),
            );
            draw_text_mut(
                &mut canvas,
                LABEL_COLOR,
                50,
                180,
                PxScale::from(18.0),
                font,
                "Placeholder",
            );
        }
        canvas
    }

    /// Write the placeholders for one source page.
    pub fn generate(&self, source: &PageRef, persister: &mut FramePersister) -> PersistOutcome {
        let name = source.file_name();
        let count = placeholder_count(&name);
        let bbox = Rect::new(0, 0, PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT);

        let mut outcome = PersistOutcome::default();
        for ordinal in 0..count {
            let canvas = self.render(&name, persister.next_index(), ordinal);
            let image = DynamicImage::ImageRgb8(canvas);
            match persister.persist(&image, source, bbox, FrameKind::Placeholder) {
                Ok(frame) => outcome.frames.push(frame),
                Err(e) => {
                    warn!(source = %name, error = %e, "placeholder write failed");
                    outcome.failures += 1;
                }
            }
        }
        debug!(source = %name, written = outcome.frames.len(), "placeholders emitted");
        outcome
    }
}

impl Default for FallbackGenerator {
    fn default() -> Self {
        Self::new()
    }
}

