pub mod catalog;
pub mod fallback;
pub mod persister;

use serde::Serialize;

use crate::segment::RegionKind;

/// What an extracted frame contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Text,
    Illustration,
    Unclassified,
    /// Synthetic frame emitted when detection found nothing usable.
    Placeholder,
}

impl From<RegionKind> for FrameKind {
    fn from(kind: RegionKind) -> Self {
        match kind {
            RegionKind::Text => FrameKind::Text,
            RegionKind::Illustration => FrameKind::Illustration,
            RegionKind::Unclassified => FrameKind::Unclassified,
        }
    }
}
