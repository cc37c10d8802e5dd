// Phase 6: frame catalog: the `frame_<NNNNNN>.png` convention shared with
// frame editors that reorder or delete frames after extraction.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::persister::{FRAME_EXTENSION, FRAME_PREFIX, frame_file_name};
use crate::error::FrameError;

const TEMP_PREFIX: &str = "renumber_";

/// Parse the global index out of a frame file name.
///
/// Accepts exactly `frame_` + at least six ASCII digits + `.png`.
pub fn parse_frame_index(file_name: &str) -> Option<u64> {
    let stem = file_name
        .strip_prefix(FRAME_PREFIX)?
        .strip_suffix(FRAME_EXTENSION)?
        .strip_suffix('.')?;
    if stem.len() < 6 || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Frame files in a directory, ordered by index.
pub fn list_frames(dir: &Path) -> crate::error::Result<Vec<(u64, PathBuf)>> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(index) = parse_frame_index(name) {
            frames.push((index, path));
        }
    }
    frames.sort_by_key(|(index, _)| *index);
    Ok(frames)
}

/// Rename frames so their indices run `0..n` in their current order.
///
/// Files already at the right name stay put. Others move through a temporary
/// name first so no rename lands on a file that has not moved yet. Returns the
/// number of files renamed.
pub fn renumber(dir: &Path) -> crate::error::Result<usize> {
    let frames = list_frames(dir)?;

    let mut staged = Vec::new();
    for (position, (index, path)) in frames.into_iter().enumerate() {
        let position = position as u64;
        if index == position {
            continue;
        }
        let temp = dir.join(format!("{TEMP_PREFIX}{position:06}.{FRAME_EXTENSION}"));
        fs::rename(&path, &temp).map_err(|e| {
            FrameError::renumber(format!("{} -> {}: {e}", path.display(), temp.display()))
        })?;
        staged.push((position, temp));
    }

    for (position, temp) in &staged {
        let target = dir.join(frame_file_name(*position));
        fs::rename(temp, &target).map_err(|e| {
            FrameError::renumber(format!("{} -> {}: {e}", temp.display(), target.display()))
        })?;
    }

    info!(dir = %dir.display(), renamed = staged.len(), "frames renumbered");
    Ok(staged.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names() {
        assert_eq!(parse_frame_index("frame_000000.png"), Some(0));
        assert_eq!(parse_frame_index("frame_000042.png"), Some(42));
        assert_eq!(parse_frame_index("frame_1234567.png"), Some(1_234_567));
    }

    #[test]
    fn rejects_other_names() {
        assert_eq!(parse_frame_index("frame_12.png"), None);
        assert_eq!(parse_frame_index("frame_00001a.png"), None);
        assert_eq!(parse_frame_index("frame_000001.jpg"), None);
        assert_eq!(parse_frame_index("page_000001.png"), None);
        assert_eq!(parse_frame_index("frame_000001png"), None);
    }
}
