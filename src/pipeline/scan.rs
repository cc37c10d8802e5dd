// Phase 7: input discovery: root -> chapter dirs -> page images
//
// Ordering here is the only thing that decides output frame order, so both
// chapters and pages are sorted by file name.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FrameError;

pub const CHAPTER_PREFIX: &str = "chapter_";
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// One chapter directory and its page images in processing order.
#[derive(Debug, Clone)]
pub struct Chapter {
    /// 1-based position among the run's chapters.
    pub index: usize,
    pub path: PathBuf,
    pub images: Vec<PathBuf>,
}

impl Chapter {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A chapter directory whose listing failed.
#[derive(Debug)]
pub struct UnreadableChapter {
    pub index: usize,
    pub path: PathBuf,
    pub error: FrameError,
}

/// Every chapter directory under a root, split by whether it could be listed.
#[derive(Debug, Default)]
pub struct ChapterScan {
    pub chapters: Vec<Chapter>,
    pub unreadable: Vec<UnreadableChapter>,
}

impl ChapterScan {
    /// Chapter directories found, readable or not.
    pub fn total(&self) -> usize {
        self.chapters.len() + self.unreadable.len()
    }

    pub fn total_images(&self) -> usize {
        self.chapters.iter().map(|c| c.images.len()).sum()
    }
}

/// `chapter_` followed by one or more ASCII digits.
pub fn is_chapter_dir_name(name: &str) -> bool {
    name.strip_prefix(CHAPTER_PREFIX)
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Extension check, ASCII case-insensitive.
pub fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

fn sorted_by_name(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    paths
}

/// Page images directly inside a chapter directory, sorted by file name.
pub fn list_images(chapter_dir: &Path) -> crate::error::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(chapter_dir)? {
        let path = entry?.path();
        if path.is_file() && is_page_image(&path) {
            images.push(path);
        }
    }
    Ok(sorted_by_name(images))
}

/// Chapters under `root`, sorted by directory name.
///
/// Fails with [`FrameError::DirectoryMissing`] when `root` is not a directory.
/// An empty result is not an error here.
pub fn scan_chapters(root: &Path) -> crate::error::Result<ChapterScan> {
    scan_chapters_with(root, list_images)
}

/// [`scan_chapters`] with a custom page lister.
///
/// A chapter whose listing fails lands in `unreadable` and keeps its position,
/// so later chapters keep their indices.
pub fn scan_chapters_with<F>(root: &Path, list: F) -> crate::error::Result<ChapterScan>
where
    F: Fn(&Path) -> crate::error::Result<Vec<PathBuf>>,
{
    if !root.is_dir() {
        return Err(FrameError::DirectoryMissing(root.to_path_buf()));
    }

    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        let is_chapter = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_chapter_dir_name);
        if is_chapter && path.is_dir() {
            dirs.push(path);
        }
    }

    let mut scan = ChapterScan::default();
    for (i, path) in sorted_by_name(dirs).into_iter().enumerate() {
        let index = i + 1;
        match list(&path) {
            Ok(images) => scan.chapters.push(Chapter {
                index,
                path,
                images,
            }),
            Err(error) => scan.unreadable.push(UnreadableChapter { index, path, error }),
        }
    }
    Ok(scan)
}
