// Phase 7: run statistics: image reports -> counters -> summary

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::page_processor::{ImageReport, ImageState};
use crate::segment::filter::SmallSkips;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChapterStats {
    pub total_chapters: usize,
    pub processed_chapters: usize,
    /// Chapter directories whose listing failed; their images are not counted.
    pub failed_chapters: usize,
    pub total_images: usize,
    /// Images that produced frames, detected or placeholder.
    pub processed_images: usize,
    /// Images that could not be decoded or faulted during processing.
    pub failed_images: usize,
    /// Processed images whose frames are placeholders.
    pub fallback_images: usize,
    pub regions_found: u64,
    pub regions_kept: u64,
    pub skipped_small: SmallSkips,
    pub frames_written: u64,
    pub fallback_frames: u64,
    pub write_failures: u64,
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
}

impl ChapterStats {
    pub fn start(&mut self) {
        self.start_time = Some(Local::now());
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Local::now());
    }

    /// Fold one image's outcome into the totals.
    pub fn record(&mut self, report: &ImageReport) {
        match report.state {
            ImageState::Persisted => self.processed_images += 1,
            ImageState::FallbackPersisted => {
                self.processed_images += 1;
                self.fallback_images += 1;
            }
            _ => self.failed_images += 1,
        }
        self.regions_found += report.candidates as u64;
        self.regions_kept += report.kept as u64;
        self.skipped_small.add(&report.skipped_small);
        self.frames_written += report.frames.len() as u64;
        self.fallback_frames += report.placeholder_frames() as u64;
        self.write_failures += report.write_failures;
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.end_time? - self.start_time?)
    }

    /// Share of images that produced frames, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_images == 0 {
            return 0.0;
        }
        self.processed_images as f64 * 100.0 / self.total_images as f64
    }

    pub fn frames_per_image(&self) -> f64 {
        if self.processed_images == 0 {
            return 0.0;
        }
        self.frames_written as f64 / self.processed_images as f64
    }

    /// Multi-line human-readable report.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        if let Some(d) = self.duration() {
            let _ = writeln!(out, "Elapsed: {:.2}s", d.num_milliseconds() as f64 / 1000.0);
        }
        let _ = write!(
            out,
            "Chapters: {}/{} processed",
            self.processed_chapters, self.total_chapters
        );
        if self.failed_chapters > 0 {
            let _ = write!(out, ", {} unreadable", self.failed_chapters);
        }
        out.push('\n');
        let _ = writeln!(
            out,
            "Images: {} total, {} processed ({} via placeholders), {} failed",
            self.total_images, self.processed_images, self.fallback_images, self.failed_images
        );
        let _ = writeln!(
            out,
            "Regions: {} found, {} kept, {} too small (text {}, illustration {}, unclassified {})",
            self.regions_found,
            self.regions_kept,
            self.skipped_small.total(),
            self.skipped_small.text,
            self.skipped_small.illustration,
            self.skipped_small.unclassified
        );
        let _ = writeln!(
            out,
            "Frames: {} written ({} placeholders), {} write failures",
            self.frames_written, self.fallback_frames, self.write_failures
        );
        if self.processed_images > 0 {
            let _ = writeln!(
                out,
                "Success rate: {:.1}%, {:.1} frames per image",
                self.success_rate(),
                self.frames_per_image()
            );
        }
        out
    }
}
