// Phase 7: job execution: chapters root -> scan -> per-image processing -> frames

use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::page_processor::{ImageReport, PageContext, process_image};
use super::scan::{list_images, scan_chapters_with};
use super::stats::ChapterStats;
use crate::config::merged::MergedConfig;
use crate::error::FrameError;
use crate::output::fallback::FallbackGenerator;
use crate::output::persister::{ExtractedFrame, FramePersister, prepare_output_dir};
use crate::segment::filter::RegionFilter;
use crate::segment::{PageRef, RegionDetector, detector_for};

pub const REPORT_FILE_NAME: &str = "extraction_report.json";

/// Configuration for a single job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Directory holding `chapter_<NNN>` subdirectories.
    pub input_root: PathBuf,
    /// Flat directory receiving `frame_<NNNNNN>.png` files.
    pub output_dir: PathBuf,
    pub settings: MergedConfig,
}

/// Snapshot delivered after each image. `current_*` values are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub current_image: usize,
    pub total_images: usize,
    pub current_chapter: usize,
    pub total_chapters: usize,
}

/// Result of a job. `success` is false only when the run found nothing to do
/// or could not start.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub input_root: PathBuf,
    pub output_dir: PathBuf,
    pub success: bool,
    pub message: String,
    pub stats: ChapterStats,
    pub frames: Vec<ExtractedFrame>,
}

impl RunOutcome {
    fn failed(config: &JobConfig, mut stats: ChapterStats, err: FrameError) -> Self {
        stats.finish();
        error!(input = %config.input_root.display(), error = %err, "job aborted");
        Self {
            input_root: config.input_root.clone(),
            output_dir: config.output_dir.clone(),
            success: false,
            message: err.to_string(),
            stats,
            frames: Vec::new(),
        }
    }
}

/// Run a job with the detector its settings select.
pub fn run_job(config: &JobConfig, progress: &mut dyn FnMut(&ProgressEvent)) -> RunOutcome {
    let detector = detector_for(&config.settings);
    let fallback = FallbackGenerator::new();
    run_job_with(config, detector.as_ref(), &fallback, progress)
}

/// Run a job with explicit collaborators.
///
/// Never panics or returns an error: every per-image problem is counted in
/// the returned stats and processing moves on to the next image.
pub fn run_job_with(
    config: &JobConfig,
    detector: &dyn RegionDetector,
    fallback: &FallbackGenerator,
    progress: &mut dyn FnMut(&ProgressEvent),
) -> RunOutcome {
    run_job_listing(config, detector, fallback, &list_images, progress)
}

/// [`run_job_with`] with the chapter page lister supplied by the caller.
///
/// A chapter whose listing fails is logged, counted in `failed_chapters` and
/// skipped. The run fails only when no readable chapter holds an image.
pub fn run_job_listing(
    config: &JobConfig,
    detector: &dyn RegionDetector,
    fallback: &FallbackGenerator,
    list: &dyn Fn(&Path) -> crate::error::Result<Vec<PathBuf>>,
    progress: &mut dyn FnMut(&ProgressEvent),
) -> RunOutcome {
    let mut stats = ChapterStats::default();
    stats.start();

    // 1. Output directory
    if let Err(e) = prepare_output_dir(&config.output_dir, config.settings.clear_output) {
        return RunOutcome::failed(config, stats, e);
    }

    // 2. Chapters and their pages
    let scan = match scan_chapters_with(&config.input_root, list) {
        Ok(scan) => scan,
        Err(e) => return RunOutcome::failed(config, stats, e),
    };
    stats.total_chapters = scan.total();
    stats.failed_chapters = scan.unreadable.len();
    if stats.total_chapters == 0 {
        return RunOutcome::failed(
            config,
            stats,
            FrameError::NoChaptersFound(config.input_root.clone()),
        );
    }

    for bad in &scan.unreadable {
        warn!(chapter = %bad.path.display(), error = %bad.error, "chapter unreadable; skipped");
    }
    for chapter in &scan.chapters {
        info!(chapter = %chapter.name(), images = chapter.images.len(), "chapter found");
    }
    stats.total_images = scan.total_images();
    if stats.total_images == 0 {
        return RunOutcome::failed(
            config,
            stats,
            FrameError::NoImagesFound(config.input_root.clone()),
        );
    }
    info!(
        chapters = stats.total_chapters,
        images = stats.total_images,
        strategy = detector.name(),
        "starting extraction"
    );

    let filter = RegionFilter::new(config.settings.min_area, detector.rejects_slivers());
    let ctx = PageContext {
        detector,
        filter: &filter,
        fallback,
        fallback_on_decode_failure: config.settings.fallback_on_decode_failure,
    };
    let mut persister = FramePersister::new(&config.output_dir);
    let mut frames = Vec::new();
    let mut done = 0;

    // 3. Every image in scan order
    for chapter in &scan.chapters {
        info!(
            chapter = %chapter.name(),
            position = chapter.index,
            of = stats.total_chapters,
            "processing chapter"
        );
        for (i, path) in chapter.images.iter().enumerate() {
            let page = i + 1;
            let source = PageRef {
                path: path.clone(),
                chapter: chapter.index,
                page,
            };
            let report = isolate_panics(source, &mut persister, |persister| {
                process_image(path, chapter.index, page, &ctx, persister)
            });
            info!(
                source = %path.display(),
                state = ?report.state,
                frames = report.frames.len(),
                "image done"
            );

            stats.record(&report);
            frames.extend(report.frames);
            done += 1;
            progress(&ProgressEvent {
                current_image: done,
                total_images: stats.total_images,
                current_chapter: chapter.index,
                total_chapters: stats.total_chapters,
            });
        }
        stats.processed_chapters += 1;
    }

    // 4. Summary
    stats.finish();
    if config.settings.write_report {
        write_report(&config.output_dir, &stats);
    }

    let message = format!(
        "Extraction finished: {} frames from {} images ({} failed)",
        stats.frames_written, stats.total_images, stats.failed_images
    );
    info!("{message}");

    RunOutcome {
        input_root: config.input_root.clone(),
        output_dir: config.output_dir.clone(),
        success: true,
        message,
        stats,
        frames,
    }
}

/// Run one image's processing, turning a panic into a `Faulted` report.
///
/// Frames `work` wrote before panicking stay on disk with their indices, so
/// the report carries them too.
pub fn isolate_panics<F>(source: PageRef, persister: &mut FramePersister, work: F) -> ImageReport
where
    F: FnOnce(&mut FramePersister) -> ImageReport,
{
    let start = persister.next_index();
    match catch_unwind(AssertUnwindSafe(|| work(&mut *persister))) {
        Ok(report) => report,
        Err(_) => {
            let frames = persister.written_since(start).to_vec();
            error!(
                source = %source.path.display(),
                frames = frames.len(),
                "image processing panicked"
            );
            ImageReport::faulted(source, frames)
        }
    }
}

fn write_report(output_dir: &Path, stats: &ChapterStats) {
    let path = output_dir.join(REPORT_FILE_NAME);
    let result = serde_json::to_string_pretty(stats)
        .map_err(FrameError::from)
        .and_then(|json| fs::write(&path, json).map_err(FrameError::from));
    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "failed to write run report");
    }
}
