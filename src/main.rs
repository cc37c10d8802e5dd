use std::path::{Path, PathBuf};
use std::process::ExitCode;

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, fmt};

use manga_frames::config;
use manga_frames::config::job::JobFile;
use manga_frames::config::merged::MergedConfig;
use manga_frames::output::catalog;
use manga_frames::pipeline::job_runner::{JobConfig, ProgressEvent};
use manga_frames::pipeline::orchestrator::run_all_jobs;

fn print_usage() {
    eprintln!("Usage: manga_frames <jobs.yaml>...");
    eprintln!("       manga_frames --renumber <frames_dir>");
    eprintln!("  Split manga chapter pages into numbered frame images.");
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("manga_frames {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_tracing();

    if args[0] == "--renumber" {
        let Some(dir) = args.get(1) else {
            print_usage();
            return ExitCode::FAILURE;
        };
        return match catalog::renumber(Path::new(dir)) {
            Ok(renamed) => {
                eprintln!("OK: {dir} ({renamed} frames renamed)");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("ERROR: Failed to renumber {dir}: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let mut job_configs: Vec<JobConfig> = Vec::new();

    for job_file_arg in &args {
        let job_file_path = Path::new(job_file_arg);

        // Load settings from the same directory as the job file.
        let settings = match config::load_settings_for_job(job_file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load settings for {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let yaml_content = match std::fs::read_to_string(job_file_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ERROR: Failed to read job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let job_file = match JobFile::from_yaml(&yaml_content) {
            Ok(jf) => jf,
            Err(e) => {
                eprintln!("ERROR: Failed to parse job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Relative paths in a job file are relative to the job file itself.
        let job_dir = job_file_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        for job in &job_file.jobs {
            job_configs.push(JobConfig {
                input_root: resolve_path(&job_dir, &job.input),
                output_dir: resolve_path(&job_dir, &job.output),
                settings: MergedConfig::new(&settings, job),
            });
        }
    }

    let mut bar: Option<(usize, ProgressBar)> = None;
    let outcomes = run_all_jobs(&job_configs, &mut |job, event: &ProgressEvent| {
        if bar.as_ref().is_none_or(|(current, _)| *current != job) {
            if let Some((_, old)) = bar.take() {
                old.finish_and_clear();
            }
            bar = Some((job, new_bar(event.total_images as u64)));
        }
        if let Some((_, pb)) = &bar {
            pb.set_position(event.current_image as u64);
            pb.set_message(format!(
                "chapter {}/{}",
                event.current_chapter, event.total_chapters
            ));
        }
    });
    if let Some((_, pb)) = bar.take() {
        pb.finish_and_clear();
    }

    let mut has_error = false;
    for outcome in &outcomes {
        if outcome.success {
            eprintln!(
                "OK: {} -> {} ({} frames)",
                outcome.input_root.display(),
                outcome.output_dir.display(),
                outcome.stats.frames_written
            );
            eprint!("{}", outcome.stats.summary());
        } else {
            eprintln!(
                "ERROR: {} -> {}: {}",
                outcome.input_root.display(),
                outcome.output_dir.display(),
                outcome.message
            );
            has_error = true;
        }
    }

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn new_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Resolve a potentially relative path against a base directory.
/// If the path is already absolute, return it as-is.
fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
