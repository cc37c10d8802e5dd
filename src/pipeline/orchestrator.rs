// Phase 7: all jobs in order

use crate::pipeline::job_runner::{JobConfig, ProgressEvent, RunOutcome, run_job};

/// Run multiple jobs in order, collecting their outcomes.
/// One job failure does NOT prevent other jobs from running.
///
/// `progress` receives the job's position in `jobs` alongside each event.
pub fn run_all_jobs(
    jobs: &[JobConfig],
    progress: &mut dyn FnMut(usize, &ProgressEvent),
) -> Vec<RunOutcome> {
    jobs.iter()
        .enumerate()
        .map(|(i, job)| run_job(job, &mut |event| progress(i, event)))
        .collect()
}
