use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::FrameError;

/// Region detection strategy selected for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Separate text and illustration masks.
    #[default]
    DualMask,
    /// Full-width vertical bands split at whitespace gaps.
    GapSlice,
    /// One brightness-adaptive foreground mask.
    SingleMask,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::DualMask => "dual_mask",
            Strategy::GapSlice => "gap_slice",
            Strategy::SingleMask => "single_mask",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dual_mask" => Ok(Strategy::DualMask),
            "gap_slice" => Ok(Strategy::GapSlice),
            "single_mask" => Ok(Strategy::SingleMask),
            other => Err(FrameError::config(format!(
                "Unknown strategy '{other}' (expected dual_mask, gap_slice or single_mask)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

/// One extraction run: a chapters root and a flat frame output directory.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub input: String,
    pub output: String,
    pub strategy: Option<Strategy>,
    pub gap: Option<u32>,
    pub indent: Option<u32>,
    pub min_area: Option<u32>,
    pub write_report: Option<bool>,
}

impl JobFile {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        let job_file: JobFile = serde_yml::from_str(yaml)?;
        if job_file.jobs.is_empty() {
            return Err(FrameError::config("Job file contains no jobs"));
        }
        Ok(job_file)
    }
}
