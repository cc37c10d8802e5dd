use super::job::{Job, Strategy};
use super::settings::Settings;

#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub strategy: Strategy,
    pub gap: u32,
    pub indent: u32,
    pub min_area: u32,
    pub clear_output: bool,
    pub fallback_on_decode_failure: bool,
    pub write_report: bool,
}

impl MergedConfig {
    /// Job values win over settings values when present.
    pub fn new(settings: &Settings, job: &Job) -> Self {
        MergedConfig {
            strategy: job.strategy.unwrap_or(settings.strategy),
            gap: job.gap.unwrap_or(settings.gap),
            indent: job.indent.unwrap_or(settings.indent),
            min_area: job.min_area.unwrap_or(settings.min_area),
            clear_output: settings.clear_output,
            fallback_on_decode_failure: settings.fallback_on_decode_failure,
            write_report: job.write_report.unwrap_or(settings.write_report),
        }
    }
}

impl From<&Settings> for MergedConfig {
    fn from(settings: &Settings) -> Self {
        MergedConfig {
            strategy: settings.strategy,
            gap: settings.gap,
            indent: settings.indent,
            min_area: settings.min_area,
            clear_output: settings.clear_output,
            fallback_on_decode_failure: settings.fallback_on_decode_failure,
            write_report: settings.write_report,
        }
    }
}

impl Default for MergedConfig {
    fn default() -> Self {
        MergedConfig::from(&Settings::default())
    }
}
