use std::path::Path;

use serde::Deserialize;

use super::job::Strategy;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub strategy: Strategy,
    /// Minimum vertical distance (px) between outline points that splits a band.
    pub gap: u32,
    /// Margin (px) added around each band edge.
    pub indent: u32,
    /// Minimum area for unclassified candidates.
    pub min_area: u32,
    pub clear_output: bool,
    pub fallback_on_decode_failure: bool,
    pub write_report: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            strategy: Strategy::DualMask,
            gap: 120,
            indent: 30,
            min_area: 500,
            clear_output: true,
            fallback_on_decode_failure: true,
            write_report: false,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| {
            crate::error::FrameError::config(format!("Failed to parse settings YAML: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
