// Settings / job file parsing tests

use std::io::Write;
use std::path::Path;

use manga_frames::config::job::{JobFile, Strategy};
use manga_frames::config::load_settings_for_job;
use manga_frames::config::merged::MergedConfig;
use manga_frames::config::settings::Settings;

// ============================================================
// 1. Strategy names
// ============================================================

#[test]
fn test_strategy_from_str_known_names() {
    assert_eq!("dual_mask".parse::<Strategy>().unwrap(), Strategy::DualMask);
    assert_eq!("gap_slice".parse::<Strategy>().unwrap(), Strategy::GapSlice);
    assert_eq!(
        "single_mask".parse::<Strategy>().unwrap(),
        Strategy::SingleMask
    );
}

#[test]
fn test_strategy_from_str_unknown_name() {
    let result = "watershed".parse::<Strategy>();
    assert!(result.is_err(), "unknown strategy should be rejected");
}

#[test]
fn test_strategy_display_round_trips_name() {
    for strategy in [Strategy::DualMask, Strategy::GapSlice, Strategy::SingleMask] {
        assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
    }
}

// ============================================================
// 2. Settings deserialization
// ============================================================

#[test]
fn test_settings_full_yaml() {
    let yaml = r#"
strategy: gap_slice
gap: 80
indent: 20
min_area: 900
clear_output: false
fallback_on_decode_failure: false
write_report: true
"#;
    let settings = Settings::from_yaml(yaml).expect("should parse full settings");
    assert_eq!(settings.strategy, Strategy::GapSlice);
    assert_eq!(settings.gap, 80);
    assert_eq!(settings.indent, 20);
    assert_eq!(settings.min_area, 900);
    assert!(!settings.clear_output);
    assert!(!settings.fallback_on_decode_failure);
    assert!(settings.write_report);
}

#[test]
fn test_settings_empty_yaml() {
    let settings = Settings::from_yaml("{}").expect("should parse empty settings");
    assert_eq!(settings.strategy, Strategy::DualMask);
    assert_eq!(settings.gap, 120);
    assert_eq!(settings.indent, 30);
    assert_eq!(settings.min_area, 500);
    assert!(settings.clear_output);
    assert!(settings.fallback_on_decode_failure);
    assert!(!settings.write_report);
}

#[test]
fn test_settings_partial_yaml() {
    let settings = Settings::from_yaml("gap: 60\n").expect("should parse partial settings");
    assert_eq!(settings.gap, 60);
    assert_eq!(settings.indent, 30);
    assert_eq!(settings.strategy, Strategy::DualMask);
}

#[test]
fn test_settings_unknown_strategy_rejected() {
    let result = Settings::from_yaml("strategy: watershed\n");
    assert!(result.is_err(), "unknown strategy should fail to parse");
}

// ============================================================
// 3. Job file deserialization
// ============================================================

#[test]
fn test_job_required_fields_only() {
    let yaml = r#"
jobs:
  - input: chapters
    output: frames
"#;
    let job_file = JobFile::from_yaml(yaml).expect("should parse job file");
    assert_eq!(job_file.jobs.len(), 1);
    let job = &job_file.jobs[0];
    assert_eq!(job.input, "chapters");
    assert_eq!(job.output, "frames");
    assert!(job.strategy.is_none());
    assert!(job.gap.is_none());
    assert!(job.write_report.is_none());
}

#[test]
fn test_job_with_optional_fields() {
    let yaml = r#"
jobs:
  - input: chapters
    output: frames
    strategy: single_mask
    gap: 50
    indent: 10
    min_area: 1000
    write_report: true
"#;
    let job_file = JobFile::from_yaml(yaml).expect("should parse job file");
    let job = &job_file.jobs[0];
    assert_eq!(job.strategy, Some(Strategy::SingleMask));
    assert_eq!(job.gap, Some(50));
    assert_eq!(job.indent, Some(10));
    assert_eq!(job.min_area, Some(1000));
    assert_eq!(job.write_report, Some(true));
}

#[test]
fn test_job_missing_required_field() {
    let yaml = r#"
jobs:
  - input: chapters
"#;
    let result = JobFile::from_yaml(yaml);
    assert!(result.is_err(), "missing output should fail");
}

#[test]
fn test_job_file_without_jobs() {
    let result = JobFile::from_yaml("jobs: []\n");
    assert!(result.is_err(), "empty job list should fail");
}

#[test]
fn test_job_multiple_jobs() {
    let yaml = r#"
jobs:
  - input: a
    output: a_frames
  - input: b
    output: b_frames
    strategy: gap_slice
"#;
    let job_file = JobFile::from_yaml(yaml).expect("should parse job file");
    assert_eq!(job_file.jobs.len(), 2);
    assert_eq!(job_file.jobs[1].strategy, Some(Strategy::GapSlice));
}

// ============================================================
// 4. Merging job over settings
// ============================================================

fn parse_single_job(yaml: &str) -> manga_frames::config::job::Job {
    JobFile::from_yaml(yaml)
        .expect("should parse job file")
        .jobs
        .remove(0)
}

#[test]
fn test_merge_job_overrides_settings() {
    let settings = Settings::from_yaml("gap: 80\nstrategy: gap_slice\n").unwrap();
    let job = parse_single_job(
        r#"
jobs:
  - input: in
    output: out
    gap: 40
    strategy: single_mask
"#,
    );
    let merged = MergedConfig::new(&settings, &job);
    assert_eq!(merged.gap, 40);
    assert_eq!(merged.strategy, Strategy::SingleMask);
}

#[test]
fn test_merge_job_without_overrides_uses_settings() {
    let settings = Settings::from_yaml("gap: 80\nindent: 12\nwrite_report: true\n").unwrap();
    let job = parse_single_job("jobs:\n  - input: in\n    output: out\n");
    let merged = MergedConfig::new(&settings, &job);
    assert_eq!(merged.gap, 80);
    assert_eq!(merged.indent, 12);
    assert!(merged.write_report);
    assert_eq!(merged.strategy, Strategy::DualMask);
}

#[test]
fn test_merge_default_matches_settings_default() {
    let merged = MergedConfig::default();
    assert_eq!(merged.strategy, Strategy::DualMask);
    assert_eq!(merged.gap, 120);
    assert_eq!(merged.indent, 30);
    assert_eq!(merged.min_area, 500);
    assert!(merged.clear_output);
    assert!(merged.fallback_on_decode_failure);
}

// ============================================================
// 5. settings.yaml next to the job file
// ============================================================

#[test]
fn test_auto_detect_settings_yaml_exists() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let settings_path = dir.path().join("settings.yaml");
    let mut f = std::fs::File::create(&settings_path).expect("create settings.yaml");
    writeln!(f, "gap: 64").expect("write settings.yaml");

    let job_path = dir.path().join("jobs.yaml");
    let settings = load_settings_for_job(&job_path).expect("should load settings");
    assert_eq!(settings.gap, 64);
}

#[test]
fn test_auto_detect_settings_yaml_missing() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let job_path = dir.path().join("jobs.yaml");

    let settings = load_settings_for_job(&job_path).expect("should return defaults");
    assert_eq!(settings.gap, 120);
    assert!(!Path::new(&dir.path().join("settings.yaml")).exists());
}

#[test]
fn test_auto_detect_settings_yaml_invalid() {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("settings.yaml"), "gap: [not, a, number]\n")
        .expect("write settings.yaml");

    let result = load_settings_for_job(&dir.path().join("jobs.yaml"));
    assert!(result.is_err(), "malformed settings should fail");
}
