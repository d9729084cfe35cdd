//! Rule tables and baselines loaded from JSON files.

use rigcheck::config::{ConfigError, OutputConfig, OutputFormat};
use rigcheck::diagnostics::{Comparator, Evaluator, RuleSet, Sample, Severity, Status};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const RULES: &str = r#"[
    {
        "name": "gpu.driverAgeDays",
        "cmp": ">",
        "limit": { "baseline": "gpu.maxDriverAgeDays" },
        "severity": "notice",
        "issue": "GPU driver is {value} days old (limit {limit})",
        "recommendation": "Update the {source} driver"
    },
    {
        "name": "gpu.driverVersion",
        "cmp": "==",
        "limit": "535.54.03",
        "severity": "warning",
        "issue": "Driver {value} has a known memory leak"
    },
    {
        "name": "gpu.temperature",
        "cmp": "missing",
        "severity": "notice",
        "issue": "No GPU temperature reported"
    }
]"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn output_config(rules: Option<PathBuf>, baselines: Option<PathBuf>) -> OutputConfig {
    OutputConfig {
        format: OutputFormat::Json,
        watch_interval: None,
        rules_file: rules,
        baselines_file: baselines,
    }
}

#[test]
fn test_load_rule_table() {
    let rules = RuleSet::from_json_str(RULES).unwrap();

    assert_eq!(rules.len(), 3);
    assert_eq!(rules.rules()[0].cmp, Comparator::Gt);
    assert_eq!(rules.rules()[1].severity, Severity::Warning);
    assert_eq!(rules.rules()[2].cmp, Comparator::Missing);
    assert!(rules.rules()[2].limit.is_none());
}

#[test]
fn test_rules_with_baselines() {
    let rules_file = write_temp(RULES);
    let baselines_file = write_temp(r#"{"gpu.maxDriverAgeDays": 365}"#);
    let config = output_config(
        Some(rules_file.path().to_path_buf()),
        Some(baselines_file.path().to_path_buf()),
    );

    let evaluator = Evaluator::new(config.load_rules().unwrap())
        .with_baselines(config.load_baselines().unwrap());

    let samples = vec![
        Sample::new("nvidia", "gpu.driverAgeDays", 400.0),
        Sample::new("nvidia", "gpu.driverVersion", "535.54.03"),
    ];
    let diagnosis = evaluator.evaluate(&samples);

    assert_eq!(diagnosis.status, Status::Warning);
    assert_eq!(
        diagnosis.issues().collect::<Vec<_>>(),
        vec![
            "GPU driver is 400 days old (limit 365)",
            "Driver 535.54.03 has a known memory leak",
            "No GPU temperature reported",
        ]
    );
    assert_eq!(diagnosis.findings[0].recommendation, "Update the nvidia driver");
}

#[test]
fn test_unknown_baseline_skips_rule() {
    let rules_file = write_temp(RULES);
    let config = output_config(Some(rules_file.path().to_path_buf()), None);

    let evaluator = Evaluator::new(config.load_rules().unwrap());
    let samples = vec![
        Sample::new("nvidia", "gpu.driverAgeDays", 4000.0),
        Sample::new("nvidia", "gpu.temperature", 60.0),
    ];
    let diagnosis = evaluator.evaluate(&samples);

    assert_eq!(diagnosis.status, Status::Healthy);
    assert!(diagnosis.findings.is_empty());
}

#[test]
fn test_malformed_rule_table() {
    let rules_file = write_temp(r#"[{"name": "x", "cmp": "~=", "limit": 1, "severity": "warning", "issue": "x"}]"#);
    let config = output_config(Some(rules_file.path().to_path_buf()), None);

    let err = config.load_rules().unwrap_err();
    assert!(matches!(err, ConfigError::Rules(_)));
}
