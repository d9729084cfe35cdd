//! Built-in probes against a temporary procfs tree, evaluated with the
//! built-in rule table.

use crate::helpers::write_proc_root;
use rigcheck::diagnostics::probes::{self, ProbeSettings};
use rigcheck::diagnostics::{Collection, Collector, Evaluator, RuleSet, Status, UnavailableReason};
use rigcheck::diagnostics::{ProbeError, ProbeOutcome};
use rigcheck::observability::metrics;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn settings(proc_root: &Path) -> ProbeSettings {
    ProbeSettings {
        proc_root: proc_root.to_path_buf(),
        nvidia_smi: "/nonexistent/rigcheck-test/nvidia-smi".to_string(),
        cpus: 2,
        ..ProbeSettings::default()
    }
}

async fn collect(names: &[&str], settings: &ProbeSettings, parallel: bool) -> Collection {
    let mut collector = Collector::new()
        .with_timeout(Duration::from_secs(5))
        .with_parallel(parallel);
    for name in names {
        collector
            .register_arc(probes::builtin(name, settings).expect("builtin probe"))
            .unwrap();
    }
    collector.collect().await
}

#[tokio::test]
async fn test_healthy_host() {
    let dir = TempDir::new().unwrap();
    write_proc_root(dir.path(), 12_000_000, 0.5);

    let collection = collect(&["memory", "load"], &settings(dir.path()), false).await;
    assert!(collection.is_complete());

    let diagnosis = Evaluator::new(RuleSet::builtin()).evaluate_collection(&collection);
    assert_eq!(diagnosis.status, Status::Healthy);
    assert!(diagnosis.findings.is_empty());
    assert_eq!(diagnosis.status.exit_code(), 0);
}

#[tokio::test]
async fn test_memory_pressure_is_critical() {
    let dir = TempDir::new().unwrap();
    // 100 MB available, load 9 on 2 CPUs
    write_proc_root(dir.path(), 100_000, 9.0);

    let collection = collect(&["memory", "load"], &settings(dir.path()), true).await;
    let diagnosis = Evaluator::new(RuleSet::builtin()).evaluate_collection(&collection);

    assert_eq!(diagnosis.status, Status::Critical);
    assert_eq!(diagnosis.status.exit_code(), 2);

    let rules: Vec<&str> = diagnosis.findings.iter().map(|f| f.rule.as_str()).collect();
    assert_eq!(rules, vec!["mem.usedPct", "mem.availableBytes", "cpu.loadPerCore"]);
    assert!(diagnosis.findings[0].issue.contains("99.4%"));
}

#[tokio::test]
async fn test_missing_gpu_tool_leaves_note() {
    let dir = TempDir::new().unwrap();
    write_proc_root(dir.path(), 12_000_000, 0.5);

    let collection = collect(&["gpu", "memory"], &settings(dir.path()), false).await;

    let ProbeOutcome::Failed { error } = &collection.slots[0].outcome else {
        panic!("gpu probe should fail: {:?}", collection.slots[0]);
    };
    assert!(matches!(
        error,
        ProbeError::Unavailable {
            reason: UnavailableReason::ToolMissing { .. },
            ..
        }
    ));
    assert!(collection.slots[1].is_collected());

    let diagnosis = Evaluator::new(RuleSet::builtin()).evaluate_collection(&collection);
    assert_eq!(diagnosis.status, Status::Healthy);
    assert_eq!(diagnosis.notes.len(), 1);
    assert_eq!(diagnosis.notes[0].probe, "gpu");

    let text = diagnosis.render_text();
    assert!(text.starts_with("Status: HEALTHY"));
    assert!(text.contains("Notes (reduced visibility):"));
}

#[tokio::test]
async fn test_missing_proc_file() {
    let dir = TempDir::new().unwrap();

    let collection = collect(&["memory"], &settings(dir.path()), false).await;
    assert!(collection.samples.is_empty());
    assert_eq!(collection.degraded().count(), 1);
}

#[tokio::test]
async fn test_report_formats() {
    let dir = TempDir::new().unwrap();
    write_proc_root(dir.path(), 100_000, 0.5);

    let collection = collect(&["gpu", "memory"], &settings(dir.path()), false).await;
    let diagnosis = Evaluator::new(RuleSet::builtin()).evaluate_collection(&collection);

    let json = serde_json::to_value(&diagnosis).unwrap();
    assert_eq!(json["status"], "critical");
    assert_eq!(json["issues"].as_array().unwrap().len(), 2);
    assert_eq!(json["recommendations"].as_array().unwrap().len(), 2);
    assert_eq!(json["notes"][0]["probe"], "gpu");

    let prom = metrics::render(&collection, &diagnosis).unwrap();
    assert!(prom.contains("rigcheck_status 3"));
    assert!(prom.contains("rigcheck_probe_up{probe=\"gpu\"} 0"));
    assert!(prom.contains("rigcheck_probe_up{probe=\"memory\"} 1"));
    assert!(prom.contains("rigcheck_findings{severity=\"critical\"} 1"));
}
