//! Rule evaluation scenarios over fake probes.

use crate::helpers::{missing_tool_probe, scenario_rules, static_probe};
use rigcheck::diagnostics::{
    evaluate, Baselines, Collector, Evaluator, Sample, Status,
};

#[tokio::test]
async fn test_hot_gpu_is_warning() {
    let mut collector = Collector::new();
    collector
        .register(static_probe("gpu", vec![("gpu.temperature", 90.0)]))
        .unwrap();

    let collection = collector.collect().await;
    let diagnosis = Evaluator::new(scenario_rules()).evaluate_collection(&collection);

    assert_eq!(diagnosis.status, Status::Warning);
    assert_eq!(diagnosis.issues().collect::<Vec<_>>(), vec!["High temperature"]);
    assert_eq!(
        diagnosis.recommendations().collect::<Vec<_>>(),
        vec!["Improve cooling"]
    );
    assert!(diagnosis.notes.is_empty());
}

#[tokio::test]
async fn test_only_breaching_sample_reported() {
    let mut collector = Collector::new();
    collector
        .register(static_probe("memory", vec![("mem.usedPct", 95.0)]))
        .unwrap();
    collector
        .register(static_probe("fans", vec![("fan.pct", 50.0)]))
        .unwrap();

    let collection = collector.collect().await;
    let diagnosis = Evaluator::new(scenario_rules()).evaluate_collection(&collection);

    assert_eq!(diagnosis.status, Status::Warning);
    assert_eq!(diagnosis.findings.len(), 1);
    assert_eq!(diagnosis.findings[0].rule, "mem.usedPct");
}

#[tokio::test]
async fn test_unavailable_gpu_does_not_raise_status() {
    let mut collector = Collector::new();
    collector
        .register(missing_tool_probe("gpu", "nvidia-smi"))
        .unwrap();
    collector
        .register(static_probe("disk", vec![("disk.usedPct", 42.0)]))
        .unwrap();

    let collection = collector.collect().await;
    assert_eq!(collection.samples.len(), 1);
    assert!(!collection.is_complete());

    let diagnosis = Evaluator::new(scenario_rules()).evaluate_collection(&collection);

    assert_eq!(diagnosis.status, Status::Healthy);
    assert!(diagnosis.findings.is_empty());
    assert_eq!(diagnosis.notes.len(), 1);
    assert_eq!(diagnosis.notes[0].probe, "gpu");
    assert!(diagnosis.notes[0].message.contains("nvidia-smi"));
}

#[tokio::test]
async fn test_empty_collection_is_healthy() {
    let collection = Collector::new().collect().await;
    let diagnosis = Evaluator::new(scenario_rules()).evaluate_collection(&collection);

    assert_eq!(diagnosis.status, Status::Healthy);
    assert_eq!(diagnosis.issues().count(), 0);
    assert!(diagnosis.render_text().contains("No issues found."));
}

#[test]
fn test_higher_severity_sample_raises_status() {
    let rules = scenario_rules();
    let baselines = Baselines::new();
    let mut samples = vec![
        Sample::new("gpu", "gpu.temperature", 90.0),
        Sample::new("fans", "fan.pct", 85.0),
    ];

    let before = evaluate(&samples, &rules, &baselines);
    assert_eq!(before.status, Status::Warning);

    samples.push(Sample::new("disk", "disk.usedPct", 99.0).with_extra("mount", "/data"));
    let after = evaluate(&samples, &rules, &baselines);

    assert_eq!(after.status, Status::Critical);
    assert!(after.status > before.status);
    assert_eq!(
        after.issues().collect::<Vec<_>>(),
        vec!["High temperature", "Fan loud", "Disk /data full"]
    );
}

#[test]
fn test_removing_sample_removes_only_its_finding() {
    let rules = scenario_rules();
    let baselines = Baselines::new();
    let samples = vec![
        Sample::new("gpu", "gpu.temperature", 90.0),
        Sample::new("memory", "mem.usedPct", 97.0),
        Sample::new("fans", "fan.pct", 85.0),
    ];

    let full = evaluate(&samples, &rules, &baselines);
    assert_eq!(
        full.issues().collect::<Vec<_>>(),
        vec!["High temperature", "High memory usage", "Fan loud"]
    );

    let without_memory: Vec<Sample> = samples
        .iter()
        .filter(|s| s.name() != "mem.usedPct")
        .cloned()
        .collect();
    let reduced = evaluate(&without_memory, &rules, &baselines);

    assert_eq!(
        reduced.issues().collect::<Vec<_>>(),
        vec!["High temperature", "Fan loud"]
    );
}

#[test]
fn test_evaluation_is_repeatable() {
    let evaluator = Evaluator::new(scenario_rules());
    let samples = vec![
        Sample::new("gpu", "gpu.temperature", 91.0),
        Sample::new("memory", "mem.usedPct", 12.0),
    ];

    assert_eq!(evaluator.evaluate(&samples), evaluator.evaluate(&samples));
}
