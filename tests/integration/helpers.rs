//! Test helpers and utilities

use rigcheck::diagnostics::{
    Comparator, FnProbe, Probe, ProbeError, RuleSet, Sample, Severity, ThresholdRule,
    UnavailableReason,
};
use std::path::Path;

/// Probe that always returns the given `(name, value)` pairs.
pub fn static_probe(
    name: &str,
    samples: Vec<(&'static str, f64)>,
) -> impl Probe + 'static {
    FnProbe::new(name, move |source: &str| {
        Ok(samples
            .iter()
            .map(|(metric, value)| Sample::new(source, *metric, *value))
            .collect())
    })
}

/// Probe whose tool is never installed.
pub fn missing_tool_probe(name: &str, tool: &'static str) -> impl Probe + 'static {
    FnProbe::new(name, move |source: &str| {
        Err(ProbeError::unavailable(
            source,
            UnavailableReason::ToolMissing { tool: tool.into() },
        ))
    })
}

/// Rule table shared by the scenario tests.
pub fn scenario_rules() -> RuleSet {
    RuleSet::new(vec![
        ThresholdRule::new(
            "gpu.temperature",
            Comparator::Gt,
            85.0,
            Severity::Warning,
            "High temperature",
        )
        .with_recommendation("Improve cooling"),
        ThresholdRule::new(
            "mem.usedPct",
            Comparator::Gt,
            90.0,
            Severity::Warning,
            "High memory usage",
        )
        .with_recommendation("Close unused applications"),
        ThresholdRule::new("fan.pct", Comparator::Gt, 80.0, Severity::Notice, "Fan loud"),
        ThresholdRule::new(
            "disk.usedPct",
            Comparator::Ge,
            97.0,
            Severity::Critical,
            "Disk {mount} full",
        ),
    ])
}

/// Write a fake procfs tree with meminfo and loadavg.
pub fn write_proc_root(dir: &Path, mem_available_kib: u64, load1: f64) {
    let meminfo = format!(
        "MemTotal:       16000000 kB\n\
         MemFree:          100000 kB\n\
         MemAvailable:   {} kB\n\
         SwapTotal:             0 kB\n\
         SwapFree:              0 kB\n",
        mem_available_kib
    );
    std::fs::write(dir.join("meminfo"), meminfo).expect("write meminfo");
    std::fs::write(
        dir.join("loadavg"),
        format!("{:.2} 1.00 0.50 2/512 12345\n", load1),
    )
    .expect("write loadavg");
}
