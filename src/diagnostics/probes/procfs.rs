//! Probes reading Linux procfs files.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::diagnostics::probe::{Probe, ProbeError, UnavailableReason};
use crate::diagnostics::types::Sample;

async fn read_proc_file(probe: &str, path: &Path) -> Result<String, ProbeError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        ProbeError::unavailable(
            probe,
            UnavailableReason::from_io(&path.display().to_string(), &e),
        )
    })
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// System memory and swap from `<proc_root>/meminfo`.
pub struct MemoryProbe {
    path: PathBuf,
}

impl MemoryProbe {
    pub fn new(proc_root: impl AsRef<Path>) -> Self {
        Self {
            path: proc_root.as_ref().join("meminfo"),
        }
    }
}

#[async_trait]
impl Probe for MemoryProbe {
    fn name(&self) -> &str {
        "memory"
    }

    async fn sample(&self) -> Result<Vec<Sample>, ProbeError> {
        let content = read_proc_file(self.name(), &self.path).await?;
        parse_meminfo(self.name(), &content)
    }
}

/// Parse meminfo into byte totals and usage percentages.
pub fn parse_meminfo(probe: &str, content: &str) -> Result<Vec<Sample>, ProbeError> {
    let mut fields: HashMap<&str, u64> = HashMap::new();
    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(raw) = rest.split_whitespace().next() else {
            continue;
        };
        let bytes = raw
            .parse::<u64>()
            .ok()
            .and_then(|kib| kib.checked_mul(1024))
            .ok_or_else(|| {
                ProbeError::parse(probe, format!("{}: value out of range '{}'", key.trim(), raw))
            })?;
        fields.insert(key.trim(), bytes);
    }

    let total = *fields
        .get("MemTotal")
        .ok_or_else(|| ProbeError::parse(probe, "MemTotal not found"))?;
    if total == 0 {
        return Err(ProbeError::parse(probe, "MemTotal is zero"));
    }

    // Kernels before 3.14 lack MemAvailable
    let available = match fields.get("MemAvailable") {
        Some(v) => *v,
        None => ["MemFree", "Buffers", "Cached"]
            .iter()
            .filter_map(|k| fields.get(k))
            .try_fold(0u64, |acc, v| acc.checked_add(*v))
            .ok_or_else(|| ProbeError::parse(probe, "available memory out of range"))?,
    };

    let used_pct = round1(total.saturating_sub(available) as f64 / total as f64 * 100.0);

    let mut samples = vec![
        Sample::new(probe, "mem.totalBytes", total).with_unit("B"),
        Sample::new(probe, "mem.availableBytes", available).with_unit("B"),
        Sample::new(probe, "mem.usedPct", used_pct).with_unit("%"),
    ];

    if let (Some(&swap_total), Some(&swap_free)) = (fields.get("SwapTotal"), fields.get("SwapFree")) {
        if swap_total > 0 {
            let swap_pct = round1(swap_total.saturating_sub(swap_free) as f64 / swap_total as f64 * 100.0);
            samples.push(Sample::new(probe, "swap.usedPct", swap_pct).with_unit("%"));
        }
    }

    Ok(samples)
}

/// Load averages from `<proc_root>/loadavg`, normalized by logical CPU count.
pub struct LoadProbe {
    path: PathBuf,
    cpus: usize,
}

impl LoadProbe {
    pub fn new(proc_root: impl AsRef<Path>, cpus: usize) -> Self {
        Self {
            path: proc_root.as_ref().join("loadavg"),
            cpus: cpus.max(1),
        }
    }
}

#[async_trait]
impl Probe for LoadProbe {
    fn name(&self) -> &str {
        "load"
    }

    async fn sample(&self) -> Result<Vec<Sample>, ProbeError> {
        let content = read_proc_file(self.name(), &self.path).await?;
        parse_loadavg(self.name(), &content, self.cpus)
    }
}

pub fn parse_loadavg(probe: &str, content: &str, cpus: usize) -> Result<Vec<Sample>, ProbeError> {
    let loads: Vec<f64> = content
        .split_whitespace()
        .take(3)
        .map(|v| v.parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| ProbeError::parse(probe, format!("invalid loadavg: {}", e)))?;

    let &[load1, load5, load15] = loads.as_slice() else {
        return Err(ProbeError::parse(probe, "loadavg has fewer than 3 fields"));
    };

    Ok(vec![
        Sample::new(probe, "cpu.load1", load1),
        Sample::new(probe, "cpu.load5", load5),
        Sample::new(probe, "cpu.load15", load15),
        Sample::new(probe, "cpu.loadPerCore", (load1 / cpus.max(1) as f64 * 100.0).round() / 100.0)
            .with_extra("cpus", cpus.to_string()),
    ])
}
