//! Filesystem usage probe over POSIX `df -P -k`.

use super::command::CommandProbe;
use crate::diagnostics::probe::ProbeError;
use crate::diagnostics::types::Sample;

pub fn disk_probe(df: &str, mounts: &[String]) -> CommandProbe {
    CommandProbe::new("disk", df, parse_df_output)
        .args(["-P", "-k"])
        .args(mounts.iter().cloned())
        .allow_partial_output()
}

/// Parse POSIX `df -P -k` output.
///
/// `disk.usedPct` is computed as `used / (used + available)`, the same ratio
/// `df` prints as capacity (reserved blocks excluded).
pub fn parse_df_output(probe: &str, stdout: &str) -> Result<Vec<Sample>, ProbeError> {
    let mut lines = stdout.lines();

    match lines.next() {
        Some(header) if header.starts_with("Filesystem") => {}
        _ => return Err(ProbeError::parse(probe, "missing df header")),
    }

    let mut samples = Vec::new();

    for line in lines.filter(|l| !l.trim().is_empty()) {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 6 {
            return Err(ProbeError::parse(probe, format!("short df row: {}", line)));
        }

        let used = parse_kib(probe, cols[2])?;
        let available = parse_kib(probe, cols[3])?;
        let filesystem = cols[0];
        // Mount points may contain spaces
        let mount = cols[5..].join(" ");

        let out_of_range = || ProbeError::parse(probe, format!("block count out of range: {}", line));
        let total = used.checked_add(available).ok_or_else(out_of_range)?;
        let available_bytes = available.checked_mul(1024).ok_or_else(out_of_range)?;
        let used_pct = if total > 0 {
            (used as f64 / total as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };

        samples.push(
            Sample::new(probe, "disk.usedPct", used_pct)
                .with_unit("%")
                .with_extra("mount", mount.as_str())
                .with_extra("filesystem", filesystem),
        );
        samples.push(
            Sample::new(probe, "disk.availableBytes", available_bytes)
                .with_unit("B")
                .with_extra("mount", mount)
                .with_extra("filesystem", filesystem),
        );
    }

    Ok(samples)
}

fn parse_kib(probe: &str, field: &str) -> Result<u64, ProbeError> {
    field
        .parse()
        .map_err(|_| ProbeError::parse(probe, format!("invalid block count '{}'", field)))
}
