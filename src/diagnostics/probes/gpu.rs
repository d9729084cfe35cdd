//! NVIDIA GPU probe over `nvidia-smi`.

use super::command::CommandProbe;
use crate::diagnostics::probe::ProbeError;
use crate::diagnostics::types::Sample;

/// Columns requested from `nvidia-smi --query-gpu`, in output order.
pub const QUERY_FIELDS: &str = "index,name,temperature.gpu,utilization.gpu,memory.used,memory.total,fan.speed,power.draw,power.limit,driver_version";

const FIELD_COUNT: usize = 10;

pub fn gpu_probe(nvidia_smi: &str) -> CommandProbe {
    CommandProbe::new("gpu", nvidia_smi, parse_query_output).args([
        format!("--query-gpu={}", QUERY_FIELDS),
        "--format=csv,noheader,nounits".to_string(),
    ])
}

/// Parse `--format=csv,noheader,nounits` rows, one per GPU.
///
/// Unsupported readings (`[N/A]`, `[Not Supported]`) are omitted rather than
/// reported as zero.
pub fn parse_query_output(probe: &str, stdout: &str) -> Result<Vec<Sample>, ProbeError> {
    let mut samples = Vec::new();

    for (line_no, line) in stdout.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Err(ProbeError::parse(
                probe,
                format!(
                    "line {}: expected {} fields, got {}",
                    line_no + 1,
                    FIELD_COUNT,
                    fields.len()
                ),
            ));
        }

        let index = fields[0];
        let model = fields[1];
        let reading = |name: &str, value: f64, unit: &str| {
            Sample::new(probe, name, value)
                .with_unit(unit)
                .with_extra("index", index)
                .with_extra("model", model)
        };

        if let Some(t) = number(fields[2]) {
            samples.push(reading("gpu.temperature", t, "C"));
        }
        if let Some(u) = number(fields[3]) {
            samples.push(reading("gpu.utilization", u, "%"));
        }
        if let (Some(used), Some(total)) = (number(fields[4]), number(fields[5])) {
            if total > 0.0 {
                samples.push(reading("gpu.memUsedPct", percent(used, total), "%"));
            }
        }
        if let Some(fan) = number(fields[6]) {
            samples.push(reading("gpu.fanPct", fan, "%"));
        }
        if let (Some(draw), Some(limit)) = (number(fields[7]), number(fields[8])) {
            if limit > 0.0 {
                samples.push(reading("gpu.powerPct", percent(draw, limit), "%"));
            }
        }
        if is_supported(fields[9]) {
            samples.push(
                Sample::new(probe, "gpu.driverVersion", fields[9])
                    .with_extra("index", index)
                    .with_extra("model", model),
            );
        }
    }

    Ok(samples)
}

fn is_supported(field: &str) -> bool {
    !field.is_empty() && !field.starts_with('[') && field != "N/A"
}

fn number(field: &str) -> Option<f64> {
    if !is_supported(field) {
        return None;
    }
    field.parse().ok()
}

fn percent(part: f64, whole: f64) -> f64 {
    (part / whole * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(samples: &'a [Sample], name: &str) -> Vec<&'a Sample> {
        samples.iter().filter(|s| s.name() == name).collect()
    }

    #[test]
    fn test_parse_two_gpus() {
        let out = "0, NVIDIA GeForce RTX 3080, 71, 35, 4096, 10240, 55, 220.50, 320.00, 535.54.03\n\
                   1, NVIDIA GeForce RTX 3060, 88, 99, 11800, 12288, 90, 170.00, 170.00, 535.54.03\n";

        let samples = parse_query_output("gpu", out).unwrap();

        let temps = find(&samples, "gpu.temperature");
        assert_eq!(temps.len(), 2);
        assert_eq!(temps[1].value().as_f64(), Some(88.0));
        assert_eq!(temps[1].extra().get("index").map(String::as_str), Some("1"));
        assert_eq!(
            temps[0].extra().get("model").map(String::as_str),
            Some("NVIDIA GeForce RTX 3080")
        );

        let mem = find(&samples, "gpu.memUsedPct");
        assert_eq!(mem[0].value().as_f64(), Some(40.0));
        assert_eq!(mem[1].value().as_f64(), Some(96.0));

        let power = find(&samples, "gpu.powerPct");
        assert_eq!(power[1].value().as_f64(), Some(100.0));

        let driver = find(&samples, "gpu.driverVersion");
        assert_eq!(driver[0].value().as_str(), Some("535.54.03"));
    }

    #[test]
    fn test_unsupported_fields_are_omitted() {
        let out = "0, Tesla T4, 45, 0, 0, 15360, [N/A], 27.81, 70.00, 470.82.01\n";

        let samples = parse_query_output("gpu", out).unwrap();

        assert!(find(&samples, "gpu.fanPct").is_empty());
        assert_eq!(find(&samples, "gpu.memUsedPct")[0].value().as_f64(), Some(0.0));
        assert_eq!(find(&samples, "gpu.temperature").len(), 1);
    }

    #[test]
    fn test_empty_output_means_no_gpus() {
        assert!(parse_query_output("gpu", "\n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_row_is_parse_failure() {
        let err = parse_query_output("gpu", "0, RTX, 70\n").unwrap_err();
        assert!(err.is_parse_failure());
        assert_eq!(err.probe(), "gpu");
    }

    #[test]
    fn test_probe_arguments() {
        let probe = gpu_probe("/usr/bin/nvidia-smi");
        assert_eq!(probe.program(), "/usr/bin/nvidia-smi");
    }
}
