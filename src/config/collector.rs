//! Collector and probe configuration.

use std::path::PathBuf;
use std::time::Duration;

use super::parse::{env_bool, env_duration, env_or, env_parse, split_list};
use super::ConfigError;
use crate::diagnostics::collector::DEFAULT_PROBE_TIMEOUT;
use crate::diagnostics::probes::{ProbeSettings, BUILTIN_PROBES};

#[derive(Clone, Debug)]
pub struct CollectorConfig {
    /// Built-in probes to register, in order.
    pub probes: Vec<String>,
    pub timeout: Duration,
    pub parallel: bool,
    pub settings: ProbeSettings,
}

impl CollectorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            probes: Self::parse_probes()?,
            timeout: Self::parse_timeout()?,
            parallel: env_bool("PARALLEL_PROBES", false),
            settings: ProbeSettings {
                proc_root: PathBuf::from(env_or("PROC_ROOT", "/proc")),
                disk_mounts: split_list(&env_or("DISK_MOUNTS", "/")),
                nvidia_smi: env_or("NVIDIA_SMI", "nvidia-smi"),
                df: env_or("DF", "df"),
                cpus: Self::parse_cpus()?,
            },
        })
    }

    /// CPU_COUNT=0 (default) detects logical CPUs.
    fn parse_cpus() -> Result<usize, ConfigError> {
        match env_parse("CPU_COUNT", 0usize)? {
            0 => Ok(num_cpus::get()),
            n => Ok(n),
        }
    }

    fn parse_probes() -> Result<Vec<String>, ConfigError> {
        let raw = env_or("PROBES", &BUILTIN_PROBES.join(","));
        let probes = split_list(&raw);

        if let Some(unknown) = probes.iter().find(|p| !BUILTIN_PROBES.contains(&p.as_str())) {
            return Err(ConfigError::Invalid {
                key: "PROBES".into(),
                message: format!(
                    "unknown probe '{}', expected one of: {}",
                    unknown,
                    BUILTIN_PROBES.join(", ")
                ),
            });
        }

        Ok(probes)
    }

    fn parse_timeout() -> Result<Duration, ConfigError> {
        // "off" is not allowed: every probe must be bounded
        match env_duration("PROBE_TIMEOUT", "5s")? {
            Some(timeout) => Ok(timeout),
            None => Err(ConfigError::Invalid {
                key: "PROBE_TIMEOUT".into(),
                message: format!(
                    "probe timeout cannot be disabled (default {}s)",
                    DEFAULT_PROBE_TIMEOUT.as_secs()
                ),
            }),
        }
    }
}
