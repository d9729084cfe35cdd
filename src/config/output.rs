//! Rule, baseline and report output configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::parse::{env_duration, env_opt, env_or};
use super::ConfigError;
use crate::diagnostics::{Baselines, RuleSet};

/// Report format on stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Prometheus,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "prometheus" | "prom" => Ok(Self::Prometheus),
            other => Err(format!(
                "expected text, json or prometheus, got '{}'",
                other
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Re-run periodically when set.
    pub watch_interval: Option<Duration>,
    /// JSON rule table; built-in table when unset.
    pub rules_file: Option<PathBuf>,
    /// JSON object of baseline values.
    pub baselines_file: Option<PathBuf>,
}

impl OutputConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or("OUTPUT_FORMAT", "text");
        let format = raw.parse().map_err(|error| ConfigError::Parse {
            key: "OUTPUT_FORMAT".into(),
            value: raw.clone(),
            error,
        })?;

        Ok(Self {
            format,
            watch_interval: env_duration("WATCH_INTERVAL", "off")?,
            rules_file: env_opt("RULES_FILE").map(PathBuf::from),
            baselines_file: env_opt("BASELINES_FILE").map(PathBuf::from),
        })
    }

    /// Load the configured rule table (or the built-in one).
    pub fn load_rules(&self) -> Result<RuleSet, ConfigError> {
        match &self.rules_file {
            Some(path) => Ok(RuleSet::from_path(path)?),
            None => Ok(RuleSet::builtin()),
        }
    }

    /// Load the configured baselines (empty when unset).
    pub fn load_baselines(&self) -> Result<Baselines, ConfigError> {
        match &self.baselines_file {
            Some(path) => load_baselines(path),
            None => Ok(Baselines::new()),
        }
    }
}

fn load_baselines(path: &Path) -> Result<Baselines, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| ConfigError::Baselines {
        path: path.to_path_buf(),
        source,
    })
}
