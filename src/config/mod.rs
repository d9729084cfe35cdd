//! Configuration module for rigcheck.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use rigcheck::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Probes: {:?}", config.collector.probes);
//! println!("Format: {:?}", config.output.format);
//! ```

mod collector;
mod error;
mod logging;
mod output;
mod parse;

pub use collector::CollectorConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use output::{OutputConfig, OutputFormat};
pub use parse::parse_duration;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Probe and collector configuration.
    pub collector: CollectorConfig,
    /// Rules, baselines and report output.
    pub output: OutputConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            collector: CollectorConfig::from_env()?,
            output: OutputConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Probes: {}", self.collector.probes.join(", "));
        info!("  Probe timeout: {}ms", self.collector.timeout.as_millis());
        info!(
            "  Mode: {}",
            if self.collector.parallel {
                "parallel"
            } else {
                "sequential"
            }
        );
        info!("  Output: {:?}", self.output.format);

        match &self.output.rules_file {
            Some(path) => info!("  Rules: {}", path.display()),
            None => info!("  Rules: built-in"),
        }

        if let Some(ref path) = self.output.baselines_file {
            info!("  Baselines: {}", path.display());
        }

        if let Some(interval) = self.output.watch_interval {
            info!("  Watch interval: {}s", interval.as_secs());
        }
    }
}
