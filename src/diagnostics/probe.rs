//! Probe interface and probe failure taxonomy.
//!
//! A probe is a thin adapter over one external data source (a command-line
//! tool, a procfs file, an OS inventory query). It yields zero or more
//! [`Sample`]s or fails with a [`ProbeError`]; the collector records the
//! failure in that probe's slot and moves on.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::types::Sample;

/// Why a probe could not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The backing tool is not installed (or not on PATH).
    ToolMissing { tool: String },
    PermissionDenied,
    /// The probe did not finish within the collector's bound.
    Timeout { after_ms: u64 },
    /// The tool ran but exited unsuccessfully.
    ExitStatus {
        code: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        stderr: Option<String>,
    },
    Io { message: String },
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolMissing { tool } => write!(f, "{} not found", tool),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::Timeout { after_ms } => write!(f, "timed out after {}ms", after_ms),
            Self::ExitStatus { code, stderr } => {
                match code {
                    Some(c) => write!(f, "exited with status {}", c)?,
                    None => write!(f, "terminated by signal")?,
                }
                if let Some(err) = stderr {
                    write!(f, " ({})", err)?;
                }
                Ok(())
            }
            Self::Io { message } => write!(f, "I/O error: {}", message),
        }
    }
}

impl UnavailableReason {
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout {
            after_ms: after.as_millis() as u64,
        }
    }

    /// Classify an I/O error raised while spawning or reading a source.
    pub fn from_io(tool: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::ToolMissing {
                tool: tool.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io {
                message: err.to_string(),
            },
        }
    }
}

/// Probe failure. Always local to the probe that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ProbeError {
    #[error("probe '{probe}' unavailable: {reason}")]
    Unavailable {
        probe: String,
        reason: UnavailableReason,
    },

    #[error("probe '{probe}' output could not be parsed: {detail}")]
    ParseFailure { probe: String, detail: String },
}

impl ProbeError {
    pub fn unavailable(probe: impl Into<String>, reason: UnavailableReason) -> Self {
        Self::Unavailable {
            probe: probe.into(),
            reason,
        }
    }

    pub fn parse(probe: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ParseFailure {
            probe: probe.into(),
            detail: detail.into(),
        }
    }

    pub fn probe(&self) -> &str {
        match self {
            Self::Unavailable { probe, .. } | Self::ParseFailure { probe, .. } => probe,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::ParseFailure { .. })
    }
}

/// Named adapter that produces samples from one data source.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Unique name used for registration and as the samples' `source`.
    fn name(&self) -> &str;

    /// Query the source once.
    async fn sample(&self) -> Result<Vec<Sample>, ProbeError>;
}

/// Probe backed by a synchronous closure.
///
/// Handy for caller-computed metrics and for tests.
pub struct FnProbe<F> {
    name: String,
    f: F,
}

impl<F> FnProbe<F>
where
    F: Fn(&str) -> Result<Vec<Sample>, ProbeError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F> Probe for FnProbe<F>
where
    F: Fn(&str) -> Result<Vec<Sample>, ProbeError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn sample(&self) -> Result<Vec<Sample>, ProbeError> {
        (self.f)(&self.name)
    }
}
