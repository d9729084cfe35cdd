//! Probe that runs an external command and parses its stdout.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::diagnostics::probe::{Probe, ProbeError, UnavailableReason};
use crate::diagnostics::types::Sample;

/// Parses command output into samples. Receives `(probe_name, stdout)`.
pub type OutputParser = dyn Fn(&str, &str) -> Result<Vec<Sample>, ProbeError> + Send + Sync;

pub struct CommandProbe {
    name: String,
    program: String,
    args: Vec<String>,
    parser: Box<OutputParser>,
    partial_output: bool,
}

impl CommandProbe {
    pub fn new<F>(name: impl Into<String>, program: impl Into<String>, parser: F) -> Self
    where
        F: Fn(&str, &str) -> Result<Vec<Sample>, ProbeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            parser: Box::new(parser),
            partial_output: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Accept samples parsed from stdout even when the tool exits non-zero
    /// (`df` fails the whole run for one bad mount but still reports the rest).
    pub fn allow_partial_output(mut self) -> Self {
        self.partial_output = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Probe for CommandProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn sample(&self) -> Result<Vec<Sample>, ProbeError> {
        debug!(probe = %self.name, program = %self.program, args = ?self.args, "Running probe command");

        // kill_on_drop reaps the child when the collector's timeout drops us
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ProbeError::unavailable(&self.name, UnavailableReason::from_io(&self.program, &e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            if self.partial_output {
                if let Ok(samples) = (self.parser)(&self.name, &stdout) {
                    if !samples.is_empty() {
                        warn!(
                            probe = %self.name,
                            code = ?output.status.code(),
                            samples = samples.len(),
                            "Probe command failed, keeping partial output"
                        );
                        return Ok(samples);
                    }
                }
            }

            let stderr = String::from_utf8_lossy(&output.stderr)
                .lines()
                .next()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty());
            return Err(ProbeError::unavailable(
                &self.name,
                UnavailableReason::ExitStatus {
                    code: output.status.code(),
                    stderr,
                },
            ));
        }

        (self.parser)(&self.name, &stdout)
    }
}
