use chrono::{DateTime, Utc};
use futures_util::stream::{FuturesOrdered, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::probe::{Probe, ProbeError, UnavailableReason};
use super::types::Sample;

/// Default per-probe bound.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectorError {
    #[error("probe '{0}' is already registered")]
    DuplicateProbe(String),
}

/// Outcome of one probe within a collection pass.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Collected { samples: usize, elapsed_ms: u64 },
    Failed { error: ProbeError },
    /// Collection was cancelled before this probe finished.
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeSlot {
    pub probe: String,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

impl ProbeSlot {
    pub fn is_collected(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Collected { .. })
    }
}

/// Result of one collection pass.
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub collection_time_ms: u64,
    /// Samples in probe registration order.
    pub samples: Vec<Sample>,
    /// One slot per registered probe, in registration order.
    pub slots: Vec<ProbeSlot>,
    pub cancelled: bool,
}

impl Collection {
    /// Slots whose probe did not contribute samples.
    pub fn degraded(&self) -> impl Iterator<Item = &ProbeSlot> {
        self.slots.iter().filter(|s| !s.is_collected())
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(ProbeSlot::is_collected)
    }
}

/// Runs registered probes once each and gathers their samples.
///
/// Probe failures never abort the pass: the failure lands in that probe's
/// slot and the remaining probes still run.
pub struct Collector {
    probes: Vec<Arc<dyn Probe>>,
    timeout: Duration,
    parallel: bool,
}

impl Collector {
    pub fn new() -> Self {
        Self {
            probes: Vec::new(),
            timeout: DEFAULT_PROBE_TIMEOUT,
            parallel: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run probes concurrently. Output order is unchanged.
    ///
    /// On cancellation only the finished prefix (in registration order) keeps
    /// its samples; later probes are reported as cancelled even if done.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn register<P: Probe + 'static>(&mut self, probe: P) -> Result<(), CollectorError> {
        self.register_arc(Arc::new(probe))
    }

    pub fn register_arc(&mut self, probe: Arc<dyn Probe>) -> Result<(), CollectorError> {
        if self.probes.iter().any(|p| p.name() == probe.name()) {
            return Err(CollectorError::DuplicateProbe(probe.name().to_string()));
        }
        self.probes.push(probe);
        Ok(())
    }

    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    /// Run every probe once.
    pub async fn collect(&self) -> Collection {
        self.collect_until(std::future::pending::<()>()).await
    }

    /// Run every probe once, stopping early when `cancel` resolves.
    ///
    /// Probes that finished before cancellation keep their samples; the rest
    /// are marked [`ProbeOutcome::Cancelled`].
    pub async fn collect_until<C>(&self, cancel: C) -> Collection
    where
        C: Future<Output = ()>,
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();

        tokio::pin!(cancel);

        let mut slots = Vec::with_capacity(self.probes.len());
        let mut samples = Vec::new();
        let mut cancelled = false;

        if self.parallel {
            let mut pending: FuturesOrdered<_> = self
                .probes
                .iter()
                .map(|probe| self.run_probe(probe.as_ref()))
                .collect();

            loop {
                tokio::select! {
                    biased;
                    _ = &mut cancel => {
                        cancelled = true;
                        break;
                    }
                    next = pending.next() => match next {
                        Some((slot, collected)) => {
                            slots.push(slot);
                            samples.extend(collected);
                        }
                        None => break,
                    }
                }
            }
        } else {
            for probe in &self.probes {
                tokio::select! {
                    biased;
                    _ = &mut cancel => {
                        cancelled = true;
                        break;
                    }
                    (slot, collected) = self.run_probe(probe.as_ref()) => {
                        slots.push(slot);
                        samples.extend(collected);
                    }
                }
            }
        }

        for probe in &self.probes[slots.len()..] {
            slots.push(ProbeSlot {
                probe: probe.name().to_string(),
                outcome: ProbeOutcome::Cancelled,
            });
        }

        let collection_time_ms = start.elapsed().as_millis() as u64;

        if cancelled {
            warn!(
                run_id = %run_id,
                collected = samples.len(),
                "Collection cancelled, keeping partial samples"
            );
        } else {
            info!(
                run_id = %run_id,
                samples = samples.len(),
                probes = slots.len(),
                elapsed_ms = collection_time_ms,
                "Collection finished"
            );
        }

        Collection {
            run_id,
            started_at,
            collection_time_ms,
            samples,
            slots,
            cancelled,
        }
    }

    async fn run_probe(&self, probe: &dyn Probe) -> (ProbeSlot, Vec<Sample>) {
        let name = probe.name().to_string();
        let start = Instant::now();

        let result = tokio::time::timeout(self.timeout, probe.sample()).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let (outcome, samples) = match result {
            Ok(Ok(samples)) => {
                debug!(probe = %name, samples = samples.len(), elapsed_ms, "Probe collected");
                (
                    ProbeOutcome::Collected {
                        samples: samples.len(),
                        elapsed_ms,
                    },
                    samples,
                )
            }
            Ok(Err(error)) => {
                warn!(probe = %name, error = %error, "Probe failed");
                (ProbeOutcome::Failed { error }, Vec::new())
            }
            Err(_) => {
                let error =
                    ProbeError::unavailable(&name, UnavailableReason::timeout(self.timeout));
                warn!(probe = %name, error = %error, "Probe timed out");
                (ProbeOutcome::Failed { error }, Vec::new())
            }
        };

        (ProbeSlot { probe: name, outcome }, samples)
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}
