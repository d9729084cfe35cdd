//! Prometheus exposition of a diagnostic run.
//!
//! Each run builds a fresh registry, so the output reflects exactly one
//! collection and its diagnosis (suitable for node-exporter's textfile
//! collector or a push gateway).

use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};

use crate::diagnostics::{Collection, Diagnosis, Severity};

pub struct Metrics {
    registry: Registry,

    /// Overall status level: 0 healthy, 1 notice, 2 warning, 3 critical
    pub status: Gauge,

    /// Triggered rules by severity
    pub findings: GaugeVec,

    /// Numeric sample readings
    pub sample_value: GaugeVec,

    /// 1 when the probe produced samples, 0 when it failed or was cancelled
    pub probe_up: GaugeVec,

    pub collection_duration_seconds: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let status = Gauge::with_opts(Opts::new(
            "rigcheck_status",
            "Overall diagnosis status (0=healthy, 1=notice, 2=warning, 3=critical)",
        ))?;
        registry.register(Box::new(status.clone()))?;

        let findings = GaugeVec::new(
            Opts::new("rigcheck_findings", "Triggered rules by severity"),
            &["severity"],
        )?;
        registry.register(Box::new(findings.clone()))?;

        let sample_value = GaugeVec::new(
            Opts::new("rigcheck_sample_value", "Numeric sample readings"),
            &["name", "source", "detail"],
        )?;
        registry.register(Box::new(sample_value.clone()))?;

        let probe_up = GaugeVec::new(
            Opts::new("rigcheck_probe_up", "Whether the probe produced samples"),
            &["probe"],
        )?;
        registry.register(Box::new(probe_up.clone()))?;

        let collection_duration_seconds = Gauge::with_opts(Opts::new(
            "rigcheck_collection_duration_seconds",
            "Wall time of the collection pass",
        ))?;
        registry.register(Box::new(collection_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            status,
            findings,
            sample_value,
            probe_up,
            collection_duration_seconds,
        })
    }

    /// Record one collection and its diagnosis.
    pub fn record_run(&self, collection: &Collection, diagnosis: &Diagnosis) {
        self.status.set(f64::from(diagnosis.status.level()));

        for severity in [Severity::Notice, Severity::Warning, Severity::Critical] {
            let count = diagnosis
                .findings
                .iter()
                .filter(|f| f.severity == severity)
                .count();
            self.findings
                .with_label_values(&[&severity.to_string()])
                .set(count as f64);
        }

        for sample in &collection.samples {
            let Some(value) = sample.value().as_f64() else {
                continue;
            };
            let detail = sample
                .extra()
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(",");
            self.sample_value
                .with_label_values(&[sample.name(), sample.source(), &detail])
                .set(value);
        }

        for slot in &collection.slots {
            self.probe_up
                .with_label_values(&[&slot.probe])
                .set(if slot.is_collected() { 1.0 } else { 0.0 });
        }

        self.collection_duration_seconds
            .set(collection.collection_time_ms as f64 / 1000.0);
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Render a run as Prometheus text.
pub fn render(collection: &Collection, diagnosis: &Diagnosis) -> Result<String, prometheus::Error> {
    let metrics = Metrics::new()?;
    metrics.record_run(collection, diagnosis);
    metrics.export()
}
