//! Observability: Prometheus export of diagnostic runs.
//!
//! ```rust,ignore
//! use rigcheck::observability::metrics;
//!
//! let text = metrics::render(&collection, &diagnosis)?;
//! std::fs::write("/var/lib/node_exporter/rigcheck.prom", text)?;
//! ```

pub mod metrics;

pub use metrics::Metrics;
