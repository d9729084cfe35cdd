//! rigcheck - host diagnostics for GPU workstations and render nodes.
//!
//! Probes read GPU, memory, disk and load figures from the host. The
//! collector turns them into a flat list of samples, and an ordered table of
//! threshold rules turns those into a diagnosis with a status, issues and
//! recommendations.
//!
//! # Architecture
//!
//! - [`diagnostics::Collector`] runs registered [`diagnostics::Probe`]s with a
//!   per-probe timeout, sequentially or in parallel
//! - [`diagnostics::Evaluator`] applies a [`diagnostics::RuleSet`] to samples
//! - [`observability::metrics`] renders a run as Prometheus text
//! - [`config::Config`] loads everything above from the environment
//!
//! # Example
//!
//! ```rust,ignore
//! use rigcheck::diagnostics::{Collector, Evaluator, RuleSet};
//! use rigcheck::diagnostics::probes::{self, ProbeSettings};
//!
//! let mut collector = Collector::new();
//! collector.register_arc(probes::builtin("memory", &ProbeSettings::default()).unwrap())?;
//!
//! let collection = collector.collect().await;
//! let diagnosis = Evaluator::new(RuleSet::builtin()).evaluate_collection(&collection);
//! std::process::exit(diagnosis.status.exit_code());
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars), empty outside a git checkout
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod diagnostics;
pub mod logging;
pub mod observability;

// Re-exports for convenience
pub use config::Config;
pub use diagnostics::{Collector, Diagnosis, Evaluator, RuleSet, Sample, Status};
