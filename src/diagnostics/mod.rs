//! Host diagnostics: probe collection and rule-based health evaluation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rigcheck::diagnostics::{Collector, Evaluator, RuleSet};
//! use rigcheck::diagnostics::probes::{self, ProbeSettings};
//!
//! let settings = ProbeSettings::default();
//! let mut collector = Collector::new();
//! for name in ["gpu", "memory", "disk"] {
//!     collector.register_arc(probes::builtin(name, &settings).unwrap())?;
//! }
//!
//! let collection = collector.collect().await;
//! let diagnosis = Evaluator::new(RuleSet::builtin()).evaluate_collection(&collection);
//! print!("{}", diagnosis.render_text());
//! ```

pub mod collector;
pub mod evaluator;
pub mod probe;
pub mod probes;
pub mod recommender;
pub mod report;
pub mod rules;
pub mod types;

pub use collector::{Collection, Collector, CollectorError, ProbeOutcome, ProbeSlot};
pub use evaluator::{evaluate, Evaluator};
pub use probe::{FnProbe, Probe, ProbeError, UnavailableReason};
pub use report::{Diagnosis, Finding, Status, VisibilityNote};
pub use rules::{Baselines, Comparator, Limit, RuleLoadError, RuleSet, Severity, ThresholdRule};
pub use types::{Sample, SampleValue};
