//! Declarative threshold rules.
//!
//! A rule maps a sample name to a comparison against a limit, a severity and
//! two message templates. Rule tables are plain data: they load from JSON or
//! come from [`RuleSet::builtin`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use super::types::SampleValue;

/// Severity of a triggered rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Notice,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notice => write!(f, "notice"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    /// Triggers when no sample with the rule's name was collected.
    #[serde(rename = "missing")]
    Missing,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Missing => "missing",
        };
        f.write_str(s)
    }
}

impl Comparator {
    /// Compare a sample value against a resolved limit.
    ///
    /// Text supports only equality; any other combination does not trigger.
    pub fn matches(&self, value: &SampleValue, limit: &SampleValue) -> bool {
        match (value, limit) {
            (SampleValue::Number(v), SampleValue::Number(l)) => match v.partial_cmp(l) {
                Some(ord) => self.accepts(ord),
                None => false,
            },
            (SampleValue::Text(v), SampleValue::Text(l)) => match self {
                Self::Eq => v == l,
                Self::Ne => v != l,
                _ => false,
            },
            _ => false,
        }
    }

    fn accepts(&self, ord: Ordering) -> bool {
        match self {
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
            Self::Missing => false,
        }
    }
}

/// Caller-supplied reference values for drift checks ("now", expected
/// driver age, ...).
pub type Baselines = HashMap<String, f64>;

/// Rule limit: a constant, or a key into [`Baselines`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Limit {
    Number(f64),
    Baseline { baseline: String },
    Text(String),
}

impl Limit {
    pub fn baseline(key: impl Into<String>) -> Self {
        Self::Baseline {
            baseline: key.into(),
        }
    }

    /// Resolve to a concrete value. `None` when the baseline is unknown.
    pub fn resolve(&self, baselines: &Baselines) -> Option<SampleValue> {
        match self {
            Self::Number(n) => Some(SampleValue::Number(*n)),
            Self::Text(s) => Some(SampleValue::Text(s.clone())),
            Self::Baseline { baseline } => baselines.get(baseline).map(|v| SampleValue::Number(*v)),
        }
    }
}

impl From<f64> for Limit {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Limit {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    /// Sample name the rule targets.
    pub name: String,
    pub cmp: Comparator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Limit>,
    pub severity: Severity,
    /// Issue template. Placeholders: `{name}`, `{value}`, `{limit}`,
    /// `{unit}`, `{source}` and any key of the sample's extra fields.
    pub issue: String,
    #[serde(default)]
    pub recommendation: String,
}

impl ThresholdRule {
    pub fn new(
        name: impl Into<String>,
        cmp: Comparator,
        limit: impl Into<Limit>,
        severity: Severity,
        issue: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cmp,
            limit: Some(limit.into()),
            severity,
            issue: issue.into(),
            recommendation: String::new(),
        }
    }

    /// Rule that fires when the named sample was never collected.
    pub fn missing(name: impl Into<String>, severity: Severity, issue: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmp: Comparator::Missing,
            limit: None,
            severity,
            issue: issue.into(),
            recommendation: String::new(),
        }
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }
}

#[derive(Debug, Error)]
pub enum RuleLoadError {
    #[error("failed to read rules from '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rule table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered rule table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<ThresholdRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ThresholdRule>) -> Self {
        Self { rules }
    }

    pub fn from_json_str(json: &str) -> Result<Self, RuleLoadError> {
        let set: RuleSet = serde_json::from_str(json)?;
        set.warn_inert_rules();
        Ok(set)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleLoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RuleLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn push(&mut self, rule: ThresholdRule) {
        self.rules.push(rule);
    }

    // Such rules never trigger; flag them once at load time.
    fn warn_inert_rules(&self) {
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.cmp != Comparator::Missing && rule.limit.is_none() {
                warn!(index, rule = %rule.name, "Rule has no limit and will never trigger");
            }
        }
    }

    /// Default host health table.
    pub fn builtin() -> Self {
        use Comparator::*;
        use Severity::*;

        Self::new(vec![
            ThresholdRule::new(
                "gpu.temperature",
                Gt,
                85.0,
                Warning,
                "GPU {index} ({model}) running hot: {value}{unit} (limit {limit}{unit})",
            )
            .with_recommendation("Check case airflow and clean the GPU heatsink and fans"),
            ThresholdRule::new(
                "gpu.memUsedPct",
                Gt,
                90.0,
                Warning,
                "GPU {index} memory nearly exhausted: {value}{unit} used",
            )
            .with_recommendation("Close GPU-heavy applications or reduce model/batch size"),
            ThresholdRule::new(
                "gpu.powerPct",
                Ge,
                98.0,
                Notice,
                "GPU {index} is drawing {value}{unit} of its power limit",
            )
            .with_recommendation("Sustained power-limit throttling; verify PSU headroom and power settings"),
            ThresholdRule::new(
                "gpu.fanPct",
                Ge,
                90.0,
                Notice,
                "GPU {index} fan at {value}{unit}",
            )
            .with_recommendation("Fans near maximum; check for dust build-up or a failing fan"),
            ThresholdRule::new(
                "mem.usedPct",
                Gt,
                90.0,
                Warning,
                "System memory usage high: {value}{unit}",
            )
            .with_recommendation("Close unused applications or add more RAM"),
            ThresholdRule::new(
                "mem.availableBytes",
                Lt,
                268_435_456.0,
                Critical,
                "Less than 256 MiB of memory available ({value} bytes)",
            )
            .with_recommendation("Free memory immediately; the OOM killer may terminate processes"),
            ThresholdRule::new(
                "swap.usedPct",
                Gt,
                50.0,
                Notice,
                "Swap usage at {value}{unit}",
            )
            .with_recommendation("Heavy swapping slows the system; consider adding RAM"),
            ThresholdRule::new(
                "disk.usedPct",
                Ge,
                90.0,
                Warning,
                "Filesystem {mount} is {value}{unit} full",
            )
            .with_recommendation("Prune container images, old kernels, logs and caches on {mount}"),
            ThresholdRule::new(
                "cpu.loadPerCore",
                Gt,
                2.0,
                Warning,
                "CPU load is {value} per core",
            )
            .with_recommendation("Identify runaway processes with top or htop"),
        ])
    }
}
