use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value carried by a [`Sample`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Number(f64),
    Text(String),
}

impl SampleValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SampleValue::Number(n) => Some(*n),
            SampleValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SampleValue::Number(_) => None,
            SampleValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole numbers print without a trailing ".0"
            SampleValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            SampleValue::Number(n) => write!(f, "{:.1}", n),
            SampleValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for SampleValue {
    fn from(n: f64) -> Self {
        SampleValue::Number(n)
    }
}

impl From<u64> for SampleValue {
    fn from(n: u64) -> Self {
        SampleValue::Number(n as f64)
    }
}

impl From<i64> for SampleValue {
    fn from(n: i64) -> Self {
        SampleValue::Number(n as f64)
    }
}

impl From<&str> for SampleValue {
    fn from(s: &str) -> Self {
        SampleValue::Text(s.to_string())
    }
}

impl From<String> for SampleValue {
    fn from(s: String) -> Self {
        SampleValue::Text(s)
    }
}

/// One named, timestamped metric reading.
///
/// Built with [`Sample::new`] plus the consuming `with_*` methods; once a
/// probe hands it to the collector it is only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    name: String,
    value: SampleValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    timestamp: DateTime<Utc>,
    source: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    extra: BTreeMap<String, String>,
}

impl Sample {
    /// Capture a reading now.
    pub fn new(
        source: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<SampleValue>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: None,
            timestamp: Utc::now(),
            source: source.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach a probe-specific field (GPU index, mount point, ...).
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &SampleValue {
        &self.value
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }
}
