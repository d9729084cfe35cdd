use serde::{Serialize, Serializer};
use std::fmt::{self, Write};

use super::rules::Severity;
use super::types::SampleValue;

/// Overall health, ordered `Healthy < Notice < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Healthy,
    Notice,
    Warning,
    Critical,
}

impl From<Severity> for Status {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Notice => Status::Notice,
            Severity::Warning => Status::Warning,
            Severity::Critical => Status::Critical,
        }
    }
}

impl Status {
    /// Process exit code for the CLI: 0 healthy/notice, 1 warning, 2 critical.
    pub fn exit_code(&self) -> i32 {
        match self {
            Status::Healthy | Status::Notice => 0,
            Status::Warning => 1,
            Status::Critical => 2,
        }
    }

    /// Numeric level used for gauges.
    pub fn level(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Healthy => write!(f, "healthy"),
            Status::Notice => write!(f, "notice"),
            Status::Warning => write!(f, "warning"),
            Status::Critical => write!(f, "critical"),
        }
    }
}

/// A triggered rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub rule: String,
    pub severity: Severity,
    pub issue: String,
    pub recommendation: String,
    /// Triggering value; absent for `missing` rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<SampleValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Informational note about reduced visibility (failed or cancelled probe).
/// Never affects [`Status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityNote {
    pub probe: String,
    pub message: String,
}

/// Result of evaluating rules against samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnosis {
    pub status: Status,
    /// Triggered rules in evaluation order.
    pub findings: Vec<Finding>,
    pub notes: Vec<VisibilityNote>,
}

impl Diagnosis {
    pub fn issues(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().map(|f| f.issue.as_str())
    }

    /// One per issue, same order; may repeat.
    pub fn recommendations(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().map(|f| f.recommendation.as_str())
    }

    pub fn is_healthy(&self) -> bool {
        self.status == Status::Healthy
    }

    /// Human-readable report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Status: {}", self.status.to_string().to_uppercase());

        if self.findings.is_empty() {
            let _ = writeln!(out, "No issues found.");
        } else {
            let _ = writeln!(out, "Issues:");
            for (i, finding) in self.findings.iter().enumerate() {
                let _ = writeln!(out, "  {}. [{}] {}", i + 1, finding.severity, finding.issue);
                if !finding.recommendation.is_empty() {
                    let _ = writeln!(out, "     -> {}", finding.recommendation);
                }
            }
        }

        if !self.notes.is_empty() {
            let _ = writeln!(out, "Notes (reduced visibility):");
            for note in &self.notes {
                let _ = writeln!(out, "  - {}: {}", note.probe, note.message);
            }
        }

        out
    }
}

impl Serialize for Diagnosis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct View<'a> {
            status: Status,
            issues: Vec<&'a str>,
            recommendations: Vec<&'a str>,
            findings: &'a [Finding],
            notes: &'a [VisibilityNote],
        }

        View {
            status: self.status,
            issues: self.issues().collect(),
            recommendations: self.recommendations().collect(),
            findings: &self.findings,
            notes: &self.notes,
        }
        .serialize(serializer)
    }
}
