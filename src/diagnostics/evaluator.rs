use tracing::debug;

use super::collector::{Collection, ProbeOutcome};
use super::recommender::{render, TemplateContext};
use super::report::{Diagnosis, Finding, Status, VisibilityNote};
use super::rules::{Baselines, Comparator, RuleSet, ThresholdRule};
use super::types::Sample;

/// Applies an ordered rule table to samples.
///
/// Evaluation is a single stateless pass and never fails: rules whose sample
/// is absent, whose baseline is unknown, or whose limit does not fit the
/// sample's value type simply do not trigger.
pub struct Evaluator {
    rules: RuleSet,
    baselines: Baselines,
}

impl Evaluator {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            baselines: Baselines::new(),
        }
    }

    pub fn with_baselines(mut self, baselines: Baselines) -> Self {
        self.baselines = baselines;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn evaluate(&self, samples: &[Sample]) -> Diagnosis {
        evaluate(samples, &self.rules, &self.baselines)
    }

    /// Evaluate a collection pass, adding a visibility note per failed or
    /// cancelled probe.
    pub fn evaluate_collection(&self, collection: &Collection) -> Diagnosis {
        let mut diagnosis = self.evaluate(&collection.samples);

        diagnosis.notes = collection
            .slots
            .iter()
            .filter_map(|slot| {
                let message = match &slot.outcome {
                    ProbeOutcome::Collected { .. } => return None,
                    ProbeOutcome::Failed { error } => error.to_string(),
                    ProbeOutcome::Cancelled => "cancelled before the probe finished".to_string(),
                };
                Some(VisibilityNote {
                    probe: slot.probe.clone(),
                    message,
                })
            })
            .collect();

        diagnosis
    }
}

/// Evaluate `rules` in order against `samples`.
pub fn evaluate(samples: &[Sample], rules: &RuleSet, baselines: &Baselines) -> Diagnosis {
    let mut findings = Vec::new();

    for rule in rules.rules() {
        evaluate_rule(rule, samples, baselines, &mut findings);
    }

    let status = findings
        .iter()
        .map(|f| Status::from(f.severity))
        .max()
        .unwrap_or_default();

    Diagnosis {
        status,
        findings,
        notes: Vec::new(),
    }
}

fn evaluate_rule(
    rule: &ThresholdRule,
    samples: &[Sample],
    baselines: &Baselines,
    findings: &mut Vec<Finding>,
) {
    let mut matching = samples.iter().filter(|s| s.name() == rule.name).peekable();

    if rule.cmp == Comparator::Missing {
        if matching.peek().is_none() {
            let ctx = TemplateContext {
                rule_name: &rule.name,
                sample: None,
                limit: None,
            };
            findings.push(Finding {
                rule: rule.name.clone(),
                severity: rule.severity,
                issue: render(&rule.issue, &ctx),
                recommendation: render(&rule.recommendation, &ctx),
                value: None,
                source: None,
            });
        }
        return;
    }

    if matching.peek().is_none() {
        debug!(rule = %rule.name, "Rule skipped, no matching sample");
        return;
    }

    let Some(limit) = rule.limit.as_ref().and_then(|l| l.resolve(baselines)) else {
        debug!(rule = %rule.name, "Rule skipped, limit unresolved");
        return;
    };

    for sample in matching {
        if !rule.cmp.matches(sample.value(), &limit) {
            continue;
        }

        let ctx = TemplateContext {
            rule_name: &rule.name,
            sample: Some(sample),
            limit: Some(&limit),
        };
        findings.push(Finding {
            rule: rule.name.clone(),
            severity: rule.severity,
            issue: render(&rule.issue, &ctx),
            recommendation: render(&rule.recommendation, &ctx),
            value: Some(sample.value().clone()),
            source: Some(sample.source().to_string()),
        });
    }
}
