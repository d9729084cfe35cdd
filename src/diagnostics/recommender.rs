//! Message template rendering for issues and recommendations.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::types::{Sample, SampleValue};

/// Placeholder pattern: `{name}`, `{value}`, `{mount}`, ...
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_.]+)\}").expect("Invalid regex"))
}

/// Values a template can reference.
pub struct TemplateContext<'a> {
    pub rule_name: &'a str,
    pub sample: Option<&'a Sample>,
    pub limit: Option<&'a SampleValue>,
}

impl TemplateContext<'_> {
    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.rule_name.to_string()),
            "limit" => self.limit.map(ToString::to_string),
            "value" => self.sample.map(|s| s.value().to_string()),
            "unit" => self.sample.map(|s| s.unit().unwrap_or_default().to_string()),
            "source" => self.sample.map(|s| s.source().to_string()),
            other => self.sample.and_then(|s| s.extra().get(other).cloned()),
        }
    }
}

/// Substitute placeholders. Unknown placeholders are left as written.
pub fn render(template: &str, ctx: &TemplateContext<'_>) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures<'_>| {
            ctx.lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
