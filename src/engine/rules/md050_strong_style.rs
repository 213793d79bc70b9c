use super::Rule;
use super::md049_emphasis_style::check_markers;
use crate::engine::{LintContext, RawDiagnostic};
use pulldown_cmark::{Event, Tag};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD050Config {
    /// consistent, asterisk, underscore
    pub style: String,
}

impl Default for MD050Config {
    fn default() -> Self {
        Self {
            style: "consistent".to_string(),
        }
    }
}

/// Rule MD050: Strong style
#[derive(Debug, Clone)]
pub struct MD050StrongStyle {
    config: MD050Config,
}

impl MD050StrongStyle {
    pub fn new(config: MD050Config) -> Self {
        Self { config }
    }
}

impl Rule for MD050StrongStyle {
    fn name(&self) -> &'static str {
        "MD050"
    }

    fn alias(&self) -> &'static str {
        "strong-style"
    }

    fn description(&self) -> &'static str {
        "Strong style"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        if !ctx.content.contains("**") && !ctx.content.contains("__") {
            return Vec::new();
        }
        check_markers(self, ctx, &self.config.style, 2, |event| matches!(event, Event::Start(Tag::Strong)))
    }
}
