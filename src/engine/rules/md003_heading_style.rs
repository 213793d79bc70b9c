use super::{Rule, expected_actual};
use crate::engine::{LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD003Config {
    /// consistent, atx, atx_closed, setext, setext_with_atx, setext_with_atx_closed
    pub style: String,
}

impl Default for MD003Config {
    fn default() -> Self {
        Self {
            style: "consistent".to_string(),
        }
    }
}

/// Rule MD003: Heading style
#[derive(Debug, Clone)]
pub struct MD003HeadingStyle {
    config: MD003Config,
}

impl MD003HeadingStyle {
    pub fn new(config: MD003Config) -> Self {
        Self { config }
    }

    fn expected(&self, style: &str, level: u8) -> &'static str {
        match style {
            "setext_with_atx" if level > 2 => "atx",
            "setext_with_atx_closed" if level > 2 => "atx_closed",
            "setext_with_atx" | "setext_with_atx_closed" | "setext" => "setext",
            "atx_closed" => "atx_closed",
            _ => "atx",
        }
    }
}

impl Rule for MD003HeadingStyle {
    fn name(&self) -> &'static str {
        "MD003"
    }

    fn alias(&self) -> &'static str {
        "heading-style"
    }

    fn description(&self) -> &'static str {
        "Heading style"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();
        let mut style = self.config.style.clone();

        for (idx, heading) in ctx.headings() {
            let actual = heading.style.as_str();
            if style == "consistent" {
                style = actual.to_string();
                continue;
            }
            let expected = self.expected(&style, heading.level);
            if actual != expected {
                warnings.push(self.diagnostic(idx + 1).detail(expected_actual(expected, actual)));
            }
        }

        warnings
    }
}
