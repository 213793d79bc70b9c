use super::{Rule, expected_actual};
use crate::engine::{LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD048Config {
    /// consistent, backtick, tilde
    pub style: String,
}

impl Default for MD048Config {
    fn default() -> Self {
        Self {
            style: "consistent".to_string(),
        }
    }
}

/// Rule MD048: Code fence style
#[derive(Debug, Clone)]
pub struct MD048CodeFenceStyle {
    config: MD048Config,
}

impl MD048CodeFenceStyle {
    pub fn new(config: MD048Config) -> Self {
        Self { config }
    }
}

fn style_name(fence_char: char) -> &'static str {
    if fence_char == '~' { "tilde" } else { "backtick" }
}

impl Rule for MD048CodeFenceStyle {
    fn name(&self) -> &'static str {
        "MD048"
    }

    fn alias(&self) -> &'static str {
        "code-fence-style"
    }

    fn description(&self) -> &'static str {
        "Code fence style"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut expected: Option<&str> = match self.config.style.as_str() {
            "backtick" => Some("backtick"),
            "tilde" => Some("tilde"),
            _ => None,
        };

        let mut warnings = Vec::new();
        for block in &ctx.code_blocks {
            let Some(fence_char) = block.fence_char else {
                continue;
            };
            let actual = style_name(fence_char);
            let wanted = *expected.get_or_insert(actual);
            if wanted != actual {
                warnings.push(self.diagnostic(block.start_line + 1).detail(expected_actual(wanted, actual)));
            }
        }
        warnings
    }
}
