use super::{Rule, expected_actual};
use crate::engine::{LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD046Config {
    /// consistent, fenced, indented
    pub style: String,
}

impl Default for MD046Config {
    fn default() -> Self {
        Self {
            style: "consistent".to_string(),
        }
    }
}

/// Rule MD046: Code block style
#[derive(Debug, Clone)]
pub struct MD046CodeBlockStyle {
    config: MD046Config,
}

impl MD046CodeBlockStyle {
    pub fn new(config: MD046Config) -> Self {
        Self { config }
    }
}

impl Rule for MD046CodeBlockStyle {
    fn name(&self) -> &'static str {
        "MD046"
    }

    fn alias(&self) -> &'static str {
        "code-block-style"
    }

    fn description(&self) -> &'static str {
        "Code block style"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut expected: Option<&str> = match self.config.style.as_str() {
            "fenced" => Some("fenced"),
            "indented" => Some("indented"),
            _ => None,
        };

        ctx.code_blocks
            .iter()
            .filter_map(|block| {
                let actual = if block.fenced { "fenced" } else { "indented" };
                let wanted = *expected.get_or_insert(actual);
                (wanted != actual).then(|| self.diagnostic(block.start_line + 1).detail(expected_actual(wanted, actual)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{lines, run};
    use serde_json::json;

    const MIXED: &str = "```\nfenced\n```\n\nText\n\n    indented\n";

    #[test]
    fn test_consistent() {
        let warnings = run("MD046", json!({}), MIXED);
        assert_eq!(lines(&warnings), vec![7]);
        assert_eq!(warnings[0].error_detail.as_deref(), Some("Expected: fenced; Actual: indented"));
    }

    #[test]
    fn test_indented_style() {
        assert_eq!(lines(&run("MD046", json!({"style": "indented"}), MIXED)), vec![1]);
    }
}
