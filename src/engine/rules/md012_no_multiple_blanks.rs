use super::{Rule, expected_actual};
use crate::engine::{FixInfo, LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

/// Configuration for MD012 (No multiple consecutive blank lines)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD012Config {
    /// Maximum number of consecutive blank lines allowed (default: 1)
    pub maximum: usize,
}

impl Default for MD012Config {
    fn default() -> Self {
        Self { maximum: 1 }
    }
}

/// Rule MD012: Multiple consecutive blank lines
///
/// Each blank line beyond `maximum` is reported and deleted by the fix.
/// Blank lines inside code blocks and front matter are not counted.
#[derive(Debug, Clone)]
pub struct MD012NoMultipleBlanks {
    config: MD012Config,
}

impl MD012NoMultipleBlanks {
    pub fn new(config: MD012Config) -> Self {
        Self { config }
    }
}

impl Rule for MD012NoMultipleBlanks {
    fn name(&self) -> &'static str {
        "MD012"
    }

    fn alias(&self) -> &'static str {
        "no-multiple-blanks"
    }

    fn description(&self) -> &'static str {
        "Multiple consecutive blank lines"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();
        let mut count = 0;

        for (idx, info) in ctx.lines.iter().enumerate() {
            if !info.is_blank || info.is_structural() {
                count = 0;
                continue;
            }
            count += 1;
            if count > self.config.maximum {
                warnings.push(
                    self.diagnostic(idx + 1)
                        .detail(expected_actual(self.config.maximum, count))
                        .fix(FixInfo::delete_line()),
                );
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{fix, lines, run};
    use serde_json::json;

    #[test]
    fn test_excess_blank_lines() {
        let content = "a\n\n\n\nb\n";
        let warnings = run("MD012", json!({}), content);
        assert_eq!(lines(&warnings), vec![3, 4]);
        assert_eq!(warnings[1].error_detail.as_deref(), Some("Expected: 1; Actual: 3"));
        assert_eq!(fix("MD012", json!({}), content), "a\n\nb\n");
    }

    #[test]
    fn test_maximum() {
        assert!(run("MD012", json!({"maximum": 2}), "a\n\n\nb\n").is_empty());
    }

    #[test]
    fn test_code_block_blank_lines_ignored() {
        assert!(run("MD012", json!({}), "```\na\n\n\n\nb\n```\n").is_empty());
    }

    #[test]
    fn test_trailing_blank_lines() {
        assert_eq!(fix("MD012", json!({}), "a\n\n\n"), "a\n\n");
    }
}
