use super::{Rule, char_len};
use crate::engine::{FixInfo, LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD009Config {
    /// Trailing spaces allowed as a hard line break (0 or 1 disables the exception)
    pub br_spaces: usize,
    /// Allow spaces on empty lines inside list items
    pub list_item_empty_lines: bool,
    /// Flag hard breaks too, even when they match `br_spaces`
    pub strict: bool,
}

impl Default for MD009Config {
    fn default() -> Self {
        Self {
            br_spaces: 2,
            list_item_empty_lines: false,
            strict: false,
        }
    }
}

/// Rule MD009: Trailing spaces
#[derive(Debug, Clone)]
pub struct MD009NoTrailingSpaces {
    config: MD009Config,
}

impl MD009NoTrailingSpaces {
    pub fn new(config: MD009Config) -> Self {
        Self { config }
    }

    fn expected(&self) -> usize {
        if self.config.br_spaces < 2 { 0 } else { self.config.br_spaces }
    }
}

impl Rule for MD009NoTrailingSpaces {
    fn name(&self) -> &'static str {
        "MD009"
    }

    fn alias(&self) -> &'static str {
        "no-trailing-spaces"
    }

    fn description(&self) -> &'static str {
        "Trailing spaces"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let expected = self.expected();
        let list_lines: Vec<bool> = if self.config.list_item_empty_lines {
            let mut inside = vec![false; ctx.line_count()];
            for block in ctx.list_blocks() {
                inside[block.start_line..=block.end_line].fill(true);
            }
            inside
        } else {
            Vec::new()
        };

        let mut warnings = Vec::new();
        for (idx, info) in ctx.lines.iter().enumerate() {
            if info.in_front_matter || (info.in_code_block && !info.is_fence) {
                continue;
            }
            let line = info.content(ctx.content);
            let trimmed = line.trim_end_matches([' ', '\t']);
            let trailing = char_len(line) - char_len(trimmed);
            if trailing == 0 {
                continue;
            }
            if info.is_blank && list_lines.get(idx).copied().unwrap_or(false) {
                continue;
            }
            let is_break = !info.is_blank && trailing == expected && line[trimmed.len()..].chars().all(|c| c == ' ');
            if is_break && !self.config.strict {
                continue;
            }

            let column = char_len(trimmed) + 1;
            let detail = if expected == 0 {
                format!("Expected: 0; Actual: {trailing}")
            } else {
                format!("Expected: 0 or {expected}; Actual: {trailing}")
            };
            warnings.push(
                self.diagnostic(idx + 1)
                    .detail(detail)
                    .range(column, trailing)
                    .fix(FixInfo::delete(column, trailing)),
            );
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{fix, lines, run};
    use serde_json::json;

    #[test]
    fn test_trailing_spaces_flagged() {
        let content = "one \ntwo  \nthree   \n";
        let warnings = run("MD009", json!({}), content);
        assert_eq!(lines(&warnings), vec![1, 3]);
        assert_eq!(warnings[0].error_detail.as_deref(), Some("Expected: 0 or 2; Actual: 1"));
        assert_eq!(fix("MD009", json!({}), content), "one\ntwo  \nthree\n");
    }

    #[test]
    fn test_br_spaces_configured() {
        let content = "a   \nb\n";
        assert!(run("MD009", json!({"br_spaces": 3}), content).is_empty());
        assert_eq!(lines(&run("MD009", json!({"br_spaces": 0}), "a  \nb\n")), vec![1]);
    }

    #[test]
    fn test_strict_flags_breaks() {
        assert_eq!(lines(&run("MD009", json!({"strict": true}), "a  \nb\n")), vec![1]);
    }

    #[test]
    fn test_code_blocks_skipped() {
        assert!(run("MD009", json!({}), "```\ncode   \n```\n").is_empty());
    }

    #[test]
    fn test_whitespace_only_line() {
        assert_eq!(fix("MD009", json!({}), "a\n  \nb\n"), "a\n\nb\n");
    }

    #[test]
    fn test_list_item_empty_lines() {
        let content = "- a\n  \n  b\n";
        assert!(run("MD009", json!({"list_item_empty_lines": true}), content).is_empty());
        assert_eq!(lines(&run("MD009", json!({}), content)), vec![2]);
    }
}
