use super::{Rule, expected_actual};
use crate::engine::{FixInfo, LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD010Config {
    /// Include code blocks
    pub code_blocks: bool,
    /// Fenced languages to skip even when `code_blocks` is set
    pub ignore_code_languages: Vec<String>,
    /// Spaces each tab becomes when fixing
    pub spaces_per_tab: usize,
}

impl Default for MD010Config {
    fn default() -> Self {
        Self {
            code_blocks: true,
            ignore_code_languages: Vec::new(),
            spaces_per_tab: 1,
        }
    }
}

/// Rule MD010: Hard tabs
#[derive(Debug, Clone)]
pub struct MD010NoHardTabs {
    config: MD010Config,
}

impl MD010NoHardTabs {
    pub fn new(config: MD010Config) -> Self {
        Self { config }
    }

    fn skipped_lines(&self, ctx: &LintContext) -> Vec<bool> {
        let mut skipped = vec![false; ctx.line_count()];
        for block in &ctx.code_blocks {
            let language = block.info_string.split_whitespace().next().unwrap_or("").to_lowercase();
            let ignored = !self.config.code_blocks
                || self
                    .config
                    .ignore_code_languages
                    .iter()
                    .any(|l| l.eq_ignore_ascii_case(&language));
            if ignored {
                skipped[block.start_line..=block.end_line].fill(true);
            }
        }
        skipped
    }
}

impl Rule for MD010NoHardTabs {
    fn name(&self) -> &'static str {
        "MD010"
    }

    fn alias(&self) -> &'static str {
        "no-hard-tabs"
    }

    fn description(&self) -> &'static str {
        "Hard tabs"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let skipped = self.skipped_lines(ctx);
        let mut warnings = Vec::new();

        for (idx, info) in ctx.lines.iter().enumerate() {
            if info.in_front_matter || skipped[idx] {
                continue;
            }
            let mut run_start: Option<usize> = None;
            let chars: Vec<char> = info.content(ctx.content).chars().collect();
            for column in 0..=chars.len() {
                let is_tab = chars.get(column) == Some(&'\t');
                match (is_tab, run_start) {
                    (true, None) => run_start = Some(column),
                    (false, Some(start)) => {
                        let length = column - start;
                        warnings.push(
                            self.diagnostic(idx + 1)
                                .detail(expected_actual(0, length))
                                .range(start + 1, length)
                                .fix(FixInfo::replace(start + 1, length, " ".repeat(length * self.config.spaces_per_tab))),
                        );
                        run_start = None;
                    }
                    _ => {}
                }
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
    fn test_tab_runs() {
        let content = "\tindented\nmid\t\tdle\n";
        let warnings = run("MD010", json!({}), content);
        assert_eq!(lines(&warnings), vec![1, 2]);
        assert_eq!(warnings[1].error_range, Some((4, 2)));
        assert_eq!(fix("MD010", json!({"spaces_per_tab": 2}), content), "  indented\nmid    dle\n");
    }

    #[test]
    fn test_code_blocks_exempt_when_disabled() {
        let content = "```\n\tcode\n```\n";
        assert_eq!(lines(&run("MD010", json!({}), content)), vec![2]);
        assert!(run("MD010", json!({"code_blocks": false}), content).is_empty());
    }

    #[test]
    fn test_ignored_language() {
        let content = "```makefile\nall:\n\tcc main.c\n```\n";
        assert!(run("MD010", json!({"ignore_code_languages": ["makefile"]}), content).is_empty());
    }
}
