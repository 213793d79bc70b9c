use super::{Rule, expected_actual};
use crate::engine::{FixInfo, LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

/// Blank lines required around a heading: one value for all levels, or one
/// per level (h1..h6). `-1` disables the check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LinesSetting {
    All(i64),
    PerLevel(Vec<i64>),
}

impl LinesSetting {
    fn for_level(&self, level: u8) -> i64 {
        match self {
            LinesSetting::All(n) => *n,
            LinesSetting::PerLevel(levels) => levels.get(level as usize - 1).copied().unwrap_or(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD022Config {
    pub lines_above: LinesSetting,
    pub lines_below: LinesSetting,
}

impl Default for MD022Config {
    fn default() -> Self {
        Self {
            lines_above: LinesSetting::All(1),
            lines_below: LinesSetting::All(1),
        }
    }
}

/// Rule MD022: Headings should be surrounded by blank lines
#[derive(Debug, Clone)]
pub struct MD022BlanksAroundHeadings {
    config: MD022Config,
}

impl MD022BlanksAroundHeadings {
    pub fn new(config: MD022Config) -> Self {
        Self { config }
    }
}

impl Rule for MD022BlanksAroundHeadings {
    fn name(&self) -> &'static str {
        "MD022"
    }

    fn alias(&self) -> &'static str {
        "blanks-around-headings"
    }

    fn description(&self) -> &'static str {
        "Headings should be surrounded by blank lines"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();
        let first_content = ctx.lines.iter().position(|l| !l.in_front_matter).unwrap_or(0);

        for (idx, heading) in ctx.headings() {
            let line_number = idx + 1;
            let context = ctx.line(idx).trim().to_string();

            let required_above = self.config.lines_above.for_level(heading.level);
            if required_above > 0 && idx > first_content {
                let actual = ctx.lines[first_content..idx].iter().rev().take_while(|l| l.is_blank).count();
                let reached_start = actual == idx - first_content;
                if !reached_start && (actual as i64) < required_above {
                    let missing = required_above as usize - actual;
                    warnings.push(
                        self.diagnostic(line_number)
                            .detail(format!("{}; Above", expected_actual(required_above, actual)))
                            .context(context.clone())
                            .fix(FixInfo::insert(1, "\n".repeat(missing))),
                    );
                }
            }

            let required_below = self.config.lines_below.for_level(heading.level);
            let end = ctx.heading_end_line(idx);
            if required_below > 0 && end + 1 < ctx.line_count() {
                let actual = ctx.lines[end + 1..].iter().take_while(|l| l.is_blank).count();
                let reached_end = end + 1 + actual == ctx.line_count();
                if !reached_end && (actual as i64) < required_below {
                    let missing = required_below as usize - actual;
                    let end_line = ctx.line(end);
                    warnings.push(
                        self.diagnostic(line_number)
                            .detail(format!("{}; Below", expected_actual(required_below, actual)))
                            .context(context)
                            .fix(FixInfo::insert(end_line.chars().count() + 1, "\n".repeat(missing)).on_line(end + 1)),
                    );
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
    fn test_missing_blank_lines() {
        let content = "Intro\n# Heading\nText\n";
        let warnings = run("MD022", json!({}), content);
        assert_eq!(lines(&warnings), vec![2, 2]);
        assert_eq!(warnings[0].error_detail.as_deref(), Some("Expected: 1; Actual: 0; Above"));
        assert_eq!(warnings[1].error_detail.as_deref(), Some("Expected: 1; Actual: 0; Below"));
        assert_eq!(fix("MD022", json!({}), content), "Intro\n\n# Heading\n\nText\n");
    }

    #[test]
    fn test_document_edges_and_front_matter() {
        assert!(run("MD022", json!({}), "---\ntitle: x\n---\n# Heading\n").is_empty());
        assert!(run("MD022", json!({}), "# Heading\n\n\n").is_empty());
    }

    #[test]
    fn test_setext_below_counts_from_underline() {
        let content = "Title\n=====\nText\n";
        assert_eq!(fix("MD022", json!({}), content), "Title\n=====\n\nText\n");
    }

    #[test]
    fn test_lines_above_only() {
        let content = "Intro\n# Heading\nText\n";
        let warnings = run("MD022", json!({"lines_above": 1, "lines_below": 0}), content);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].error_detail.as_deref().unwrap().ends_with("Above"));
    }

    #[test]
    fn test_per_level_setting() {
        let content = "# One\n## Two\n\nText\n";
        let warnings = run("MD022", json!({"lines_above": [1, 2], "lines_below": 0}), content);
        assert_eq!(warnings.len(), 1);
        assert_eq!(fix("MD022", json!({"lines_above": [1, 2], "lines_below": 0}), content), "# One\n\n\n## Two\n\nText\n");
    }
}
