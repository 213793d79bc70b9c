use super::{Rule, default_title_pattern, front_matter_has_title};
use crate::engine::{LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD041Config {
    pub level: u8,
    pub front_matter_title: String,
}

impl Default for MD041Config {
    fn default() -> Self {
        Self {
            level: 1,
            front_matter_title: default_title_pattern(),
        }
    }
}

/// Rule MD041: First line in a file should be a top-level heading
///
/// Leading blank lines and HTML comments are skipped.
#[derive(Debug, Clone)]
pub struct MD041FirstLineHeading {
    config: MD041Config,
}

impl MD041FirstLineHeading {
    pub fn new(config: MD041Config) -> Self {
        Self { config }
    }
}

impl Rule for MD041FirstLineHeading {
    fn name(&self) -> &'static str {
        "MD041"
    }

    fn alias(&self) -> &'static str {
        "first-line-heading"
    }

    fn description(&self) -> &'static str {
        "First line in a file should be a top-level heading"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        if front_matter_has_title(ctx, &self.config.front_matter_title) {
            return Vec::new();
        }

        let mut in_comment = false;
        for (idx, info) in ctx.lines.iter().enumerate() {
            if info.in_front_matter || info.is_blank {
                continue;
            }
            let text = ctx.line(idx).trim();
            if in_comment || text.starts_with("<!--") {
                in_comment = !text.contains("-->");
                continue;
            }

            let ok = info.heading.as_ref().is_some_and(|h| h.level == self.config.level);
            return if ok {
                Vec::new()
            } else {
                vec![self.diagnostic(idx + 1).context(text)]
            };
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{lines, run};
    use serde_json::json;

    #[test]
    fn test_first_line_heading() {
        assert!(run("MD041", json!({}), "# Title\n\nText\n").is_empty());
        assert!(run("MD041", json!({}), "\n<!-- comment\nspanning -->\n# Title\n").is_empty());
        assert_eq!(lines(&run("MD041", json!({}), "Text\n\n# Title\n")), vec![1]);
        assert_eq!(lines(&run("MD041", json!({}), "## Title\n")), vec![1]);
    }

    #[test]
    fn test_front_matter() {
        assert!(run("MD041", json!({}), "---\ntitle: Doc\n---\nText\n").is_empty());
        assert_eq!(lines(&run("MD041", json!({}), "---\nauthor: me\n---\nText\n")), vec![4]);
    }

    #[test]
    fn test_empty_document() {
        assert!(run("MD041", json!({}), "").is_empty());
    }
}
