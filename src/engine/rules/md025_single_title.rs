use super::{Rule, default_title_pattern, front_matter_has_title};
use crate::engine::{LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD025Config {
    pub level: u8,
    /// Front matter key that counts as the document title; empty to disable
    pub front_matter_title: String,
}

impl Default for MD025Config {
    fn default() -> Self {
        Self {
            level: 1,
            front_matter_title: default_title_pattern(),
        }
    }
}

/// Rule MD025: Multiple top-level headings in the same document
///
/// Only applies when the first line of the document is the top-level
/// heading, or when front matter supplies the title.
#[derive(Debug, Clone)]
pub struct MD025SingleTitle {
    config: MD025Config,
}

impl MD025SingleTitle {
    pub fn new(config: MD025Config) -> Self {
        Self { config }
    }
}

impl Rule for MD025SingleTitle {
    fn name(&self) -> &'static str {
        "MD025"
    }

    fn alias(&self) -> &'static str {
        "single-title"
    }

    fn description(&self) -> &'static str {
        "Multiple top-level headings in the same document"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();
        let first_content = ctx.lines.iter().position(|l| !l.in_front_matter);
        let mut has_title = front_matter_has_title(ctx, &self.config.front_matter_title);

        for (idx, heading) in ctx.headings() {
            if heading.level != self.config.level {
                continue;
            }
            if has_title {
                warnings.push(self.diagnostic(idx + 1).context(ctx.line(idx).trim()));
            } else if Some(idx) == first_content {
                has_title = true;
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{lines, run};
    use serde_json::json;

    #[test]
    fn test_second_h1() {
        assert_eq!(lines(&run("MD025", json!({}), "# One\n\n# Two\n")), vec![3]);
    }

    #[test]
    fn test_h1_not_on_first_line() {
        assert!(run("MD025", json!({}), "Intro\n\n# One\n\n# Two\n").is_empty());
    }

    #[test]
    fn test_front_matter_title() {
        let content = "---\ntitle: Doc\n---\n# One\n";
        assert_eq!(lines(&run("MD025", json!({}), content)), vec![4]);
        assert!(run("MD025", json!({"front_matter_title": ""}), content).is_empty());
    }

    #[test]
    fn test_level_option() {
        assert_eq!(lines(&run("MD025", json!({"level": 2}), "## A\n\n## B\n")), vec![3]);
    }
}
