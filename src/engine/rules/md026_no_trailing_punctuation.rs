use super::Rule;
use crate::engine::{FixInfo, LintContext, RawDiagnostic};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static TRAILING_ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#?[0-9a-zA-Z]+;$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD026Config {
    pub punctuation: String,
}

impl Default for MD026Config {
    fn default() -> Self {
        Self {
            punctuation: ".,;:!。，；：！".to_string(),
        }
    }
}

/// Rule MD026: Trailing punctuation in heading
#[derive(Debug, Clone)]
pub struct MD026NoTrailingPunctuation {
    config: MD026Config,
}

impl MD026NoTrailingPunctuation {
    pub fn new(config: MD026Config) -> Self {
        Self { config }
    }
}

impl Rule for MD026NoTrailingPunctuation {
    fn name(&self) -> &'static str {
        "MD026"
    }

    fn alias(&self) -> &'static str {
        "no-trailing-punctuation"
    }

    fn description(&self) -> &'static str {
        "Trailing punctuation in heading"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();

        for (idx, heading) in ctx.headings() {
            let text = heading.text.as_str();
            if TRAILING_ENTITY.is_match(text) {
                continue;
            }
            let stripped = text.trim_end_matches(|c| self.config.punctuation.contains(c));
            if stripped.len() == text.len() || stripped.is_empty() {
                continue;
            }
            let line = ctx.line(idx);
            let Some(text_start) = line[heading.marker_column..].find(text).map(|p| p + heading.marker_column) else {
                continue;
            };
            let punctuation = &text[stripped.len()..];
            let column = line[..text_start + stripped.len()].chars().count() + 1;
            let count = punctuation.chars().count();
            warnings.push(
                self.diagnostic(idx + 1)
                    .detail(format!("Punctuation: '{punctuation}'"))
                    .range(column, count)
                    .fix(FixInfo::delete(column, count)),
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
    fn test_trailing_punctuation() {
        let content = "# Title.\n\n## Closed!! ##\n\n## Question?\n";
        let warnings = run("MD026", json!({}), content);
        assert_eq!(lines(&warnings), vec![1, 3]);
        assert_eq!(warnings[1].error_detail.as_deref(), Some("Punctuation: '!!'"));
        assert_eq!(fix("MD026", json!({}), content), "# Title\n\n## Closed ##\n\n## Question?\n");
    }

    #[test]
    fn test_custom_punctuation_and_entities() {
        assert_eq!(lines(&run("MD026", json!({"punctuation": "?"}), "# Why?\n")), vec![1]);
        assert!(run("MD026", json!({}), "# Copyright &copy;\n").is_empty());
    }

    #[test]
    fn test_full_width_punctuation() {
        assert_eq!(fix("MD026", json!({}), "# 标题：\n"), "# 标题\n");
    }
}
