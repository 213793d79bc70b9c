use super::Rule;
use crate::engine::{FixInfo, LintContext, RawDiagnostic};
use regex::Regex;
use std::sync::LazyLock;

static MISSING_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^( {0,3})(#{1,6})([^#\s])").unwrap());

/// Rule MD018: No space after hash on atx style heading
#[derive(Debug, Clone, Copy, Default)]
pub struct MD018NoMissingSpaceAtx;

impl Rule for MD018NoMissingSpaceAtx {
    fn name(&self) -> &'static str {
        "MD018"
    }

    fn alias(&self) -> &'static str {
        "no-missing-space-atx"
    }

    fn description(&self) -> &'static str {
        "No space after hash on atx style heading"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();

        for (idx, info) in ctx.lines.iter().enumerate() {
            if info.is_structural() || info.heading.is_some() || info.list_item.is_some() {
                continue;
            }
            let line = info.content(ctx.content);
            let Some(caps) = MISSING_SPACE.captures(line) else {
                continue;
            };
            // `#!` shebangs and `#️⃣`-style emoji are not headings
            if caps[3].starts_with(['!', '\u{fe0f}']) {
                continue;
            }
            let indent = caps[1].len();
            let hashes = caps[2].len();
            warnings.push(
                self.diagnostic(idx + 1)
                    .context(line.trim())
                    .range(indent + 1, hashes + 1)
                    .fix(FixInfo::insert(indent + hashes + 1, " ")),
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
    fn test_missing_space() {
        let content = "#Heading\n\n##Another\n\n# Fine\n";
        assert_eq!(lines(&run("MD018", json!({}), content)), vec![1, 3]);
        assert_eq!(fix("MD018", json!({}), content), "# Heading\n\n## Another\n\n# Fine\n");
    }

    #[test]
    fn test_not_headings() {
        assert!(run("MD018", json!({}), "#!/bin/sh\n\n```\n#comment\n```\n\n####### seven\n").is_empty());
    }
}
