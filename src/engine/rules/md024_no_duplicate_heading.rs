use super::Rule;
use crate::engine::{LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD024Config {
    /// Only flag duplicates that share the same parent heading
    pub siblings_only: bool,
}

/// Rule MD024: Multiple headings with the same content
#[derive(Debug, Clone)]
pub struct MD024NoDuplicateHeading {
    config: MD024Config,
}

impl MD024NoDuplicateHeading {
    pub fn new(config: MD024Config) -> Self {
        Self { config }
    }
}

impl Rule for MD024NoDuplicateHeading {
    fn name(&self) -> &'static str {
        "MD024"
    }

    fn alias(&self) -> &'static str {
        "no-duplicate-heading"
    }

    fn description(&self) -> &'static str {
        "Multiple headings with the same content"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        // sibling sets, one per open heading level
        let mut by_level: Vec<(u8, HashSet<String>)> = vec![(0, HashSet::new())];

        for (idx, heading) in ctx.headings() {
            let text = heading.text.trim().to_string();
            let duplicate = if self.config.siblings_only {
                while by_level.last().is_some_and(|(level, _)| *level >= heading.level) {
                    by_level.pop();
                }
                let duplicate = by_level
                    .last_mut()
                    .is_some_and(|(_, children)| !children.insert(text.clone()));
                by_level.push((heading.level, HashSet::new()));
                duplicate
            } else {
                !seen.insert(text.clone())
            };

            if duplicate {
                warnings.push(self.diagnostic(idx + 1).context(text));
            }
        }

        warnings
    }
}
