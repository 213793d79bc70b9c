use super::Rule;
use crate::engine::{FixInfo, LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD031Config {
    /// Also check fences nested in list items
    pub list_items: bool,
}

impl Default for MD031Config {
    fn default() -> Self {
        Self { list_items: true }
    }
}

/// Rule MD031: Fenced code blocks should be surrounded by blank lines
#[derive(Debug, Clone)]
pub struct MD031BlanksAroundFences {
    config: MD031Config,
}

impl MD031BlanksAroundFences {
    pub fn new(config: MD031Config) -> Self {
        Self { config }
    }
}

impl Rule for MD031BlanksAroundFences {
    fn name(&self) -> &'static str {
        "MD031"
    }

    fn alias(&self) -> &'static str {
        "blanks-around-fences"
    }

    fn description(&self) -> &'static str {
        "Fenced code blocks should be surrounded by blank lines"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();

        for block in ctx.code_blocks.iter().filter(|b| b.fenced) {
            if !self.config.list_items && ctx.lines[block.start_line].indent > 0 {
                continue;
            }

            let start = block.start_line;
            if start > 0 {
                let previous = &ctx.lines[start - 1];
                if !previous.is_blank && !previous.in_front_matter {
                    warnings.push(
                        self.diagnostic(start + 1)
                            .context(ctx.line(start).trim())
                            .fix(FixInfo::insert(1, "\n")),
                    );
                }
            }

            let end = block.end_line;
            if block.closed && end + 1 < ctx.line_count() && !ctx.lines[end + 1].is_blank {
                warnings.push(
                    self.diagnostic(end + 1)
                        .context(ctx.line(end).trim())
                        .fix(FixInfo::insert(1, "\n").on_line(end + 2)),
                );
            }
        }

        warnings
    }
}
