use super::Rule;
use crate::engine::{FixInfo, LintContext, RawDiagnostic};

/// Rule MD047: Files should end with a single newline character
#[derive(Debug, Clone, Copy, Default)]
pub struct MD047SingleTrailingNewline;

impl Rule for MD047SingleTrailingNewline {
    fn name(&self) -> &'static str {
        "MD047"
    }

    fn alias(&self) -> &'static str {
        "single-trailing-newline"
    }

    fn description(&self) -> &'static str {
        "Files should end with a single newline character"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        if ctx.content.is_empty() || ctx.content.ends_with(['\n', '\r']) {
            return Vec::new();
        }
        let line_number = ctx.line_count();
        let length = ctx.line(line_number - 1).chars().count();
        vec![
            self.diagnostic(line_number)
                .range(length.max(1), 1)
                .fix(FixInfo::insert(length + 1, "\n")),
        ]
    }
}
