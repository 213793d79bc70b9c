use super::{Rule, expected_actual};
use crate::engine::{LintContext, RawDiagnostic};

/// Rule MD001: Heading levels should only increment by one level at a time
///
/// Decreasing by any amount is allowed. The first heading sets the baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct MD001HeadingIncrement;

impl Rule for MD001HeadingIncrement {
    fn name(&self) -> &'static str {
        "MD001"
    }

    fn alias(&self) -> &'static str {
        "heading-increment"
    }

    fn description(&self) -> &'static str {
        "Heading levels should only increment by one level at a time"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();
        let mut previous: Option<u8> = None;

        for (idx, heading) in ctx.headings() {
            if let Some(prev) = previous
                && heading.level > prev + 1
            {
                warnings.push(
                    self.diagnostic(idx + 1)
                        .detail(expected_actual(format!("h{}", prev + 1), format!("h{}", heading.level)))
                        .context(ctx.line(idx).trim()),
                );
            }
            previous = Some(heading.level);
        }

        warnings
    }
}
