use super::Rule;
use crate::engine::lint_context::HeadingStyle;
use crate::engine::{FixInfo, LintContext, RawDiagnostic};

/// Rule MD019: Multiple spaces after hash on atx style heading
#[derive(Debug, Clone, Copy, Default)]
pub struct MD019NoMultipleSpaceAtx;

impl Rule for MD019NoMultipleSpaceAtx {
    fn name(&self) -> &'static str {
        "MD019"
    }

    fn alias(&self) -> &'static str {
        "no-multiple-space-atx"
    }

    fn description(&self) -> &'static str {
        "Multiple spaces after hash on atx style heading"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();

        for (idx, heading) in ctx.headings() {
            if heading.style != HeadingStyle::Atx || heading.spaces_after_marker <= 1 || heading.text.is_empty() {
                continue;
            }
            let hashes_end = heading.marker_column + heading.level as usize;
            let extra = heading.spaces_after_marker - 1;
            warnings.push(
                self.diagnostic(idx + 1)
                    .context(ctx.line(idx).trim())
                    .range(heading.marker_column + 1, heading.level as usize + heading.spaces_after_marker + 1)
                    .fix(FixInfo::delete(hashes_end + 2, extra)),
            );
        }

        warnings
    }
}
