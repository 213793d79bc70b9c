use super::Rule;
use crate::engine::{FixInfo, LintContext, RawDiagnostic};

/// Rule MD023: Headings must start at the beginning of the line
#[derive(Debug, Clone, Copy, Default)]
pub struct MD023HeadingStartLeft;

impl Rule for MD023HeadingStartLeft {
    fn name(&self) -> &'static str {
        "MD023"
    }

    fn alias(&self) -> &'static str {
        "heading-start-left"
    }

    fn description(&self) -> &'static str {
        "Headings must start at the beginning of the line"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();

        for (idx, heading) in ctx.headings() {
            let indent = ctx.lines[idx].indent;
            if indent == 0 {
                continue;
            }
            // an indented heading under a list item belongs to that item
            let in_list = ctx.lines[..idx]
                .iter()
                .rev()
                .find(|l| !l.is_blank && l.indent < indent)
                .is_some_and(|l| l.list_item.is_some());
            if in_list {
                continue;
            }
            let indent_chars = ctx.line(idx).chars().take_while(|c| c.is_whitespace()).count();
            let mut warning = self
                .diagnostic(idx + 1)
                .context(ctx.line(idx).trim())
                .range(1, indent_chars + 1)
                .fix(FixInfo::delete(1, indent_chars));
            if heading.style.is_setext() {
                warning = warning.detail("Setext heading text is indented");
            }
            warnings.push(warning);
        }

        warnings
    }
}
