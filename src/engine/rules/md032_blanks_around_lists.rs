use super::Rule;
use crate::engine::{FixInfo, LintContext, RawDiagnostic};

/// Rule MD032: Lists should be surrounded by blank lines
#[derive(Debug, Clone, Copy, Default)]
pub struct MD032BlanksAroundLists;

impl Rule for MD032BlanksAroundLists {
    fn name(&self) -> &'static str {
        "MD032"
    }

    fn alias(&self) -> &'static str {
        "blanks-around-lists"
    }

    fn description(&self) -> &'static str {
        "Lists should be surrounded by blank lines"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();

        for block in ctx.list_blocks() {
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
            if end + 1 < ctx.line_count() && !ctx.lines[end + 1].is_blank {
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

#[cfg(test)]
mod tests {
    use super::super::test_utils::{fix, lines, run};
    use serde_json::json;

    #[test]
    fn test_list_after_paragraph() {
        let content = "Intro:\n- a\n- b\n\nAfter\n";
        assert_eq!(lines(&run("MD032", json!({}), content)), vec![2]);
        assert_eq!(fix("MD032", json!({}), content), "Intro:\n\n- a\n- b\n\nAfter\n");
    }

    #[test]
    fn test_list_before_heading() {
        let content = "- a\n- b\n# Next\n";
        assert_eq!(lines(&run("MD032", json!({}), content)), vec![2]);
        assert_eq!(fix("MD032", json!({}), content), "- a\n- b\n\n# Next\n");
    }

    #[test]
    fn test_lazy_continuation_stays_in_list() {
        assert!(run("MD032", json!({}), "- a\ncontinued\n").is_empty());
    }

    #[test]
    fn test_marker_change_starts_new_list() {
        assert_eq!(lines(&run("MD032", json!({}), "- a\n* b\n")), vec![1, 2]);
    }
}
