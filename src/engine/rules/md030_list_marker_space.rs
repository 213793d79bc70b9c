use super::{Rule, expected_actual};
use crate::engine::{FixInfo, LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD030Config {
    pub ul_single: usize,
    pub ol_single: usize,
    pub ul_multi: usize,
    pub ol_multi: usize,
}

impl Default for MD030Config {
    fn default() -> Self {
        Self {
            ul_single: 1,
            ol_single: 1,
            ul_multi: 1,
            ol_multi: 1,
        }
    }
}

/// Rule MD030: Spaces after list markers
///
/// A list is "multi" when any of its items spans more than one line.
#[derive(Debug, Clone)]
pub struct MD030ListMarkerSpace {
    config: MD030Config,
}

impl MD030ListMarkerSpace {
    pub fn new(config: MD030Config) -> Self {
        Self { config }
    }

    fn expected(&self, ordered: bool, multi: bool) -> usize {
        match (ordered, multi) {
            (false, false) => self.config.ul_single,
            (true, false) => self.config.ol_single,
            (false, true) => self.config.ul_multi,
            (true, true) => self.config.ol_multi,
        }
    }
}

impl Rule for MD030ListMarkerSpace {
    fn name(&self) -> &'static str {
        "MD030"
    }

    fn alias(&self) -> &'static str {
        "list-marker-space"
    }

    fn description(&self) -> &'static str {
        "Spaces after list markers"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();

        for block in ctx.list_blocks() {
            for group in &block.groups {
                let multi = group.items.iter().any(|&line| {
                    let next = line + 1;
                    next <= block.end_line && ctx.lines[next].list_item.is_none()
                });
                let expected = self.expected(group.ordered, multi);

                for &line in &group.items {
                    let Some(item) = &ctx.lines[line].list_item else {
                        continue;
                    };
                    let actual = item.spaces_after_marker;
                    let text = ctx.line(line);
                    // empty items and tab separators are left alone
                    if actual == 0 || actual == expected || item.content_column >= text.len() {
                        continue;
                    }
                    if text[item.content_column - actual..item.content_column].contains('\t') {
                        continue;
                    }
                    let column = item.marker_column + item.marker.len() + 1;
                    warnings.push(
                        self.diagnostic(line + 1)
                            .detail(expected_actual(expected, actual))
                            .range(item.marker_column + 1, item.marker.len() + actual)
                            .fix(FixInfo::replace(column, actual, " ".repeat(expected))),
                    );
                }
            }
        }

        warnings
    }
}
