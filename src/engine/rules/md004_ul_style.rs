use super::{Rule, expected_actual};
use crate::engine::{FixInfo, LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD004Config {
    /// consistent, asterisk, plus, dash, sublist
    pub style: String,
}

impl Default for MD004Config {
    fn default() -> Self {
        Self {
            style: "consistent".to_string(),
        }
    }
}

/// Rule MD004: Unordered list style
///
/// `sublist` requires each nesting level to use a different marker than its
/// parent, cycling `*`, `+`, `-`.
#[derive(Debug, Clone)]
pub struct MD004UlStyle {
    config: MD004Config,
}

fn marker_for_style(style: &str) -> Option<char> {
    match style {
        "asterisk" => Some('*'),
        "plus" => Some('+'),
        "dash" => Some('-'),
        _ => None,
    }
}

fn style_name(marker: char) -> &'static str {
    match marker {
        '*' => "asterisk",
        '+' => "plus",
        _ => "dash",
    }
}

fn next_in_cycle(marker: char) -> char {
    match marker {
        '*' => '+',
        '+' => '-',
        _ => '*',
    }
}

impl MD004UlStyle {
    pub fn new(config: MD004Config) -> Self {
        Self { config }
    }
}

impl Rule for MD004UlStyle {
    fn name(&self) -> &'static str {
        "MD004"
    }

    fn alias(&self) -> &'static str {
        "ul-style"
    }

    fn description(&self) -> &'static str {
        "Unordered list style"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();
        let fixed = marker_for_style(&self.config.style);
        let sublist = self.config.style == "sublist";
        let mut document_marker: Option<char> = None;

        for block in ctx.list_blocks() {
            // expected marker per nesting level, for `sublist`
            let mut level_markers: Vec<Option<char>> = Vec::new();

            for group in block.groups.iter().filter(|g| !g.ordered) {
                for &line in &group.items {
                    let Some(item) = &ctx.lines[line].list_item else {
                        continue;
                    };
                    let Some(actual) = item.marker.chars().next() else {
                        continue;
                    };

                    let expected = if let Some(marker) = fixed {
                        marker
                    } else if sublist {
                        if level_markers.len() <= group.level {
                            level_markers.resize(group.level + 1, None);
                        }
                        if level_markers[group.level].is_none() {
                            let parent = group
                                .level
                                .checked_sub(1)
                                .and_then(|p| level_markers.get(p).copied().flatten());
                            level_markers[group.level] = Some(match parent {
                                Some(parent) if parent == actual => next_in_cycle(parent),
                                _ => actual,
                            });
                        }
                        level_markers[group.level].unwrap_or(actual)
                    } else {
                        *document_marker.get_or_insert(actual)
                    };

                    if actual != expected {
                        let column = item.marker_column + 1;
                        warnings.push(
                            self.diagnostic(line + 1)
                                .detail(expected_actual(style_name(expected), style_name(actual)))
                                .range(column, 1)
                                .fix(FixInfo::replace(column, 1, expected.to_string())),
                        );
                    }
                }
            }
        }

        warnings
    }
}
