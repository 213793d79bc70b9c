use super::{Rule, expected_actual};
use crate::engine::{FixInfo, LintContext, RawDiagnostic};
use pulldown_cmark::{Event, Tag};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD049Config {
    /// consistent, asterisk, underscore
    pub style: String,
}

impl Default for MD049Config {
    fn default() -> Self {
        Self {
            style: "consistent".to_string(),
        }
    }
}

/// Rule MD049: Emphasis style
#[derive(Debug, Clone)]
pub struct MD049EmphasisStyle {
    config: MD049Config,
}

impl MD049EmphasisStyle {
    pub fn new(config: MD049Config) -> Self {
        Self { config }
    }
}

/// Check emphasis-like spans delimited by `width` marker characters, reporting
/// and fixing both delimiters of each span whose marker is not the expected one.
pub(super) fn check_markers<R: Rule + ?Sized>(
    rule: &R,
    ctx: &LintContext,
    style: &str,
    width: usize,
    is_span: impl Fn(&Event) -> bool,
) -> Vec<RawDiagnostic> {
    let mut expected: Option<char> = match style {
        "asterisk" => Some('*'),
        "underscore" => Some('_'),
        _ => None,
    };
    let name = |c: char| if c == '_' { "underscore" } else { "asterisk" };

    let mut warnings = Vec::new();
    for (event, range) in ctx.markdown_events() {
        if !is_span(&event) {
            continue;
        }
        let span = &ctx.content[range.clone()];
        let Some(actual) = span.chars().next().filter(|c| *c == '*' || *c == '_') else {
            continue;
        };
        let wanted = *expected.get_or_insert(actual);
        if wanted == actual {
            continue;
        }
        // intraword emphasis cannot use underscores
        if wanted == '_' {
            let before = ctx.content[..range.start].chars().next_back();
            let after = ctx.content[range.end..].chars().next();
            if before.is_some_and(char::is_alphanumeric) || after.is_some_and(char::is_alphanumeric) {
                continue;
            }
        }

        let replacement = wanted.to_string().repeat(width);
        for offset in [range.start, range.end - width] {
            let (line, column) = ctx.offset_to_line_col(offset);
            warnings.push(
                rule.diagnostic(line)
                    .detail(expected_actual(name(wanted), name(actual)))
                    .range(column, width)
                    .fix(FixInfo::replace(column, width, replacement.clone())),
            );
        }
    }
    warnings
}

impl Rule for MD049EmphasisStyle {
    fn name(&self) -> &'static str {
        "MD049"
    }

    fn alias(&self) -> &'static str {
        "emphasis-style"
    }

    fn description(&self) -> &'static str {
        "Emphasis style"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        if !ctx.content.contains(['*', '_']) {
            return Vec::new();
        }
        check_markers(self, ctx, &self.config.style, 1, |event| matches!(event, Event::Start(Tag::Emphasis)))
    }
}
