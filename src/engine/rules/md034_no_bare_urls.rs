use super::Rule;
use crate::engine::{FixInfo, LintContext, RawDiagnostic};
use pulldown_cmark::{Event, Tag};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static BARE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"https?://[^\s<>\[\]()"'`]+"#).unwrap());
static REFERENCE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}\[[^\]]+\]:\s").unwrap());

/// Rule MD034: Bare URL used
///
/// The fix wraps the URL in angle brackets, turning it into an autolink.
#[derive(Debug, Clone, Copy, Default)]
pub struct MD034NoBareUrls;

/// Byte ranges where a URL is not bare: links, images, code, HTML, metadata.
fn excluded_ranges(ctx: &LintContext) -> Vec<Range<usize>> {
    ctx.markdown_events()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_) | Tag::MetadataBlock(_) | Tag::HtmlBlock) => {
                Some(range)
            }
            Event::Code(_) | Event::Html(_) | Event::InlineHtml(_) => Some(range),
            _ => None,
        })
        .collect()
}

impl Rule for MD034NoBareUrls {
    fn name(&self) -> &'static str {
        "MD034"
    }

    fn alias(&self) -> &'static str {
        "no-bare-urls"
    }

    fn description(&self) -> &'static str {
        "Bare URL used"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        if !ctx.content.contains("://") {
            return Vec::new();
        }
        let excluded = excluded_ranges(ctx);
        let mut warnings = Vec::new();

        for m in BARE_URL.find_iter(ctx.content) {
            let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', '*', '_', '~']);
            let range = m.start()..m.start() + url.len();
            if excluded.iter().any(|r| r.start < range.end && range.start < r.end) {
                continue;
            }
            let (line, column) = ctx.offset_to_line_col(range.start);
            let info = &ctx.lines[line - 1];
            if info.is_structural() || REFERENCE_DEFINITION.is_match(ctx.line(line - 1)) {
                continue;
            }
            let length = url.chars().count();
            warnings.push(
                self.diagnostic(line)
                    .context(url)
                    .range(column, length)
                    .fix(FixInfo::replace(column, length, format!("<{url}>"))),
            );
        }

        warnings
    }
}
