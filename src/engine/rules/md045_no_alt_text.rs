use super::Rule;
use crate::engine::{LintContext, RawDiagnostic};
use pulldown_cmark::{Event, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

static HTML_IMG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());
static HTML_ALT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)\salt\s*=\s*("[^"]*\S[^"]*"|'[^']*\S[^']*'|[^\s"'>]+)"#).unwrap());
static HTML_HIDDEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)\saria-hidden\s*=\s*["']?true"#).unwrap());

/// Rule MD045: Images should have alternate text (alt text)
#[derive(Debug, Clone, Copy, Default)]
pub struct MD045NoAltText;

impl Rule for MD045NoAltText {
    fn name(&self) -> &'static str {
        "MD045"
    }

    fn alias(&self) -> &'static str {
        "no-alt-text"
    }

    fn description(&self) -> &'static str {
        "Images should have alternate text (alt text)"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();
        // (start, end, alt text) of the image being read
        let mut image: Option<(usize, usize, String)> = None;

        for (event, range) in ctx.markdown_events() {
            match event {
                Event::Start(Tag::Image { .. }) => image = Some((range.start, range.end, String::new())),
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, _, alt)) = image.as_mut() {
                        alt.push_str(&text);
                    }
                }
                Event::End(TagEnd::Image) => {
                    if let Some((start, end, alt)) = image.take()
                        && alt.trim().is_empty()
                    {
                        let (line, column) = ctx.offset_to_line_col(start);
                        let source = &ctx.content[start..end];
                        warnings.push(
                            self.diagnostic(line)
                                .context(source)
                                .range(column, source.chars().count()),
                        );
                    }
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    for tag in HTML_IMG.find_iter(&html) {
                        if HTML_ALT.is_match(tag.as_str()) || HTML_HIDDEN.is_match(tag.as_str()) {
                            continue;
                        }
                        let offset = ctx.content[range.clone()].find(tag.as_str()).map_or(range.start, |p| range.start + p);
                        let (line, column) = ctx.offset_to_line_col(offset);
                        warnings.push(
                            self.diagnostic(line)
                                .context(tag.as_str())
                                .range(column, tag.as_str().chars().count()),
                        );
                    }
                }
                _ => {}
            }
        }

        warnings
    }
}
