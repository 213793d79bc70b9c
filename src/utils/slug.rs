//! GitHub-style heading anchors.
//!
//! Lowercase the heading text, drop inline markup (emphasis, code spans, link
//! syntax), keep letters, digits, `_` and `-`, and turn each whitespace
//! character into a hyphen. Repeated anchors get `-1`, `-2`, ... suffixes.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static EMPHASIS_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\*{1,3}|_{1,3})([^*_]+)(\*{1,3}|_{1,3})").unwrap());
static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\](?:\([^)]*\)|\[[^\]]*\])?").unwrap());

/// Heading text with inline markup removed.
pub fn strip_inline_markup(text: &str) -> String {
    let text = LINK_PATTERN.replace_all(text, "$1");
    let text = CODE_PATTERN.replace_all(&text, "$1");
    EMPHASIS_PATTERN.replace_all(&text, "$2").into_owned()
}

/// Anchor fragment for a heading, without the leading `#`.
pub fn heading_to_fragment(heading: &str) -> String {
    let text = strip_inline_markup(heading.trim()).to_lowercase();

    text.chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                Some(c)
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

/// Hands out unique anchors for a sequence of headings.
#[derive(Debug, Default)]
pub struct SlugTracker {
    seen: HashMap<String, usize>,
}

impl SlugTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slug(&mut self, heading: &str) -> String {
        let base = heading_to_fragment(heading);
        let mut candidate = base.clone();
        if self.seen.contains_key(&base) {
            loop {
                let count = self.seen.entry(base.clone()).or_insert(0);
                *count += 1;
                candidate = format!("{base}-{count}");
                if !self.seen.contains_key(&candidate) {
                    break;
                }
            }
        }
        self.seen.insert(candidate.clone(), 0);
        candidate
    }
}
