//!
//! List structure normalization.
//!
//! Lists are parsed into items (marker plus dedented body), item bodies are
//! normalized recursively so nested lists are handled at every level, and the
//! result is rendered back with the configured bullet, ordered numbering and
//! marker spacing.
//!
//! Every list is rendered tight: blank lines between items are removed. Blank
//! lines after the last item belong to the surrounding document and are kept.
//! With blank-line trimming enabled, blank runs inside an item collapse to one
//! blank line and leading/trailing blanks in the item are dropped.
//!
//! Unlike the other post-processing transforms this one returns an error
//! instead of the unchanged document; the pipeline is the error boundary.

use crate::code_blocks::{OpenFence, parse_closing_fence, parse_opening_fence};
use crate::config::{LintRules, OrderedListStyle, PrettierMarkdownConfig};
use crate::front_matter;
use crate::utils::line_ending::{LineEnding, detect_line_ending};
use thiserror::Error;

/// Nesting beyond this is rejected instead of recursing further.
pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListStructureError {
    #[error("List nesting exceeds {max} levels")]
    NestingTooDeep { max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    Bullet,
    Ordered { number: u64, delimiter: char },
}

#[derive(Debug, Clone)]
struct ListMarker {
    kind: MarkerKind,
    /// Column where the item content starts.
    content_indent: usize,
    content: String,
}

impl ListMarker {
    fn is_ordered(&self) -> bool {
        matches!(self.kind, MarkerKind::Ordered { .. })
    }
}

#[derive(Debug)]
struct ListItem {
    marker: ListMarker,
    body: Vec<String>,
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_thematic_break(trimmed: &str) -> bool {
    let mut chars = trimmed.chars().filter(|c| !c.is_whitespace());
    let Some(first) = chars.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for c in chars {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

fn parse_list_marker(line: &str) -> Option<ListMarker> {
    let trimmed = line.trim_start_matches(' ');
    let indent = line.len() - trimmed.len();
    if indent > 3 || is_thematic_break(trimmed) {
        return None;
    }

    let (kind, marker_len) = match trimmed.chars().next()? {
        '-' | '*' | '+' => (MarkerKind::Bullet, 1),
        _ => {
            let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits == 0 || digits > 9 {
                return None;
            }
            let delimiter = trimmed[digits..].chars().next().filter(|c| *c == '.' || *c == ')')?;
            let number = trimmed[..digits].parse().ok()?;
            (MarkerKind::Ordered { number, delimiter }, digits + 1)
        }
    };

    let rest = &trimmed[marker_len..];
    let content = rest.trim_start_matches([' ', '\t']);
    let spacing = rest.len() - content.len();
    if !rest.is_empty() && spacing == 0 {
        return None;
    }

    let marker = if content.is_empty() {
        ListMarker {
            kind,
            content_indent: indent + marker_len + 1,
            content: String::new(),
        }
    } else if spacing > 4 {
        // Content starting with an indented code block keeps its extra spaces.
        ListMarker {
            kind,
            content_indent: indent + marker_len + 1,
            content: rest[1..].to_string(),
        }
    } else {
        ListMarker {
            kind,
            content_indent: indent + marker_len + spacing,
            content: content.to_string(),
        }
    };
    Some(marker)
}

fn interrupts_block(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('#')
        || trimmed.starts_with('>')
        || is_thematic_break(trimmed)
        || parse_opening_fence(line).is_some()
        || parse_list_marker(line).is_some()
}

fn update_fence(fence: &mut Option<OpenFence>, line: &str) {
    match fence {
        Some(open) => {
            if parse_closing_fence(line, open.fence_char, open.fence_length) {
                *fence = None;
            }
        }
        None => *fence = parse_opening_fence(line),
    }
}

/// Parse the list whose first item is at `lines[start]`. Returns the items and
/// the index of the first line not consumed; trailing blank lines after the
/// last item are left unconsumed.
fn parse_list(lines: &[String], start: usize, first: ListMarker) -> (Vec<ListItem>, usize) {
    let ordered = first.is_ordered();
    let mut items = Vec::new();
    let mut fence = parse_opening_fence(&first.content);
    let mut current = ListItem {
        body: vec![first.content.clone()],
        marker: first,
    };
    let mut pending_blanks = 0;
    let mut i = start + 1;

    while i < lines.len() {
        let line = &lines[i];

        if is_blank(line) {
            if fence.is_some() {
                current.body.push(String::new());
            } else {
                pending_blanks += 1;
            }
            i += 1;
            continue;
        }

        let width = current.marker.content_indent;
        if leading_spaces(line) >= width {
            current.body.extend(std::iter::repeat_n(String::new(), pending_blanks));
            pending_blanks = 0;
            let content = line[width..].to_string();
            update_fence(&mut fence, &content);
            current.body.push(content);
            i += 1;
            continue;
        }

        if fence.is_some() {
            break;
        }

        if let Some(marker) = parse_list_marker(line)
            && marker.is_ordered() == ordered
        {
            fence = parse_opening_fence(&marker.content);
            let body = vec![marker.content.clone()];
            items.push(std::mem::replace(&mut current, ListItem { marker, body }));
            pending_blanks = 0;
            i += 1;
            continue;
        }

        if pending_blanks == 0 && !interrupts_block(line) {
            current.body.push(line.trim_start().to_string());
            i += 1;
            continue;
        }

        break;
    }

    items.push(current);
    (items, i - pending_blanks)
}

/// Collapse blank runs to a single blank line and drop leading and trailing
/// blanks. Lines inside fenced code are left alone.
fn trim_blank_lines(body: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(body.len());
    let mut fence: Option<OpenFence> = None;

    for line in body {
        if fence.is_none() && is_blank(&line) {
            if out.last().is_some_and(|last| !is_blank(last)) {
                out.push(String::new());
            }
            continue;
        }
        update_fence(&mut fence, &line);
        out.push(line);
    }

    while out.last().is_some_and(|last| is_blank(last)) && fence.is_none() {
        out.pop();
    }
    out
}

/// Rewrites lists with a fixed bullet, numbering and spacing.
#[derive(Debug, Clone)]
pub struct ListNormalizer {
    bullet: char,
    increment_ordered: bool,
    /// Minimum width of marker plus spacing; 0 means a single space.
    marker_width: usize,
    trim_blank_lines: bool,
}

impl ListNormalizer {
    pub fn new(rules: &LintRules, options: &PrettierMarkdownConfig, trim_blank_lines: bool) -> Self {
        Self {
            bullet: rules.unordered_list_style.bullet(),
            increment_ordered: rules.ordered_list_style == OrderedListStyle::Ordered,
            marker_width: if options.use_tabs { options.tab_width } else { 0 },
            trim_blank_lines,
        }
    }

    /// Normalize every list in `doc`. Front matter is never touched.
    pub fn normalize(&self, doc: &str) -> Result<String, ListStructureError> {
        let fm = front_matter::extract(doc);
        let body = fm.body;

        let lines: Vec<String> = body.lines().map(str::to_string).collect();
        let normalized = self.normalize_fragment(&lines, 0)?;
        if normalized == lines {
            return Ok(doc.to_string());
        }

        let eol = match detect_line_ending(body) {
            LineEnding::Crlf => "\r\n",
            _ => "\n",
        };
        let mut out = normalized.join(eol);
        if body.ends_with('\n') {
            out.push_str(eol);
        }
        Ok(fm.reassemble(&out))
    }

    fn normalize_fragment(&self, lines: &[String], depth: usize) -> Result<Vec<String>, ListStructureError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ListStructureError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }

        let mut out = Vec::with_capacity(lines.len());
        let mut paragraph_open = false;
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];

            if let Some(fence) = parse_opening_fence(line) {
                out.push(line.clone());
                i += 1;
                while i < lines.len() {
                    let inner = &lines[i];
                    out.push(inner.clone());
                    i += 1;
                    if parse_closing_fence(inner, fence.fence_char, fence.fence_length) {
                        break;
                    }
                }
                paragraph_open = false;
                continue;
            }

            if let Some(marker) = parse_list_marker(line)
                && can_start_list(&marker, paragraph_open)
            {
                let (items, next) = parse_list(lines, i, marker);
                out.extend(self.render_list(items, depth)?);
                i = next;
                paragraph_open = false;
                continue;
            }

            let trimmed = line.trim_start();
            paragraph_open = !trimmed.is_empty() && !trimmed.starts_with('#') && leading_spaces(line) < 4;
            out.push(line.clone());
            i += 1;
        }

        Ok(out)
    }

    fn render_list(&self, items: Vec<ListItem>, depth: usize) -> Result<Vec<String>, ListStructureError> {
        let (mut number, delimiter) = match items.first().map(|item| item.marker.kind) {
            Some(MarkerKind::Ordered { number, delimiter }) => (number, delimiter),
            _ => (1, '.'),
        };

        let mut out = Vec::new();
        for item in items {
            let marker = match item.marker.kind {
                MarkerKind::Bullet => self.bullet.to_string(),
                MarkerKind::Ordered { .. } => {
                    let marker = format!("{number}{delimiter}");
                    if self.increment_ordered {
                        number += 1;
                    }
                    marker
                }
            };

            let mut body = self.normalize_fragment(&item.body, depth + 1)?;
            if self.trim_blank_lines {
                body = trim_blank_lines(body);
            }

            let first_is_empty = body.first().is_none_or(|line| is_blank(line));
            let width = if first_is_empty {
                marker.len() + 1
            } else {
                self.content_width(marker.len())
            };

            let mut lines = body.into_iter();
            match lines.next() {
                Some(first) if !is_blank(&first) => {
                    out.push(format!("{marker}{}{first}", " ".repeat(width - marker.len())));
                }
                _ => out.push(marker),
            }

            let indent = " ".repeat(width);
            for line in lines {
                if is_blank(&line) {
                    out.push(String::new());
                } else {
                    out.push(format!("{indent}{line}"));
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn bullet(&self) -> char {
        self.bullet
    }

    /// Columns taken by a bullet and its spacing; nested items indent by this.
    pub(crate) fn bullet_width(&self) -> usize {
        self.content_width(1)
    }

    fn content_width(&self, marker_len: usize) -> usize {
        let width = self.marker_width.max(marker_len + 1);
        if width - marker_len > 4 { marker_len + 1 } else { width }
    }
}

fn can_start_list(marker: &ListMarker, paragraph_open: bool) -> bool {
    if !paragraph_open {
        return true;
    }
    // Only non-empty bullets and lists starting at 1 interrupt a paragraph.
    !marker.content.is_empty()
        && match marker.kind {
            MarkerKind::Bullet => true,
            MarkerKind::Ordered { number, .. } => number == 1,
        }
}

/// Normalize lists with settings taken from the lint rules and formatter options.
pub fn normalize_lists(
    doc: &str,
    trim_blank_lines: bool,
    rules: &LintRules,
    options: &PrettierMarkdownConfig,
) -> Result<String, ListStructureError> {
    ListNormalizer::new(rules, options, trim_blank_lines).normalize(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnorderedListStyle;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn rules(style: UnorderedListStyle, ordered: OrderedListStyle) -> LintRules {
        LintRules {
            unordered_list_style: style,
            ordered_list_style: ordered,
            ..Default::default()
        }
    }

    fn normalize(doc: &str, trim: bool) -> String {
        normalize_lists(doc, trim, &LintRules::default(), &PrettierMarkdownConfig::default()).unwrap()
    }

    #[test]
    fn test_bullets_and_spacing() {
        let doc = "Intro\n\n* one\n\n+   two\n\n*  three\n\nAfter\n";
        assert_eq!(normalize(doc, false), "Intro\n\n- one\n- two\n- three\n\nAfter\n");
    }

    #[test]
    fn test_configured_bullet() {
        let doc = "- a\n- b\n";
        let out = normalize_lists(
            doc,
            false,
            &rules(UnorderedListStyle::Asterisk, OrderedListStyle::OneOrOrdered),
            &PrettierMarkdownConfig::default(),
        )
        .unwrap();
        assert_eq!(out, "* a\n* b\n");
    }

    #[test]
    fn test_ordered_numbering() {
        let doc = "3. a\n3. b\n3. c\n";
        let incrementing = normalize_lists(
            doc,
            false,
            &rules(UnorderedListStyle::Dash, OrderedListStyle::Ordered),
            &PrettierMarkdownConfig::default(),
        )
        .unwrap();
        assert_eq!(incrementing, "3. a\n4. b\n5. c\n");

        let constant = normalize_lists(
            "1. a\n2. b\n",
            false,
            &rules(UnorderedListStyle::Dash, OrderedListStyle::One),
            &PrettierMarkdownConfig::default(),
        )
        .unwrap();
        assert_eq!(constant, "1. a\n1. b\n");
    }

    #[test]
    fn test_nested_lists() {
        let doc = "* parent\n    * child one\n\n    * child two\n* sibling\n";
        assert_eq!(normalize(doc, false), "- parent\n  - child one\n  - child two\n- sibling\n");
    }

    #[test]
    fn test_continuation_reindented() {
        let doc = "10. first line\n    continued\n11. next\n";
        let out = normalize_lists(
            doc,
            false,
            &rules(UnorderedListStyle::Dash, OrderedListStyle::Ordered),
            &PrettierMarkdownConfig::default(),
        )
        .unwrap();
        assert_eq!(out, "10. first line\n    continued\n11. next\n");
    }

    #[test]
    fn test_trimming_inside_items() {
        let doc = "- para one\n\n\n\n  para two\n- next\n";
        assert_eq!(normalize(doc, false), doc);
        assert_eq!(normalize(doc, true), "- para one\n\n  para two\n- next\n");
    }

    #[test]
    fn test_fenced_code_untouched() {
        let doc = "```\n* not a list\n\n* still not\n```\n";
        assert_eq!(normalize(doc, true), doc);
    }

    #[test]
    fn test_code_inside_item_keeps_blank_lines() {
        let doc = "- item\n\n  ```\n  a\n\n\n  b\n  ```\n";
        assert_eq!(normalize(doc, true), doc);
    }

    #[test]
    fn test_front_matter_preserved() {
        let doc = "---\ntags:\n* a\n---\n* x\n";
        assert_eq!(normalize(doc, false), "---\ntags:\n* a\n---\n- x\n");
    }

    #[test]
    fn test_thematic_break_is_not_a_list() {
        let doc = "Text\n\n* * *\n\nMore\n";
        assert_eq!(normalize(doc, false), doc);
    }

    #[test]
    fn test_tab_width_marker_spacing() {
        let options = PrettierMarkdownConfig {
            use_tabs: true,
            tab_width: 4,
            ..Default::default()
        };
        let out = normalize_lists("- a\n  b\n", false, &LintRules::default(), &options).unwrap();
        assert_eq!(out, "-   a\n    b\n");
    }

    #[test]
    fn test_crlf_preserved() {
        let doc = "* a\r\n\r\n* b\r\n";
        assert_eq!(normalize(doc, false), "- a\r\n- b\r\n");
    }

    #[test]
    fn test_excessive_nesting_is_an_error() {
        let doc = format!("{}x\n", "- ".repeat(MAX_NESTING_DEPTH + 5));
        let result = normalize_lists(&doc, false, &LintRules::default(), &PrettierMarkdownConfig::default());
        assert_eq!(
            result,
            Err(ListStructureError::NestingTooDeep {
                max: MAX_NESTING_DEPTH
            })
        );
    }

    #[test]
    fn test_idempotent_on_sample() {
        let doc = "# Title\n\n* a\n\n  more a\n* b\n    1) x\n    2) y\n\n\nText\n";
        let once = normalize(doc, true);
        assert_eq!(normalize(&once, true), once);
    }

    proptest! {
        #[test]
        fn prop_normalization_is_idempotent(
            items in proptest::collection::vec(
                (prop_oneof![Just("-"), Just("*"), Just("+"), Just("1."), Just("7)")],
                 0usize..3, "[a-z]{1,6}", 0usize..3),
                1..8,
            ),
            trim in any::<bool>(),
        ) {
            let mut doc = String::new();
            for (marker, indent, text, blanks) in &items {
                doc.push_str(&" ".repeat(*indent));
                doc.push_str(marker);
                doc.push(' ');
                doc.push_str(text);
                doc.push('\n');
                doc.push_str(&"\n".repeat(*blanks));
            }
            let once = normalize(&doc, trim);
            let twice = normalize(&once, trim);
            prop_assert_eq!(once, twice);
        }
    }
}
