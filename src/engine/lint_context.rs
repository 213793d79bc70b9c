//!
//! Line-oriented document model shared by all built-in rules.
//!
//! Front matter, fenced and indented code, headings (ATX and setext), list
//! items and thematic breaks are resolved once per lint run so that every
//! rule sees the same structure.

use crate::code_blocks::{parse_closing_fence, parse_opening_fence};
use crate::front_matter;
use pulldown_cmark::{Event, Options, Parser};
use std::ops::Range;

/// Pre-computed information about a line
#[derive(Debug, Clone, Default)]
pub struct LineInfo {
    /// Byte offset where this line starts in the document
    pub byte_offset: usize,
    /// Length of the line in bytes (without line ending)
    pub byte_len: usize,
    /// Number of bytes of leading whitespace
    pub indent: usize,
    /// Whether the line is blank (empty or only whitespace)
    pub is_blank: bool,
    /// Whether this line is inside a code block, fences included
    pub in_code_block: bool,
    /// Whether this line is an opening or closing code fence
    pub is_fence: bool,
    /// Whether this line is inside front matter, delimiters included
    pub in_front_matter: bool,
    /// Whether this line is a thematic break (---, ***, ___)
    pub is_horizontal_rule: bool,
    /// Whether this line underlines a setext heading
    pub is_setext_underline: bool,
    /// Whether this line is a blockquote line
    pub in_blockquote: bool,
    /// Whether this line looks like a table row
    pub is_table_row: bool,
    pub list_item: Option<ListItemInfo>,
    pub heading: Option<HeadingInfo>,
}

impl LineInfo {
    pub fn content<'a>(&self, source: &'a str) -> &'a str {
        &source[self.byte_offset..self.byte_offset + self.byte_len]
    }

    /// Whether rules that look at prose should skip this line.
    pub fn is_structural(&self) -> bool {
        self.in_code_block || self.in_front_matter
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemInfo {
    /// The marker used (*, -, +, or number with . or ))
    pub marker: String,
    pub is_ordered: bool,
    pub number: Option<u64>,
    /// Column where the marker starts (0-based)
    pub marker_column: usize,
    /// Number of whitespace characters between marker and content
    pub spaces_after_marker: usize,
    /// Column where content after marker starts
    pub content_column: usize,
}

impl ListItemInfo {
    /// Whether `other` continues a list started by this item: same bullet
    /// character, or same ordered delimiter.
    pub fn same_list_kind(&self, other: &ListItemInfo) -> bool {
        self.is_ordered == other.is_ordered && self.marker.chars().last() == other.marker.chars().last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingStyle {
    Atx,
    AtxClosed,
    Setext1,
    Setext2,
}

impl HeadingStyle {
    pub fn is_setext(self) -> bool {
        matches!(self, HeadingStyle::Setext1 | HeadingStyle::Setext2)
    }

    /// Name used by the heading-style rule.
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingStyle::Atx => "atx",
            HeadingStyle::AtxClosed => "atx_closed",
            HeadingStyle::Setext1 | HeadingStyle::Setext2 => "setext",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingInfo {
    /// Heading level (1-6 for ATX, 1-2 for setext)
    pub level: u8,
    pub style: HeadingStyle,
    /// Column where the marker (or setext text) starts
    pub marker_column: usize,
    /// Whitespace characters between the opening `#`s and the text
    pub spaces_after_marker: usize,
    /// The heading text, without markers
    pub text: String,
}

/// A code block region, 0-indexed inclusive line range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockInfo {
    pub start_line: usize,
    pub end_line: usize,
    pub fenced: bool,
    pub fence_char: Option<char>,
    pub info_string: String,
    pub closed: bool,
}

/// A run of list items at one nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListGroup {
    /// Nesting depth, 0 for top-level items
    pub level: usize,
    pub ordered: bool,
    /// 0-indexed lines of the items' markers
    pub items: Vec<usize>,
}

impl ListGroup {
    fn new(level: usize, ordered: bool, first: usize) -> Self {
        Self {
            level,
            ordered,
            items: vec![first],
        }
    }
}

/// A whole list, nested lists included; 0-indexed inclusive line range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBlock {
    pub start_line: usize,
    pub end_line: usize,
    pub groups: Vec<ListGroup>,
}

pub struct LintContext<'a> {
    pub content: &'a str,
    pub lines: Vec<LineInfo>,
    pub code_blocks: Vec<CodeBlockInfo>,
    pub line_offsets: Vec<usize>,
}

impl<'a> LintContext<'a> {
    pub fn new(content: &'a str) -> Self {
        let mut lines = split_lines(content);
        let line_offsets = lines.iter().map(|l| l.byte_offset).collect();

        mark_front_matter(content, &mut lines);
        let code_blocks = mark_code_blocks(content, &mut lines);
        mark_blocks(content, &mut lines);

        Self {
            content,
            lines,
            code_blocks,
            line_offsets,
        }
    }

    /// Line content without its line ending (0-indexed).
    pub fn line(&self, idx: usize) -> &'a str {
        self.lines.get(idx).map(|l| l.content(self.content)).unwrap_or("")
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Headings in document order with their 0-indexed line.
    pub fn headings(&self) -> impl Iterator<Item = (usize, &HeadingInfo)> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| line.heading.as_ref().map(|h| (idx, h)))
    }

    /// Last line of the heading starting at `idx` (the underline for setext).
    pub fn heading_end_line(&self, idx: usize) -> usize {
        match self.lines.get(idx).and_then(|l| l.heading.as_ref()) {
            Some(h) if h.style.is_setext() => idx + 1,
            _ => idx,
        }
    }

    /// CommonMark events with source ranges, for rules that inspect inline
    /// markup (emphasis, links, images). Front matter is reported as a
    /// metadata block.
    pub fn markdown_events(&self) -> impl Iterator<Item = (Event<'a>, Range<usize>)> + 'a {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        Parser::new_ext(self.content, options).into_offset_iter()
    }

    /// Map a byte offset to (line, column), both 1-based. Columns count characters.
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        match self.line_offsets.binary_search(&offset) {
            Ok(line) => (line + 1, 1),
            Err(line) => {
                let line_start = self.line_offsets.get(line.wrapping_sub(1)).copied().unwrap_or(0);
                let column = self.content.get(line_start..offset).map_or(1, |s| s.chars().count() + 1);
                (line, column)
            }
        }
    }

    /// Group list items into lists.
    ///
    /// A list runs from its first item through lazy and indented continuation
    /// lines, and across blank lines when more list content follows. Within a
    /// list, items sharing a marker column form one [`ListGroup`].
    pub fn list_blocks(&self) -> Vec<ListBlock> {
        let mut blocks = Vec::new();
        let mut idx = 0;

        while idx < self.lines.len() {
            let line = &self.lines[idx];
            let starts_list = !line.is_structural() && line.list_item.as_ref().is_some_and(|item| item.marker_column <= 3);
            if !starts_list {
                idx += 1;
                continue;
            }

            let start = idx;
            let mut end = idx;
            let mut item_lines = vec![idx];
            let mut min_content = self.lines[idx].list_item.as_ref().map_or(2, |i| i.content_column);
            let mut j = idx + 1;

            while j < self.lines.len() {
                let next = &self.lines[j];
                if next.in_front_matter {
                    break;
                }
                if next.is_blank {
                    j += 1;
                    continue;
                }
                let after_blank = self.lines[j - 1].is_blank;
                let indented = next.indent >= min_content.min(4) || (next.in_code_block && next.indent >= 2);

                if let Some(item) = next.list_item.as_ref().filter(|_| !next.in_code_block) {
                    if item.marker_column < min_content {
                        if !self.lines[start].list_item.as_ref().is_some_and(|first| first.same_list_kind(item)) {
                            break;
                        }
                        min_content = min_content.min(item.content_column);
                    }
                    item_lines.push(j);
                } else if indented {
                    // continuation
                } else if after_blank
                    || next.heading.is_some()
                    || next.is_horizontal_rule
                    || next.in_code_block
                    || next.is_table_row
                    || next.in_blockquote
                {
                    break;
                }
                end = j;
                j += 1;
            }

            blocks.push(ListBlock {
                start_line: start,
                end_line: end,
                groups: self.group_items(&item_lines),
            });
            idx = end + 1;
        }

        blocks
    }

    fn group_items(&self, item_lines: &[usize]) -> Vec<ListGroup> {
        let mut finished = Vec::new();
        let mut stack: Vec<(usize, ListGroup)> = Vec::new();

        for &line in item_lines {
            let Some(item) = &self.lines[line].list_item else {
                continue;
            };
            while let Some((column, _)) = stack.last() {
                if *column > item.marker_column {
                    if let Some((_, group)) = stack.pop() {
                        finished.push(group);
                    }
                } else {
                    break;
                }
            }
            match stack.last_mut() {
                Some((column, group)) if *column == item.marker_column && group.ordered == item.is_ordered => {
                    group.items.push(line);
                }
                Some((column, _)) if *column == item.marker_column => {
                    if let Some((_, group)) = stack.pop() {
                        finished.push(group);
                    }
                    let level = stack.len();
                    stack.push((item.marker_column, ListGroup::new(level, item.is_ordered, line)));
                }
                _ => {
                    let level = stack.len();
                    stack.push((item.marker_column, ListGroup::new(level, item.is_ordered, line)));
                }
            }
        }
        finished.extend(stack.into_iter().rev().map(|(_, group)| group));
        finished.sort_by_key(|group| group.items.first().copied());
        finished
    }
}

fn split_lines(content: &str) -> Vec<LineInfo> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in content.split_inclusive('\n') {
        let text = raw.strip_suffix('\n').unwrap_or(raw);
        let text = text.strip_suffix('\r').unwrap_or(text);
        let indent = text.len() - text.trim_start_matches([' ', '\t']).len();
        lines.push(LineInfo {
            byte_offset: offset,
            byte_len: text.len(),
            indent,
            is_blank: text.trim().is_empty(),
            ..Default::default()
        });
        offset += raw.len();
    }
    lines
}

fn mark_front_matter(content: &str, lines: &mut [LineInfo]) {
    let prefix_len = front_matter::extract(content).prefix_len();
    if prefix_len == 0 {
        return;
    }
    for line in lines.iter_mut().take_while(|l| l.byte_offset < prefix_len) {
        line.in_front_matter = true;
    }
}

fn mark_code_blocks(content: &str, lines: &mut [LineInfo]) -> Vec<CodeBlockInfo> {
    let mut blocks = Vec::new();
    let mut idx = 0;
    let mut list_context = false;

    while idx < lines.len() {
        if lines[idx].in_front_matter {
            idx += 1;
            continue;
        }
        let text = lines[idx].content(content);

        if let Some(fence) = parse_opening_fence(text) {
            let start = idx;
            let mut end = None;
            let mut j = idx + 1;
            while j < lines.len() {
                if parse_closing_fence(lines[j].content(content), fence.fence_char, fence.fence_length) {
                    end = Some(j);
                    break;
                }
                j += 1;
            }
            let end_line = end.unwrap_or(lines.len() - 1);
            for line in &mut lines[start..=end_line] {
                line.in_code_block = true;
            }
            lines[start].is_fence = true;
            if let Some(end) = end {
                lines[end].is_fence = true;
            }
            blocks.push(CodeBlockInfo {
                start_line: start,
                end_line,
                fenced: true,
                fence_char: Some(fence.fence_char),
                info_string: fence.info_string,
                closed: end.is_some(),
            });
            idx = end_line + 1;
            continue;
        }

        if parse_marker(text).is_some() {
            list_context = true;
        } else if !lines[idx].is_blank && lines[idx].indent == 0 {
            list_context = false;
        }

        let previous_blank = idx == 0 || lines[idx - 1].is_blank;
        let indented = !lines[idx].is_blank && leading_columns(text) >= 4;
        if indented && previous_blank && !list_context {
            let start = idx;
            let mut end = idx;
            let mut j = idx + 1;
            while j < lines.len() {
                let next = lines[j].content(content);
                if lines[j].is_blank {
                    j += 1;
                    continue;
                }
                if leading_columns(next) >= 4 {
                    end = j;
                    j += 1;
                } else {
                    break;
                }
            }
            for line in &mut lines[start..=end] {
                line.in_code_block = true;
            }
            blocks.push(CodeBlockInfo {
                start_line: start,
                end_line: end,
                fenced: false,
                fence_char: None,
                info_string: String::new(),
                closed: true,
            });
            idx = end + 1;
            continue;
        }

        idx += 1;
    }

    blocks
}

fn mark_blocks(content: &str, lines: &mut [LineInfo]) {
    for idx in 0..lines.len() {
        if lines[idx].is_structural() || lines[idx].is_blank {
            continue;
        }
        let text = lines[idx].content(content);
        let trimmed = text.trim_start();

        lines[idx].in_blockquote = trimmed.starts_with('>');
        lines[idx].is_table_row = trimmed.starts_with('|') || (trimmed.contains(" | ") && trimmed.ends_with('|'));

        if lines[idx].indent <= 3 && is_thematic_break(trimmed) {
            lines[idx].is_horizontal_rule = true;
        } else if let Some(heading) = parse_atx_heading(text) {
            lines[idx].heading = Some(heading);
            continue;
        } else if let Some(item) = parse_marker(text) {
            lines[idx].list_item = Some(item);
            continue;
        }

        // Setext underline: the previous line is paragraph text.
        if idx > 0 && let Some(level) = setext_level(text) {
            let prev = &lines[idx - 1];
            let prev_is_paragraph = !prev.is_blank
                && !prev.is_structural()
                && prev.heading.is_none()
                && prev.list_item.is_none()
                && !prev.is_horizontal_rule
                && !prev.is_setext_underline
                && !prev.in_blockquote
                && prev.indent <= 3;
            if prev_is_paragraph {
                let prev_text = prev.content(content);
                let heading = HeadingInfo {
                    level,
                    style: if level == 1 {
                        HeadingStyle::Setext1
                    } else {
                        HeadingStyle::Setext2
                    },
                    marker_column: prev.indent,
                    spaces_after_marker: 0,
                    text: prev_text.trim().to_string(),
                };
                lines[idx - 1].heading = Some(heading);
                lines[idx].is_setext_underline = true;
                lines[idx].is_horizontal_rule = false;
            }
        }
    }
}

fn leading_columns(text: &str) -> usize {
    let mut columns = 0;
    for c in text.chars() {
        match c {
            ' ' => columns += 1,
            '\t' => columns += 4 - (columns % 4),
            _ => break,
        }
    }
    columns
}

pub(crate) fn is_thematic_break(trimmed: &str) -> bool {
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

fn setext_level(text: &str) -> Option<u8> {
    let trimmed = text.trim_start_matches(' ');
    if text.len() - trimmed.len() > 3 {
        return None;
    }
    let trimmed = trimmed.trim_end();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c == '=') {
        Some(1)
    } else if !trimmed.is_empty() && trimmed.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

/// Parse an ATX heading line. Lines such as `#Heading` are not headings.
pub(crate) fn parse_atx_heading(text: &str) -> Option<HeadingInfo> {
    let trimmed = text.trim_start_matches(' ');
    let marker_column = text.len() - trimmed.len();
    if marker_column > 3 {
        return None;
    }
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let after_marker = rest.trim_start_matches([' ', '\t']);
    let spaces_after_marker = rest.len() - after_marker.len();

    let mut text_part = after_marker.trim_end();
    let mut style = HeadingStyle::Atx;
    let without_closing = text_part.trim_end_matches('#');
    if without_closing.len() < text_part.len()
        && (without_closing.is_empty() || without_closing.ends_with([' ', '\t']))
    {
        style = HeadingStyle::AtxClosed;
        text_part = without_closing.trim_end();
    }

    Some(HeadingInfo {
        level: hashes as u8,
        style,
        marker_column,
        spaces_after_marker,
        text: text_part.to_string(),
    })
}

pub(crate) fn parse_marker(text: &str) -> Option<ListItemInfo> {
    let trimmed = text.trim_start_matches(' ');
    let marker_column = text.len() - trimmed.len();
    if is_thematic_break(trimmed) {
        return None;
    }

    let marker_len = match trimmed.chars().next()? {
        '-' | '*' | '+' => 1,
        _ => {
            let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits == 0 || digits > 9 {
                return None;
            }
            trimmed[digits..].chars().next().filter(|c| *c == '.' || *c == ')')?;
            digits + 1
        }
    };

    let marker = &trimmed[..marker_len];
    let rest = &trimmed[marker_len..];
    let content = rest.trim_start_matches([' ', '\t']);
    let spaces_after_marker = rest.len() - content.len();
    if !rest.is_empty() && spaces_after_marker == 0 {
        return None;
    }

    let is_ordered = marker.ends_with(['.', ')']);
    let number = if is_ordered {
        marker[..marker.len() - 1].parse().ok()
    } else {
        None
    };

    Some(ListItemInfo {
        marker: marker.to_string(),
        is_ordered,
        number,
        marker_column,
        spaces_after_marker,
        content_column: marker_column + marker_len + spaces_after_marker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content() {
        let ctx = LintContext::new("");
        assert_eq!(ctx.line_count(), 0);
        assert!(ctx.code_blocks.is_empty());
    }

    #[test]
    fn test_offset_to_line_col() {
        let ctx = LintContext::new("# Title\n\nSecond line\nThird line");
        assert_eq!(ctx.line_offsets, vec![0, 8, 9, 21]);
        assert_eq!(ctx.offset_to_line_col(0), (1, 1));
        assert_eq!(ctx.offset_to_line_col(15), (3, 7));
        assert_eq!(ctx.offset_to_line_col(21), (4, 1));
    }

    #[test]
    fn test_headings() {
        let ctx = LintContext::new("# One\n\nTwo\n===\n\nThree\n---\n\n## Four ##\n\n#NotHeading\n");
        let headings: Vec<_> = ctx.headings().map(|(idx, h)| (idx, h.level, h.style, h.text.clone())).collect();
        assert_eq!(
            headings,
            vec![
                (0, 1, HeadingStyle::Atx, "One".to_string()),
                (2, 1, HeadingStyle::Setext1, "Two".to_string()),
                (5, 2, HeadingStyle::Setext2, "Three".to_string()),
                (8, 2, HeadingStyle::AtxClosed, "Four".to_string()),
            ]
        );
        assert!(ctx.lines[3].is_setext_underline);
        assert!(!ctx.lines[6].is_horizontal_rule);
        assert_eq!(ctx.heading_end_line(2), 3);
    }

    #[test]
    fn test_code_blocks_hide_structure() {
        let ctx = LintContext::new("```md\n# not heading\n```\n\n    indented code\n\n- item\n");
        assert_eq!(ctx.code_blocks.len(), 2);
        assert!(ctx.lines[1].in_code_block);
        assert!(ctx.lines[1].heading.is_none());
        assert!(ctx.lines[0].is_fence && ctx.lines[2].is_fence);
        assert!(ctx.lines[4].in_code_block);
        assert!(!ctx.code_blocks[1].fenced);
        assert!(ctx.lines[6].list_item.is_some());
    }

    #[test]
    fn test_list_continuation_is_not_code() {
        let ctx = LintContext::new("- item\n\n    continued paragraph\n");
        assert!(ctx.code_blocks.is_empty());
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let ctx = LintContext::new("text\n```\ncode\n# hidden\n");
        assert_eq!(ctx.code_blocks.len(), 1);
        assert!(!ctx.code_blocks[0].closed);
        assert!(ctx.lines[3].in_code_block);
    }

    #[test]
    fn test_front_matter_lines() {
        let ctx = LintContext::new("---\ntitle: x\n---\n# Heading\n");
        assert!(ctx.lines[0].in_front_matter && ctx.lines[2].in_front_matter);
        assert!(!ctx.lines[3].in_front_matter);
        assert!(ctx.lines[2].heading.is_none());
    }

    #[test]
    fn test_list_blocks() {
        let content = "Intro\n\n- a\n  - b\n  - c\n- d\nlazy\n\n1. one\n2. two\n\n# Heading\n- x\n";
        let ctx = LintContext::new(content);
        let blocks = ctx.list_blocks();
        assert_eq!(blocks.len(), 3);

        assert_eq!((blocks[0].start_line, blocks[0].end_line), (2, 6));
        assert_eq!(blocks[0].groups.len(), 2);
        assert_eq!(blocks[0].groups[0].items, vec![2, 5]);
        assert_eq!(blocks[0].groups[0].level, 0);
        assert_eq!(blocks[0].groups[1].items, vec![3, 4]);
        assert_eq!(blocks[0].groups[1].level, 1);

        assert_eq!((blocks[1].start_line, blocks[1].end_line), (8, 9));
        assert!(blocks[1].groups[0].ordered);

        assert_eq!((blocks[2].start_line, blocks[2].end_line), (12, 12));
    }

    #[test]
    fn test_loose_list_is_one_block() {
        let ctx = LintContext::new("- a\n\n- b\n\n  more b\n\nafter\n");
        let blocks = ctx.list_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (0, 4));
        assert_eq!(blocks[0].groups[0].items, vec![0, 2]);
    }

    #[test]
    fn test_list_items() {
        let ctx = LintContext::new("* a\n10) b\n-  c\n* * *\n");
        let a = ctx.lines[0].list_item.as_ref().unwrap();
        assert_eq!(a.marker, "*");
        let b = ctx.lines[1].list_item.as_ref().unwrap();
        assert!(b.is_ordered);
        assert_eq!(b.number, Some(10));
        assert_eq!(b.content_column, 4);
        assert_eq!(ctx.lines[2].list_item.as_ref().unwrap().spaces_after_marker, 2);
        assert!(ctx.lines[3].is_horizontal_rule);
    }
}
