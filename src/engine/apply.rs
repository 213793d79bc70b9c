//!
//! Application of engine-native patches, following markdownlint's `applyFixes`.
//!
//! Fixes are normalized, sorted bottom-up (and right-to-left within a line),
//! deduplicated, and applied to a split copy of the document. An edit that
//! overlaps an edit already applied on the same line is dropped.

use super::{FixInfo, RawDiagnostic};
use crate::utils::line_ending::detect_line_ending;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FixError {
    #[error("Fix for {rule} targets line {line}, but the document has {line_count} lines")]
    LineOutOfRange { rule: String, line: usize, line_count: usize },

    #[error("Fix for {rule} targets column {column} on line {line}, which has {length} characters")]
    ColumnOutOfRange {
        rule: String,
        line: usize,
        column: usize,
        length: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    line: usize,
    column: usize,
    delete_count: i64,
    insert_text: String,
}

impl Edit {
    fn from_fix(diagnostic: &RawDiagnostic, fix: &FixInfo) -> Self {
        Self {
            line: fix.line_number.unwrap_or(diagnostic.line_number),
            column: fix.edit_column.unwrap_or(1).max(1),
            delete_count: fix.delete_count.unwrap_or(0),
            insert_text: fix.insert_text.clone().unwrap_or_default(),
        }
    }

    fn deletes_line(&self) -> bool {
        self.delete_count == -1
    }
}

fn edit_order(a: &Edit, b: &Edit) -> Ordering {
    b.line
        .cmp(&a.line)
        .then_with(|| match (a.deletes_line(), b.deletes_line()) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => Ordering::Equal,
        })
        .then_with(|| b.column.cmp(&a.column))
        .then_with(|| b.insert_text.chars().count().cmp(&a.insert_text.chars().count()))
}

fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = content;
    while let Some(pos) = rest.find(['\r', '\n']) {
        lines.push(&rest[..pos]);
        let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[pos + skip..];
    }
    lines.push(rest);
    lines
}

fn splice(line: &str, edit: &Edit, line_ending: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let start = (edit.column - 1).min(chars.len());
    let end = (start + edit.delete_count.max(0) as usize).min(chars.len());

    let mut result: String = chars[..start].iter().collect();
    result.push_str(&edit.insert_text.replace('\n', line_ending));
    result.extend(&chars[end..]);
    result
}

/// Apply every fix attached to `diagnostics` to `content`.
pub fn apply_fixes(content: &str, diagnostics: &[RawDiagnostic]) -> Result<String, FixError> {
    let line_ending = detect_line_ending(content).as_str();
    let mut lines: Vec<Option<String>> = split_lines(content).into_iter().map(|l| Some(l.to_string())).collect();

    let mut edits = Vec::new();
    for diagnostic in diagnostics {
        let Some(fix) = &diagnostic.fix_info else {
            continue;
        };
        let edit = Edit::from_fix(diagnostic, fix);
        if edit.line == 0 || edit.line > lines.len() {
            return Err(FixError::LineOutOfRange {
                rule: diagnostic.code().to_string(),
                line: edit.line,
                line_count: lines.len(),
            });
        }
        let length = lines[edit.line - 1].as_deref().map_or(0, |l| l.chars().count());
        if !edit.deletes_line() && edit.column > length + 1 {
            return Err(FixError::ColumnOutOfRange {
                rule: diagnostic.code().to_string(),
                line: edit.line,
                column: edit.column,
                length,
            });
        }
        edits.push(edit);
    }

    edits.sort_by(edit_order);
    edits.dedup();

    // An insert-only edit followed by a delete-only edit at the same spot is a replacement.
    let mut merged: Vec<Edit> = Vec::with_capacity(edits.len());
    for mut edit in edits {
        if let Some(last) = merged.last()
            && last.line == edit.line
            && last.column == edit.column
            && edit.insert_text.is_empty()
            && edit.delete_count > 0
            && !last.insert_text.is_empty()
            && last.delete_count == 0
        {
            edit.insert_text = last.insert_text.clone();
            merged.pop();
        }
        merged.push(edit);
    }

    let mut last_line = None;
    let mut last_index: i64 = -1;
    for edit in &merged {
        let index = edit.column as i64 - 1;
        let applies = last_line != Some(edit.line)
            || edit.deletes_line()
            || index + edit.delete_count <= last_index - if edit.delete_count > 0 { 0 } else { 1 };

        if applies {
            let slot = &mut lines[edit.line - 1];
            *slot = match slot.as_deref() {
                _ if edit.deletes_line() => None,
                Some(line) => Some(splice(line, edit, line_ending)),
                None => None,
            };
        }
        last_line = Some(edit.line);
        last_index = index;
    }

    Ok(lines.into_iter().flatten().collect::<Vec<_>>().join(line_ending))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn diag(line: usize, fix: FixInfo) -> RawDiagnostic {
        RawDiagnostic::new(line, &["MD000", "test"], "test").fix(fix)
    }

    #[test]
    fn test_no_fixes_is_identity() {
        let content = "a\r\nb\r\n";
        let unfixable = RawDiagnostic::new(1, &["MD001"], "x");
        assert_eq!(apply_fixes(content, &[unfixable]).unwrap(), content);
    }

    #[test]
    fn test_insert_replace_and_delete() {
        let content = "#Title\ntrailing  \nremove me\nend";
        let fixes = vec![
            diag(1, FixInfo::insert(2, " ")),
            diag(2, FixInfo::delete(9, 2)),
            diag(3, FixInfo::delete_line()),
        ];
        assert_eq!(apply_fixes(content, &fixes).unwrap(), "# Title\ntrailing\nend");
    }

    #[test]
    fn test_newline_in_insert_uses_document_ending() {
        let content = "# A\r\ntext\r\n";
        let fixes = vec![diag(1, FixInfo::insert(4, "\n"))];
        assert_eq!(apply_fixes(content, &fixes).unwrap(), "# A\r\n\r\ntext\r\n");
    }

    #[test]
    fn test_fix_targets_other_line() {
        let content = "a\nb";
        let fixes = vec![diag(1, FixInfo::insert(2, "\n").on_line(2))];
        assert_eq!(apply_fixes(content, &fixes).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_duplicate_fixes_applied_once() {
        let content = "```\ncode\n```\n```\nmore\n```";
        let fixes = vec![diag(4, FixInfo::insert(1, "\n")), diag(4, FixInfo::insert(1, "\n"))];
        assert_eq!(apply_fixes(content, &fixes).unwrap(), "```\ncode\n```\n\n```\nmore\n```");
    }

    #[test]
    fn test_overlapping_edit_dropped() {
        let content = "abcdef";
        let fixes = vec![diag(1, FixInfo::replace(2, 3, "X")), diag(1, FixInfo::replace(3, 2, "Y"))];
        // Sorted right to left: the edit at column 3 applies, the one at column 2 overlaps it.
        assert_eq!(apply_fixes(content, &fixes).unwrap(), "abYef");
    }

    #[test]
    fn test_non_overlapping_edits_on_one_line() {
        let content = "*a* and *b*";
        let fixes = vec![
            diag(1, FixInfo::replace(1, 1, "_")),
            diag(1, FixInfo::replace(3, 1, "_")),
            diag(1, FixInfo::replace(9, 1, "_")),
            diag(1, FixInfo::replace(11, 1, "_")),
        ];
        assert_eq!(apply_fixes(content, &fixes).unwrap(), "_a_ and _b_");
    }

    #[test]
    fn test_insert_and_delete_merge() {
        let content = "- item";
        let fixes = vec![diag(1, FixInfo::insert(1, "*")), diag(1, FixInfo::delete(1, 1))];
        assert_eq!(apply_fixes(content, &fixes).unwrap(), "* item");
    }

    #[test]
    fn test_multibyte_columns() {
        let content = "héllo\tworld";
        let fixes = vec![diag(1, FixInfo::replace(6, 1, " "))];
        assert_eq!(apply_fixes(content, &fixes).unwrap(), "héllo world");
    }

    #[test]
    fn test_out_of_range_line() {
        let result = apply_fixes("a", &[diag(5, FixInfo::insert(1, "x"))]);
        assert!(matches!(result, Err(FixError::LineOutOfRange { line: 5, .. })));
    }

    #[test]
    fn test_out_of_range_column() {
        let result = apply_fixes("ab", &[diag(1, FixInfo::insert(9, "x"))]);
        assert!(matches!(result, Err(FixError::ColumnOutOfRange { column: 9, .. })));
    }

    #[test]
    fn test_deleting_consecutive_blank_lines() {
        let content = "a\n\n\n\nb\n";
        let fixes = vec![diag(3, FixInfo::delete_line()), diag(4, FixInfo::delete_line())];
        assert_eq!(apply_fixes(content, &fixes).unwrap(), "a\n\nb\n");
    }
}
