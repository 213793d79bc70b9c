//!
//! The host editor as seen by the fix and format operations.
//!
//! The core only ever reads the whole document and replaces it wholesale;
//! it never makes incremental edits.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Cursor position, both 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub ch: usize,
}

pub trait EditorHandle {
    fn get_value(&self) -> String;

    /// Replace the whole document. Completes before returning.
    fn set_value(&mut self, text: &str) -> Result<(), EditorError>;

    fn get_cursor(&self) -> Cursor;

    fn set_cursor(&mut self, cursor: Cursor);

    fn path(&self) -> Option<&Path>;

    fn extension(&self) -> Option<&str> {
        self.path().and_then(|p| p.extension()).and_then(|e| e.to_str())
    }
}

/// Keep `cursor` inside `text`.
fn clamp_cursor(text: &str, cursor: Cursor) -> Cursor {
    let line_count = text.split('\n').count();
    let line = cursor.line.min(line_count.saturating_sub(1));
    let width = text
        .split('\n')
        .nth(line)
        .map_or(0, |l| l.trim_end_matches('\r').chars().count());
    Cursor {
        line,
        ch: cursor.ch.min(width),
    }
}

/// An in-memory document.
#[derive(Debug, Clone, Default)]
pub struct MemoryEditor {
    content: String,
    cursor: Cursor,
    path: Option<PathBuf>,
    /// Number of `set_value` calls so far.
    pub writes: usize,
}

impl MemoryEditor {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl EditorHandle for MemoryEditor {
    fn get_value(&self) -> String {
        self.content.clone()
    }

    fn set_value(&mut self, text: &str) -> Result<(), EditorError> {
        self.content = text.to_string();
        self.cursor = clamp_cursor(&self.content, self.cursor);
        self.writes += 1;
        Ok(())
    }

    fn get_cursor(&self) -> Cursor {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = clamp_cursor(&self.content, cursor);
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// A document backed by a file; every `set_value` writes it out.
#[derive(Debug, Clone)]
pub struct FileEditor {
    path: PathBuf,
    content: String,
    cursor: Cursor,
}

impl FileEditor {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EditorError> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|source| EditorError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            path,
            content,
            cursor: Cursor::default(),
        })
    }
}

impl EditorHandle for FileEditor {
    fn get_value(&self) -> String {
        self.content.clone()
    }

    fn set_value(&mut self, text: &str) -> Result<(), EditorError> {
        if text != self.content {
            fs::write(&self.path, text).map_err(|source| EditorError::Write {
                path: self.path.display().to_string(),
                source,
            })?;
            self.content = text.to_string();
        }
        self.cursor = clamp_cursor(&self.content, self.cursor);
        Ok(())
    }

    fn get_cursor(&self) -> Cursor {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = clamp_cursor(&self.content, cursor);
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_editor_replaces_content() {
        let mut editor = MemoryEditor::new("one\ntwo\n");
        editor.set_cursor(Cursor { line: 1, ch: 2 });
        editor.set_value("x").unwrap();
        assert_eq!(editor.get_value(), "x");
        assert_eq!(editor.get_cursor(), Cursor { line: 0, ch: 1 });
        assert_eq!(editor.writes, 1);
    }

    #[test]
    fn test_cursor_clamped_to_document() {
        let mut editor = MemoryEditor::new("ab\r\ncdef");
        editor.set_cursor(Cursor { line: 0, ch: 10 });
        assert_eq!(editor.get_cursor(), Cursor { line: 0, ch: 2 });
        editor.set_cursor(Cursor { line: 7, ch: 3 });
        assert_eq!(editor.get_cursor(), Cursor { line: 1, ch: 3 });
    }

    #[test]
    fn test_extension() {
        let editor = MemoryEditor::new("").with_path("notes/todo.md");
        assert_eq!(editor.extension(), Some("md"));
        assert_eq!(MemoryEditor::new("").extension(), None);
    }

    #[test]
    fn test_file_editor_writes_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "#Title\n").unwrap();

        let mut editor = FileEditor::open(&path).unwrap();
        assert_eq!(editor.get_value(), "#Title\n");
        editor.set_value("# Title\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Title\n");
        assert_eq!(editor.extension(), Some("md"));
    }

    #[test]
    fn test_file_editor_missing_file() {
        let dir = tempdir().unwrap();
        let result = FileEditor::open(dir.path().join("missing.md"));
        assert!(matches!(result, Err(EditorError::Read { .. })));
    }
}
