//!
//! YAML front matter handling.
//!
//! Front matter is a `---` delimited block at the very start of a document.
//! Transforms that must not touch it split the document with [`extract`],
//! work on the body, and put it back together with [`FrontMatter::reassemble`]
//! (byte-identical) or [`reconstruct`] (canonical LF delimiters).
//!
//! [`validate`] is a shallow line check, not a YAML parser: every non-blank,
//! non-comment line must contain `:` or start with `-`. Multi-line scalars and
//! other valid YAML this scan does not understand can be rejected; callers
//! treat a failed check as "leave the document alone".

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static FRONT_MATTER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A(---\r?\n)(.*?)(\r?\n---(?:\r?\n|\z))").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontMatterError {
    #[error("Invalid front matter at line {line}: '{content}' is neither a key nor a list item")]
    InvalidLine { line: usize, content: String },
}

/// A document split into its front matter and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// Front matter content between the delimiters, without them.
    pub raw: Option<&'a str>,
    pub body: &'a str,
    opening: &'a str,
    closing: &'a str,
}

impl<'a> FrontMatter<'a> {
    pub fn has_front_matter(&self) -> bool {
        self.raw.is_some()
    }

    /// Length in bytes of the front matter prefix, delimiters included.
    pub fn prefix_len(&self) -> usize {
        self.raw
            .map(|raw| self.opening.len() + raw.len() + self.closing.len())
            .unwrap_or(0)
    }

    /// The original prefix (delimiters included), or an empty string.
    pub fn prefix(&self) -> String {
        match self.raw {
            Some(raw) => format!("{}{}{}", self.opening, raw, self.closing),
            None => String::new(),
        }
    }

    /// Reattach the original front matter to `body`, keeping the original
    /// delimiter line endings.
    pub fn reassemble(&self, body: &str) -> String {
        let mut out = self.prefix();
        out.push_str(body);
        out
    }

    /// Check the front matter, if any.
    pub fn validate(&self) -> Result<(), FrontMatterError> {
        match self.raw {
            Some(raw) => validate(raw),
            None => Ok(()),
        }
    }
}

/// Split `doc` into front matter and body. Without a leading block the body
/// is the whole document.
pub fn extract(doc: &str) -> FrontMatter<'_> {
    match FRONT_MATTER_REGEX.captures(doc) {
        Some(caps) => {
            let (Some(opening), Some(raw), Some(closing)) = (caps.get(1), caps.get(2), caps.get(3)) else {
                return FrontMatter {
                    raw: None,
                    body: doc,
                    opening: "",
                    closing: "",
                };
            };
            FrontMatter {
                raw: Some(raw.as_str()),
                body: &doc[closing.end()..],
                opening: opening.as_str(),
                closing: closing.as_str(),
            }
        }
        None => FrontMatter {
            raw: None,
            body: doc,
            opening: "",
            closing: "",
        },
    }
}

/// Wrap `body` with `front_matter` using LF delimiters. `None` returns the body.
pub fn reconstruct(front_matter: Option<&str>, body: &str) -> String {
    match front_matter {
        Some(raw) => format!("---\n{raw}\n---\n{body}"),
        None => body.to_string(),
    }
}

/// Shallow syntactic check of front matter content.
pub fn validate(front_matter: &str) -> Result<(), FrontMatterError> {
    for (idx, line) in front_matter.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !trimmed.contains(':') && !trimmed.starts_with('-') {
            return Err(FrontMatterError::InvalidLine {
                line: idx + 2,
                content: trimmed.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_with_front_matter() {
        let doc = "---\ntitle: Test\ntags:\n  - a\n---\n# Heading\n";
        let fm = extract(doc);
        assert!(fm.has_front_matter());
        assert_eq!(fm.raw, Some("title: Test\ntags:\n  - a"));
        assert_eq!(fm.body, "# Heading\n");
        assert!(fm.validate().is_ok());
    }

    #[test]
    fn test_extract_without_front_matter() {
        let doc = "# Heading\n---\nnot front matter\n";
        let fm = extract(doc);
        assert!(!fm.has_front_matter());
        assert_eq!(fm.body, doc);
        assert_eq!(fm.prefix_len(), 0);
    }

    #[test]
    fn test_extract_crlf() {
        let doc = "---\r\ntitle: Test\r\n---\r\nBody\r\n";
        let fm = extract(doc);
        assert_eq!(fm.raw, Some("title: Test"));
        assert_eq!(fm.body, "Body\r\n");
        assert_eq!(fm.reassemble(fm.body), doc);
    }

    #[test]
    fn test_reconstruct() {
        assert_eq!(reconstruct(None, "body"), "body");
        assert_eq!(reconstruct(Some("a: 1"), "body\n"), "---\na: 1\n---\nbody\n");
    }

    #[test]
    fn test_validate_rejects_bare_words() {
        let err = validate("title: ok\njust some words\n").unwrap_err();
        assert_eq!(
            err,
            FrontMatterError::InvalidLine {
                line: 3,
                content: "just some words".to_string()
            }
        );
    }

    #[test]
    fn test_validate_allows_comments_and_lists() {
        assert!(validate("# comment\n\n- item\nkey: value").is_ok());
    }

    proptest! {
        #[test]
        fn prop_reconstruct_inverts_extract(
            keys in proptest::collection::vec("[a-z]{1,8}", 1..5),
            body in "[a-zA-Z #\n]{0,60}",
        ) {
            let raw = keys.iter().map(|k| format!("{k}: value")).collect::<Vec<_>>().join("\n");
            let doc = format!("---\n{raw}\n---\n{body}");
            let fm = extract(&doc);
            prop_assert!(fm.validate().is_ok());
            prop_assert_eq!(reconstruct(fm.raw, fm.body), doc.clone());
            prop_assert_eq!(fm.reassemble(fm.body), doc);
        }
    }
}
