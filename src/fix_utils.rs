//! Deterministic fixes the diagnostic engine cannot make on its own.
//!
//! They run after the engine's patches, on the patched text, and work line by
//! line so CRLF documents keep their endings.

use crate::engine::RawDiagnostic;
use regex::Regex;
use std::sync::LazyLock;

static EMPTY_BACKTICK_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^```\s*$").unwrap());
static EMPTY_TILDE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^~~~\s*$").unwrap());
static OVERSIZED_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(`{4,}|~{4,})(.*)$").unwrap());
static FENCE_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(```|~~~)").unwrap());
static BACKTICK_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^`{3,}\s*$").unwrap());
static TILDE_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^~{3,}\s*$").unwrap());

/// Tag untagged fences flagged by MD040 with `default_language`.
///
/// Line numbers come from the diagnostics of the lint run that preceded the
/// engine's fixes; a flagged line is only touched when it is still exactly an
/// empty fence.
pub fn fix_md040_violations(content: &str, diagnostics: &[RawDiagnostic], default_language: &str) -> String {
    if default_language.is_empty() {
        return content.to_string();
    }
    let mut flagged: Vec<usize> = diagnostics
        .iter()
        .filter(|d| d.rule_names.iter().any(|name| name == "MD040"))
        .map(|d| d.line_number)
        .collect();
    if flagged.is_empty() {
        return content.to_string();
    }
    flagged.sort_unstable();
    flagged.dedup();

    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    for line_number in flagged.into_iter().rev() {
        let Some(line) = line_number.checked_sub(1).and_then(|idx| lines.get_mut(idx)) else {
            continue;
        };
        let (text, cr) = match line.strip_suffix('\r') {
            Some(text) => (text, "\r"),
            None => (line.as_str(), ""),
        };
        let fence = if EMPTY_BACKTICK_FENCE.is_match(text) {
            "```"
        } else if EMPTY_TILDE_FENCE.is_match(text) {
            "~~~"
        } else {
            continue;
        };
        *line = format!("{fence}{default_language}{cr}");
    }
    lines.join("\n")
}

/// Shorten fences of four or more backticks or tildes to three.
pub fn fix_oversized_fence_markers(content: &str) -> String {
    content
        .split('\n')
        .map(|line| match OVERSIZED_FENCE.captures(line) {
            Some(caps) => {
                let fence = if line.starts_with('`') { "```" } else { "~~~" };
                format!("{fence}{}", &caps[2])
            }
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Delete fenced blocks whose body is only blank lines, fences included.
/// Unterminated fences stay.
pub fn remove_empty_code_blocks(content: &str) -> String {
    let mut lines: Vec<&str> = content.split('\n').collect();
    let mut empty_blocks = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let Some(open) = FENCE_OPEN.find(lines[i]) else {
            i += 1;
            continue;
        };
        let close = if open.as_str().starts_with('`') {
            &BACKTICK_CLOSE
        } else {
            &TILDE_CLOSE
        };

        let mut has_content = false;
        let mut closing = None;
        for (j, line) in lines.iter().enumerate().skip(i + 1) {
            if close.is_match(line) {
                closing = Some(j);
                break;
            }
            if !line.trim().is_empty() {
                has_content = true;
            }
        }

        match closing {
            Some(end) => {
                if !has_content {
                    empty_blocks.push((i, end));
                }
                i = end + 1;
            }
            None => i += 1,
        }
    }

    for (start, end) in empty_blocks.into_iter().rev() {
        lines.drain(start..=end);
    }
    lines.join("\n")
}

/// The three supplemental passes, in order.
pub fn apply_supplemental_fixes(content: &str, diagnostics: &[RawDiagnostic], default_language: &str) -> String {
    let fixed = fix_md040_violations(content, diagnostics, default_language);
    let fixed = fix_oversized_fence_markers(&fixed);
    remove_empty_code_blocks(&fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn md040(line: usize) -> RawDiagnostic {
        RawDiagnostic::new(
            line,
            &["MD040", "fenced-code-language"],
            "Fenced code blocks should have a language specified",
        )
    }

    #[test]
    fn test_md040_adds_default_language() {
        let content = "# A\n\n```\ncode\n```\n\n~~~\nmore\n~~~\n";
        let fixed = fix_md040_violations(content, &[md040(3), md040(7)], "text");
        assert_eq!(fixed, "# A\n\n```text\ncode\n```\n\n~~~text\nmore\n~~~\n");
    }

    #[test]
    fn test_md040_skips_lines_that_changed() {
        let content = "```rust\ncode\n```\n";
        assert_eq!(fix_md040_violations(content, &[md040(1)], "text"), content);
        assert_eq!(fix_md040_violations(content, &[md040(40)], "text"), content);
    }

    #[test]
    fn test_md040_ignores_other_rules_and_empty_language() {
        let content = "```\ncode\n```";
        let other = RawDiagnostic::new(1, &["MD031"], "x");
        assert_eq!(fix_md040_violations(content, &[other], "text"), content);
        assert_eq!(fix_md040_violations(content, &[md040(1)], ""), content);
    }

    #[test]
    fn test_md040_keeps_crlf() {
        let content = "```\r\ncode\r\n```\r\n";
        assert_eq!(fix_md040_violations(content, &[md040(1)], "sh"), "```sh\r\ncode\r\n```\r\n");
    }

    #[test]
    fn test_oversized_fences() {
        assert_eq!(fix_oversized_fence_markers("`````python\nx\n`````"), "```python\nx\n```");
        assert_eq!(fix_oversized_fence_markers("~~~~\nx\n~~~~~~"), "~~~\nx\n~~~");
        assert_eq!(fix_oversized_fence_markers("```js\nx\n```"), "```js\nx\n```");
        assert_eq!(fix_oversized_fence_markers("  ````\nx"), "  ````\nx");
    }

    #[test]
    fn test_remove_empty_block() {
        assert_eq!(remove_empty_code_blocks("text\n```js\n\n\n```\nmore"), "text\nmore");
    }

    #[test]
    fn test_remove_keeps_blocks_with_content() {
        let content = "```\n\nx\n```\n~~~\n~~~\n";
        assert_eq!(remove_empty_code_blocks(content), "```\n\nx\n```\n");
    }

    #[test]
    fn test_remove_needs_matching_fence_char() {
        let content = "```\n\n~~~\n";
        assert_eq!(remove_empty_code_blocks(content), content);
    }

    #[test]
    fn test_unterminated_fence_untouched() {
        let content = "a\n```\n\n\n";
        assert_eq!(remove_empty_code_blocks(content), content);
    }

    #[test]
    fn test_several_empty_blocks_removed_bottom_up() {
        let content = "a\n```\n```\nb\n~~~\n   \n~~~\nc";
        assert_eq!(remove_empty_code_blocks(content), "a\nb\nc");
    }

    #[test]
    fn test_supplemental_passes_compose() {
        let content = "````\ncode\n````\n\n`````\n\n`````\n";
        let fixed = apply_supplemental_fixes(content, &[md040(1)], "text");
        assert_eq!(fixed, "```\ncode\n```\n\n");
    }
}
