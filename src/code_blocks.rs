//!
//! Fenced code block discovery and in-place rewriting.
//!
//! Blocks are found with a line scanner that follows the CommonMark fence
//! rules the rest of the crate relies on: up to three spaces of indentation,
//! three or more backticks or tildes, and a closing fence of the same
//! character that is at least as long as the opening one. Unterminated
//! fences are not reported as blocks.
//!
//! Rewrites are applied left to right. Every splice shifts the text after it,
//! so each block's original offsets are adjusted by the running sum of
//! `new_len - old_len` of all earlier splices.

use crate::code_formatter::CodeFormatter;
use crate::code_languages;
use crate::config::PrettierMarkdownConfig;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeBlockError {
    #[error("Formatted {language} block at line {line} contains its own closing fence")]
    FenceCollision { language: String, line: usize },
    #[error("Code block at byte {offset} no longer matches the document")]
    OffsetMismatch { offset: usize },
}

/// A fenced code block located in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedCodeBlock {
    /// First word of the info string, lowercased. Empty when untagged.
    pub language: String,
    /// Full info string after the fence characters, trimmed.
    pub info_string: String,
    /// The fence character used (` or ~).
    pub fence_char: char,
    /// Length of the opening fence.
    pub fence_length: usize,
    /// Leading spaces on the opening fence line.
    pub indent: usize,
    /// Block body with the fence indentation removed, lines joined with `\n`.
    pub code: String,
    /// Byte offset of the opening fence line.
    pub start_offset: usize,
    /// Byte offset just past the closing fence (its line ending excluded).
    pub end_offset: usize,
    /// `doc[start_offset..end_offset]` at extraction time.
    pub block_text: String,
    /// 0-indexed line of the opening fence.
    pub start_line: usize,
    /// 0-indexed line of the closing fence.
    pub end_line: usize,
    line_ending: &'static str,
}

impl FencedCodeBlock {
    fn fence(&self) -> String {
        self.fence_char.to_string().repeat(self.fence_length)
    }

    /// Render this block with `code` as its new body, keeping fence, info
    /// string, indentation and line endings.
    pub fn render_with(&self, code: &str) -> String {
        let indent = " ".repeat(self.indent);
        let eol = self.line_ending;
        let fence = self.fence();

        let mut out = format!("{indent}{fence}{}{eol}", self.info_string);
        if !code.is_empty() {
            for line in code.split('\n') {
                if !line.is_empty() {
                    out.push_str(&indent);
                    out.push_str(line);
                }
                out.push_str(eol);
            }
        }
        out.push_str(&indent);
        out.push_str(&fence);
        out
    }

    fn closes_fence(&self, line: &str) -> bool {
        parse_closing_fence(line, self.fence_char, self.fence_length)
    }
}

pub(crate) struct OpenFence {
    pub(crate) indent: usize,
    pub(crate) fence_char: char,
    pub(crate) fence_length: usize,
    pub(crate) info_string: String,
}

/// Parse an opening fence line (line ending already stripped).
pub(crate) fn parse_opening_fence(line: &str) -> Option<OpenFence> {
    let trimmed = line.trim_start_matches(' ');
    let indent = line.len() - trimmed.len();
    if indent > 3 {
        return None;
    }

    let fence_char = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let fence_length = trimmed.chars().take_while(|&c| c == fence_char).count();
    if fence_length < 3 {
        return None;
    }

    let info_string = trimmed[fence_length..].trim();
    if fence_char == '`' && info_string.contains('`') {
        return None;
    }

    Some(OpenFence {
        indent,
        fence_char,
        fence_length,
        info_string: info_string.to_string(),
    })
}

pub(crate) fn parse_closing_fence(line: &str, fence_char: char, min_length: usize) -> bool {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return false;
    }
    let run = trimmed.chars().take_while(|&c| c == fence_char).count();
    run >= min_length && trimmed[run..].trim().is_empty()
}

fn strip_line_ending(line: &str) -> (&str, &'static str) {
    if let Some(stripped) = line.strip_suffix("\r\n") {
        (stripped, "\r\n")
    } else if let Some(stripped) = line.strip_suffix('\n') {
        (stripped, "\n")
    } else {
        (line, "\n")
    }
}

fn dedent(line: &str, indent: usize) -> &str {
    let leading = line.len() - line.trim_start_matches(' ').len();
    &line[leading.min(indent)..]
}

/// Find every terminated fenced code block in document order.
pub fn extract_blocks(doc: &str) -> Vec<FencedCodeBlock> {
    struct Open {
        fence: OpenFence,
        start_offset: usize,
        start_line: usize,
        line_ending: &'static str,
        body: Vec<String>,
    }

    let mut blocks = Vec::new();
    let mut current: Option<Open> = None;
    let mut offset = 0;

    for (line_idx, raw_line) in doc.split_inclusive('\n').enumerate() {
        let (line, eol) = strip_line_ending(raw_line);

        match current.take() {
            None => {
                if let Some(fence) = parse_opening_fence(line) {
                    current = Some(Open {
                        fence,
                        start_offset: offset,
                        start_line: line_idx,
                        line_ending: eol,
                        body: Vec::new(),
                    });
                }
            }
            Some(mut open) => {
                if parse_closing_fence(line, open.fence.fence_char, open.fence.fence_length) {
                    let end_offset = offset + line.len();
                    let language = open
                        .fence
                        .info_string
                        .split_whitespace()
                        .next()
                        .unwrap_or("")
                        .to_lowercase();
                    blocks.push(FencedCodeBlock {
                        language,
                        info_string: open.fence.info_string,
                        fence_char: open.fence.fence_char,
                        fence_length: open.fence.fence_length,
                        indent: open.fence.indent,
                        code: open.body.join("\n"),
                        start_offset: open.start_offset,
                        end_offset,
                        block_text: doc[open.start_offset..end_offset].to_string(),
                        start_line: open.start_line,
                        end_line: line_idx,
                        line_ending: open.line_ending,
                    });
                } else {
                    open.body.push(dedent(line, open.fence.indent).to_string());
                    current = Some(open);
                }
            }
        }

        offset += raw_line.len();
    }

    if let Some(open) = current {
        log::debug!("Skipping unterminated code fence at line {}", open.start_line + 1);
    }

    blocks
}

/// Apply `rewrite` to every block left to right. `Ok(None)` keeps a block.
pub fn rewrite_blocks<F>(doc: &str, blocks: &[FencedCodeBlock], mut rewrite: F) -> Result<String, CodeBlockError>
where
    F: FnMut(&FencedCodeBlock) -> Result<Option<String>, CodeBlockError>,
{
    let mut result = doc.to_string();
    let mut delta: isize = 0;

    for block in blocks {
        let Some(replacement) = rewrite(block)? else {
            continue;
        };

        let start = block.start_offset.checked_add_signed(delta);
        let end = block.end_offset.checked_add_signed(delta);
        let (Some(start), Some(end)) = (start, end) else {
            return Err(CodeBlockError::OffsetMismatch {
                offset: block.start_offset,
            });
        };
        if result.get(start..end) != Some(block.block_text.as_str()) {
            return Err(CodeBlockError::OffsetMismatch {
                offset: block.start_offset,
            });
        }

        result.replace_range(start..end, &replacement);
        delta += replacement.len() as isize - block.block_text.len() as isize;
    }

    Ok(result)
}

/// Reformat the bodies of blocks whose language is in `enabled_languages`
/// (every tagged block when the list is empty).
///
/// A formatter error leaves that block untouched and processing continues.
/// Output that would close the fence early is rejected as an error for the
/// whole document.
pub fn format_all(
    doc: &str,
    enabled_languages: &[String],
    formatter: &dyn CodeFormatter,
    options: &PrettierMarkdownConfig,
) -> Result<String, CodeBlockError> {
    let blocks = extract_blocks(doc);
    if blocks.is_empty() {
        return Ok(doc.to_string());
    }

    rewrite_blocks(doc, &blocks, |block| {
        if block.language.is_empty() {
            return Ok(None);
        }
        if !enabled_languages.is_empty() && !enabled_languages.iter().any(|l| l == &block.language) {
            return Ok(None);
        }

        let formatted = match formatter.format_code(&block.language, &block.code, options) {
            Ok(formatted) => formatted,
            Err(e) => {
                log::debug!(
                    "Leaving {} block at line {} unformatted: {e}",
                    block.language,
                    block.start_line + 1
                );
                return Ok(None);
            }
        };

        let formatted = formatted.trim_end_matches(['\n', '\r']).replace("\r\n", "\n");
        if formatted == block.code {
            return Ok(None);
        }
        if formatted.split('\n').any(|line| block.closes_fence(line)) {
            return Err(CodeBlockError::FenceCollision {
                language: block.language.clone(),
                line: block.start_line + 1,
            });
        }

        Ok(Some(block.render_with(&formatted)))
    })
}

/// Trim surrounding whitespace from each line of shell blocks. Blank lines
/// and comment lines are kept as they are.
pub fn normalize_shell_blocks(doc: &str) -> Result<String, CodeBlockError> {
    let blocks = extract_blocks(doc);

    rewrite_blocks(doc, &blocks, |block| {
        if !code_languages::is_shell_language(&block.language) {
            return Ok(None);
        }

        let normalized = block
            .code
            .split('\n')
            .map(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    line
                } else {
                    trimmed
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        if normalized == block.code {
            Ok(None)
        } else {
            Ok(Some(block.render_with(&normalized)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_executor::ToolError;
    use pretty_assertions::assert_eq;

    struct MapFormatter(fn(&str) -> String);

    impl CodeFormatter for MapFormatter {
        fn name(&self) -> &'static str {
            "map"
        }

        fn format_code(&self, _language: &str, code: &str, _options: &PrettierMarkdownConfig) -> Result<String, ToolError> {
            Ok((self.0)(code))
        }
    }

    struct FailingFormatter;

    impl CodeFormatter for FailingFormatter {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn format_code(&self, language: &str, _code: &str, _options: &PrettierMarkdownConfig) -> Result<String, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool: language.to_string(),
                message: "boom".to_string(),
            })
        }
    }

    #[test]
    fn test_extract_blocks() {
        let doc = "Intro\n```js title=\"a\"\nlet x = 1;\n```\n\n~~~~\nplain\n~~~~\n";
        let blocks = extract_blocks(doc);
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].language, "js");
        assert_eq!(blocks[0].info_string, "js title=\"a\"");
        assert_eq!(blocks[0].code, "let x = 1;");
        assert_eq!(blocks[0].start_line, 1);
        assert_eq!(blocks[0].end_line, 3);
        assert_eq!(&doc[blocks[0].start_offset..blocks[0].end_offset], blocks[0].block_text);

        assert_eq!(blocks[1].language, "");
        assert_eq!(blocks[1].fence_char, '~');
        assert_eq!(blocks[1].fence_length, 4);
    }

    #[test]
    fn test_closing_fence_must_match() {
        let doc = "````md\n```\ninner\n```\n````\n";
        let blocks = extract_blocks(doc);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code, "```\ninner\n```");
    }

    #[test]
    fn test_unterminated_fence_is_skipped() {
        let doc = "```js\nlet x = 1;\n";
        assert!(extract_blocks(doc).is_empty());
    }

    #[test]
    fn test_splices_use_cumulative_offsets() {
        let doc = "A\n```js\nx=1\n```\nB\n```js\ny=2\n```\nC";
        let formatter = MapFormatter(|code| match code {
            "x=1" => "x".to_string(),
            "y=2" => "const y = 2;\nconsole.log(y);".to_string(),
            other => other.to_string(),
        });

        let result = format_all(doc, &[], &formatter, &PrettierMarkdownConfig::default()).unwrap();
        assert_eq!(result, "A\n```js\nx\n```\nB\n```js\nconst y = 2;\nconsole.log(y);\n```\nC");
    }

    #[test]
    fn test_language_filter() {
        let doc = "```js\na\n```\n```json\nb\n```\n";
        let formatter = MapFormatter(|code| code.to_uppercase());
        let result = format_all(doc, &["json".to_string()], &formatter, &PrettierMarkdownConfig::default()).unwrap();
        assert_eq!(result, "```js\na\n```\n```json\nB\n```\n");
    }

    #[test]
    fn test_formatter_failure_passes_through() {
        let doc = "```js\nlet  x\n```\n";
        let result = format_all(doc, &[], &FailingFormatter, &PrettierMarkdownConfig::default()).unwrap();
        assert_eq!(result, doc);
    }

    #[test]
    fn test_fence_collision_is_an_error() {
        let doc = "```md\ntext\n```\n";
        let formatter = MapFormatter(|_| "text\n```\nmore".to_string());
        let result = format_all(doc, &[], &formatter, &PrettierMarkdownConfig::default());
        assert!(matches!(result, Err(CodeBlockError::FenceCollision { .. })));
    }

    #[test]
    fn test_indented_block_keeps_indent_and_crlf() {
        let doc = "- item\r\n\r\n  ```json\r\n  {\"a\":1}\r\n  ```\r\n";
        let formatter = MapFormatter(|_| "{\n  \"a\": 1\n}\n".to_string());
        let result = format_all(doc, &[], &formatter, &PrettierMarkdownConfig::default()).unwrap();
        assert_eq!(result, "- item\r\n\r\n  ```json\r\n  {\r\n    \"a\": 1\r\n  }\r\n  ```\r\n");
    }

    #[test]
    fn test_normalize_shell_blocks() {
        let doc = "```bash\n   echo hi   \n  # keep me  \n\n\tls -la\n```\n```python\n  x = 1\n```\n";
        let result = normalize_shell_blocks(doc).unwrap();
        assert_eq!(
            result,
            "```bash\necho hi\n  # keep me  \n\nls -la\n```\n```python\n  x = 1\n```\n"
        );
    }
}
