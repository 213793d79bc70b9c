//!
//! Markdown formatting: post-processing followed by a pretty-printer.
//!
//! [`MarkdownFormatter::format`] never fails. A post-processing error stops
//! before the printer runs; a printer error leaves the document as it was.
//! Both report the reason in [`FormatResult::error`].

use crate::code_blocks::{parse_closing_fence, parse_opening_fence};
use crate::code_formatter::{BuiltinCodeFormatter, CodeFormatter};
use crate::config::{EndOfLine, LintRules, PostProcessingConfig, PrettierMarkdownConfig, ProseWrap};
use crate::front_matter;
use crate::post_processing::PostProcessor;
use crate::tool_executor::{Invocation, ToolError, ToolExecutor};
use crate::utils::line_ending::{LineEnding, normalize_line_ending, to_lf};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

/// Line openings that would turn a wrapped prose line into another block.
static BLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6}|[-*+]|\d{1,9}[.)]|>.*|=+|-+|`{3,}.*|~{3,}.*|\|.*|<.*|\[[^\]]*\]:.*)$").unwrap());

static NON_PROSE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6}(\s|$)|[-*+](\s|$)|\d{1,9}[.)](\s|$)|>|=+\s*$|-+\s*$|\*+\s*$|_+\s*$|`{3,}|~{3,}|<|\[[^\]]*\]:)").unwrap()
});

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("Cannot format document: {reason} (line {line})")]
    Unparsable { line: usize, reason: String },

    #[error(transparent)]
    Tool(ToolError),
}

/// Prettier's `(line:column)` suffix on syntax errors.
static ERROR_POSITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d+):\d+\)").unwrap());

impl From<ToolError> for PrinterError {
    fn from(error: ToolError) -> Self {
        match error {
            ToolError::InvalidInput { message, .. } => {
                let line = ERROR_POSITION
                    .captures(&message)
                    .and_then(|c| c[1].parse().ok())
                    .unwrap_or(0);
                PrinterError::Unparsable { line, reason: message }
            }
            other => PrinterError::Tool(other),
        }
    }
}

/// Rewrites a whole Markdown document into canonical layout.
pub trait PrettyPrinter: Send + Sync {
    fn name(&self) -> &'static str;

    fn format(&self, content: &str, options: &PrettierMarkdownConfig) -> Result<String, PrinterError>;
}

/// In-process whitespace canonicalization.
///
/// Front matter is kept byte for byte. Outside fenced code: trailing
/// whitespace goes (a two-space hard break before a non-blank line stays as
/// exactly two spaces), blank-line runs shrink to one, leading tabs become
/// spaces unless `useTabs` is set, and plain paragraphs are rewrapped per
/// `proseWrap`. The output ends with exactly one newline, in the configured
/// line ending.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPrettyPrinter;

impl BuiltinPrettyPrinter {
    fn code_line_mask(lines: &[&str]) -> Result<Vec<bool>, PrinterError> {
        let mut mask = vec![false; lines.len()];
        let mut idx = 0;
        while idx < lines.len() {
            let Some(fence) = parse_opening_fence(lines[idx]) else {
                idx += 1;
                continue;
            };
            let close = (idx + 1..lines.len())
                .find(|&j| parse_closing_fence(lines[j], fence.fence_char, fence.fence_length))
                .ok_or_else(|| PrinterError::Unparsable {
                    line: idx + 1,
                    reason: "unterminated code fence".to_string(),
                })?;
            mask[idx..=close].iter_mut().for_each(|m| *m = true);
            idx = close + 1;
        }
        Ok(mask)
    }

    fn expand_leading_tabs(line: &str, tab_width: usize) -> String {
        let tab_width = tab_width.max(1);
        let mut column = 0;
        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        while let Some(c) = rest.chars().next() {
            match c {
                '\t' => {
                    let advance = tab_width - column % tab_width;
                    out.push_str(&" ".repeat(advance));
                    column += advance;
                }
                ' ' => {
                    out.push(' ');
                    column += 1;
                }
                _ => break,
            }
            rest = &rest[c.len_utf8()..];
        }
        out.push_str(rest);
        out
    }

    fn trim_trailing(line: &str, next_is_text: bool) -> String {
        let trimmed = line.trim_end();
        let trailing = &line[trimmed.len()..];
        if next_is_text && !trimmed.is_empty() && trailing.len() >= 2 && trailing.bytes().all(|b| b == b' ') {
            format!("{trimmed}  ")
        } else {
            trimmed.to_string()
        }
    }

    fn is_prose(line: &str, next: Option<&str>) -> bool {
        if line.trim().is_empty() || line.starts_with([' ', '\t']) || line.contains('|') {
            return false;
        }
        if NON_PROSE_LINE.is_match(line) {
            return false;
        }
        // The text line of a setext heading.
        !next.is_some_and(|n| {
            let n = n.trim_end();
            !n.is_empty() && (n.bytes().all(|b| b == b'=') || n.bytes().all(|b| b == b'-'))
        })
    }

    fn wrap_segment(words: &[&str], suffix: &str, options: &PrettierMarkdownConfig) -> Vec<String> {
        let limit = match (options.prose_wrap, options.line_limit()) {
            (ProseWrap::Always, Some(limit)) => limit,
            _ => usize::MAX,
        };

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut width = 0;
        for word in words {
            let word_width = word.width();
            if current.is_empty() {
                current.push_str(word);
                width = word_width;
            } else if width + 1 + word_width > limit && !BLOCK_START.is_match(word) {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                width = word_width;
            } else {
                current.push(' ');
                current.push_str(word);
                width += 1 + word_width;
            }
        }
        current.push_str(suffix);
        lines.push(current);
        lines
    }

    /// Rewrap one paragraph. Hard breaks split it into separately wrapped segments.
    fn rewrap(paragraph: &[String], options: &PrettierMarkdownConfig) -> Vec<String> {
        let mut out = Vec::new();
        let mut words: Vec<&str> = Vec::new();
        for line in paragraph {
            words.extend(line.split_whitespace());
            let suffix = if line.ends_with("  ") {
                "  "
            } else if line.ends_with('\\') {
                ""
            } else {
                continue;
            };
            out.extend(Self::wrap_segment(&words, suffix, options));
            words.clear();
        }
        if !words.is_empty() {
            out.extend(Self::wrap_segment(&words, "", options));
        }
        out
    }

    fn format_body(body: &str, options: &PrettierMarkdownConfig) -> Result<String, PrinterError> {
        let lf = to_lf(body);
        let raw: Vec<&str> = lf.lines().collect();
        let code = Self::code_line_mask(&raw)?;

        // Whitespace per line, blank runs collapsed.
        let mut lines: Vec<(String, bool)> = Vec::with_capacity(raw.len());
        for (idx, line) in raw.iter().enumerate() {
            if code[idx] {
                lines.push((line.to_string(), true));
                continue;
            }
            let next_is_text = raw.get(idx + 1).is_some_and(|n| !n.trim().is_empty());
            let line = if options.use_tabs {
                line.to_string()
            } else {
                Self::expand_leading_tabs(line, options.tab_width)
            };
            let line = Self::trim_trailing(&line, next_is_text);
            let previous_blank = lines.last().is_none_or(|(l, in_code)| !in_code && l.is_empty());
            if line.is_empty() && previous_blank {
                continue;
            }
            lines.push((line, false));
        }
        while lines.last().is_some_and(|(l, in_code)| !in_code && l.is_empty()) {
            lines.pop();
        }

        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        if options.prose_wrap == ProseWrap::Preserve {
            out.extend(lines.into_iter().map(|(l, _)| l));
        } else {
            let mut idx = 0;
            while idx < lines.len() {
                let next = lines.get(idx + 1).map(|(l, _)| l.as_str());
                if lines[idx].1 || !Self::is_prose(&lines[idx].0, next) {
                    out.push(lines[idx].0.clone());
                    idx += 1;
                    continue;
                }
                let start = idx;
                while idx < lines.len()
                    && !lines[idx].1
                    && Self::is_prose(&lines[idx].0, lines.get(idx + 1).map(|(l, _)| l.as_str()))
                {
                    idx += 1;
                }
                let paragraph: Vec<String> = lines[start..idx].iter().map(|(l, _)| l.clone()).collect();
                out.extend(Self::rewrap(&paragraph, options));
            }
        }

        if out.is_empty() {
            return Ok(String::new());
        }
        let mut result = out.join("\n");
        result.push('\n');
        Ok(result)
    }
}

impl PrettyPrinter for BuiltinPrettyPrinter {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn format(&self, content: &str, options: &PrettierMarkdownConfig) -> Result<String, PrinterError> {
        let fm = front_matter::extract(content);
        let body = Self::format_body(fm.body, options)?;
        let body = match LineEnding::resolve(options.end_of_line, content) {
            LineEnding::Lf => body,
            ending => normalize_line_ending(&body, ending),
        };
        Ok(fm.reassemble(&body))
    }
}

/// Pipes the document through `prettier --parser markdown`.
#[derive(Debug, Clone)]
pub struct PrettierCli {
    executor: ToolExecutor,
    program: String,
}

impl PrettierCli {
    pub fn new(executor: ToolExecutor) -> Self {
        Self {
            executor,
            program: "prettier".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn is_available(&self) -> bool {
        self.executor.is_available(&self.program)
    }

    fn invocation(&self, options: &PrettierMarkdownConfig) -> Invocation {
        let prose_wrap = match options.prose_wrap {
            ProseWrap::Always => "always",
            ProseWrap::Never => "never",
            ProseWrap::Preserve => "preserve",
        };
        let end_of_line = match options.end_of_line {
            EndOfLine::Lf => "lf",
            EndOfLine::Crlf => "crlf",
            EndOfLine::Cr => "cr",
            EndOfLine::Auto => "auto",
        };
        Invocation::prettier(&self.program, "markdown", options)
            .arg("--prose-wrap")
            .arg(prose_wrap)
            .arg("--end-of-line")
            .arg(end_of_line)
    }
}

impl Default for PrettierCli {
    fn default() -> Self {
        Self::new(ToolExecutor::default())
    }
}

impl PrettyPrinter for PrettierCli {
    fn name(&self) -> &'static str {
        "prettier"
    }

    fn format(&self, content: &str, options: &PrettierMarkdownConfig) -> Result<String, PrinterError> {
        Ok(self.executor.run(&self.invocation(options), content)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatResult {
    /// Whether `content` differs from the document passed in.
    pub formatted: bool,
    pub content: String,
    pub error: Option<String>,
    /// Post-processing steps that changed the document.
    pub applied_transformations: Vec<String>,
}

impl FormatResult {
    fn failed(original: &str, error: String) -> Self {
        Self {
            formatted: false,
            content: original.to_string(),
            error: Some(error),
            applied_transformations: Vec::new(),
        }
    }
}

/// Post-processing plus pretty-printing in one call.
pub struct MarkdownFormatter {
    printer: Box<dyn PrettyPrinter>,
    code_formatter: Box<dyn CodeFormatter>,
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            printer: Box::new(BuiltinPrettyPrinter),
            code_formatter: Box::new(BuiltinCodeFormatter),
        }
    }

    pub fn with_printer(mut self, printer: impl PrettyPrinter + 'static) -> Self {
        self.printer = Box::new(printer);
        self
    }

    /// Formatter used for fenced code blocks during post-processing.
    pub fn with_code_formatter(mut self, code_formatter: impl CodeFormatter + 'static) -> Self {
        self.code_formatter = Box::new(code_formatter);
        self
    }

    pub fn printer_name(&self) -> &'static str {
        self.printer.name()
    }

    pub fn format(
        &self,
        doc: &str,
        options: &PrettierMarkdownConfig,
        rules: &LintRules,
        post_processing: Option<&PostProcessingConfig>,
    ) -> FormatResult {
        let mut applied = Vec::new();
        let input = match post_processing {
            Some(config) => {
                let result = PostProcessor::new(config, options, rules)
                    .with_code_formatter(self.code_formatter.as_ref())
                    .process(doc);
                if let Some(error) = result.error {
                    return FormatResult::failed(doc, error);
                }
                applied = result.applied_transformations;
                result.processed_content
            }
            None => doc.to_string(),
        };

        match self.printer.format(&input, options) {
            Ok(content) => FormatResult {
                formatted: content != doc,
                content,
                error: None,
                applied_transformations: applied,
            },
            Err(e) => {
                let error = describe_failure(doc, &e);
                log::warn!("{} printer failed: {error}", self.printer.name());
                FormatResult::failed(doc, error)
            }
        }
    }

    /// Whether the printer would leave `doc` as it is. A printer failure counts as no.
    pub fn check(&self, doc: &str, options: &PrettierMarkdownConfig) -> bool {
        match self.printer.format(doc, options) {
            Ok(content) => content == doc,
            Err(e) => {
                log::debug!("Format check failed: {e}");
                false
            }
        }
    }
}

/// Printer errors on documents with broken front matter usually stem from it.
fn describe_failure(doc: &str, error: &PrinterError) -> String {
    match front_matter::extract(doc).validate() {
        Err(fm_error) => format!("{error} ({fm_error})"),
        Ok(()) => error.to_string(),
    }
}
