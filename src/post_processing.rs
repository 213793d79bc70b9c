//!
//! Post-processing pipeline run before the pretty-printer.
//!
//! Steps run in a fixed order: blank-line collapsing, list normalization,
//! code block formatting, table of contents. A failing step aborts the whole
//! run and the caller gets the original input back, never a partially
//! processed document.

use crate::code_blocks::{self, CodeBlockError};
use crate::code_formatter::{BuiltinCodeFormatter, CodeFormatter};
use crate::code_languages;
use crate::config::{LintRules, PostProcessingConfig, PrettierMarkdownConfig};
use crate::list_normalizer::{self, ListStructureError};
use crate::toc;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\r?\n){3,}").unwrap());

static BUILTIN_CODE_FORMATTER: BuiltinCodeFormatter = BuiltinCodeFormatter;

pub const COLLAPSED_BLANK_LINES: &str = "Collapsed excessive blank lines";
pub const NORMALIZED_LISTS: &str = "Normalized list structure and spacing";
pub const FORMATTED_CODE_BLOCKS: &str = "Formatted code within fenced blocks";
pub const GENERATED_TOC: &str = "Generated table of contents";

#[derive(Debug, Error)]
pub enum PostProcessError {
    #[error("List normalization failed: {0}")]
    Lists(#[from] ListStructureError),

    #[error("Code block formatting failed: {0}")]
    CodeBlocks(#[from] CodeBlockError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessResult {
    pub has_changes: bool,
    pub processed_content: String,
    /// Labels of the steps that changed the document, in order.
    pub applied_transformations: Vec<String>,
    pub error: Option<String>,
}

/// Collapse runs of three or more line breaks into a single blank line.
pub fn collapse_blank_lines(doc: &str) -> String {
    EXCESS_NEWLINES.replace_all(doc, "${1}${1}").into_owned()
}

pub struct PostProcessor<'a> {
    config: &'a PostProcessingConfig,
    options: &'a PrettierMarkdownConfig,
    rules: &'a LintRules,
    code_formatter: &'a dyn CodeFormatter,
}

impl<'a> PostProcessor<'a> {
    pub fn new(config: &'a PostProcessingConfig, options: &'a PrettierMarkdownConfig, rules: &'a LintRules) -> Self {
        Self {
            config,
            options,
            rules,
            code_formatter: &BUILTIN_CODE_FORMATTER,
        }
    }

    pub fn with_code_formatter(mut self, code_formatter: &'a dyn CodeFormatter) -> Self {
        self.code_formatter = code_formatter;
        self
    }

    pub fn process(&self, doc: &str) -> PostProcessResult {
        let mut applied = Vec::new();
        match self.run_steps(doc, &mut applied) {
            Ok(processed) => PostProcessResult {
                has_changes: !applied.is_empty(),
                processed_content: processed,
                applied_transformations: applied,
                error: None,
            },
            Err(e) => {
                log::warn!("Post-processing aborted, keeping original content: {e}");
                PostProcessResult {
                    has_changes: false,
                    processed_content: doc.to_string(),
                    applied_transformations: applied,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn run_steps(&self, doc: &str, applied: &mut Vec<String>) -> Result<String, PostProcessError> {
        let mut current = doc.to_string();

        if self.config.remove_duplicate_blank_lines {
            let next = collapse_blank_lines(&current);
            record(&mut current, next, COLLAPSED_BLANK_LINES, applied);
        }

        if self.config.enable_list_formatting {
            let next = list_normalizer::normalize_lists(
                &current,
                self.config.enable_line_trimming_in_lists,
                self.rules,
                self.options,
            )?;
            record(&mut current, next, NORMALIZED_LISTS, applied);
        }

        if self.config.enable_code_block_formatting {
            let next = self.format_code_blocks(&current)?;
            record(&mut current, next, FORMATTED_CODE_BLOCKS, applied);
        }

        if self.config.enable_toc_generation {
            let next = toc::build(
                &current,
                self.config.effective_toc_depth(),
                self.config.toc_position,
                self.rules,
                self.options,
            );
            record(&mut current, next, GENERATED_TOC, applied);
        }

        Ok(current)
    }

    fn format_code_blocks(&self, doc: &str) -> Result<String, CodeBlockError> {
        let languages = self.config.normalized_languages();
        let (shell, other): (Vec<String>, Vec<String>) =
            languages.into_iter().partition(|l| code_languages::is_shell_language(l));

        let mut result = doc.to_string();
        if !shell.is_empty() {
            result = code_blocks::normalize_shell_blocks(&result)?;
        }
        // An empty language list means "every language" to format_all, so skip instead.
        if !other.is_empty() {
            result = code_blocks::format_all(&result, &other, self.code_formatter, self.options)?;
        }
        Ok(result)
    }
}

fn record(current: &mut String, next: String, label: &str, applied: &mut Vec<String>) {
    if next != *current {
        log::debug!("{label}");
        applied.push(label.to_string());
        *current = next;
    }
}

/// Run the pipeline with the built-in code formatter.
pub fn apply_post_processing(
    doc: &str,
    config: &PostProcessingConfig,
    options: &PrettierMarkdownConfig,
    rules: &LintRules,
) -> PostProcessResult {
    PostProcessor::new(config, options, rules).process(doc)
}
