//! Markdown lint, fix and format orchestration.
//!
//! The crate keeps documents in a canonical style in three ways:
//!
//! - [`lint_adapter::LintAdapter`] lints a document with a markdownlint
//!   compatible engine configured from the user's [`config::LintRules`].
//! - [`fix_coordinator::FixCoordinator`] runs fix-and-recheck rounds until
//!   the document converges or a guard stops it.
//! - [`formatter::MarkdownFormatter`] runs the post-processing pipeline
//!   (blank lines, lists, fenced code, table of contents) and a
//!   pretty-printer.
//!
//! Every collaborator sits behind a trait: [`engine::DiagnosticEngine`],
//! [`formatter::PrettyPrinter`], [`code_formatter::CodeFormatter`] and
//! [`editor::EditorHandle`].

pub mod code_blocks;
pub mod code_formatter;
pub mod code_languages;
pub mod config;
pub mod editor;
pub mod engine;
pub mod exit_codes;
pub mod fix_coordinator;
pub mod fix_utils;
pub mod formatter;
pub mod front_matter;
pub mod lint_adapter;
pub mod list_normalizer;
pub mod markdownlint_config;
pub mod post_processing;
pub mod toc;
pub mod tool_executor;
pub mod utils;

pub use config::{LintRules, PostProcessingConfig, PrettierMarkdownConfig, Settings};
pub use fix_coordinator::{FixCoordinator, FixOutcome, FixReport};
pub use formatter::{FormatResult, MarkdownFormatter};
pub use lint_adapter::{LintAdapter, LintIssue, LintResult, Severity};
