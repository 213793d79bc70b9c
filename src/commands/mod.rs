//! Command handlers for the mdtidy CLI.
//!
//! Each subcommand has its own module with a public handler function
//! that `main()` dispatches to. Handlers return the process exit code.

pub mod check;
pub mod completions;
pub mod config;
pub mod fix;
pub mod fmt;
pub mod toc;

use anyhow::{Context, Result};
use std::path::Path;

use mdtidy_lib::code_formatter::{BuiltinCodeFormatter, ChainedCodeFormatter, PrettierCodeFormatter};
use mdtidy_lib::config::Settings;
use mdtidy_lib::editor::FileEditor;
use mdtidy_lib::formatter::{MarkdownFormatter, PrettierCli};
use mdtidy_lib::lint_adapter::LintAdapter;
use mdtidy_lib::markdownlint_config::EngineConfig;

use crate::PrinterKind;

/// Settings and collaborator choices shared by the subcommands.
pub struct Session {
    pub settings: Settings,
    engine_config: Option<EngineConfig>,
    printer: PrinterKind,
}

impl Session {
    pub fn load(config: Option<&Path>, engine_config: Option<&Path>, printer: PrinterKind) -> Result<Self> {
        let settings = match config {
            Some(path) => {
                Settings::load(path).with_context(|| format!("Failed to load settings from {}", path.display()))?
            }
            None => Settings::default(),
        };
        let engine_config = engine_config
            .map(|path| EngineConfig::load(&path.to_string_lossy()))
            .transpose()
            .context("Failed to load engine configuration")?;

        log::debug!("Using {printer:?} printer");
        Ok(Self {
            settings,
            engine_config,
            printer,
        })
    }

    pub fn adapter(&self) -> LintAdapter {
        let adapter = LintAdapter::new(
            self.settings.lint_rules.clone(),
            self.settings.prettier_config.clone(),
            self.settings.advanced.clone(),
        );
        match &self.engine_config {
            Some(config) => adapter.with_engine_config(config.clone()),
            None => adapter,
        }
    }

    pub fn formatter(&self) -> MarkdownFormatter {
        match self.printer {
            PrinterKind::Builtin => MarkdownFormatter::new(),
            PrinterKind::Prettier => {
                let printer = PrettierCli::default();
                if !printer.is_available() {
                    log::warn!("prettier was not found on PATH; formatting will report an error");
                }
                MarkdownFormatter::new().with_printer(printer).with_code_formatter(
                    ChainedCodeFormatter::default()
                        .push(PrettierCodeFormatter::default())
                        .push(BuiltinCodeFormatter),
                )
            }
        }
    }
}

pub fn open_document(path: &Path) -> Result<FileEditor> {
    FileEditor::open(path).with_context(|| format!("Cannot open {}", path.display()))
}
