//! Handler for the `check` command.

use anyhow::Result;
use colored::*;
use std::path::Path;

use mdtidy_lib::editor::EditorHandle;
use mdtidy_lib::exit_codes;
use mdtidy_lib::lint_adapter::{LintResult, Severity};

use super::{Session, open_document};

pub fn handle_check(session: &Session, file: &Path) -> Result<i32> {
    if !session.settings.enable_linting {
        println!("{}", "Linting is disabled. Enable it in settings.".yellow());
        return Ok(exit_codes::SUCCESS);
    }

    let content = open_document(file)?.get_value();
    let result = session.adapter().lint(&content);
    print_issues(file, &result);
    Ok(exit_codes::for_outcome(result.is_clean()))
}

/// One line per issue, then the summary.
pub fn print_issues(file: &Path, result: &LintResult) {
    if result.is_clean() {
        println!("{} No lint issues found!", "✓".green());
        return;
    }

    let path = file.display().to_string();
    for issue in &result.issues {
        let severity = match issue.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };
        let fixable = if issue.fixable { " [*]".green().to_string() } else { String::new() };
        println!(
            "{}:{}:{}: {} {} {}{}",
            path.blue().underline(),
            issue.line,
            issue.column,
            severity,
            format!("[{}]", issue.rule).cyan(),
            issue.message,
            fixable
        );
    }

    println!();
    println!("{}", result.summary());
    let fixable = result.fixable_count();
    if fixable > 0 {
        println!("Run `mdtidy fix` to fix {fixable} of them automatically.");
    }
}
