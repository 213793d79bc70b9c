//! Handler for the `fmt` command.

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use mdtidy_lib::editor::EditorHandle;
use mdtidy_lib::exit_codes;
use mdtidy_lib::fix_coordinator::FixCoordinator;

use super::{Session, open_document};

pub fn handle_fmt(session: &Session, file: &Path, check: bool) -> Result<i32> {
    let settings = &session.settings;
    let mut editor = open_document(file)?;
    let content = editor.get_value();
    let formatter = session.formatter();
    log::debug!("Formatting {} with the {} printer", file.display(), formatter.printer_name());

    if check {
        let formatted = formatter.check(&content, &settings.prettier_config);
        if formatted {
            println!("{} {} is formatted", "✓".green(), file.display());
        } else {
            println!("{} Would reformat {}", "!".yellow(), file.display());
        }
        return Ok(exit_codes::for_outcome(formatted));
    }

    if !settings.enable_auto_format {
        println!("{}", "Auto-formatting is disabled. Enable it in settings.".yellow());
        return Ok(exit_codes::SUCCESS);
    }

    let result = formatter.format(
        &content,
        &settings.prettier_config,
        &settings.lint_rules,
        Some(&settings.post_processing_config),
    );
    if let Some(error) = result.error {
        eprintln!("{}: Formatting error: {error}", "Error".red().bold());
        return Ok(exit_codes::TOOL_ERROR);
    }

    if result.formatted {
        editor
            .set_value(&result.content)
            .with_context(|| format!("Cannot write {}", file.display()))?;
        for step in &result.applied_transformations {
            println!("  {} {step}", "•".cyan());
        }
        println!("{} Document formatted successfully!", "✓".green());
    } else {
        println!("Document is already formatted.");
    }

    if settings.auto_fix_lint_issues {
        let adapter = session.adapter();
        let report = FixCoordinator::new(&adapter)
            .with_tuning(&settings.advanced)
            .silent_auto_fix(&result.content, &mut editor);
        if !report.result.is_clean() {
            println!("{}", report.result.summary());
        }
    }
    Ok(exit_codes::SUCCESS)
}
