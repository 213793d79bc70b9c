//! Handler for the `toc` command.

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use mdtidy_lib::editor::EditorHandle;
use mdtidy_lib::exit_codes;
use mdtidy_lib::toc;

use super::{Session, open_document};

pub fn handle_toc(session: &Session, file: &Path, remove: bool) -> Result<i32> {
    let settings = &session.settings;
    let post = &settings.post_processing_config;
    let mut editor = open_document(file)?;
    let content = editor.get_value();

    let updated = if remove {
        toc::remove_existing(&content)
    } else {
        toc::build(
            &content,
            post.effective_toc_depth(),
            post.toc_position,
            &settings.lint_rules,
            &settings.prettier_config,
        )
    };

    if updated == content {
        println!("Table of contents is up to date.");
        return Ok(exit_codes::SUCCESS);
    }
    editor
        .set_value(&updated)
        .with_context(|| format!("Cannot write {}", file.display()))?;
    if remove {
        println!("{} Removed table of contents from {}", "✓".green(), file.display());
    } else {
        println!("{} Updated table of contents in {}", "✓".green(), file.display());
    }
    Ok(exit_codes::SUCCESS)
}
