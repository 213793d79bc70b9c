//! Handler for the `fix` command.

use anyhow::{Context, Result};
use colored::*;
use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::path::Path;

use mdtidy_lib::editor::EditorHandle;
use mdtidy_lib::exit_codes;
use mdtidy_lib::fix_coordinator::{FixCoordinator, FixOutcome, FixReport, FixRound};

use super::check::print_issues;
use super::{Session, open_document};

pub fn handle_fix(session: &Session, file: &Path, interactive: bool) -> Result<i32> {
    let mut editor = open_document(file)?;
    let content = editor.get_value();
    let adapter = session.adapter();
    let coordinator = FixCoordinator::new(&adapter).with_tuning(&session.settings.advanced);

    let report = if interactive {
        let initial = coordinator.lint(&content);
        if initial.is_clean() {
            println!("{} No lint issues found!", "✓".green());
            return Ok(exit_codes::SUCCESS);
        }
        print_issues(file, &initial);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("Failed to start the fix session runtime")?;
        runtime.block_on(coordinator.recursive_fix_with_callback(&content, initial, &mut editor, |round| {
            confirm_next_round(file, round)
        }))
    } else {
        coordinator.silent_auto_fix(&content, &mut editor)
    };

    print_report(file, &report);
    Ok(exit_codes::for_outcome(report.result.is_clean()))
}

/// Show the round's outcome and ask whether to keep going.
fn confirm_next_round(file: &Path, round: &FixRound) -> ControlFlow<()> {
    println!("{} {}", "→".cyan(), round.message());
    if round.recheck.is_clean() || round.recheck.fixable_count() == 0 {
        return ControlFlow::Continue(());
    }

    print_issues(file, &round.recheck);
    print!("Fix remaining issues? [Y/n] ");
    if io::stdout().flush().is_err() {
        return ControlFlow::Break(());
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        // EOF accepts the default.
        Ok(_) if !answer.trim().eq_ignore_ascii_case("n") => ControlFlow::Continue(()),
        _ => ControlFlow::Break(()),
    }
}

fn print_report(file: &Path, report: &FixReport) {
    let path = file.display().to_string();
    match report.outcome {
        FixOutcome::Converged => {
            println!("{} {}: all issues fixed ({} round(s))", "✓".green(), path, report.rounds);
        }
        FixOutcome::NoFixableIssues => {
            println!(
                "{} {}: {} issue(s) remaining, none fixable automatically",
                "!".yellow(),
                path,
                report.result.total_issues
            );
        }
        FixOutcome::NotConverging | FixOutcome::IterationLimit | FixOutcome::Stopped => {
            println!(
                "{} {}: stopped after {} round(s) with {} issue(s) remaining",
                "!".yellow(),
                path,
                report.rounds,
                report.result.total_issues
            );
        }
    }
    if !report.result.is_clean() {
        println!("{}", report.result.summary());
    }
}
