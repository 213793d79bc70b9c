use crate::config::AdvancedTuning;
use crate::editor::EditorHandle;
use crate::lint_adapter::{LintAdapter, LintResult};
use std::ops::ControlFlow;
use std::time::Duration;

/// Hard cap on fix rounds when none is configured.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// One fix pass followed by a fresh lint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixRound {
    pub fixed: String,
    pub recheck: LintResult,
    /// Issues that were fixable before this round.
    pub fixed_count: usize,
}

impl FixRound {
    /// Status line for the host after this round.
    pub fn message(&self) -> String {
        if self.recheck.is_clean() {
            "All issues fixed successfully!".to_string()
        } else {
            format!(
                "Fixed {} issue(s). {} issue(s) remaining.",
                self.fixed_count, self.recheck.total_issues
            )
        }
    }
}

/// Why a fix session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixOutcome {
    /// No issues left.
    Converged,
    /// Issues remain, none of them fixable.
    NoFixableIssues,
    /// The issue count stopped going down, or a round changed nothing.
    NotConverging,
    IterationLimit,
    /// The round callback asked to stop.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixReport {
    pub content: String,
    pub result: LintResult,
    pub rounds: usize,
    pub outcome: FixOutcome,
}

/// Coordinates repeated fix-and-recheck rounds for one document.
///
/// Every round writes the fixed text to the editor before the next lint, and
/// no two rounds ever overlap.
pub struct FixCoordinator<'a> {
    adapter: &'a LintAdapter,
    max_iterations: usize,
    retry_delay: Duration,
}

impl<'a> FixCoordinator<'a> {
    pub fn new(adapter: &'a LintAdapter) -> Self {
        Self {
            adapter,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            retry_delay: Duration::from_millis(100),
        }
    }

    pub fn with_tuning(mut self, advanced: &AdvancedTuning) -> Self {
        self.max_iterations = advanced.max_autofix_attempts.max(1);
        self.retry_delay = Duration::from_millis(advanced.autofix_retry_delay_ms);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn lint(&self, doc: &str) -> LintResult {
        self.adapter.lint(doc)
    }

    /// Fix once, write the result to the editor and lint again.
    pub fn fix_and_recheck(&self, doc: &str, result: &LintResult, editor: &mut dyn EditorHandle) -> FixRound {
        let fixed = self.adapter.fix(doc, &result.raw_result);
        write_back(editor, &fixed);
        let recheck = self.adapter.lint(&fixed);
        FixRound {
            fixed,
            recheck,
            fixed_count: result.fixable_count(),
        }
    }

    /// Interactive session: run rounds while fixable issues remain, pausing
    /// `retry_delay` between rounds and reporting each one to `on_round`.
    pub async fn recursive_fix_with_callback<F>(
        &self,
        doc: &str,
        result: LintResult,
        editor: &mut dyn EditorHandle,
        mut on_round: F,
    ) -> FixReport
    where
        F: FnMut(&FixRound) -> ControlFlow<()>,
    {
        let mut content = doc.to_string();
        let mut result = result;
        let mut rounds = 0;

        loop {
            let round = self.fix_and_recheck(&content, &result, editor);
            rounds += 1;
            let stop = on_round(&round).is_break();
            let unchanged = round.fixed == content;
            content = round.fixed;
            result = round.recheck;

            let outcome = if result.is_clean() {
                Some(FixOutcome::Converged)
            } else if result.fixable_count() == 0 {
                Some(FixOutcome::NoFixableIssues)
            } else if stop {
                Some(FixOutcome::Stopped)
            } else if unchanged {
                Some(FixOutcome::NotConverging)
            } else if rounds >= self.max_iterations {
                Some(FixOutcome::IterationLimit)
            } else {
                None
            };

            if let Some(outcome) = outcome {
                log::debug!("Fix session ended after {rounds} round(s): {outcome:?}");
                return FixReport {
                    content,
                    result,
                    rounds,
                    outcome,
                };
            }

            tokio::time::sleep(self.retry_delay).await;
        }
    }

    /// Non-interactive session with the iteration cap and a guard that stops
    /// as soon as the total issue count fails to drop.
    pub fn silent_auto_fix(&self, doc: &str, editor: &mut dyn EditorHandle) -> FixReport {
        let mut content = doc.to_string();
        let mut previous_total = usize::MAX;

        for rounds in 0..self.max_iterations {
            let result = self.adapter.lint(&content);

            let outcome = if result.fixable_count() == 0 {
                Some(if result.is_clean() {
                    FixOutcome::Converged
                } else {
                    FixOutcome::NoFixableIssues
                })
            } else if result.total_issues >= previous_total {
                log::warn!(
                    "Auto-fix stopped: issue count did not decrease ({} -> {})",
                    previous_total,
                    result.total_issues
                );
                Some(FixOutcome::NotConverging)
            } else {
                None
            };
            if let Some(outcome) = outcome {
                return FixReport {
                    content,
                    result,
                    rounds,
                    outcome,
                };
            }

            previous_total = result.total_issues;
            content = self.adapter.fix(&content, &result.raw_result);
            write_back(editor, &content);
        }

        log::warn!("Auto-fix stopped after {} iterations", self.max_iterations);
        FixReport {
            result: self.adapter.lint(&content),
            content,
            rounds: self.max_iterations,
            outcome: FixOutcome::IterationLimit,
        }
    }
}

fn write_back(editor: &mut dyn EditorHandle, content: &str) {
    if let Err(e) = editor.set_value(content) {
        log::error!("Failed to update document: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LintRules, PrettierMarkdownConfig};
    use crate::editor::MemoryEditor;
    use crate::engine::{DiagnosticEngine, EngineError, FixInfo, RawDiagnostic};
    use crate::markdownlint_config::EngineConfig;
    use pretty_assertions::assert_eq;

    fn adapter() -> LintAdapter {
        LintAdapter::new(
            LintRules::default(),
            PrettierMarkdownConfig::default(),
            AdvancedTuning::default(),
        )
    }

    /// Flags every line containing "x" and "fixes" it into two such lines.
    struct Oscillating;

    impl DiagnosticEngine for Oscillating {
        fn name(&self) -> &'static str {
            "oscillating"
        }

        fn lint(&self, content: &str, _: &EngineConfig) -> Result<Vec<RawDiagnostic>, EngineError> {
            Ok(content
                .lines()
                .enumerate()
                .filter(|(_, line)| line.contains('x'))
                .map(|(idx, _)| RawDiagnostic::new(idx + 1, &["MD999"], "x").fix(FixInfo::insert(1, "x\n")))
                .collect())
        }

        fn apply_fixes(&self, content: &str, diagnostics: &[RawDiagnostic]) -> Result<String, EngineError> {
            Ok(crate::engine::apply_fixes(content, diagnostics)?)
        }
    }

    #[test]
    fn test_fix_and_recheck_counts_previously_fixable() {
        let adapter = adapter();
        let coordinator = FixCoordinator::new(&adapter);
        let doc = "#Title\n\ntext  x \n";
        let before = coordinator.lint(doc);
        let mut editor = MemoryEditor::new(doc);

        let round = coordinator.fix_and_recheck(doc, &before, &mut editor);
        assert_eq!(round.fixed_count, before.fixable_count());
        assert_eq!(round.fixed, "# Title\n\ntext  x\n");
        assert_eq!(editor.get_value(), round.fixed);
        assert!(round.recheck.is_clean());
        assert_eq!(round.message(), "All issues fixed successfully!");
    }

    #[test]
    fn test_silent_auto_fix_converges() {
        let adapter = adapter();
        let coordinator = FixCoordinator::new(&adapter);
        let doc = "#Title\nSome text   \n\n\n\n* item\n* item\n";
        let mut editor = MemoryEditor::new(doc);

        let report = coordinator.silent_auto_fix(doc, &mut editor);
        assert_eq!(report.outcome, FixOutcome::Converged);
        assert!(report.result.is_clean());
        assert_eq!(editor.get_value(), report.content);
        assert!(report.rounds >= 1);
    }

    #[test]
    fn test_silent_auto_fix_stops_when_count_grows() {
        let adapter = adapter().with_engine(Oscillating);
        let coordinator = FixCoordinator::new(&adapter);
        let mut editor = MemoryEditor::new("x\n");

        let report = coordinator.silent_auto_fix("x\n", &mut editor);
        assert_eq!(report.outcome, FixOutcome::NotConverging);
        assert_eq!(report.rounds, 1);
        assert_eq!(editor.writes, 1);
    }

    #[test]
    fn test_silent_auto_fix_reports_unfixable_residue() {
        let adapter = adapter();
        let coordinator = FixCoordinator::new(&adapter);
        let doc = "# A\n\n### C\n";
        let mut editor = MemoryEditor::new(doc);

        let report = coordinator.silent_auto_fix(doc, &mut editor);
        assert_eq!(report.outcome, FixOutcome::NoFixableIssues);
        assert_eq!(report.rounds, 0);
        assert_eq!(report.content, doc);
        assert_eq!(editor.writes, 0);
    }

    #[tokio::test]
    async fn test_recursive_fix_reports_each_round() {
        let adapter = adapter();
        let coordinator = FixCoordinator::new(&adapter).with_retry_delay(Duration::from_millis(1));
        let doc = "#Title\ntext \n";
        let mut editor = MemoryEditor::new(doc);
        let initial = coordinator.lint(doc);

        let mut messages = Vec::new();
        let report = coordinator
            .recursive_fix_with_callback(doc, initial, &mut editor, |round| {
                messages.push(round.message());
                ControlFlow::Continue(())
            })
            .await;

        assert_eq!(report.outcome, FixOutcome::Converged);
        assert_eq!(messages.len(), report.rounds);
        assert_eq!(messages.last().map(String::as_str), Some("All issues fixed successfully!"));
        assert_eq!(editor.get_value(), report.content);
    }

    #[tokio::test]
    async fn test_recursive_fix_respects_iteration_cap() {
        let adapter = adapter().with_engine(Oscillating);
        let coordinator = FixCoordinator::new(&adapter)
            .with_max_iterations(3)
            .with_retry_delay(Duration::ZERO);
        let mut editor = MemoryEditor::new("x\n");
        let initial = coordinator.lint("x\n");

        let report = coordinator
            .recursive_fix_with_callback("x\n", initial, &mut editor, |_| ControlFlow::Continue(()))
            .await;
        assert_eq!(report.outcome, FixOutcome::IterationLimit);
        assert_eq!(report.rounds, 3);
    }

    #[tokio::test]
    async fn test_recursive_fix_stops_on_request() {
        let adapter = adapter().with_engine(Oscillating);
        let coordinator = FixCoordinator::new(&adapter).with_retry_delay(Duration::ZERO);
        let mut editor = MemoryEditor::new("x\n");
        let initial = coordinator.lint("x\n");

        let report = coordinator
            .recursive_fix_with_callback("x\n", initial, &mut editor, |_| ControlFlow::Break(()))
            .await;
        assert_eq!(report.outcome, FixOutcome::Stopped);
        assert_eq!(report.rounds, 1);
        assert_eq!(report.content, "x\nx\n");
    }
}
