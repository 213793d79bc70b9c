//!
//! Bridge between the diagnostic engine and the rest of the crate.
//!
//! [`LintAdapter::lint`] maps the user's preferences onto an engine
//! configuration, runs the engine once and turns raw diagnostics into
//! [`LintIssue`]s. The raw diagnostics ride along in [`LintResult`] so that
//! [`LintAdapter::fix`] can hand the engine back its own patches.
//!
//! Neither call fails: an engine error yields an empty result, a fixer error
//! yields the input document.

use crate::config::{AdvancedTuning, LintRules, PrettierMarkdownConfig};
use crate::engine::{BuiltinEngine, DiagnosticEngine, FixInfo, RawDiagnostic, RawLintResult};
use crate::fix_utils;
use crate::markdownlint_config::{EngineConfig, map_lint_rules};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Fixed classification by diagnostic code.
    pub fn for_rule(code: &str) -> Self {
        match code {
            "MD001" => Severity::Error,
            "MD013" | "MD022" => Severity::Info,
            _ => Severity::Warning,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintIssue {
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub message: String,
    pub rule: String,
    pub fixable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_info: Option<FixInfo>,
}

impl LintIssue {
    fn from_raw(diagnostic: &RawDiagnostic) -> Self {
        let rule = diagnostic.code().to_string();
        let message = match &diagnostic.error_detail {
            Some(detail) => format!("{} [{detail}]", diagnostic.rule_description),
            None => diagnostic.rule_description.clone(),
        };
        Self {
            line: diagnostic.line_number.max(1),
            column: diagnostic.error_range.map_or(1, |(column, _)| column.max(1)),
            severity: Severity::for_rule(&rule),
            message,
            rule,
            fixable: diagnostic.fix_info.is_some(),
            fix_info: diagnostic.fix_info.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintResult {
    pub issues: Vec<LintIssue>,
    pub total_issues: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    /// Engine output exactly as returned, for [`LintAdapter::fix`].
    pub raw_result: RawLintResult,
}

impl LintResult {
    /// The result reported when the engine could not run.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_diagnostics(diagnostics: Vec<RawDiagnostic>) -> Self {
        let issues: Vec<LintIssue> = diagnostics.iter().map(LintIssue::from_raw).collect();
        let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
        Self {
            total_issues: issues.len(),
            error_count: count(Severity::Error),
            warning_count: count(Severity::Warning),
            info_count: count(Severity::Info),
            issues,
            raw_result: RawLintResult(diagnostics),
        }
    }

    pub fn fixable_count(&self) -> usize {
        self.issues.iter().filter(|i| i.fixable).count()
    }

    pub fn is_clean(&self) -> bool {
        self.total_issues == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "Found {} issue(s): {} error(s), {} warning(s)",
            self.total_issues, self.error_count, self.warning_count
        )
    }
}

/// Lints and fixes documents with one engine and one set of preferences.
pub struct LintAdapter {
    engine: Box<dyn DiagnosticEngine>,
    rules: LintRules,
    prettier: PrettierMarkdownConfig,
    advanced: AdvancedTuning,
    /// Replaces the mapped configuration when set.
    engine_config: Option<EngineConfig>,
}

impl LintAdapter {
    pub fn new(rules: LintRules, prettier: PrettierMarkdownConfig, advanced: AdvancedTuning) -> Self {
        Self {
            engine: Box::new(BuiltinEngine::new()),
            rules,
            prettier,
            advanced,
            engine_config: None,
        }
    }

    pub fn with_engine(mut self, engine: impl DiagnosticEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Use a ready-made engine configuration instead of mapping the rules.
    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = Some(config);
        self
    }

    pub fn rules(&self) -> &LintRules {
        &self.rules
    }

    pub fn engine_config(&self) -> EngineConfig {
        match &self.engine_config {
            Some(config) => config.clone(),
            None => map_lint_rules(&self.rules, &self.prettier, &self.advanced),
        }
    }

    pub fn lint(&self, doc: &str) -> LintResult {
        let config = self.engine_config();
        match self.engine.lint(doc, &config) {
            Ok(diagnostics) => LintResult::from_diagnostics(diagnostics),
            Err(e) => {
                log::warn!("{} engine failed, reporting no issues: {e}", self.engine.name());
                LintResult::empty()
            }
        }
    }

    /// Apply the engine's patches from `raw`, then the supplemental fixes.
    pub fn fix(&self, doc: &str, raw: &RawLintResult) -> String {
        self.fix_with_language(doc, raw, &self.rules.default_code_language)
    }

    pub fn fix_with_language(&self, doc: &str, raw: &RawLintResult, default_language: &str) -> String {
        let patched = match self.engine.apply_fixes(doc, raw.diagnostics()) {
            Ok(patched) => patched,
            Err(e) => {
                log::warn!("Fixing failed, keeping document unchanged: {e}");
                return doc.to_string();
            }
        };
        fix_utils::apply_supplemental_fixes(&patched, raw.diagnostics(), default_language)
    }
}
