//!
//! Diagnostic engine contract and the built-in markdownlint-compatible engine.
//!
//! An engine lints a document against an [`EngineConfig`] and applies the
//! patches attached to its own diagnostics. Diagnostics are threaded from
//! `lint` to `apply_fixes` unchanged, so an engine never has to re-derive
//! a fix from the normalized issue model.

pub mod apply;
pub mod lint_context;
pub mod rules;

pub use apply::{FixError, apply_fixes};
pub use lint_context::LintContext;

use crate::markdownlint_config::EngineConfig;
use rules::Rule;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid options for {rule}: {message}")]
    InvalidOptions { rule: String, message: String },

    #[error("Failed to apply fixes: {0}")]
    Fix(#[from] FixError),

    #[error("{engine} failed: {message}")]
    Backend { engine: String, message: String },
}

/// A line-relative edit attached to a diagnostic.
///
/// Columns are 1-based and count characters. Absent fields default to the
/// diagnostic's line, column 1, no deletion and no insertion. A
/// `delete_count` of `-1` deletes the whole line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
}

impl FixInfo {
    /// Replace `delete_count` characters at `column` with `text`.
    pub fn replace(column: usize, delete_count: usize, text: impl Into<String>) -> Self {
        Self {
            line_number: None,
            edit_column: Some(column),
            delete_count: Some(delete_count as i64),
            insert_text: Some(text.into()),
        }
    }

    pub fn insert(column: usize, text: impl Into<String>) -> Self {
        Self::replace(column, 0, text)
    }

    pub fn delete(column: usize, delete_count: usize) -> Self {
        Self::replace(column, delete_count, "")
    }

    pub fn delete_line() -> Self {
        Self {
            delete_count: Some(-1),
            ..Default::default()
        }
    }

    /// Target a line other than the diagnostic's own.
    pub fn on_line(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }
}

/// One diagnostic as reported by an engine, in markdownlint's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDiagnostic {
    pub line_number: usize,
    pub rule_names: Vec<String>,
    pub rule_description: String,
    #[serde(default)]
    pub error_detail: Option<String>,
    #[serde(default)]
    pub error_context: Option<String>,
    /// `(column, length)`, 1-based column.
    #[serde(default)]
    pub error_range: Option<(usize, usize)>,
    #[serde(default)]
    pub fix_info: Option<FixInfo>,
}

impl RawDiagnostic {
    pub fn new(line_number: usize, rule_names: &[&str], rule_description: &str) -> Self {
        Self {
            line_number,
            rule_names: rule_names.iter().map(|s| s.to_string()).collect(),
            rule_description: rule_description.to_string(),
            error_detail: None,
            error_context: None,
            error_range: None,
            fix_info: None,
        }
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.error_context = Some(context.into());
        self
    }

    pub fn range(mut self, column: usize, length: usize) -> Self {
        self.error_range = Some((column, length));
        self
    }

    pub fn fix(mut self, fix: FixInfo) -> Self {
        self.fix_info = Some(fix);
        self
    }

    /// The rule code, e.g. `MD009`.
    pub fn code(&self) -> &str {
        self.rule_names.first().map(String::as_str).unwrap_or("")
    }
}

/// The unmodified output of one lint run, kept for the fixer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawLintResult(pub Vec<RawDiagnostic>);

impl RawLintResult {
    pub fn diagnostics(&self) -> &[RawDiagnostic] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub trait DiagnosticEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn lint(&self, content: &str, config: &EngineConfig) -> Result<Vec<RawDiagnostic>, EngineError>;

    /// Apply every patch attached to `diagnostics` in a single pass.
    fn apply_fixes(&self, content: &str, diagnostics: &[RawDiagnostic]) -> Result<String, EngineError>;
}

/// In-process engine implementing a subset of the markdownlint rules.
#[derive(Clone, Default)]
pub struct BuiltinEngine {
    custom_rules: Vec<Box<dyn Rule>>,
}

impl BuiltinEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an additional rule. It runs unless the config disables its code.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.custom_rules.push(Box::new(rule));
        self
    }

    fn enabled_rules(&self, config: &EngineConfig) -> Result<Vec<Box<dyn Rule>>, EngineError> {
        for code in config.rules.keys() {
            if !rules::is_builtin(code) && !self.custom_rules.iter().any(|r| r.name() == code) {
                log::debug!("Rule {code} is not implemented by the built-in engine; ignoring");
            }
        }

        let mut enabled = Vec::new();
        for code in rules::RULE_CODES {
            if let Some(options) = config.rule_options(code)
                && let Some(rule) = rules::create_rule(code, &options)?
            {
                enabled.push(rule);
            }
        }
        enabled.extend(
            self.custom_rules
                .iter()
                .filter(|rule| config.is_enabled(rule.name()))
                .cloned(),
        );
        Ok(enabled)
    }
}

impl DiagnosticEngine for BuiltinEngine {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn lint(&self, content: &str, config: &EngineConfig) -> Result<Vec<RawDiagnostic>, EngineError> {
        let rules = self.enabled_rules(config)?;
        let ctx = LintContext::new(content);

        let mut diagnostics: Vec<RawDiagnostic> = rules.iter().flat_map(|rule| rule.check(&ctx)).collect();
        diagnostics.sort_by(|a, b| {
            a.line_number
                .cmp(&b.line_number)
                .then_with(|| a.code().cmp(b.code()))
                .then_with(|| a.error_range.cmp(&b.error_range))
        });

        log::debug!("{} rules reported {} diagnostics", rules.len(), diagnostics.len());
        Ok(diagnostics)
    }

    fn apply_fixes(&self, content: &str, diagnostics: &[RawDiagnostic]) -> Result<String, EngineError> {
        Ok(apply_fixes(content, diagnostics)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdownlint_config::RuleSetting;

    #[derive(Clone)]
    struct NoTodo;

    impl Rule for NoTodo {
        fn name(&self) -> &'static str {
            "no-todo"
        }

        fn alias(&self) -> &'static str {
            "no-todo"
        }

        fn description(&self) -> &'static str {
            "TODO markers should be resolved"
        }

        fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
            (0..ctx.line_count())
                .filter(|&idx| ctx.line(idx).contains("TODO"))
                .map(|idx| self.diagnostic(idx + 1))
                .collect()
        }
    }

    fn only(codes: &[&str]) -> EngineConfig {
        let mut config = EngineConfig {
            default: false,
            ..Default::default()
        };
        for code in codes {
            config.rules.insert(code.to_string(), RuleSetting::Enabled(true));
        }
        config
    }

    #[test]
    fn test_diagnostics_sorted_by_line() {
        let content = "# Title\n\n\n\nText  \n";
        let diagnostics = BuiltinEngine::new()
            .lint(content, &only(&["MD012", "MD009", "MD047"]))
            .unwrap();
        let lines: Vec<_> = diagnostics.iter().map(|d| (d.line_number, d.code().to_string())).collect();
        assert_eq!(lines, vec![(3, "MD012".to_string()), (4, "MD012".to_string())]);
    }

    #[test]
    fn test_disabled_default_runs_nothing() {
        let diagnostics = BuiltinEngine::new()
            .lint("#Bad\n\n\n\nno newline", &only(&[]))
            .unwrap();
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_codes_are_ignored() {
        let config = only(&["MD033", "MD999"]);
        assert!(BuiltinEngine::new().lint("<b>x</b>\n", &config).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_options_error() {
        let mut config = only(&[]);
        config.rules.insert(
            "MD012".to_string(),
            RuleSetting::Options(serde_json::json!({"maximum": "many"}).as_object().unwrap().clone()),
        );
        let result = BuiltinEngine::new().lint("a\n", &config);
        assert!(matches!(result, Err(EngineError::InvalidOptions { .. })));
    }

    #[test]
    fn test_custom_rule() {
        let engine = BuiltinEngine::new().with_rule(NoTodo);
        let diagnostics = engine.lint("a\nTODO: b\n", &only(&["no-todo"])).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line_number, 2);
        assert_eq!(diagnostics[0].rule_names, vec!["no-todo", "no-todo"]);

        let mut disabled = EngineConfig::default();
        disabled.rules.insert("no-todo".to_string(), RuleSetting::Enabled(false));
        let diagnostics = engine.lint("TODO\n", &disabled).unwrap();
        assert!(diagnostics.iter().all(|d| d.code() != "no-todo"));
    }

    #[test]
    fn test_lint_then_fix() {
        let engine = BuiltinEngine::new();
        let config = EngineConfig::default();
        let content = "#Title\n\nText   \n";
        let diagnostics = engine.lint(content, &config).unwrap();
        let fixed = engine.apply_fixes(content, &diagnostics).unwrap();
        assert_eq!(fixed, "# Title\n\nText\n");
        assert!(engine.lint(&fixed, &config).unwrap().is_empty());
    }

    #[test]
    fn test_raw_diagnostic_serializes_like_markdownlint() {
        let diagnostic = RawDiagnostic::new(3, &["MD047", "single-trailing-newline"], "Files should end with a single newline character")
            .range(5, 1)
            .fix(FixInfo::insert(6, "\n"));
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["lineNumber"], 3);
        assert_eq!(json["ruleNames"][1], "single-trailing-newline");
        assert_eq!(json["fixInfo"], serde_json::json!({"editColumn": 6, "deleteCount": 0, "insertText": "\n"}));
    }
}
