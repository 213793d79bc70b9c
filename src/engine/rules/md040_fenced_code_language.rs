use super::Rule;
use crate::engine::{LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD040Config {
    /// When non-empty, only these languages are allowed
    pub allowed_languages: Vec<String>,
    /// Info strings must be only the language, without attributes
    pub language_only: bool,
}

/// Rule MD040: Fenced code blocks should have a language specified
///
/// The engine has no fix for this; the adapter fills in a default language
/// after the native fixes have been applied.
#[derive(Debug, Clone)]
pub struct MD040FencedCodeLanguage {
    config: MD040Config,
}

impl MD040FencedCodeLanguage {
    pub fn new(config: MD040Config) -> Self {
        Self { config }
    }
}

impl Rule for MD040FencedCodeLanguage {
    fn name(&self) -> &'static str {
        "MD040"
    }

    fn alias(&self) -> &'static str {
        "fenced-code-language"
    }

    fn description(&self) -> &'static str {
        "Fenced code blocks should have a language specified"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();

        for block in ctx.code_blocks.iter().filter(|b| b.fenced) {
            let line_number = block.start_line + 1;
            let context = ctx.line(block.start_line).trim();
            let mut words = block.info_string.split_whitespace();
            let Some(language) = words.next() else {
                warnings.push(self.diagnostic(line_number).context(context));
                continue;
            };

            if !self.config.allowed_languages.is_empty() && !self.config.allowed_languages.iter().any(|l| l == language) {
                warnings.push(
                    self.diagnostic(line_number)
                        .detail(format!("\"{language}\" is not allowed"))
                        .context(context),
                );
            } else if self.config.language_only && words.next().is_some() {
                warnings.push(
                    self.diagnostic(line_number)
                        .detail(format!("Info string contains more than language: \"{}\"", block.info_string))
                        .context(context),
                );
            }
        }

        warnings
    }
}
