//!
//! Per-language formatters for the contents of fenced code blocks.
//!
//! A formatter receives the dedented block body and returns the formatted
//! body. Any `Err` is a pass-through for the caller: the block is left as is.

use crate::code_languages;
use crate::config::PrettierMarkdownConfig;
use crate::tool_executor::{Invocation, ToolError, ToolExecutor};
use serde::Serialize;

pub trait CodeFormatter: Send + Sync {
    fn name(&self) -> &'static str;

    fn format_code(&self, language: &str, code: &str, options: &PrettierMarkdownConfig) -> Result<String, ToolError>;
}

/// In-process formatter for data languages (JSON, YAML).
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCodeFormatter;

impl BuiltinCodeFormatter {
    fn format_json(code: &str, options: &PrettierMarkdownConfig) -> Result<String, ToolError> {
        let value: serde_json::Value = serde_json::from_str(code).map_err(|e| ToolError::InvalidInput {
            language: "json".to_string(),
            message: e.to_string(),
        })?;

        let indent = options.indent_unit();
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer).map_err(|e| ToolError::InvalidInput {
            language: "json".to_string(),
            message: e.to_string(),
        })?;

        String::from_utf8(buf).map_err(|e| ToolError::Io { message: e.to_string() })
    }

    fn format_yaml(code: &str) -> Result<String, ToolError> {
        serde_yml::from_str::<serde_yml::Value>(code).map_err(|e| ToolError::InvalidInput {
            language: "yaml".to_string(),
            message: e.to_string(),
        })?;

        Ok(code.lines().map(str::trim_end).collect::<Vec<_>>().join("\n"))
    }
}

impl CodeFormatter for BuiltinCodeFormatter {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn format_code(&self, language: &str, code: &str, options: &PrettierMarkdownConfig) -> Result<String, ToolError> {
        match language.to_lowercase().as_str() {
            "json" => Self::format_json(code, options),
            "yaml" | "yml" => Self::format_yaml(code),
            other => Err(ToolError::Unsupported {
                language: other.to_string(),
            }),
        }
    }
}

/// Formats code by piping it through the `prettier` CLI.
#[derive(Debug, Clone)]
pub struct PrettierCodeFormatter {
    executor: ToolExecutor,
    program: String,
}

impl PrettierCodeFormatter {
    pub fn new(executor: ToolExecutor) -> Self {
        Self {
            executor,
            program: "prettier".to_string(),
        }
    }

    /// Use a different executable, e.g. `npx` wrappers or a pinned path.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn invocation(&self, parser: &str, options: &PrettierMarkdownConfig) -> Invocation {
        Invocation::prettier(&self.program, parser, options)
    }
}

impl Default for PrettierCodeFormatter {
    fn default() -> Self {
        Self::new(ToolExecutor::default())
    }
}

impl CodeFormatter for PrettierCodeFormatter {
    fn name(&self) -> &'static str {
        "prettier"
    }

    fn format_code(&self, language: &str, code: &str, options: &PrettierMarkdownConfig) -> Result<String, ToolError> {
        let parser = code_languages::prettier_parser(language).ok_or_else(|| ToolError::Unsupported {
            language: language.to_string(),
        })?;
        self.executor.run(&self.invocation(parser, options), code)
    }
}

/// Tries each formatter in order and returns the first success.
#[derive(Default)]
pub struct ChainedCodeFormatter {
    formatters: Vec<Box<dyn CodeFormatter>>,
}

impl ChainedCodeFormatter {
    pub fn new(formatters: Vec<Box<dyn CodeFormatter>>) -> Self {
        Self { formatters }
    }

    pub fn push(mut self, formatter: impl CodeFormatter + 'static) -> Self {
        self.formatters.push(Box::new(formatter));
        self
    }
}

impl CodeFormatter for ChainedCodeFormatter {
    fn name(&self) -> &'static str {
        "chained"
    }

    fn format_code(&self, language: &str, code: &str, options: &PrettierMarkdownConfig) -> Result<String, ToolError> {
        let mut last_error = ToolError::Unsupported {
            language: language.to_string(),
        };
        for formatter in &self.formatters {
            match formatter.format_code(language, code, options) {
                Ok(formatted) => return Ok(formatted),
                Err(ToolError::Unsupported { .. }) => {}
                Err(e) => {
                    log::debug!("{} formatter failed for {language}: {e}", formatter.name());
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_json_uses_tab_width() {
        let options = PrettierMarkdownConfig {
            tab_width: 4,
            ..Default::default()
        };
        let formatted = BuiltinCodeFormatter
            .format_code("json", r#"{"b":1,"a":[1,2]}"#, &options)
            .unwrap();
        assert_eq!(formatted, "{\n    \"b\": 1,\n    \"a\": [\n        1,\n        2\n    ]\n}");
    }

    #[test]
    fn test_builtin_json_with_tabs() {
        let options = PrettierMarkdownConfig {
            use_tabs: true,
            ..Default::default()
        };
        let formatted = BuiltinCodeFormatter.format_code("JSON", r#"{"a":1}"#, &options).unwrap();
        assert_eq!(formatted, "{\n\t\"a\": 1\n}");
    }

    #[test]
    fn test_builtin_json_invalid() {
        let result = BuiltinCodeFormatter.format_code("json", "{not json", &PrettierMarkdownConfig::default());
        assert!(matches!(result, Err(ToolError::InvalidInput { .. })));
    }

    #[test]
    fn test_builtin_yaml_trims_trailing_whitespace() {
        let formatted = BuiltinCodeFormatter
            .format_code("yml", "a: 1   \nb:\n  - x  ", &PrettierMarkdownConfig::default())
            .unwrap();
        assert_eq!(formatted, "a: 1\nb:\n  - x");
    }

    #[test]
    fn test_builtin_unsupported_language() {
        let result = BuiltinCodeFormatter.format_code("python", "x=1", &PrettierMarkdownConfig::default());
        assert_eq!(
            result,
            Err(ToolError::Unsupported {
                language: "python".to_string()
            })
        );
    }

    #[test]
    fn test_prettier_command_line() {
        let formatter = PrettierCodeFormatter::default();
        let options = PrettierMarkdownConfig {
            print_width: 80,
            use_tabs: true,
            ..Default::default()
        };
        let invocation = formatter.with_program("npx-prettier").invocation("babel", &options);
        assert_eq!(invocation.program(), "npx-prettier");
        assert_eq!(invocation.parser(), Some("babel"));
        assert!(invocation.args().windows(2).any(|w| w == ["--print-width", "80"]));
    }

    #[test]
    fn test_prettier_rejects_unknown_language() {
        let formatter = PrettierCodeFormatter::default();
        let result = formatter.format_code("cobol", "x", &PrettierMarkdownConfig::default());
        assert!(matches!(result, Err(ToolError::Unsupported { .. })));
    }

    #[test]
    fn test_chain_falls_through_to_next() {
        let chain = ChainedCodeFormatter::default()
            .push(PrettierCodeFormatter::default().with_program("nonexistent-prettier-xyz"))
            .push(BuiltinCodeFormatter);
        let formatted = chain
            .format_code("json", r#"{"a":1}"#, &PrettierMarkdownConfig::default())
            .unwrap();
        assert_eq!(formatted, "{\n  \"a\": 1\n}");
    }
}
