use super::{Rule, char_len, expected_actual};
use crate::engine::{LintContext, RawDiagnostic};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static LINK_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]\s+|\d+[.)]\s+)?!?\[[^\]]*\]\([^)]*\)\s*$|^\s*<?https?://\S+>?\s*$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD013Config {
    pub line_length: usize,
    pub heading_line_length: Option<usize>,
    pub code_block_line_length: Option<usize>,
    pub code_blocks: bool,
    pub tables: bool,
    pub headings: bool,
    /// Flag every long line, even without whitespace past the limit
    pub strict: bool,
}

impl Default for MD013Config {
    fn default() -> Self {
        Self {
            line_length: 80,
            heading_line_length: None,
            code_block_line_length: None,
            code_blocks: true,
            tables: true,
            headings: true,
            strict: false,
        }
    }
}

/// Rule MD013: Line length
///
/// Outside strict mode a line is only reported when there is whitespace
/// beyond the limit, so long URLs and link-only lines pass.
#[derive(Debug, Clone)]
pub struct MD013LineLength {
    config: MD013Config,
}

impl MD013LineLength {
    pub fn new(config: MD013Config) -> Self {
        Self { config }
    }
}

impl Rule for MD013LineLength {
    fn name(&self) -> &'static str {
        "MD013"
    }

    fn alias(&self) -> &'static str {
        "line-length"
    }

    fn description(&self) -> &'static str {
        "Line length"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();

        for (idx, info) in ctx.lines.iter().enumerate() {
            if info.in_front_matter || info.is_setext_underline {
                continue;
            }
            let limit = if info.in_code_block {
                if !self.config.code_blocks {
                    continue;
                }
                self.config.code_block_line_length.unwrap_or(self.config.line_length)
            } else if info.heading.is_some() {
                if !self.config.headings {
                    continue;
                }
                self.config.heading_line_length.unwrap_or(self.config.line_length)
            } else if info.is_table_row {
                if !self.config.tables {
                    continue;
                }
                self.config.line_length
            } else {
                self.config.line_length
            };

            let line = info.content(ctx.content);
            let length = char_len(line);
            if length <= limit {
                continue;
            }
            if !self.config.strict {
                let beyond: String = line.chars().skip(limit).collect();
                if !beyond.contains(char::is_whitespace) || LINK_ONLY.is_match(line) {
                    continue;
                }
            }
            warnings.push(
                self.diagnostic(idx + 1)
                    .detail(expected_actual(limit, length))
                    .range(limit + 1, length - limit),
            );
        }

        warnings
    }
}
