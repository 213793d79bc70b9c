//!
//! Persisted settings consumed by the lint/fix/format core.
//!
//! Field names and enum values are the settings wire format: a settings file
//! saved by a host and loaded back here must round-trip byte-for-byte, so every
//! record uses camelCase keys and the exact enum spellings hosts persist
//! (`"atx"`, `"*"`, `"one_or_ordered"`, `"after-frontmatter"`, ...). Missing
//! keys fall back to defaults, which is how partial user settings are merged.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse JSON settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse TOML settings: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unsupported settings file format: {0} (expected .json or .toml)")]
    UnsupportedFormat(String),
}

/// Heading style preference (MD003).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    #[default]
    Atx,
    Setext,
    Consistent,
}

/// Emphasis marker preference (MD049).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub enum EmphasisMarker {
    #[default]
    #[serde(rename = "*")]
    Asterisk,
    #[serde(rename = "_")]
    Underscore,
    #[serde(rename = "consistent")]
    Consistent,
}

/// Strong marker preference (MD050).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub enum StrongMarker {
    #[default]
    #[serde(rename = "**")]
    Asterisk,
    #[serde(rename = "__")]
    Underscore,
    #[serde(rename = "consistent")]
    Consistent,
}

/// Unordered list bullet preference (MD004, list normalization, ToC bullets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum UnorderedListStyle {
    Asterisk,
    Plus,
    #[default]
    Dash,
    Consistent,
}

impl UnorderedListStyle {
    /// Bullet character used when lists are rewritten. `Consistent` has no
    /// single answer, so rewriting falls back to a dash.
    pub fn bullet(self) -> char {
        match self {
            UnorderedListStyle::Asterisk => '*',
            UnorderedListStyle::Plus => '+',
            UnorderedListStyle::Dash | UnorderedListStyle::Consistent => '-',
        }
    }
}

/// Ordered list numbering preference (MD029, list normalization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderedListStyle {
    One,
    Ordered,
    #[default]
    OneOrOrdered,
}

/// Code block style preference (MD046).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CodeBlockStyle {
    #[default]
    Fenced,
    Indented,
    Consistent,
}

/// Code fence character preference (MD048).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CodeFenceStyle {
    #[default]
    Backtick,
    Tilde,
    Consistent,
}

/// User-facing rule toggles. Read-only to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LintRules {
    pub no_trailing_spaces: bool,
    pub no_multiple_blank_lines: bool,
    pub require_blank_line_before_heading: bool,
    pub require_blank_line_after_heading: bool,
    pub heading_style: HeadingStyle,
    pub emphasis_marker: EmphasisMarker,
    pub strong_marker: StrongMarker,
    pub default_code_language: String,
    pub heading_increment: bool,
    pub no_duplicate_headings: bool,
    #[serde(rename = "singleH1")]
    pub single_h1: bool,
    pub no_trailing_punctuation_in_heading: bool,
    #[serde(rename = "firstLineH1")]
    pub first_line_h1: bool,
    pub unordered_list_style: UnorderedListStyle,
    pub ordered_list_style: OrderedListStyle,
    pub list_marker_space: bool,
    pub blank_lines_around_lists: bool,
    pub blank_lines_around_fences: bool,
    pub code_block_style: CodeBlockStyle,
    pub code_fence_style: CodeFenceStyle,
    pub no_bare_urls: bool,
    pub no_alt_text: bool,
    pub files_end_with_newline: bool,
}

impl Default for LintRules {
    fn default() -> Self {
        Self {
            no_trailing_spaces: true,
            no_multiple_blank_lines: true,
            require_blank_line_before_heading: true,
            require_blank_line_after_heading: true,
            heading_style: HeadingStyle::Atx,
            emphasis_marker: EmphasisMarker::Asterisk,
            strong_marker: StrongMarker::Asterisk,
            default_code_language: "text".to_string(),
            heading_increment: true,
            no_duplicate_headings: true,
            single_h1: true,
            no_trailing_punctuation_in_heading: true,
            first_line_h1: false,
            unordered_list_style: UnorderedListStyle::Dash,
            ordered_list_style: OrderedListStyle::OneOrOrdered,
            list_marker_space: true,
            blank_lines_around_lists: true,
            blank_lines_around_fences: true,
            code_block_style: CodeBlockStyle::Fenced,
            code_fence_style: CodeFenceStyle::Backtick,
            no_bare_urls: true,
            no_alt_text: true,
            files_end_with_newline: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProseWrap {
    Always,
    Never,
    #[default]
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EndOfLine {
    #[default]
    Lf,
    Crlf,
    Cr,
    Auto,
}

/// Formatting preferences shared by the pretty-printer, the code block
/// formatters and the rule mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PrettierMarkdownConfig {
    /// Maximum line width; `0` means unlimited.
    pub print_width: usize,
    pub tab_width: usize,
    pub use_tabs: bool,
    pub prose_wrap: ProseWrap,
    pub end_of_line: EndOfLine,
}

impl Default for PrettierMarkdownConfig {
    fn default() -> Self {
        Self {
            print_width: 0,
            tab_width: 2,
            use_tabs: false,
            prose_wrap: ProseWrap::Preserve,
            end_of_line: EndOfLine::Lf,
        }
    }
}

impl PrettierMarkdownConfig {
    /// Preset with a 100 column limit.
    pub fn enterprise() -> Self {
        Self {
            print_width: 100,
            ..Self::default()
        }
    }

    /// Width limit, or `None` when unlimited.
    pub fn line_limit(&self) -> Option<usize> {
        (self.print_width > 0).then_some(self.print_width)
    }

    /// Indentation unit for one nesting level.
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.tab_width.max(1))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub enum TocPosition {
    #[serde(rename = "top")]
    Top,
    #[default]
    #[serde(rename = "after-frontmatter")]
    AfterFrontmatter,
}

/// Switches for the post-processing transforms. Pipeline order is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PostProcessingConfig {
    pub enable_list_formatting: bool,
    pub enable_line_trimming_in_lists: bool,
    pub remove_duplicate_blank_lines: bool,
    pub enable_code_block_formatting: bool,
    pub code_block_languages: Vec<String>,
    pub enable_toc_generation: bool,
    pub toc_depth: u8,
    pub toc_position: TocPosition,
}

impl Default for PostProcessingConfig {
    fn default() -> Self {
        Self {
            enable_list_formatting: false,
            enable_line_trimming_in_lists: false,
            remove_duplicate_blank_lines: true,
            enable_code_block_formatting: false,
            code_block_languages: ["javascript", "typescript", "json", "css", "yaml", "bash"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            enable_toc_generation: false,
            toc_depth: 3,
            toc_position: TocPosition::AfterFrontmatter,
        }
    }
}

impl PostProcessingConfig {
    /// ToC depth clamped into the supported 1..=6 range.
    pub fn effective_toc_depth(&self) -> u8 {
        self.toc_depth.clamp(1, 6)
    }

    /// Configured languages, lowercased and trimmed, without duplicates.
    pub fn normalized_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = Vec::new();
        for language in &self.code_block_languages {
            let language = language.trim().to_lowercase();
            if !language.is_empty() && !languages.contains(&language) {
                languages.push(language);
            }
        }
        languages
    }
}

/// Knobs the rule table leaves tunable, plus fix-loop pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvancedTuning {
    pub max_blank_lines: usize,
    pub trailing_spaces_break: usize,
    pub heading_punctuation: String,
    pub emphasis_heading_punctuation: String,
    pub autofix_retry_delay_ms: u64,
    pub max_autofix_attempts: usize,
}

impl Default for AdvancedTuning {
    fn default() -> Self {
        Self {
            max_blank_lines: 1,
            trailing_spaces_break: 2,
            heading_punctuation: ".,;:!。，；：！".to_string(),
            emphasis_heading_punctuation: ".,;:!?。，；：！？".to_string(),
            autofix_retry_delay_ms: 100,
            max_autofix_attempts: 10,
        }
    }
}

/// The complete persisted settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub enable_auto_format: bool,
    pub enable_linting: bool,
    pub format_on_save: bool,
    pub show_lint_errors: bool,
    pub auto_fix_lint_issues: bool,
    pub prettier_config: PrettierMarkdownConfig,
    pub lint_rules: LintRules,
    pub post_processing_config: PostProcessingConfig,
    pub advanced: AdvancedTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_auto_format: true,
            enable_linting: true,
            format_on_save: false,
            show_lint_errors: true,
            auto_fix_lint_issues: false,
            prettier_config: PrettierMarkdownConfig::default(),
            lint_rules: LintRules::default(),
            post_processing_config: PostProcessingConfig::default(),
            advanced: AdvancedTuning::default(),
        }
    }
}

impl Settings {
    /// Load settings from a `.json` or `.toml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(ConfigError::UnsupportedFormat(display)),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(content)?;
        settings.log_suspicious_values();
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.log_suspicious_values();
        Ok(settings)
    }

    /// Serialize to the persisted JSON form.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON Schema describing the settings file.
    pub fn json_schema() -> Result<String, ConfigError> {
        let schema = schemars::schema_for!(Settings);
        Ok(serde_json::to_string_pretty(&schema)?)
    }

    fn log_suspicious_values(&self) {
        let depth = self.post_processing_config.toc_depth;
        if !(1..=6).contains(&depth) {
            log::warn!("tocDepth {depth} is outside 1..=6 and will be clamped");
        }
        if !crate::code_languages::is_known_language(&self.lint_rules.default_code_language) {
            log::warn!(
                "defaultCodeLanguage '{}' is not a recognised language identifier",
                self.lint_rules.default_code_language
            );
        }
        if self.prettier_config.tab_width == 0 {
            log::warn!("tabWidth 0 is treated as 1");
        }
    }
}
