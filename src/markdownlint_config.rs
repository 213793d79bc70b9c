//!
//! Mapping from user-facing rule toggles to a markdownlint-style engine
//! configuration.
//!
//! [`map_lint_rules`] is the policy surface: one table listing every
//! diagnostic code and how it is derived from `LintRules`, the formatter
//! preferences and `AdvancedTuning`. Codes without a user-facing toggle have
//! fixed values in the same table. Severity is not part of the configuration.
//!
//! Configurations written for markdownlint itself (JSON or YAML, codes or
//! aliases as keys) can also be loaded and used in place of the mapped one.

use crate::config::{
    AdvancedTuning, CodeBlockStyle, CodeFenceStyle, EmphasisMarker, HeadingStyle, LintRules, OrderedListStyle,
    PrettierMarkdownConfig, StrongMarker, UnorderedListStyle,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse markdownlint config {path}: {message}")]
    Parse { path: String, message: String },
}

/// Setting of a single diagnostic code: on/off, or on with options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSetting {
    Enabled(bool),
    Options(Map<String, Value>),
}

impl RuleSetting {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, RuleSetting::Enabled(false))
    }

    /// Options of an enabled rule; `None` when disabled.
    pub fn options(&self) -> Option<Map<String, Value>> {
        match self {
            RuleSetting::Enabled(false) => None,
            RuleSetting::Enabled(true) => Some(Map::new()),
            RuleSetting::Options(options) => Some(options.clone()),
        }
    }
}

/// Engine configuration in markdownlint's shape:
/// `{"default": true, "MD001": true, "MD013": {"line_length": 80}, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_true")]
    pub default: bool,
    #[serde(flatten)]
    pub rules: IndexMap<String, RuleSetting>,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default: true,
            rules: IndexMap::new(),
        }
    }
}

impl EngineConfig {
    /// Effective options for `code`, or `None` when the code is disabled.
    /// Codes absent from the table follow `default`.
    pub fn rule_options(&self, code: &str) -> Option<Map<String, Value>> {
        match self.rules.get(code) {
            Some(setting) => setting.options(),
            None if self.default => Some(Map::new()),
            None => None,
        }
    }

    pub fn is_enabled(&self, code: &str) -> bool {
        self.rules.get(code).map_or(self.default, RuleSetting::is_enabled)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a markdownlint config file (JSON or YAML). Alias keys such as
    /// `no-trailing-spaces` are mapped to their codes; unknown keys are dropped.
    pub fn load(path: &str) -> Result<Self, EngineConfigError> {
        let content = fs::read_to_string(path).map_err(|source| EngineConfigError::Io {
            path: path.to_string(),
            source,
        })?;

        let raw: IndexMap<String, Value> = if path.ends_with(".json") || path.ends_with(".jsonc") {
            serde_json::from_str::<IndexMap<String, Value>>(&content).map_err(|e| e.to_string())
        } else if path.ends_with(".yaml") || path.ends_with(".yml") {
            serde_yml::from_str::<IndexMap<String, Value>>(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str::<IndexMap<String, Value>>(&content)
                .or_else(|_| serde_yml::from_str::<IndexMap<String, Value>>(&content))
                .map_err(|e| format!("not valid JSON or YAML: {e}"))
        }
        .map_err(|message| EngineConfigError::Parse {
            path: path.to_string(),
            message,
        })?;

        Ok(Self::from_markdownlint_map(raw))
    }

    /// Build a configuration from raw markdownlint keys and values.
    pub fn from_markdownlint_map(raw: IndexMap<String, Value>) -> Self {
        let mut config = EngineConfig::default();
        for (key, value) in raw {
            if key == "default" {
                config.default = value.as_bool().unwrap_or(true);
                continue;
            }
            if key == "$schema" || key == "extends" {
                continue;
            }
            let Some(code) = rule_code_for_key(&key) else {
                log::debug!("Ignoring unknown markdownlint config key '{key}'");
                continue;
            };
            match serde_json::from_value::<RuleSetting>(value) {
                Ok(setting) => {
                    config.rules.insert(code.to_string(), setting);
                }
                Err(e) => log::warn!("Ignoring invalid setting for {code}: {e}"),
            }
        }
        config
    }
}

/// Map a markdownlint rule code or alias to its code.
pub fn rule_code_for_key(key: &str) -> Option<&'static str> {
    match key.to_ascii_uppercase().replace('_', "-").as_str() {
        "MD001" | "HEADING-INCREMENT" => Some("MD001"),
        "MD003" | "HEADING-STYLE" => Some("MD003"),
        "MD004" | "UL-STYLE" => Some("MD004"),
        "MD005" | "LIST-INDENT" => Some("MD005"),
        "MD007" | "UL-INDENT" => Some("MD007"),
        "MD009" | "NO-TRAILING-SPACES" => Some("MD009"),
        "MD010" | "NO-HARD-TABS" => Some("MD010"),
        "MD011" | "NO-REVERSED-LINKS" => Some("MD011"),
        "MD012" | "NO-MULTIPLE-BLANKS" => Some("MD012"),
        "MD013" | "LINE-LENGTH" => Some("MD013"),
        "MD014" | "COMMANDS-SHOW-OUTPUT" => Some("MD014"),
        "MD018" | "NO-MISSING-SPACE-ATX" => Some("MD018"),
        "MD019" | "NO-MULTIPLE-SPACE-ATX" => Some("MD019"),
        "MD020" | "NO-MISSING-SPACE-CLOSED-ATX" => Some("MD020"),
        "MD021" | "NO-MULTIPLE-SPACE-CLOSED-ATX" => Some("MD021"),
        "MD022" | "BLANKS-AROUND-HEADINGS" => Some("MD022"),
        "MD023" | "HEADING-START-LEFT" => Some("MD023"),
        "MD024" | "NO-DUPLICATE-HEADING" => Some("MD024"),
        "MD025" | "SINGLE-TITLE" | "SINGLE-H1" => Some("MD025"),
        "MD026" | "NO-TRAILING-PUNCTUATION" => Some("MD026"),
        "MD027" | "NO-MULTIPLE-SPACE-BLOCKQUOTE" => Some("MD027"),
        "MD028" | "NO-BLANKS-BLOCKQUOTE" => Some("MD028"),
        "MD029" | "OL-PREFIX" => Some("MD029"),
        "MD030" | "LIST-MARKER-SPACE" => Some("MD030"),
        "MD031" | "BLANKS-AROUND-FENCES" => Some("MD031"),
        "MD032" | "BLANKS-AROUND-LISTS" => Some("MD032"),
        "MD033" | "NO-INLINE-HTML" => Some("MD033"),
        "MD034" | "NO-BARE-URLS" => Some("MD034"),
        "MD035" | "HR-STYLE" => Some("MD035"),
        "MD036" | "NO-EMPHASIS-AS-HEADING" => Some("MD036"),
        "MD037" | "NO-SPACE-IN-EMPHASIS" => Some("MD037"),
        "MD038" | "NO-SPACE-IN-CODE" => Some("MD038"),
        "MD039" | "NO-SPACE-IN-LINKS" => Some("MD039"),
        "MD040" | "FENCED-CODE-LANGUAGE" => Some("MD040"),
        "MD041" | "FIRST-LINE-HEADING" | "FIRST-LINE-H1" => Some("MD041"),
        "MD042" | "NO-EMPTY-LINKS" => Some("MD042"),
        "MD043" | "REQUIRED-HEADINGS" => Some("MD043"),
        "MD044" | "PROPER-NAMES" => Some("MD044"),
        "MD045" | "NO-ALT-TEXT" => Some("MD045"),
        "MD046" | "CODE-BLOCK-STYLE" => Some("MD046"),
        "MD047" | "SINGLE-TRAILING-NEWLINE" => Some("MD047"),
        "MD048" | "CODE-FENCE-STYLE" => Some("MD048"),
        "MD049" | "EMPHASIS-STYLE" => Some("MD049"),
        "MD050" | "STRONG-STYLE" => Some("MD050"),
        "MD051" | "LINK-FRAGMENTS" => Some("MD051"),
        "MD052" | "REFERENCE-LINKS-IMAGES" => Some("MD052"),
        "MD053" | "LINK-IMAGE-REFERENCE-DEFINITIONS" => Some("MD053"),
        "MD054" | "LINK-IMAGE-STYLE" => Some("MD054"),
        "MD055" | "TABLE-PIPE-STYLE" => Some("MD055"),
        "MD056" | "TABLE-COLUMN-COUNT" => Some("MD056"),
        "MD058" | "BLANKS-AROUND-TABLES" => Some("MD058"),
        "MD059" | "DESCRIPTIVE-LINK-TEXT" => Some("MD059"),
        _ => None,
    }
}

fn on(enabled: bool) -> RuleSetting {
    RuleSetting::Enabled(enabled)
}

fn with(options: Value) -> RuleSetting {
    match options {
        Value::Object(map) => RuleSetting::Options(map),
        _ => RuleSetting::Enabled(true),
    }
}

fn when(enabled: bool, options: Value) -> RuleSetting {
    if enabled { with(options) } else { on(false) }
}

fn heading_style(style: HeadingStyle) -> &'static str {
    match style {
        HeadingStyle::Atx => "atx",
        HeadingStyle::Setext => "setext",
        HeadingStyle::Consistent => "consistent",
    }
}

fn ul_style(style: UnorderedListStyle) -> &'static str {
    match style {
        UnorderedListStyle::Asterisk => "asterisk",
        UnorderedListStyle::Plus => "plus",
        UnorderedListStyle::Dash => "dash",
        UnorderedListStyle::Consistent => "consistent",
    }
}

fn ol_style(style: OrderedListStyle) -> &'static str {
    match style {
        OrderedListStyle::One => "one",
        OrderedListStyle::Ordered => "ordered",
        OrderedListStyle::OneOrOrdered => "one_or_ordered",
    }
}

fn code_block_style(style: CodeBlockStyle) -> &'static str {
    match style {
        CodeBlockStyle::Fenced => "fenced",
        CodeBlockStyle::Indented => "indented",
        CodeBlockStyle::Consistent => "consistent",
    }
}

fn fence_style(style: CodeFenceStyle) -> &'static str {
    match style {
        CodeFenceStyle::Backtick => "backtick",
        CodeFenceStyle::Tilde => "tilde",
        CodeFenceStyle::Consistent => "consistent",
    }
}

fn emphasis_style(marker: EmphasisMarker) -> &'static str {
    match marker {
        EmphasisMarker::Asterisk => "asterisk",
        EmphasisMarker::Underscore => "underscore",
        EmphasisMarker::Consistent => "consistent",
    }
}

fn strong_style(marker: StrongMarker) -> &'static str {
    match marker {
        StrongMarker::Asterisk => "asterisk",
        StrongMarker::Underscore => "underscore",
        StrongMarker::Consistent => "consistent",
    }
}

/// Expected nested list indent for MD007.
fn list_indent(prettier: &PrettierMarkdownConfig) -> usize {
    if prettier.use_tabs {
        prettier.tab_width.max(1)
    } else {
        prettier.tab_width.clamp(2, 4)
    }
}

/// Build the engine configuration for the given preferences.
pub fn map_lint_rules(rules: &LintRules, prettier: &PrettierMarkdownConfig, advanced: &AdvancedTuning) -> EngineConfig {
    let before = rules.require_blank_line_before_heading;
    let after = rules.require_blank_line_after_heading;

    let table: Vec<(&str, RuleSetting)> = vec![
        ("MD001", on(rules.heading_increment)),
        ("MD003", with(json!({ "style": heading_style(rules.heading_style) }))),
        ("MD004", with(json!({ "style": ul_style(rules.unordered_list_style) }))),
        ("MD005", on(true)),
        ("MD007", with(json!({ "indent": list_indent(prettier) }))),
        (
            "MD009",
            when(
                rules.no_trailing_spaces,
                json!({ "br_spaces": advanced.trailing_spaces_break, "list_item_empty_lines": false }),
            ),
        ),
        (
            "MD010",
            with(json!({ "code_blocks": !prettier.use_tabs, "spaces_per_tab": prettier.tab_width.max(1) })),
        ),
        ("MD011", on(true)),
        (
            "MD012",
            when(rules.no_multiple_blank_lines, json!({ "maximum": advanced.max_blank_lines.max(1) })),
        ),
        (
            "MD013",
            match prettier.line_limit() {
                Some(width) => with(json!({
                    "line_length": width,
                    "code_blocks": false,
                    "tables": false,
                    "headings": false
                })),
                None => on(false),
            },
        ),
        ("MD014", on(false)),
        ("MD018", on(true)),
        ("MD019", on(true)),
        ("MD020", on(true)),
        ("MD021", on(true)),
        (
            "MD022",
            when(
                before || after,
                json!({ "lines_above": usize::from(before), "lines_below": usize::from(after) }),
            ),
        ),
        ("MD023", on(true)),
        ("MD024", when(rules.no_duplicate_headings, json!({ "siblings_only": false }))),
        ("MD025", when(rules.single_h1, json!({ "level": 1 }))),
        (
            "MD026",
            when(
                rules.no_trailing_punctuation_in_heading,
                json!({ "punctuation": advanced.heading_punctuation }),
            ),
        ),
        ("MD027", on(false)),
        ("MD028", on(false)),
        ("MD029", with(json!({ "style": ol_style(rules.ordered_list_style) }))),
        (
            "MD030",
            when(
                rules.list_marker_space,
                json!({ "ul_single": 1, "ol_single": 1, "ul_multi": 1, "ol_multi": 1 }),
            ),
        ),
        ("MD031", when(rules.blank_lines_around_fences, json!({ "list_items": true }))),
        ("MD032", on(rules.blank_lines_around_lists)),
        ("MD033", with(json!({ "allowed_elements": [] }))),
        ("MD034", on(rules.no_bare_urls)),
        ("MD035", with(json!({ "style": "consistent" }))),
        ("MD036", with(json!({ "punctuation": advanced.emphasis_heading_punctuation }))),
        ("MD037", on(true)),
        ("MD038", on(true)),
        ("MD039", on(true)),
        ("MD040", with(json!({ "allowed_languages": [] }))),
        ("MD041", when(rules.first_line_h1, json!({ "level": 1 }))),
        ("MD042", on(true)),
        ("MD043", on(false)),
        ("MD044", on(false)),
        ("MD045", on(rules.no_alt_text)),
        ("MD046", with(json!({ "style": code_block_style(rules.code_block_style) }))),
        ("MD047", on(rules.files_end_with_newline)),
        ("MD048", with(json!({ "style": fence_style(rules.code_fence_style) }))),
        ("MD049", with(json!({ "style": emphasis_style(rules.emphasis_marker) }))),
        ("MD050", with(json!({ "style": strong_style(rules.strong_marker) }))),
        ("MD051", on(true)),
        ("MD052", on(false)),
        ("MD053", on(true)),
        (
            "MD054",
            with(json!({
                "autolink": true,
                "inline": true,
                "full": true,
                "collapsed": true,
                "shortcut": true,
                "url_inline": true
            })),
        ),
        ("MD055", with(json!({ "style": "consistent" }))),
        ("MD056", on(true)),
        ("MD058", on(true)),
        ("MD059", on(true)),
    ];

    EngineConfig {
        default: true,
        rules: table.into_iter().map(|(code, setting)| (code.to_string(), setting)).collect(),
    }
}
