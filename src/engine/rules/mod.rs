//!
//! Built-in rules, one module per markdownlint code.
//!
//! Rules read options from the engine configuration through small serde
//! structs; missing keys fall back to markdownlint's defaults.

mod md001_heading_increment;
mod md003_heading_style;
mod md004_ul_style;
mod md009_no_trailing_spaces;
mod md010_no_hard_tabs;
mod md012_no_multiple_blanks;
mod md013_line_length;
mod md018_no_missing_space_atx;
mod md019_no_multiple_space_atx;
mod md022_blanks_around_headings;
mod md023_heading_start_left;
mod md024_no_duplicate_heading;
mod md025_single_title;
mod md026_no_trailing_punctuation;
mod md029_ol_prefix;
mod md030_list_marker_space;
mod md031_blanks_around_fences;
mod md032_blanks_around_lists;
mod md034_no_bare_urls;
mod md040_fenced_code_language;
mod md041_first_line_heading;
mod md045_no_alt_text;
mod md046_code_block_style;
mod md047_single_trailing_newline;
mod md048_code_fence_style;
mod md049_emphasis_style;
mod md050_strong_style;

pub use md001_heading_increment::MD001HeadingIncrement;
pub use md003_heading_style::MD003HeadingStyle;
pub use md004_ul_style::MD004UlStyle;
pub use md009_no_trailing_spaces::MD009NoTrailingSpaces;
pub use md010_no_hard_tabs::MD010NoHardTabs;
pub use md012_no_multiple_blanks::MD012NoMultipleBlanks;
pub use md013_line_length::MD013LineLength;
pub use md018_no_missing_space_atx::MD018NoMissingSpaceAtx;
pub use md019_no_multiple_space_atx::MD019NoMultipleSpaceAtx;
pub use md022_blanks_around_headings::MD022BlanksAroundHeadings;
pub use md023_heading_start_left::MD023HeadingStartLeft;
pub use md024_no_duplicate_heading::MD024NoDuplicateHeading;
pub use md025_single_title::MD025SingleTitle;
pub use md026_no_trailing_punctuation::MD026NoTrailingPunctuation;
pub use md029_ol_prefix::MD029OlPrefix;
pub use md030_list_marker_space::MD030ListMarkerSpace;
pub use md031_blanks_around_fences::MD031BlanksAroundFences;
pub use md032_blanks_around_lists::MD032BlanksAroundLists;
pub use md034_no_bare_urls::MD034NoBareUrls;
pub use md040_fenced_code_language::MD040FencedCodeLanguage;
pub use md041_first_line_heading::MD041FirstLineHeading;
pub use md045_no_alt_text::MD045NoAltText;
pub use md046_code_block_style::MD046CodeBlockStyle;
pub use md047_single_trailing_newline::MD047SingleTrailingNewline;
pub use md048_code_fence_style::MD048CodeFenceStyle;
pub use md049_emphasis_style::MD049EmphasisStyle;
pub use md050_strong_style::MD050StrongStyle;

use super::{EngineError, LintContext, RawDiagnostic};
use crate::front_matter;
use dyn_clone::DynClone;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub trait Rule: DynClone + Send + Sync {
    /// Rule code, e.g. `MD009`.
    fn name(&self) -> &'static str;
    fn alias(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic>;

    /// A diagnostic for this rule at a 1-based line.
    fn diagnostic(&self, line_number: usize) -> RawDiagnostic {
        RawDiagnostic::new(line_number, &[self.name(), self.alias()], self.description())
    }
}

dyn_clone::clone_trait_object!(Rule);

/// Codes implemented by the built-in engine, in run order.
pub const RULE_CODES: [&str; 27] = [
    "MD001", "MD003", "MD004", "MD009", "MD010", "MD012", "MD013", "MD018", "MD019", "MD022", "MD023", "MD024",
    "MD025", "MD026", "MD029", "MD030", "MD031", "MD032", "MD034", "MD040", "MD041", "MD045", "MD046", "MD047",
    "MD048", "MD049", "MD050",
];

pub fn is_builtin(code: &str) -> bool {
    RULE_CODES.contains(&code)
}

fn parse_options<T: DeserializeOwned + Default>(code: &str, options: &Map<String, Value>) -> Result<T, EngineError> {
    if options.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_value(Value::Object(options.clone())).map_err(|e| EngineError::InvalidOptions {
        rule: code.to_string(),
        message: e.to_string(),
    })
}

/// Instantiate the rule for `code` with its options. `None` for unknown codes.
pub fn create_rule(code: &str, options: &Map<String, Value>) -> Result<Option<Box<dyn Rule>>, EngineError> {
    let rule: Box<dyn Rule> = match code {
        "MD001" => Box::new(MD001HeadingIncrement),
        "MD003" => Box::new(MD003HeadingStyle::new(parse_options(code, options)?)),
        "MD004" => Box::new(MD004UlStyle::new(parse_options(code, options)?)),
        "MD009" => Box::new(MD009NoTrailingSpaces::new(parse_options(code, options)?)),
        "MD010" => Box::new(MD010NoHardTabs::new(parse_options(code, options)?)),
        "MD012" => Box::new(MD012NoMultipleBlanks::new(parse_options(code, options)?)),
        "MD013" => Box::new(MD013LineLength::new(parse_options(code, options)?)),
        "MD018" => Box::new(MD018NoMissingSpaceAtx),
        "MD019" => Box::new(MD019NoMultipleSpaceAtx),
        "MD022" => Box::new(MD022BlanksAroundHeadings::new(parse_options(code, options)?)),
        "MD023" => Box::new(MD023HeadingStartLeft),
        "MD024" => Box::new(MD024NoDuplicateHeading::new(parse_options(code, options)?)),
        "MD025" => Box::new(MD025SingleTitle::new(parse_options(code, options)?)),
        "MD026" => Box::new(MD026NoTrailingPunctuation::new(parse_options(code, options)?)),
        "MD029" => Box::new(MD029OlPrefix::new(parse_options(code, options)?)),
        "MD030" => Box::new(MD030ListMarkerSpace::new(parse_options(code, options)?)),
        "MD031" => Box::new(MD031BlanksAroundFences::new(parse_options(code, options)?)),
        "MD032" => Box::new(MD032BlanksAroundLists),
        "MD034" => Box::new(MD034NoBareUrls),
        "MD040" => Box::new(MD040FencedCodeLanguage::new(parse_options(code, options)?)),
        "MD041" => Box::new(MD041FirstLineHeading::new(parse_options(code, options)?)),
        "MD045" => Box::new(MD045NoAltText),
        "MD046" => Box::new(MD046CodeBlockStyle::new(parse_options(code, options)?)),
        "MD047" => Box::new(MD047SingleTrailingNewline),
        "MD048" => Box::new(MD048CodeFenceStyle::new(parse_options(code, options)?)),
        "MD049" => Box::new(MD049EmphasisStyle::new(parse_options(code, options)?)),
        "MD050" => Box::new(MD050StrongStyle::new(parse_options(code, options)?)),
        _ => return Ok(None),
    };
    Ok(Some(rule))
}

pub(crate) fn expected_actual(expected: impl std::fmt::Display, actual: impl std::fmt::Display) -> String {
    format!("Expected: {expected}; Actual: {actual}")
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Whether the document's front matter sets a title matching `pattern`.
pub(crate) fn front_matter_has_title(ctx: &LintContext, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    let Some(raw) = front_matter::extract(ctx.content).raw else {
        return false;
    };
    match Regex::new(pattern) {
        Ok(re) => raw.lines().any(|line| re.is_match(line)),
        Err(e) => {
            log::warn!("Invalid front_matter_title pattern '{pattern}': {e}");
            false
        }
    }
}

pub(crate) fn default_title_pattern() -> String {
    r#"^\s*"?title"?\s*[:=]"#.to_string()
}
