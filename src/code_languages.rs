//! Static language identifier data for fenced code blocks.

use phf::phf_map;

/// Fence language identifier -> prettier parser name.
pub static PRETTIER_PARSERS: phf::Map<&'static str, &'static str> = phf_map! {
    "javascript" => "babel",
    "js" => "babel",
    "jsx" => "babel",
    "typescript" => "typescript",
    "ts" => "typescript",
    "tsx" => "typescript",
    "json" => "json",
    "json5" => "json5",
    "css" => "css",
    "scss" => "scss",
    "less" => "less",
    "html" => "html",
    "vue" => "vue",
    "yaml" => "yaml",
    "yml" => "yaml",
    "markdown" => "markdown",
    "md" => "markdown",
    "graphql" => "graphql",
};

/// Identifiers whose blocks get shell line normalization instead of a
/// code formatter.
pub const SHELL_LANGUAGES: &[&str] = &["bash", "shell", "sh", "zsh"];

/// Identifiers offered to hosts when choosing a default fence language.
pub const COMMON_LANGUAGES: &[&str] = &[
    "text",
    "plaintext",
    "bash",
    "shell",
    "sh",
    "zsh",
    "powershell",
    "console",
    "javascript",
    "js",
    "jsx",
    "typescript",
    "ts",
    "tsx",
    "json",
    "json5",
    "yaml",
    "yml",
    "toml",
    "ini",
    "xml",
    "html",
    "css",
    "scss",
    "less",
    "vue",
    "markdown",
    "md",
    "graphql",
    "sql",
    "python",
    "py",
    "ruby",
    "rb",
    "rust",
    "rs",
    "go",
    "java",
    "kotlin",
    "scala",
    "swift",
    "c",
    "cpp",
    "csharp",
    "cs",
    "php",
    "perl",
    "lua",
    "r",
    "dart",
    "haskell",
    "elixir",
    "erlang",
    "clojure",
    "dockerfile",
    "makefile",
    "nginx",
    "diff",
    "mermaid",
    "latex",
    "tex",
];

/// Prettier parser for a fence identifier, case-insensitively.
pub fn prettier_parser(language: &str) -> Option<&'static str> {
    PRETTIER_PARSERS.get(language.to_lowercase().as_str()).copied()
}

pub fn is_shell_language(language: &str) -> bool {
    let language = language.to_lowercase();
    SHELL_LANGUAGES.contains(&language.as_str())
}

/// Whether `language` is a recognised fence identifier.
pub fn is_known_language(language: &str) -> bool {
    let language = language.trim().to_lowercase();
    COMMON_LANGUAGES.contains(&language.as_str()) || PRETTIER_PARSERS.contains_key(language.as_str())
}
