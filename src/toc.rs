//!
//! Table of contents generation and removal.
//!
//! The ToC lives under a "Table of Contents" heading (level 1 or 2). Building
//! reuses that heading when present, otherwise a `## Table of Contents`
//! heading is inserted at the start of the body. The blank lines and list
//! entries under the ToC heading are replaced by the generated list; any
//! other text stays, so running the builder twice yields the same document.
//!
//! Both operations leave the document untouched when its front matter fails
//! validation. Building also leaves it untouched when no heading qualifies
//! for an entry.

use crate::config::{LintRules, PrettierMarkdownConfig, TocPosition};
use crate::engine::LintContext;
use crate::front_matter::{self, FrontMatterError};
use crate::list_normalizer::ListNormalizer;
use crate::utils::line_ending::{LineEnding, detect_line_ending, normalize_line_ending, to_lf};
use crate::utils::slug::{SlugTracker, strip_inline_markup};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

pub const TOC_HEADING: &str = "## Table of Contents";

static TOC_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^table\s+of\s+contents$").unwrap());

static TOC_ENTRY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ \t]*[-*+][ \t]+").unwrap());

static EXISTING_TOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^##?[ \t]+table[ \t]+of[ \t]+contents[ \t]*\r?\n(?:[ \t]*\r?\n)*(?:[ \t]*[-*+][ \t]+.*(?:\r?\n|\z))+(?:[ \t]*\r?\n)*",
    )
    .unwrap()
});

#[derive(Debug, Error)]
pub enum TocError {
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TocEntry {
    depth: usize,
    text: String,
    anchor: String,
}

/// Generates a nested ToC list in the configured bullet style.
#[derive(Debug, Clone)]
pub struct TocBuilder {
    max_depth: u8,
    position: TocPosition,
    bullet: char,
    /// Width of bullet plus spacing; nested entries indent by this much.
    indent_width: usize,
}

impl TocBuilder {
    pub fn new(max_depth: u8, position: TocPosition, rules: &LintRules, options: &PrettierMarkdownConfig) -> Self {
        let lists = ListNormalizer::new(rules, options, false);
        Self {
            max_depth: max_depth.clamp(1, 6),
            position,
            bullet: lists.bullet(),
            indent_width: lists.bullet_width(),
        }
    }

    /// Insert or refresh the ToC. Returns `doc` unchanged on failure.
    pub fn build(&self, doc: &str) -> String {
        match self.try_build(doc) {
            Ok(result) => result,
            Err(e) => {
                log::debug!("Skipping table of contents: {e}");
                doc.to_string()
            }
        }
    }

    fn try_build(&self, doc: &str) -> Result<String, TocError> {
        let fm = front_matter::extract(doc);
        fm.validate()?;

        let line_ending = detect_line_ending(fm.body);
        let mut body = to_lf(fm.body);
        let inserted = toc_heading_line(&LintContext::new(&body)).is_none();
        if inserted {
            // Both positions land directly after the front matter.
            match self.position {
                TocPosition::Top | TocPosition::AfterFrontmatter => body.insert_str(0, &format!("{TOC_HEADING}\n\n")),
            }
        }

        let ctx = LintContext::new(&body);
        let Some(heading_line) = toc_heading_line(&ctx) else {
            return Ok(doc.to_string());
        };
        let heading_end = ctx.heading_end_line(heading_line);
        let entries = self.collect_entries(&ctx, heading_end);
        if entries.is_empty() {
            log::debug!("No headings within depth {}; table of contents left as is", self.max_depth);
            return Ok(doc.to_string());
        }

        let lines: Vec<&str> = body.lines().collect();
        let next_heading = ctx
            .headings()
            .map(|(idx, _)| idx)
            .find(|&idx| idx > heading_end)
            .unwrap_or(lines.len());
        let section_end = if inserted {
            skip_blank(&lines, heading_end + 1, next_heading)
        } else {
            owned_section_end(&lines, heading_end + 1, next_heading)
        };

        let mut out: Vec<String> = lines[..=heading_end.min(lines.len().saturating_sub(1))]
            .iter().map(|l| l.to_string()).collect();
        out.push(String::new());
        out.extend(entries.iter().map(|entry| self.render(entry)));
        if section_end < lines.len() {
            out.push(String::new());
            out.extend(lines[section_end..].iter().map(|l| l.to_string()));
        }

        let mut result = out.join("\n");
        if body.ends_with('\n') {
            result.push('\n');
        }
        if line_ending != LineEnding::Lf {
            result = normalize_line_ending(&result, line_ending);
        }
        Ok(fm.reassemble(&result))
    }

    fn collect_entries(&self, ctx: &LintContext, heading_end: usize) -> Vec<TocEntry> {
        let mut slugs = SlugTracker::new();
        let mut levels: Vec<u8> = Vec::new();
        let mut entries = Vec::new();

        for (idx, heading) in ctx.headings() {
            // Every heading claims its anchor, so duplicates number the same way the renderer does.
            let anchor = slugs.slug(&heading.text);
            if idx <= heading_end || heading.level > self.max_depth {
                continue;
            }
            while levels.last().is_some_and(|&level| level >= heading.level) {
                levels.pop();
            }
            entries.push(TocEntry {
                depth: levels.len(),
                text: strip_inline_markup(heading.text.trim()),
                anchor,
            });
            levels.push(heading.level);
        }
        entries
    }

    fn render(&self, entry: &TocEntry) -> String {
        format!(
            "{}{}{}[{}](#{})",
            " ".repeat(entry.depth * self.indent_width),
            self.bullet,
            " ".repeat(self.indent_width.saturating_sub(1).max(1)),
            entry.text,
            entry.anchor
        )
    }
}

/// First index at or after `from` that is not blank, capped at `limit`.
fn skip_blank(lines: &[&str], from: usize, limit: usize) -> usize {
    (from..limit).find(|&idx| !lines[idx].trim().is_empty()).unwrap_or(limit)
}

/// End of the lines an existing ToC heading owns: blank lines and list
/// entries (with their indented continuations), stopping at other text.
fn owned_section_end(lines: &[&str], from: usize, limit: usize) -> usize {
    let mut end = from;
    let mut in_list = false;
    for idx in from..limit {
        let line = lines[idx];
        if line.trim().is_empty() {
            end = idx + 1;
        } else if TOC_ENTRY.is_match(line) || (in_list && line.starts_with([' ', '\t'])) {
            in_list = true;
            end = idx + 1;
        } else {
            break;
        }
    }
    end
}

fn toc_heading_line(ctx: &LintContext) -> Option<usize> {
    ctx.headings()
        .find(|(_, heading)| heading.level <= 2 && TOC_TITLE.is_match(heading.text.trim()))
        .map(|(idx, _)| idx)
}

/// Build or refresh the table of contents of `doc`.
pub fn build(
    doc: &str,
    max_depth: u8,
    position: TocPosition,
    rules: &LintRules,
    options: &PrettierMarkdownConfig,
) -> String {
    TocBuilder::new(max_depth, position, rules, options).build(doc)
}

/// Remove a "Table of Contents" heading together with its list of entries.
pub fn remove_existing(doc: &str) -> String {
    let fm = front_matter::extract(doc);
    if let Err(e) = fm.validate() {
        log::debug!("Skipping table of contents removal: {e}");
        return doc.to_string();
    }
    match EXISTING_TOC.find(fm.body) {
        Some(m) => {
            let body = format!("{}{}", &fm.body[..m.start()], &fm.body[m.end()..]);
            fm.reassemble(&body)
        }
        None => doc.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnorderedListStyle;
    use pretty_assertions::assert_eq;

    fn toc(doc: &str, depth: u8) -> String {
        build(
            doc,
            depth,
            TocPosition::AfterFrontmatter,
            &LintRules::default(),
            &PrettierMarkdownConfig::default(),
        )
    }

    #[test]
    fn test_inserts_heading_after_front_matter() {
        let doc = "---\ntitle: x\n---\n# Title\n\n## Install\n\n### From source\n\n## Usage\n";
        let expected = "---\ntitle: x\n---\n## Table of Contents\n\n- [Title](#title)\n  - [Install](#install)\n    - [From source](#from-source)\n  - [Usage](#usage)\n\n# Title\n\n## Install\n\n### From source\n\n## Usage\n";
        assert_eq!(toc(doc, 3), expected);
    }

    #[test]
    fn test_build_is_idempotent() {
        let doc = "# Title\n\n## Install\n\n### From source\n\n## Usage\n";
        let once = toc(doc, 3);
        assert_eq!(toc(&once, 3), once);
    }

    #[test]
    fn test_reuses_existing_heading() {
        let doc = "# Doc\n\n## Table of Contents\n\n- [Old](#old)\n  - [Gone](#gone)\n\n## A\n\ntext\n";
        assert_eq!(toc(doc, 3), "# Doc\n\n## Table of Contents\n\n- [A](#a)\n\n## A\n\ntext\n");
    }

    #[test]
    fn test_text_under_existing_heading_is_kept() {
        let doc = "# Doc\n\n## Table of Contents\n\nSee below.\n\n## A\n";
        assert_eq!(
            toc(doc, 3),
            "# Doc\n\n## Table of Contents\n\n- [A](#a)\n\nSee below.\n\n## A\n"
        );
    }

    #[test]
    fn test_intro_before_first_heading_is_kept() {
        let doc = "Intro paragraph.\n\n# Title\n\n## Usage\n";
        let once = toc(doc, 3);
        assert_eq!(
            once,
            "## Table of Contents\n\n- [Title](#title)\n  - [Usage](#usage)\n\nIntro paragraph.\n\n# Title\n\n## Usage\n"
        );
        assert_eq!(toc(&once, 3), once);
    }

    #[test]
    fn test_document_without_headings_is_unchanged() {
        let doc = "---\ntitle: x\n---\nSome notes without headings.\nMore text.\n";
        assert_eq!(toc(doc, 3), doc);
        assert_eq!(toc("plain text", 3), "plain text");
    }

    #[test]
    fn test_headings_deeper_than_limit_leave_document_unchanged() {
        let doc = "### Deep\n\nbody\n\n#### Deeper\n\nmore\n";
        assert_eq!(toc(doc, 2), doc);
    }

    #[test]
    fn test_heading_inside_unterminated_fence_is_ignored() {
        let doc = "```\n##  H  ";
        assert_eq!(toc(doc, 3), doc);
        let doc = "Text\n\n```\n## Not a heading\n";
        assert_eq!(toc(doc, 3), doc);
    }

    #[test]
    fn test_existing_heading_without_entries_is_unchanged() {
        let doc = "## Table of Contents\n\nNothing to list yet.\n";
        assert_eq!(toc(doc, 3), doc);
    }

    #[test]
    fn test_heading_match_is_case_insensitive() {
        let doc = "# table of CONTENTS\n\n## A\n";
        assert_eq!(toc(doc, 3), "# table of CONTENTS\n\n- [A](#a)\n\n## A\n");
    }

    #[test]
    fn test_depth_limit() {
        let doc = "## A\n\n### B\n\n## C\n";
        let result = toc(doc, 2);
        assert!(result.contains("- [A](#a)\n- [C](#c)\n"));
        assert!(!result.contains("[B]"));
    }

    #[test]
    fn test_duplicate_and_formatted_headings() {
        let doc = "## Setup\n\n## Setup\n\n## The `run` *command*\n";
        let result = toc(doc, 3);
        assert!(result.contains("- [Setup](#setup)\n- [Setup](#setup-1)\n- [The run command](#the-run-command)\n"));
    }

    #[test]
    fn test_bullet_and_indent_follow_list_style() {
        let rules = LintRules {
            unordered_list_style: UnorderedListStyle::Asterisk,
            ..Default::default()
        };
        let options = PrettierMarkdownConfig {
            use_tabs: true,
            tab_width: 4,
            ..Default::default()
        };
        let result = build("## A\n\n### B\n", 3, TocPosition::Top, &rules, &options);
        assert!(result.contains("*   [A](#a)\n    *   [B](#b)\n"));
    }

    #[test]
    fn test_crlf_preserved() {
        let doc = "# A\r\n\r\n## B\r\n";
        assert_eq!(
            toc(doc, 3),
            "## Table of Contents\r\n\r\n- [A](#a)\r\n  - [B](#b)\r\n\r\n# A\r\n\r\n## B\r\n"
        );
    }

    #[test]
    fn test_invalid_front_matter_left_alone() {
        let doc = "---\nnot yaml\n---\n# A\n\n## Table of Contents\n\n- [A](#a)\n";
        assert_eq!(toc(doc, 3), doc);
        assert_eq!(remove_existing(doc), doc);
    }

    #[test]
    fn test_remove_existing_with_nested_entries() {
        let doc = "# Doc\n\n## Table of Contents\n\n- [A](#a)\n  - [B](#b)\n\n## A\n";
        assert_eq!(remove_existing(doc), "# Doc\n\n## A\n");
    }

    #[test]
    fn test_remove_keeps_front_matter() {
        let doc = "---\ntitle: x\n---\n## Table of Contents\n\n- [A](#a)\n\n## A\n";
        assert_eq!(remove_existing(doc), "---\ntitle: x\n---\n## A\n");
    }

    #[test]
    fn test_remove_without_toc_is_identity() {
        let doc = "# Doc\n\n- item\n";
        assert_eq!(remove_existing(doc), doc);
    }

    #[test]
    fn test_build_then_remove_round_trip() {
        let doc = "# Title\n\n## A\n";
        assert_eq!(remove_existing(&toc(doc, 3)), doc);
    }
}
