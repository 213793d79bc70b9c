use super::Rule;
use crate::engine::{LintContext, RawDiagnostic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MD029Config {
    /// one, ordered, one_or_ordered, zero
    pub style: String,
}

impl Default for MD029Config {
    fn default() -> Self {
        Self {
            style: "one_or_ordered".to_string(),
        }
    }
}

/// Rule MD029: Ordered list item prefix
#[derive(Debug, Clone)]
pub struct MD029OlPrefix {
    config: MD029Config,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Numbering {
    Constant(u64),
    Increasing(u64),
}

impl Numbering {
    fn expected(self, position: usize) -> u64 {
        match self {
            Numbering::Constant(n) => n,
            Numbering::Increasing(start) => start + position as u64,
        }
    }

    fn example(self) -> &'static str {
        match self {
            Numbering::Constant(0) => "0/0/0",
            Numbering::Constant(_) => "1/1/1",
            Numbering::Increasing(0) => "0/1/2",
            Numbering::Increasing(_) => "1/2/3",
        }
    }
}

impl MD029OlPrefix {
    pub fn new(config: MD029Config) -> Self {
        Self { config }
    }

    fn numbering(&self, numbers: &[u64]) -> Numbering {
        let first = numbers.first().copied().unwrap_or(1);
        match self.config.style.as_str() {
            "one" => Numbering::Constant(1),
            "zero" => Numbering::Constant(0),
            "ordered" => Numbering::Increasing(if first == 0 { 0 } else { 1 }),
            _ => {
                let second = numbers.get(1).copied();
                if first <= 1 && second == Some(first) {
                    Numbering::Constant(first)
                } else {
                    Numbering::Increasing(first)
                }
            }
        }
    }
}

impl Rule for MD029OlPrefix {
    fn name(&self) -> &'static str {
        "MD029"
    }

    fn alias(&self) -> &'static str {
        "ol-prefix"
    }

    fn description(&self) -> &'static str {
        "Ordered list item prefix"
    }

    fn check(&self, ctx: &LintContext) -> Vec<RawDiagnostic> {
        let mut warnings = Vec::new();

        for block in ctx.list_blocks() {
            for group in block.groups.iter().filter(|g| g.ordered) {
                let numbers: Vec<u64> = group
                    .items
                    .iter()
                    .filter_map(|&line| ctx.lines[line].list_item.as_ref().and_then(|i| i.number))
                    .collect();
                if numbers.len() != group.items.len() {
                    continue;
                }
                let numbering = self.numbering(&numbers);
                for (position, (&line, &actual)) in group.items.iter().zip(&numbers).enumerate() {
                    let expected = numbering.expected(position);
                    if actual != expected {
                        let column = ctx.lines[line].list_item.as_ref().map_or(1, |i| i.marker_column + 1);
                        warnings.push(
                            self.diagnostic(line + 1)
                                .detail(format!(
                                    "Expected: {expected}; Actual: {actual}; Style: {}",
                                    numbering.example()
                                ))
                                .range(column, actual.to_string().len() + 1),
                        );
                    }
                }
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{lines, run};
    use serde_json::json;

    #[test]
    fn test_one_or_ordered_accepts_both() {
        assert!(run("MD029", json!({}), "1. a\n1. b\n1. c\n").is_empty());
        assert!(run("MD029", json!({}), "1. a\n2. b\n3. c\n").is_empty());
        assert!(run("MD029", json!({}), "3. a\n4. b\n").is_empty());
    }

    #[test]
    fn test_one_or_ordered_flags_gaps() {
        let warnings = run("MD029", json!({}), "1. a\n2. b\n4. c\n");
        assert_eq!(lines(&warnings), vec![3]);
        assert_eq!(warnings[0].error_detail.as_deref(), Some("Expected: 3; Actual: 4; Style: 1/2/3"));
    }

    #[test]
    fn test_one_style() {
        assert_eq!(lines(&run("MD029", json!({"style": "one"}), "1. a\n2. b\n")), vec![2]);
    }

    #[test]
    fn test_ordered_style() {
        assert_eq!(lines(&run("MD029", json!({"style": "ordered"}), "1. a\n1. b\n")), vec![2]);
    }

    #[test]
    fn test_nested_lists_numbered_separately() {
        assert!(run("MD029", json!({"style": "ordered"}), "1. a\n   1. x\n   2. y\n2. b\n").is_empty());
    }
}
