//! SQL injection heuristics.
//!
//! Detects common injection shapes in a query: tautologies chained with
//! `OR`/`AND`, and comment markers used to cut off the rest of a statement.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern)
        .unwrap_or_else(|e| panic!("Internal error: invalid regex pattern '{}': {}", pattern, e))
}

/// `OR`/`AND` followed by `operand = operand` or `operand IS operand`.
///
/// The keyword may be glued to a quote or an opening parenthesis
/// (`or'1'='1'`, `OR(1=1)`). A quoted operand may be unterminated so that
/// `OR '='` matches.
static TAUTOLOGY: Lazy<Regex> = Lazy::new(|| {
    compile(
        r#"(?i)\b(?:or|and)(?:\s*\(\s*|\s+|\b)(?P<left>'[^']*'?|"[^"]*"?|\d+(?:\.\d+)?|\w+)\s*(?:=|\bis\b)\s*(?P<right>'[^']*'?|"[^"]*"?|\w+)"#,
    )
});

/// Comment markers used to cut off the rest of a statement.
static COMMENT_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (compile(r"--"), "SQL line comment"),
        (compile(r"/\*|\*/"), "SQL block comment"),
    ]
});

/// SQL injection detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectionDetector;

impl InjectionDetector {
    /// Create a new injection detector.
    pub fn new() -> Self {
        Self
    }

    /// Return the description of the first heuristic that matches `query`.
    pub fn detect(&self, query: &str) -> Option<&'static str> {
        let tautology = TAUTOLOGY
            .captures_iter(query)
            .any(|caps| is_tautology(&caps["left"], &caps["right"]));
        if tautology {
            return Some("OR/AND tautology");
        }

        COMMENT_PATTERNS
            .iter()
            .find(|(pattern, _)| pattern.is_match(query))
            .map(|(_, description)| *description)
    }
}

/// A comparison is tautology-shaped when its left side is a constant, or
/// when a bare word is compared with itself (`a = a`).
fn is_tautology(left: &str, right: &str) -> bool {
    is_constant(left) || left.eq_ignore_ascii_case(right)
}

fn is_constant(operand: &str) -> bool {
    operand.starts_with(|c: char| c == '\'' || c == '"' || c.is_ascii_digit())
        || ["true", "false", "null"]
            .iter()
            .any(|word| operand.eq_ignore_ascii_case(word))
}
