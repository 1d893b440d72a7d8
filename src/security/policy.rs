//! Process-wide policy tables for the query gate.

use once_cell::sync::Lazy;
use regex::Regex;

/// Statement keywords that reject a query when they appear as whole words
/// outside string literals.
///
/// Order matters: when several keywords match, the first one listed here is
/// the one reported.
pub const FORBIDDEN_KEYWORDS: [&str; 15] = [
    "insert",
    "update",
    "delete",
    "drop",
    "alter",
    "create",
    "truncate",
    "rename",
    "replace",
    "grant",
    "revoke",
    "shutdown",
    "process",
    "into outfile",
    "into dumpfile",
];

/// Function names that reject a query wherever they appear, including when
/// their arguments are literals.
pub const DANGEROUS_FUNCTIONS: [&str; 7] = [
    "sleep",
    "benchmark",
    "load_file",
    "load data",
    "sys_eval",
    "extractvalue",
    "updatexml",
];

/// A word or phrase matched on word boundaries.
#[derive(Debug)]
pub(crate) struct WordPattern {
    pub(crate) word: &'static str,
    regex: Regex,
}

impl WordPattern {
    fn new(word: &'static str) -> Self {
        // Multi-word entries tolerate any run of whitespace between words.
        let body = word
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\s+");
        let pattern = format!(r"(?i)\b{body}\b");
        let regex = Regex::new(&pattern).unwrap_or_else(|e| {
            panic!("Internal error: invalid regex pattern '{}': {}", pattern, e)
        });
        Self { word, regex }
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Compiled keyword and function tables.
#[derive(Debug)]
pub(crate) struct PolicyTables {
    pub(crate) keywords: Vec<WordPattern>,
    pub(crate) functions: Vec<WordPattern>,
}

impl PolicyTables {
    fn build() -> Self {
        Self {
            keywords: FORBIDDEN_KEYWORDS.into_iter().map(WordPattern::new).collect(),
            functions: DANGEROUS_FUNCTIONS.into_iter().map(WordPattern::new).collect(),
        }
    }

    /// First forbidden keyword found in `text`, in table order.
    pub(crate) fn forbidden_keyword(&self, text: &str) -> Option<&'static str> {
        self.keywords
            .iter()
            .find(|p| p.is_match(text))
            .map(|p| p.word)
    }

    /// First dangerous function found in `text`, in table order.
    pub(crate) fn dangerous_function(&self, text: &str) -> Option<&'static str> {
        self.functions
            .iter()
            .find(|p| p.is_match(text))
            .map(|p| p.word)
    }
}

/// Compiled once at first use; never mutated afterwards.
static POLICY: Lazy<PolicyTables> = Lazy::new(PolicyTables::build);

pub(crate) fn policy() -> &'static PolicyTables {
    &POLICY
}
