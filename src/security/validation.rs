//! Read-only, single-statement query validation.

use super::injection::InjectionDetector;
use super::literals::mask_literals;
use super::policy::{policy, PolicyTables};
use thiserror::Error;

/// Why a query was refused.
///
/// The `Display` text is the exact reason returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Only SELECT queries are allowed")]
    InvalidStatementType,

    #[error("Multiple SQL statements are not allowed")]
    MultipleStatements,

    #[error("Query contains forbidden keyword: {0}")]
    ForbiddenKeyword(&'static str),

    #[error("Query contains dangerous function: {0}")]
    DangerousFunction(&'static str),

    #[error("Query contains potential SQL injection pattern")]
    SuspiciousPattern,
}

/// Outcome of validating a query: `Ok(())` means accepted.
pub type ValidationResult = Result<(), Rejection>;

/// Query gate for the `select` tool.
///
/// Stateless over process-wide tables, so it is `Copy` and may be shared
/// across any number of concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct QueryGuard {
    policy: &'static PolicyTables,
    injection: InjectionDetector,
}

impl QueryGuard {
    /// Create a guard over the built-in policy tables.
    pub fn new() -> Self {
        Self {
            policy: policy(),
            injection: InjectionDetector::new(),
        }
    }

    /// Validate a query. The first failing rule decides the reason.
    ///
    /// Rules, in order:
    /// 1. the first token must be `select`
    /// 2. no `;` anywhere, literals included
    /// 3. no forbidden keyword outside string literals
    /// 4. no dangerous function anywhere
    /// 5. no injection heuristic match anywhere
    pub fn validate(&self, query: &str) -> ValidationResult {
        let normalized = query.trim().to_lowercase();

        if first_token(&normalized) != "select" {
            return Err(Rejection::InvalidStatementType);
        }

        if normalized.contains(';') {
            return Err(Rejection::MultipleStatements);
        }

        let masked = mask_literals(&normalized);
        if let Some(keyword) = self.policy.forbidden_keyword(&masked) {
            return Err(Rejection::ForbiddenKeyword(keyword));
        }

        // Function names are checked unmasked so LOAD_FILE('/etc/passwd') is caught.
        if let Some(function) = self.policy.dangerous_function(&normalized) {
            return Err(Rejection::DangerousFunction(function));
        }

        if self.injection.detect(&normalized).is_some() {
            return Err(Rejection::SuspiciousPattern);
        }

        Ok(())
    }

    /// Validate and hand back the original, unmodified query for execution.
    pub fn admit<'q>(&self, query: &'q str) -> Result<&'q str, Rejection> {
        self.validate(query).map(|()| query)
    }
}

impl Default for QueryGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Leading run of identifier characters.
fn first_token(normalized: &str) -> &str {
    normalized
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default()
}
