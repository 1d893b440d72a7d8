//! Query gate deciding which SQL strings may reach the database.
//!
//! The gate is lexical, not a parser. It sits in front of a database account
//! that should itself be read-only.

mod injection;
mod literals;
mod policy;
mod validation;

pub use injection::InjectionDetector;
pub use literals::mask_literals;
pub use policy::{DANGEROUS_FUNCTIONS, FORBIDDEN_KEYWORDS};
pub use validation::{QueryGuard, Rejection, ValidationResult};
