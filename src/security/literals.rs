//! String literal masking.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Single- or double-quoted literal. No escape handling beyond quote matching.
static STRING_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'[^']*'|"[^"]*""#)
        .unwrap_or_else(|e| panic!("Internal error: invalid literal pattern: {}", e))
});

/// Replace every quoted literal with a placeholder unique to its position.
///
/// The result is only ever scanned, never executed, so there is no way back
/// to the original text. Unterminated quotes are left as they are.
pub fn mask_literals(text: &str) -> Cow<'_, str> {
    let mut index = 0usize;
    STRING_LITERAL.replace_all(text, |_: &Captures<'_>| {
        let placeholder = format!("__literal_{index}__");
        index += 1;
        placeholder
    })
}
