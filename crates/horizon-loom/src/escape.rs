//! CSS identifier escaping.

use std::fmt::Write as _;

/// Escape a string for use as a CSS identifier.
///
/// Used for class selectors (`.hover\:bg-red-500`) and for theme keys
/// derived from candidate values.
pub fn escape_ident(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    // Writing into a String cannot fail.
    let _ = cssparser::serialize_identifier(value, &mut out);
    out
}

/// Escape a candidate class name into a class selector.
pub fn class_selector(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len() + 1);
    out.push('.');
    let _ = write!(out, "{}", escape_ident(candidate));
    out
}
