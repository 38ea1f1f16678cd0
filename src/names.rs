//! XML name validation and path classification
//!
//! Name checks guard every operation that creates an element or attribute.
//! The simple-path classifier decides whether a navigation path can bypass the
//! query engine.

use crate::error::{Error, Result};

/// Check if a string is a valid XML Name (without colons)
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.' || c == '\u{B7}')
}

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    !name.contains(':') && is_valid_name(name)
}

/// Check if a string is a valid QName (qualified name)
pub fn is_valid_qname(name: &str) -> bool {
    // QName can be "prefix:localName" or just "localName"
    if let Some((prefix, local)) = name.split_once(':') {
        is_valid_ncname(prefix) && is_valid_ncname(local)
    } else {
        is_valid_ncname(name)
    }
}

/// Validate a QName and return an invalid-argument error if it is malformed
pub fn validate_qname(name: &str) -> Result<()> {
    if is_valid_qname(name) {
        Ok(())
    } else {
        Err(Error::argument(format!("invalid XML name: '{}'", name)))
    }
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// Check if a navigation path is a direct child or attribute lookup
///
/// Every character must be an ASCII letter, digit, `.` or `-`; the first
/// character may also be `@`. Lookups are namespace-blind.
pub fn is_simple_path(path: &str) -> bool {
    !path.is_empty()
        && path.char_indices().all(|(i, c)| {
            (i == 0 && c == '@') || c.is_ascii_alphanumeric() || c == '-' || c == '.'
        })
}
