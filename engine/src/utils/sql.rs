//! SQL utility functions

/// Escape a caller-written LIKE pattern, keeping its `%` wildcards.
///
/// `_` and `\` are matched literally, so `foo_bar%` only matches values that
/// start with the exact text `foo_bar`.
///
/// # Example
///
/// ```
/// use contentquery::utils::sql::escape_like_wildcards;
///
/// assert_eq!(escape_like_wildcards("about_us%"), "about\\_us%");
/// ```
pub fn escape_like_wildcards(s: &str) -> String {
    s.replace('\\', "\\\\").replace('_', "\\_")
}

/// Check whether a name is safe to splice into SQL as an identifier.
///
/// Accepts ASCII letters, digits and underscores, not starting with a digit.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
