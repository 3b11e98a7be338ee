//! SQL utility functions

/// Quote an identifier for interpolation into statement text
///
/// Wraps the name in double quotes and doubles any embedded quote, so the
/// result is always a single identifier token regardless of its content.
///
/// # Example
///
/// ```
/// use busfinder_server::utils::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("Karnataka"), "\"Karnataka\"");
/// assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build a comma-separated placeholder list (`?, ?, ?`) of the given length
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
