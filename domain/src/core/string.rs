//! String utilities for the domain layer.

/// Truncate a string to a maximum byte length, appending `...` (UTF-8 safe).
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Collapse all whitespace runs into single spaces.
///
/// Used for log previews of multi-line agent output.
pub fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Single-line preview of at most `max_len` bytes.
pub fn preview(s: &str, max_len: usize) -> String {
    truncate(&one_line(s), max_len)
}
