//! String utilities for the domain layer.
//!
//! Every size budget in the pipeline is a hard ceiling enforced by
//! truncation, and every truncation leaves a visible marker behind.

/// Marker inserted between head and tail when a file excerpt is capped.
pub const EXCERPT_MARKER: &str = "\n\n... [truncated] ...\n\n";

/// Marker appended when an agent output exceeds its size cap.
pub const OUTPUT_TRUNCATED_MARKER: &str = "\n\n... [output truncated by quality gate] ...";

/// Longest prefix of `s` not exceeding `max_bytes`, on a char boundary.
pub fn prefix(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Longest suffix of `s` not exceeding `max_bytes`, on a char boundary.
pub fn suffix(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut start = s.len() - max_bytes;
    while start < s.len() && !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

/// Keep the head and tail halves of `s` so the result fits `max_bytes`
/// of original content, joined by [`EXCERPT_MARKER`].
pub fn head_tail(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let half = max_bytes / 2;
    format!("{}{}{}", prefix(s, half), EXCERPT_MARKER, suffix(s, half))
}

/// Cut `s` to `max_bytes` and append [`OUTPUT_TRUNCATED_MARKER`].
///
/// Returns the input unchanged when it already fits.
pub fn truncate_with_marker(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    format!("{}{}", prefix(s, max_bytes), OUTPUT_TRUNCATED_MARKER)
}
