//! Shared utility functions.

/// Turn free text into an uppercase identifier slug.
///
/// Runs of non-alphanumeric characters collapse into a single `-`, leading
/// and trailing separators are dropped, and the result is capped at
/// `max_len` characters.
pub fn slug_upper(text: &str, max_len: usize) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_uppercase());
        } else {
            pending_dash = true;
        }
    }
    let capped: String = slug.chars().take(max_len).collect();
    capped.trim_end_matches('-').to_string()
}

/// Case-insensitive ASCII containment check.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
