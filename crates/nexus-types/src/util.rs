//! Helpers for shortening text without splitting UTF-8 codepoints.

/// Truncate `s` to at most `max_bytes`, backing off to the previous char boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Single-line preview: newlines collapsed, cut at `max_bytes` with a trailing "...".
pub fn preview(s: &str, max_bytes: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.len() <= max_bytes {
        flat
    } else {
        format!("{}...", truncate_str(&flat, max_bytes.saturating_sub(3)))
    }
}
