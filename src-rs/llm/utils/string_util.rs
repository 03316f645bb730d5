/// Truncates a string to at most `max_bytes` while ensuring it's a valid UTF-8 sequence.
/// Adds an ellipsis if truncated.
pub fn truncate_utf8_with_ellipsis(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let mut end = 0usize;
    for (i, ch) in s.char_indices() {
        let next = i + ch.len_utf8();
        if next <= max_bytes {
            end = next;
        } else {
            break;
        }
    }

    format!("{}...", &s[..end])
}

/// First `max_chars` characters of `s`, no ellipsis.
pub fn take_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Hides a secret for display, keeping the last four characters of long keys.
pub fn mask_secret(secret: &str) -> String {
    let secret = secret.trim();
    if secret.is_empty() {
        return String::new();
    }
    let count = secret.chars().count();
    if count <= 8 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
