//! Secret masking for log output
//!
//! API keys, session ids and customer numbers are logged only in masked form.

/// Values up to this length are fully masked by [`mask_value`]
const MASK_THRESHOLD_SHORT: usize = 4;

/// Values up to this length are fully masked by [`mask_sensitive`]
const MASK_THRESHOLD_LONG: usize = 8;

/// Maximum number of bytes of a backend response body to include in logs
const TRUNCATE_LIMIT: usize = 256;

/// Mask a value, keeping the first and last two characters
pub fn mask_value(value: &str) -> String {
    mask_keeping(value, MASK_THRESHOLD_SHORT, 2)
}

/// Mask a longer secret (e.g. a password hash), keeping four characters each side
pub fn mask_sensitive(value: &str) -> String {
    mask_keeping(value, MASK_THRESHOLD_LONG, 4)
}

/// Truncate a backend response body for safe logging
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        return s.to_string();
    }
    let mut end = TRUNCATE_LIMIT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated, total {} bytes]", &s[..end], s.len())
}

fn mask_keeping(value: &str, threshold: usize, keep: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return "<empty>".to_string();
    }
    if chars.len() <= threshold {
        return "***".to_string();
    }
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{head}...{tail}")
}
