//! Text chunking for bounded-size analysis requests.
//!
//! The remote service truncates or rejects oversized prompts, so long
//! manuscripts are split into fixed-width pieces that are analyzed one at a
//! time. Splitting is by character count, never inside a UTF-8 sequence.

/// Split `text` into ordered pieces of at most `max_len` characters.
///
/// Every piece except possibly the last is exactly `max_len` characters;
/// the last holds the remainder. Concatenating the result reproduces
/// `text` exactly. Empty input yields no chunks.
///
/// # Panics
///
/// Panics if `max_len` is zero.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<&str> {
    assert!(max_len > 0, "chunk length must be positive");

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chars_in_chunk = 0;

    for (idx, _) in text.char_indices() {
        if chars_in_chunk == max_len {
            chunks.push(&text[start..idx]);
            start = idx;
            chars_in_chunk = 0;
        }
        chars_in_chunk += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

/// First `max_chars` characters of `text`.
pub fn head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Last `max_chars` characters of `text`.
pub fn tail(text: &str, max_chars: usize) -> &str {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    match text.char_indices().nth(total - max_chars) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}
