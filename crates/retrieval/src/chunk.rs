//! Overlapping character-window chunking.

/// Split text into overlapping windows of `size` characters, each window
/// starting `size - overlap` characters after the previous one.
///
/// Operates on character boundaries so multi-byte text never splits a
/// code point. `overlap` must be smaller than `size` (enforced by config
/// validation); a final short window is kept as-is.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || size == 0 {
        return Vec::new();
    }

    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}
