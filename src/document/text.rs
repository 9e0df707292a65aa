//! Char-offset helpers for paragraph text.
//!
//! Error spans count Unicode scalar values, not bytes, so every slice and
//! splice goes through a char-to-byte conversion first.

use std::ops::Range;

/// Convert a `[start, end)` char range into a byte range of `text`.
pub fn byte_range(text: &str, start: usize, end: usize) -> Option<Range<usize>> {
    if start > end {
        return None;
    }

    let mut byte_start = None;
    for (position, (index, _)) in text.char_indices().enumerate() {
        if position == start {
            byte_start = Some(index);
        }
        if position == end {
            return byte_start.map(|s| s..index);
        }
    }

    // `end` may sit exactly at the end of the text
    let len = text.chars().count();
    if end == len {
        let byte_start = if start == len { text.len() } else { byte_start? };
        return Some(byte_start..text.len());
    }

    None
}

pub fn slice(text: &str, start: usize, end: usize) -> Option<&str> {
    byte_range(text, start, end).map(|range| &text[range])
}

/// Replace the chars in `[start, end)` with `replacement`.
///
/// Returns `false` and leaves `text` untouched when the range does not fit.
pub fn splice(text: &mut String, start: usize, end: usize, replacement: &str) -> bool {
    match byte_range(text, start, end) {
        Some(range) => {
            text.replace_range(range, replacement);
            true
        }
        None => false,
    }
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
