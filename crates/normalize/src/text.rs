//! Text helpers: whitespace, Unicode normalization and truncation.
//!
//! All lengths are counted in Unicode scalar values, matching
//! [`rules::char_len`].
use unicode_normalization::{is_nfc, UnicodeNormalization};

/// The marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Collapses runs of whitespace into one ASCII space and trims both ends.
///
/// ```rust
/// use normalize::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  Custom \t Mug\n"), "Custom Mug");
/// assert_eq!(collapse_whitespace("a\u{00A0}b"), "a b");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !collapsed.is_empty() {
            collapsed.push(' ');
        }
        collapsed.push_str(segment);
    }
    collapsed
}

/// NFC form of `text`. Already-composed input is copied without
/// re-running composition.
pub fn nfc(text: &str) -> String {
    if is_nfc(text) {
        text.to_string()
    } else {
        text.nfc().collect()
    }
}

/// Truncates `text` to at most `max` chars.
///
/// Text that fits is returned unchanged. Longer text keeps its first
/// `max - 3` chars and gains `"..."`, so the result is exactly `max` chars.
/// When `max` is shorter than the ellipsis the text is cut without one.
///
/// ```rust
/// use normalize::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Handmade mug", 8), "Handm...");
/// assert_eq!(truncate_with_ellipsis("Mug", 8), "Mug");
/// ```
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let ellipsis_len = ELLIPSIS.len();
    if max < ellipsis_len {
        return text.chars().take(max).collect();
    }
    let mut truncated: String = text.chars().take(max - ellipsis_len).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
