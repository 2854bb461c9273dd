//! Tag cleaning and platform formatting.
use std::collections::HashSet;

use rules::{tag_key, Target};

/// Formats one tag for `target`.
///
/// Commas read as separators in the comma-joined tag string, so they are
/// treated as whitespace. Social targets get a single leading `#` with
/// internal whitespace removed. The marketplace gets plain keywords with any
/// leading `#` stripped and whitespace collapsed. Returns an empty string
/// when nothing is left.
///
/// ```rust
/// use normalize::format_tag;
/// use rules::Target;
///
/// assert_eq!(format_tag(" gift for mom ", Target::Instagram), "#giftformom");
/// assert_eq!(format_tag("##Mug", Target::Pinterest), "#Mug");
/// assert_eq!(format_tag("#coffee  mug", Target::Marketplace), "coffee mug");
/// assert_eq!(format_tag("mom, dad", Target::Facebook), "#momdad");
/// assert_eq!(format_tag("mom, dad", Target::Marketplace), "mom dad");
/// ```
pub fn format_tag(tag: &str, target: Target) -> String {
    let spaced = tag.replace(',', " ");
    let bare = spaced.trim().trim_start_matches('#');
    if target.is_social() {
        let joined: String = bare.split_whitespace().collect();
        if joined.is_empty() {
            joined
        } else {
            format!("#{joined}")
        }
    } else {
        crate::text::collapse_whitespace(bare)
    }
}

/// Formats, drops blanks, de-duplicates (first occurrence kept) and keeps at
/// most `max_count` tags, cutting from the tail.
pub fn clean_tags(tags: &[String], target: Target, max_count: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|tag| format_tag(tag, target))
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag_key(tag)))
        .take(max_count)
        .collect()
}
