//! Business rules layered on a structurally valid record.
//!
//! All matching is case-insensitive substring matching. Checks run in a
//! fixed order (required words, banned words, phrase groups, tag coverage,
//! duplicates, tag shape) and every violation is collected.
use std::collections::HashSet;

use rules::{tag_key, ContentRecord, RuleSet, TagCategory};

use crate::violation::Violation;

/// Bucket for tags no configured category claims.
pub const OTHER_CATEGORY: &str = "other";

/// Name of the first category whose patterns match `tag`, or
/// [`OTHER_CATEGORY`].
///
/// ```rust
/// use rules::TagCategory;
/// use validate::classify_tag;
///
/// let categories = [
///     TagCategory::new("product", &["mug"]),
///     TagCategory::new("occasion", &["gift"]),
/// ];
/// assert_eq!(classify_tag("Mug Gift", &categories), "product");
/// assert_eq!(classify_tag("birthday gift", &categories), "occasion");
/// assert_eq!(classify_tag("blue", &categories), "other");
/// ```
pub fn classify_tag<'a>(tag: &str, categories: &'a [TagCategory]) -> &'a str {
    let lower = tag.to_lowercase();
    categories
        .iter()
        .find(|category| category.matches(&lower))
        .map_or(OTHER_CATEGORY, |category| category.name.as_str())
}

/// Checks `record` against the semantic rules of `rules`.
pub fn validate_business_rules(record: &ContentRecord, rules: &RuleSet) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    if let Some(required) = &rules.required_words {
        let text = required.scope.text_of(record);
        if !required.any_in(&text) {
            violations.push(Violation::MissingRequiredWord {
                scope: required.scope,
                words: required.words.clone(),
            });
        }
    }

    if let Some(banned) = &rules.banned_words {
        let text = banned.scope.text_of(record);
        for word in banned.matches_in(&text) {
            violations.push(Violation::BannedWord {
                scope: banned.scope,
                word: word.to_string(),
            });
        }
    }

    let description = record.description.to_lowercase();
    for (index, group) in rules.required_phrase_groups.iter().enumerate() {
        if !group.is_satisfied_in(&description) {
            violations.push(Violation::MissingPhraseGroup {
                group: index,
                phrases: group.phrases.clone(),
            });
        }
    }

    if !rules.tag_categories.is_empty() {
        let covered: HashSet<&str> = record
            .tags
            .iter()
            .map(|tag| classify_tag(tag, &rules.tag_categories))
            .collect();
        for category in &rules.tag_categories {
            if !covered.contains(category.name.as_str()) {
                violations.push(Violation::MissingTagCategory {
                    category: category.name.clone(),
                });
            }
        }
    }

    let mut seen = HashSet::new();
    for tag in &record.tags {
        let key = tag_key(tag);
        if !key.is_empty() && !seen.insert(key) {
            violations.push(Violation::DuplicateTag { tag: tag.clone() });
        }
    }

    if let Some(max) = rules.max_tag_words {
        for tag in &record.tags {
            let words = tag.split_whitespace().count();
            if words > max {
                violations.push(Violation::SentenceTag {
                    tag: tag.clone(),
                    words,
                    max,
                });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
