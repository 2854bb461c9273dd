//! Deterministic repair and fallback for generated marketing content.
//!
//! [`normalize`] takes a draft that may break recoverable rules (an overlong
//! title, a short or overlong description, missing stylistic elements,
//! duplicate, blank or surplus tags) and rewrites it into the target's
//! canonical shape. It never consults the validators; callers re-validate
//! the result. [`fallback`] hands back the target's default record.
//!
//! The transformation is idempotent: normalizing a normalized record
//! returns it unchanged.
//!
//! ```rust
//! use normalize::normalize;
//! use rules::{Catalog, ContentRecord, Target};
//!
//! let catalog = Catalog::builtin();
//! let rules = catalog.get(Target::Instagram);
//! let draft = ContentRecord::new(
//!     "  Spring   collection ",
//!     "Fresh prints for the new season.",
//!     ["spring", "#Spring", "art prints"],
//! );
//! let record = normalize(&draft, Target::Instagram, rules);
//! assert_eq!(record.title, "Spring collection");
//! assert_eq!(record.tags, ["#spring", "#artprints"]);
//! assert_eq!(normalize(&record, Target::Instagram, rules), record);
//! ```

mod style;
mod tags;
mod text;

use std::fmt;

use rules::{char_len, ContentRecord, RuleSet, Target};
use tracing::debug;

pub use crate::style::{
    apply_style, compose_description, fit_plain, missing_style, MissingStyle, Styled,
};
pub use crate::tags::{clean_tags, format_tag};
pub use crate::text::{collapse_whitespace, nfc, truncate_with_ellipsis, ELLIPSIS};

/// One change made by [`normalize_with_repairs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    TitleTruncated { from: usize, to: usize },
    DescriptionReplaced { len: usize },
    DescriptionTruncated,
    EmotionalSuffixAppended,
    CallToActionAppended,
    /// A sentence carrying the first phrase of an unsatisfied group.
    PhraseAppended { group: usize },
    TagsDropped { count: usize },
    TagsReformatted,
}

impl Repair {
    pub fn label(&self) -> &'static str {
        match self {
            Repair::TitleTruncated { .. } => "title_truncated",
            Repair::DescriptionReplaced { .. } => "description_replaced",
            Repair::DescriptionTruncated => "description_truncated",
            Repair::EmotionalSuffixAppended => "emotional_suffix_appended",
            Repair::CallToActionAppended => "call_to_action_appended",
            Repair::PhraseAppended { .. } => "phrase_appended",
            Repair::TagsDropped { .. } => "tags_dropped",
            Repair::TagsReformatted => "tags_reformatted",
        }
    }
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalized record and the repairs that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub record: ContentRecord,
    pub repairs: Vec<Repair>,
}

/// Rewrites `draft` into the canonical shape for `target`.
pub fn normalize(draft: &ContentRecord, target: Target, rules: &RuleSet) -> ContentRecord {
    normalize_with_repairs(draft, target, rules).record
}

/// Like [`normalize`], also reporting what changed.
pub fn normalize_with_repairs(draft: &ContentRecord, target: Target, rules: &RuleSet) -> Normalized {
    let mut repairs = Vec::new();

    let title = nfc(&collapse_whitespace(&draft.title));
    let title_len = char_len(&title);
    let title = if title_len > rules.title.max_len {
        repairs.push(Repair::TitleTruncated {
            from: title_len,
            to: rules.title.max_len,
        });
        truncate_with_ellipsis(&title, rules.title.max_len)
    } else {
        title
    };

    let mut body = nfc(draft.description.trim());
    let body_len = char_len(&body);
    if body_len < rules.description.min_len {
        repairs.push(Repair::DescriptionReplaced { len: body_len });
        body = nfc(rules.default_record.description.trim());
    }
    let styled = compose_description(
        &body,
        rules.style.as_ref(),
        &rules.required_phrase_groups,
        rules.description.max_len,
    );
    if styled.truncated {
        repairs.push(Repair::DescriptionTruncated);
    }
    if styled.appended.emotional {
        repairs.push(Repair::EmotionalSuffixAppended);
    }
    if styled.appended.call_to_action {
        repairs.push(Repair::CallToActionAppended);
    }
    repairs.extend(
        styled
            .phrases
            .iter()
            .map(|&group| Repair::PhraseAppended { group }),
    );

    let tags = clean_tags(&draft.tags, target, rules.tags.max_count);
    if tags.len() < draft.tags.len() {
        repairs.push(Repair::TagsDropped {
            count: draft.tags.len() - tags.len(),
        });
    } else if tags != draft.tags {
        repairs.push(Repair::TagsReformatted);
    }

    for repair in &repairs {
        debug!(%target, repair = repair.label(), "normalizer repair");
    }

    Normalized {
        record: ContentRecord {
            title,
            description: styled.text,
            tags,
        },
        repairs,
    }
}

/// The default record for `target`, returned verbatim.
pub fn fallback(target: Target, rules: &RuleSet) -> ContentRecord {
    debug!(%target, "substituting default record");
    rules.default_record.clone()
}
