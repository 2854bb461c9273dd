//! Individual rule violations.
//!
//! A [`Violation`] names one broken constraint with the numbers needed to
//! explain it. Stages collect every violation they find rather than stopping
//! at the first, so a caller sees the whole picture in one pass.
//!
//! Violations serialize with a `rule` tag:
//!
//! ```text
//! {"rule":"tag_count","count":2,"min":10,"max":13}
//! ```
use std::fmt;

use rules::FieldScope;
use serde::{Deserialize, Serialize};

/// Text or list field of a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Description,
    Tags,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Tags => "tags",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One broken constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Violation {
    /// Raw input exceeds the configured byte limit.
    InputTooLarge { len: usize, max: usize },
    /// Field holds the wrong JSON type.
    FieldType { field: Field, expected: String },
    TitleLength { len: usize, min: usize, max: usize },
    DescriptionLength { len: usize, min: usize, max: usize },
    /// `{` or `}` inside a text field.
    JsonSyntaxInField { field: Field },
    TagCount { count: usize, min: usize, max: usize },
    /// 1-based position of a blank tag.
    EmptyTag { position: usize },
    TagTooLong { tag: String, len: usize, max: usize },
    MissingRequiredWord { scope: FieldScope, words: Vec<String> },
    BannedWord { scope: FieldScope, word: String },
    /// 0-based index of the unsatisfied phrase group.
    MissingPhraseGroup { group: usize, phrases: Vec<String> },
    MissingTagCategory { category: String },
    DuplicateTag { tag: String },
    /// A tag with more words than the target allows.
    SentenceTag { tag: String, words: usize, max: usize },
}

impl Violation {
    /// Whether the normalizer can plausibly fix this violation.
    ///
    /// Recoverable violations are repaired and the result is validated
    /// again, so a wrong guess here costs a second pass, never an invalid
    /// record.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Violation::TitleLength { len, max, .. } => len > max,
            Violation::DescriptionLength { .. } => true,
            Violation::TagCount { count, max, .. } => count > max,
            Violation::EmptyTag { .. }
            | Violation::DuplicateTag { .. }
            | Violation::MissingPhraseGroup { .. } => true,
            _ => false,
        }
    }

    /// Snake-case rule name, identical to the serialized `rule` tag.
    pub fn rule(&self) -> &'static str {
        match self {
            Violation::InputTooLarge { .. } => "input_too_large",
            Violation::FieldType { .. } => "field_type",
            Violation::TitleLength { .. } => "title_length",
            Violation::DescriptionLength { .. } => "description_length",
            Violation::JsonSyntaxInField { .. } => "json_syntax_in_field",
            Violation::TagCount { .. } => "tag_count",
            Violation::EmptyTag { .. } => "empty_tag",
            Violation::TagTooLong { .. } => "tag_too_long",
            Violation::MissingRequiredWord { .. } => "missing_required_word",
            Violation::BannedWord { .. } => "banned_word",
            Violation::MissingPhraseGroup { .. } => "missing_phrase_group",
            Violation::MissingTagCategory { .. } => "missing_tag_category",
            Violation::DuplicateTag { .. } => "duplicate_tag",
            Violation::SentenceTag { .. } => "sentence_tag",
        }
    }
}

fn scope_label(scope: FieldScope) -> &'static str {
    match scope {
        FieldScope::Title => "title",
        FieldScope::Description => "description",
        FieldScope::Both => "title or description",
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::InputTooLarge { len, max } => {
                write!(f, "input is {len} bytes, limit is {max}")
            }
            Violation::FieldType { field, expected } => {
                write!(f, "{field} must be {expected}")
            }
            Violation::TitleLength { len, min, max } => {
                write!(f, "title length {len} is outside {min}..={max}")
            }
            Violation::DescriptionLength { len, min, max } => {
                write!(f, "description length {len} is outside {min}..={max}")
            }
            Violation::JsonSyntaxInField { field } => {
                write!(f, "{field} contains JSON syntax ('{{' or '}}')")
            }
            Violation::TagCount { count, min, max } => {
                write!(f, "tag count {count} is outside {min}..={max}")
            }
            Violation::EmptyTag { position } => write!(f, "tag {position} is empty"),
            Violation::TagTooLong { tag, len, max } => {
                write!(f, "tag `{tag}` is {len} chars, limit is {max}")
            }
            Violation::MissingRequiredWord { scope, words } => write!(
                f,
                "{} must mention one of: {}",
                scope_label(*scope),
                words.join(", ")
            ),
            Violation::BannedWord { scope, word } => {
                write!(f, "{} contains banned word `{word}`", scope_label(*scope))
            }
            Violation::MissingPhraseGroup { phrases, .. } => {
                write!(f, "description needs one of: {}", phrases.join(", "))
            }
            Violation::MissingTagCategory { category } => {
                write!(f, "no tag covers category `{category}`")
            }
            Violation::DuplicateTag { tag } => write!(f, "duplicate tag `{tag}`"),
            Violation::SentenceTag { tag, words, max } => {
                write!(f, "tag `{tag}` has {words} words, limit is {max}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_recoverability_depends_on_direction() {
        let long = Violation::TitleLength {
            len: 200,
            min: 10,
            max: 140,
        };
        let short = Violation::TitleLength {
            len: 1,
            min: 10,
            max: 140,
        };
        assert!(long.is_recoverable());
        assert!(!short.is_recoverable());

        let too_many = Violation::TagCount {
            count: 20,
            min: 10,
            max: 13,
        };
        let too_few = Violation::TagCount {
            count: 2,
            min: 10,
            max: 13,
        };
        assert!(too_many.is_recoverable());
        assert!(!too_few.is_recoverable());
    }

    #[test]
    fn brace_guard_is_not_recoverable() {
        let violation = Violation::JsonSyntaxInField {
            field: Field::Title,
        };
        assert!(!violation.is_recoverable());
        assert_eq!(
            violation.to_string(),
            "title contains JSON syntax ('{' or '}')"
        );
    }

    #[test]
    fn serializes_with_rule_tag() {
        let violation = Violation::TagCount {
            count: 2,
            min: 10,
            max: 13,
        };
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["rule"], violation.rule());
        assert_eq!(json["count"], 2);

        let banned = Violation::BannedWord {
            scope: FieldScope::Both,
            word: "replica".into(),
        };
        let json = serde_json::to_value(&banned).unwrap();
        assert_eq!(json["rule"], "banned_word");
        assert_eq!(json["scope"], "both");
    }

    #[test]
    fn messages_name_the_offending_value() {
        let violation = Violation::MissingTagCategory {
            category: "occasion".into(),
        };
        assert_eq!(violation.to_string(), "no tag covers category `occasion`");

        let violation = Violation::MissingRequiredWord {
            scope: FieldScope::Title,
            words: vec!["custom".into(), "gift".into()],
        };
        assert_eq!(violation.to_string(), "title must mention one of: custom, gift");
    }
}
