//! Schema validation: field types, lengths and counts.
//!
//! Runs on the object returned by
//! [`validate_structure`](crate::validate_structure) and produces a typed
//! [`ContentRecord`]. Every violation found is collected; when all three
//! fields had a usable JSON type the coerced draft travels with the failure
//! so the normalizer can attempt a repair.
use rules::{char_len, has_json_syntax, ContentRecord, RuleSet};
use serde_json::{Map, Value};

use crate::business::validate_business_rules;
use crate::error::ContentError;
use crate::structure::json_type_name;
use crate::violation::{Field, Violation};

const TAGS_EXPECTED: &str = "a comma-separated string or an array of strings";

/// Schema violations plus the draft record, when one could be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFailure {
    pub violations: Vec<Violation>,
    pub draft: Option<ContentRecord>,
}

impl SchemaFailure {
    /// True when a draft exists and every violation is one the normalizer
    /// can fix.
    pub fn is_repairable(&self) -> bool {
        self.draft.is_some() && self.violations.iter().all(Violation::is_recoverable)
    }
}

impl From<SchemaFailure> for ContentError {
    fn from(failure: SchemaFailure) -> Self {
        ContentError::Validation {
            violations: failure.violations,
        }
    }
}

/// Reads the `tags` value in either accepted shape.
///
/// A string is split on commas with each piece trimmed and empty pieces
/// dropped. An array must hold only strings; each is trimmed but blanks are
/// kept so the schema check can report them.
///
/// ```rust
/// use serde_json::json;
/// use validate::coerce_tags;
///
/// assert_eq!(coerce_tags(&json!(" mug, gift,,  ")).unwrap(), ["mug", "gift"]);
/// assert_eq!(coerce_tags(&json!([" #mug ", "#gift"])).unwrap(), ["#mug", "#gift"]);
/// assert!(coerce_tags(&json!(7)).is_err());
/// ```
pub fn coerce_tags(value: &Value) -> Result<Vec<String>, Violation> {
    let wrong_type = || Violation::FieldType {
        field: Field::Tags,
        expected: TAGS_EXPECTED.into(),
    };
    match value {
        Value::String(joined) => Ok(joined
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(|tag| tag.trim().to_string()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(wrong_type),
        _ => Err(wrong_type()),
    }
}

/// Coerces and checks the three fields against `rules`.
pub fn validate_schema(
    object: &Map<String, Value>,
    rules: &RuleSet,
) -> Result<ContentRecord, SchemaFailure> {
    let mut violations = Vec::new();

    let title = text_field(object, Field::Title, &mut violations);
    let description = text_field(object, Field::Description, &mut violations);
    let tags = match coerce_tags(object.get(Field::Tags.as_str()).unwrap_or(&Value::Null)) {
        Ok(tags) => Some(tags),
        Err(violation) => {
            violations.push(violation);
            None
        }
    };

    if let Some(title) = &title {
        check_title(title, rules, &mut violations);
    }
    if let Some(description) = &description {
        check_description(description, rules, &mut violations);
    }
    if let Some(tags) = &tags {
        check_tags(tags, rules, &mut violations);
    }

    let draft = match (title, description, tags) {
        (Some(title), Some(description), Some(tags)) => Some(ContentRecord {
            title,
            description,
            tags,
        }),
        _ => None,
    };

    match draft {
        Some(record) if violations.is_empty() => Ok(record),
        draft => Err(SchemaFailure { violations, draft }),
    }
}

/// Checks a typed record against every structural and business rule.
///
/// Used to re-validate normalized output, where there is no JSON left to
/// inspect.
pub fn validate_record(record: &ContentRecord, rules: &RuleSet) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    check_title(&record.title, rules, &mut violations);
    check_description(&record.description, rules, &mut violations);
    check_tags(&record.tags, rules, &mut violations);
    if let Err(business) = validate_business_rules(record, rules) {
        violations.extend(business);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn text_field(
    object: &Map<String, Value>,
    field: Field,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match object.get(field.as_str()) {
        Some(Value::String(text)) => Some(text.trim().to_string()),
        other => {
            violations.push(Violation::FieldType {
                field,
                expected: format!(
                    "a string, not {}",
                    other.map_or("missing", json_type_name)
                ),
            });
            None
        }
    }
}

fn check_title(title: &str, rules: &RuleSet, violations: &mut Vec<Violation>) {
    let len = char_len(title);
    if !rules.title.contains(len) {
        violations.push(Violation::TitleLength {
            len,
            min: rules.title.min_len,
            max: rules.title.max_len,
        });
    }
    if has_json_syntax(title) {
        violations.push(Violation::JsonSyntaxInField { field: Field::Title });
    }
}

fn check_description(description: &str, rules: &RuleSet, violations: &mut Vec<Violation>) {
    let len = char_len(description);
    if !rules.description.contains(len) {
        violations.push(Violation::DescriptionLength {
            len,
            min: rules.description.min_len,
            max: rules.description.max_len,
        });
    }
    if has_json_syntax(description) {
        violations.push(Violation::JsonSyntaxInField {
            field: Field::Description,
        });
    }
}

fn check_tags(tags: &[String], rules: &RuleSet, violations: &mut Vec<Violation>) {
    if !rules.tags.contains(tags.len()) {
        violations.push(Violation::TagCount {
            count: tags.len(),
            min: rules.tags.min_count,
            max: rules.tags.max_count,
        });
    }
    for (index, tag) in tags.iter().enumerate() {
        let bare = tag.trim().trim_start_matches('#');
        if bare.trim().is_empty() {
            violations.push(Violation::EmptyTag { position: index + 1 });
            continue;
        }
        if let Some(max) = rules.max_tag_chars {
            let len = char_len(bare);
            if len > max {
                violations.push(Violation::TagTooLong {
                    tag: tag.clone(),
                    len,
                    max,
                });
            }
        }
    }
}
