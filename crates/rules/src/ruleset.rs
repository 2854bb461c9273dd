//! Declarative constraints for one publishing target.
//!
//! A [`RuleSet`] is plain data: length and count bounds, vocabulary rules,
//! phrase groups, tag categories, stylistic repair hints, the fallback policy
//! and the target's default record. It is built once at start-up, checked with
//! [`RuleSet::validate`], and only read afterwards.
//!
//! All text matching is case-insensitive substring matching. Callers pass
//! already-lowercased haystacks to the `*_in` helpers; needles are lowercased
//! here.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::RuleSetError;
use crate::record::ContentRecord;
use crate::target::Target;

/// Inclusive character-length bounds for a text field.
///
/// Lengths are counted in Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min_len: usize,
    pub max_len: usize,
}

impl LengthBounds {
    pub const fn new(min_len: usize, max_len: usize) -> Self {
        Self { min_len, max_len }
    }

    pub fn contains(&self, len: usize) -> bool {
        (self.min_len..=self.max_len).contains(&len)
    }
}

/// Inclusive bounds on the number of tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBounds {
    pub min_count: usize,
    pub max_count: usize,
}

impl CountBounds {
    pub const fn new(min_count: usize, max_count: usize) -> Self {
        Self {
            min_count,
            max_count,
        }
    }

    pub fn contains(&self, count: usize) -> bool {
        (self.min_count..=self.max_count).contains(&count)
    }
}

/// Which text fields a vocabulary rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldScope {
    Title,
    Description,
    Both,
}

impl FieldScope {
    /// Lowercased text of the fields in scope. `Both` joins the fields with a
    /// newline so a phrase cannot straddle title and description.
    pub fn text_of(&self, record: &ContentRecord) -> String {
        match self {
            FieldScope::Title => record.title.to_lowercase(),
            FieldScope::Description => record.description.to_lowercase(),
            FieldScope::Both => {
                format!("{}\n{}", record.title, record.description).to_lowercase()
            }
        }
    }
}

/// A word list applied to one scope: match-any for required words, any hit
/// for banned words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyRule {
    pub words: Vec<String>,
    pub scope: FieldScope,
}

impl VocabularyRule {
    pub fn new(scope: FieldScope, words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|w| w.to_string()).collect(),
            scope,
        }
    }

    /// Every word of the rule found in `text_lower`, in rule order. Blank
    /// entries never match.
    pub fn matches_in<'a>(&'a self, text_lower: &str) -> Vec<&'a str> {
        self.words
            .iter()
            .filter(|word| !word.trim().is_empty())
            .filter(|word| text_lower.contains(&word.to_lowercase()))
            .map(String::as_str)
            .collect()
    }

    pub fn any_in(&self, text_lower: &str) -> bool {
        contains_any(text_lower, &self.words)
    }
}

/// Alternatives of which at least one must appear in the description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhraseGroup {
    pub phrases: Vec<String>,
}

impl PhraseGroup {
    pub fn new(phrases: &[&str]) -> Self {
        Self {
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn is_satisfied_in(&self, text_lower: &str) -> bool {
        contains_any(text_lower, &self.phrases)
    }
}

/// A named tag bucket and the substrings that place a tag in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCategory {
    pub name: String,
    pub patterns: Vec<String>,
}

impl TagCategory {
    pub fn new(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn matches(&self, tag_lower: &str) -> bool {
        contains_any(tag_lower, &self.patterns)
    }
}

/// Repair hints: markers that show an emotional appeal or a call to action is
/// already present, and the sentence appended when it is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRules {
    pub emotional_markers: Vec<String>,
    pub emotional_suffix: String,
    pub cta_markers: Vec<String>,
    pub cta_suffix: String,
}

impl StyleRules {
    pub fn has_emotional_appeal(&self, text_lower: &str) -> bool {
        contains_any(text_lower, &self.emotional_markers)
    }

    pub fn has_call_to_action(&self, text_lower: &str) -> bool {
        contains_any(text_lower, &self.cta_markers)
    }
}

/// What the pipeline hands back when content cannot be used as generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureAction {
    /// Return the typed error and its diagnostic.
    #[default]
    Reject,
    /// Return the target's default record instead.
    SubstituteDefault,
}

/// Per-target choice between repairing, substituting and rejecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackPolicy {
    /// Send recoverable violations through the normalizer and re-validate.
    pub repair: bool,
    /// Applies when the text is not a JSON object or lacks required keys.
    pub on_structural_failure: FailureAction,
    /// Applies when violations remain that repair cannot fix.
    pub on_unrepairable: FailureAction,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            repair: true,
            on_structural_failure: FailureAction::Reject,
            on_unrepairable: FailureAction::Reject,
        }
    }
}

impl FallbackPolicy {
    /// Repair what can be repaired, otherwise hand back the default record.
    pub const fn substituting() -> Self {
        Self {
            repair: true,
            on_structural_failure: FailureAction::SubstituteDefault,
            on_unrepairable: FailureAction::SubstituteDefault,
        }
    }
}

/// Complete constraint bundle for one [`Target`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub title: LengthBounds,
    pub description: LengthBounds,
    pub tags: CountBounds,
    #[serde(default)]
    pub max_tag_chars: Option<usize>,
    #[serde(default)]
    pub max_tag_words: Option<usize>,
    #[serde(default)]
    pub required_words: Option<VocabularyRule>,
    #[serde(default)]
    pub banned_words: Option<VocabularyRule>,
    #[serde(default)]
    pub required_phrase_groups: Vec<PhraseGroup>,
    #[serde(default)]
    pub tag_categories: Vec<TagCategory>,
    #[serde(default)]
    pub style: Option<StyleRules>,
    #[serde(default)]
    pub fallback: FallbackPolicy,
    pub default_record: ContentRecord,
}

impl RuleSet {
    /// Checks the rule set for internal consistency.
    ///
    /// Call once when the catalog is assembled. The checks cover bounds,
    /// empty word lists, duplicate categories, stylistic suffixes that would
    /// not recognise themselves, and the default record against the
    /// structural limits. Business rules on the default record need the
    /// validator and are covered by the pipeline's own tests.
    pub fn validate(&self, target: Target) -> Result<(), RuleSetError> {
        check_bounds(target, "title", self.title.min_len, self.title.max_len)?;
        check_bounds(
            target,
            "description",
            self.description.min_len,
            self.description.max_len,
        )?;
        check_bounds(target, "tags", self.tags.min_count, self.tags.max_count)?;

        for (rule, vocabulary) in [
            ("required_words", &self.required_words),
            ("banned_words", &self.banned_words),
        ] {
            if let Some(vocabulary) = vocabulary {
                if vocabulary.words.iter().all(|w| w.trim().is_empty()) {
                    return Err(RuleSetError::EmptyRule {
                        target,
                        rule: rule.to_string(),
                    });
                }
            }
        }

        for (index, group) in self.required_phrase_groups.iter().enumerate() {
            if group.phrases.iter().all(|p| p.trim().is_empty()) {
                return Err(RuleSetError::EmptyRule {
                    target,
                    rule: format!("required_phrase_groups[{index}]"),
                });
            }
        }

        let mut seen = HashSet::new();
        for category in &self.tag_categories {
            if category.patterns.iter().all(|p| p.trim().is_empty()) {
                return Err(RuleSetError::EmptyRule {
                    target,
                    rule: format!("tag category `{}`", category.name),
                });
            }
            if !seen.insert(category.name.to_lowercase()) {
                return Err(RuleSetError::DuplicateCategory {
                    target,
                    name: category.name.clone(),
                });
            }
        }

        // Each phrase sentence is the phrase, a period and a separator.
        let mut needed: usize = self
            .required_phrase_groups
            .iter()
            .filter_map(|group| group.phrases.iter().find(|p| !p.trim().is_empty()))
            .map(|phrase| char_len(phrase.trim()) + 2)
            .sum();
        if let Some(style) = &self.style {
            if !style.has_emotional_appeal(&style.emotional_suffix.to_lowercase()) {
                return Err(RuleSetError::SuffixMissingMarker {
                    target,
                    kind: "emotional",
                });
            }
            if !style.has_call_to_action(&style.cta_suffix.to_lowercase()) {
                return Err(RuleSetError::SuffixMissingMarker {
                    target,
                    kind: "call-to-action",
                });
            }
            needed += char_len(&style.emotional_suffix) + char_len(&style.cta_suffix) + 2;
        }
        // Room for an ellipsis on the truncated body.
        if needed > 0 && needed + 3 >= self.description.max_len {
            return Err(RuleSetError::SuffixTooLong {
                target,
                needed: needed + 3,
                max: self.description.max_len,
            });
        }

        self.check_default_record(target)
    }

    fn check_default_record(&self, target: Target) -> Result<(), RuleSetError> {
        let record = &self.default_record;
        let reject = |reason: String| RuleSetError::DefaultRecordRejected { target, reason };

        let title_len = char_len(&record.title);
        if !self.title.contains(title_len) {
            return Err(reject(format!("title length {title_len}")));
        }
        let description_len = char_len(&record.description);
        if !self.description.contains(description_len) {
            return Err(reject(format!("description length {description_len}")));
        }
        if !self.tags.contains(record.tags.len()) {
            return Err(reject(format!("tag count {}", record.tags.len())));
        }
        if has_json_syntax(&record.title) || has_json_syntax(&record.description) {
            return Err(reject("contains '{' or '}'".into()));
        }
        let mut keys = HashSet::new();
        for tag in &record.tags {
            if !keys.insert(tag_key(tag)) {
                return Err(reject(format!("duplicate tag `{tag}`")));
            }
        }
        Ok(())
    }
}

fn check_bounds(
    target: Target,
    field: &'static str,
    min: usize,
    max: usize,
) -> Result<(), RuleSetError> {
    if min > max || max == 0 {
        return Err(RuleSetError::InvalidBounds {
            target,
            field,
            min,
            max,
        });
    }
    Ok(())
}

fn contains_any(text_lower: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .filter(|n| !n.trim().is_empty())
        .any(|needle| text_lower.contains(&needle.to_lowercase()))
}

/// Length in Unicode scalar values, the unit every bound is expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// True when `text` carries JSON object braces, which means the model echoed
/// JSON syntax into a field.
pub fn has_json_syntax(text: &str) -> bool {
    text.contains(['{', '}'])
}

/// Comparison key for tag uniqueness: trimmed, lowercased, leading `#`
/// removed.
///
/// ```rust
/// use rules::tag_key;
///
/// assert_eq!(tag_key(" #Coffee "), tag_key("coffee"));
/// ```
pub fn tag_key(tag: &str) -> String {
    tag.trim().trim_start_matches('#').trim().to_lowercase()
}
