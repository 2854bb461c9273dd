//! Stylistic repair of descriptions.
//!
//! A description needs an emotional appeal and a call to action. When the
//! markers for either are absent the configured suffix sentence is appended.
//! The emotional check runs first; the call-to-action check then sees the
//! body plus any emotional suffix, so a suffix that happens to carry both
//! markers is appended once.
//!
//! Required phrase groups are repaired the same way. A group that the text
//! does not satisfy is covered by whichever suffix carries one of its
//! phrases; failing that, the group's first phrase is appended as a sentence
//! of its own, placed before the call to action.
//!
//! Appended sentences must fit inside the description limit. The body is
//! truncated (with an ellipsis) to leave room. Truncation can cut a marker
//! or phrase out of the body, so the plan is recomputed until it stops
//! growing.
use rules::{char_len, PhraseGroup, StyleRules};

use crate::text::{nfc, truncate_with_ellipsis};

/// Which suffixes a description still needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissingStyle {
    pub emotional: bool,
    pub call_to_action: bool,
}

impl MissingStyle {
    pub fn is_empty(&self) -> bool {
        !self.emotional && !self.call_to_action
    }

    fn union(self, other: MissingStyle) -> MissingStyle {
        MissingStyle {
            emotional: self.emotional || other.emotional,
            call_to_action: self.call_to_action || other.call_to_action,
        }
    }
}

/// Checks `body` for emotional and call-to-action markers.
pub fn missing_style(body: &str, style: &StyleRules) -> MissingStyle {
    let lower = body.to_lowercase();
    let emotional = !style.has_emotional_appeal(&lower);
    let call_to_action = if emotional {
        let extended = format!("{lower} {}", style.emotional_suffix.to_lowercase());
        !style.has_call_to_action(&extended)
    } else {
        !style.has_call_to_action(&lower)
    };
    MissingStyle {
        emotional,
        call_to_action,
    }
}

/// Result of [`compose_description`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Styled {
    pub text: String,
    pub appended: MissingStyle,
    /// Indices of phrase groups repaired with their own sentence.
    pub phrases: Vec<usize>,
    pub truncated: bool,
}

/// Appends the missing suffixes to `body`, truncating it so the whole
/// description stays within `max_len` chars.
pub fn apply_style(body: &str, style: &StyleRules, max_len: usize) -> Styled {
    compose_description(body, Some(style), &[], max_len)
}

/// Truncates `body` to `max_len` when there is nothing to append.
pub fn fit_plain(body: &str, max_len: usize) -> Styled {
    compose_description(body, None, &[], max_len)
}

/// Appends whatever `body` lacks (stylistic suffixes and sentences for
/// unsatisfied phrase groups) and truncates the body so the result stays
/// within `max_len` chars.
///
/// ```rust
/// use normalize::compose_description;
/// use rules::PhraseGroup;
///
/// let groups = [PhraseGroup::new(&["ideal for", "great for"])];
/// let styled = compose_description("A ceramic mug.", None, &groups, 200);
/// assert_eq!(styled.text, "A ceramic mug. Ideal for.");
/// assert_eq!(styled.phrases, [0]);
/// ```
pub fn compose_description(
    body: &str,
    style: Option<&StyleRules>,
    groups: &[PhraseGroup],
    max_len: usize,
) -> Styled {
    let mut plan = plan_for(body, style, groups);
    loop {
        let parts = sentences(&plan, style, groups);
        let reserved: usize = parts.iter().map(|part| char_len(part) + 1).sum();
        let fitted = truncate_with_ellipsis(body, max_len.saturating_sub(reserved));
        let merged = plan.clone().union(plan_for(&fitted, style, groups));
        if merged != plan {
            plan = merged;
            continue;
        }

        let truncated = fitted != body;
        let mut text = fitted;
        for part in &parts {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(part);
        }
        return Styled {
            text,
            appended: plan.style,
            phrases: plan.phrases,
            truncated,
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Plan {
    style: MissingStyle,
    /// Sorted, no duplicates.
    phrases: Vec<usize>,
}

impl Plan {
    fn union(mut self, other: Plan) -> Plan {
        self.style = self.style.union(other.style);
        self.phrases.extend(other.phrases);
        self.phrases.sort_unstable();
        self.phrases.dedup();
        self
    }
}

fn plan_for(text: &str, style: Option<&StyleRules>, groups: &[PhraseGroup]) -> Plan {
    let mut plan = Plan {
        style: style.map_or_else(MissingStyle::default, |style| missing_style(text, style)),
        phrases: Vec::new(),
    };

    let mut covered = text.to_lowercase();
    if let Some(style) = style {
        if plan.style.emotional {
            cover(&mut covered, &style.emotional_suffix);
        }
        if plan.style.call_to_action {
            cover(&mut covered, &style.cta_suffix);
        }
    }

    for (index, group) in groups.iter().enumerate() {
        if group.is_satisfied_in(&covered) {
            continue;
        }
        match style {
            Some(style) if group.is_satisfied_in(&style.emotional_suffix.to_lowercase()) => {
                plan.style.emotional = true;
                cover(&mut covered, &style.emotional_suffix);
            }
            Some(style) if group.is_satisfied_in(&style.cta_suffix.to_lowercase()) => {
                plan.style.call_to_action = true;
                cover(&mut covered, &style.cta_suffix);
            }
            _ => {
                if let Some(sentence) = phrase_sentence(group) {
                    plan.phrases.push(index);
                    cover(&mut covered, &sentence);
                }
            }
        }
    }
    plan
}

fn cover(covered: &mut String, sentence: &str) {
    covered.push(' ');
    covered.push_str(&sentence.to_lowercase());
}

/// Appended sentences in output order: emotional suffix, phrase sentences,
/// call to action.
fn sentences(plan: &Plan, style: Option<&StyleRules>, groups: &[PhraseGroup]) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(style) = style {
        if plan.style.emotional {
            parts.push(nfc(style.emotional_suffix.trim()));
        }
    }
    parts.extend(
        plan.phrases
            .iter()
            .filter_map(|&index| groups.get(index).and_then(phrase_sentence)),
    );
    if let Some(style) = style {
        if plan.style.call_to_action {
            parts.push(nfc(style.cta_suffix.trim()));
        }
    }
    parts
}

/// The group's first non-blank phrase, capitalized and closed with a period.
fn phrase_sentence(group: &PhraseGroup) -> Option<String> {
    let phrase = group.phrases.iter().map(|p| p.trim()).find(|p| !p.is_empty())?;
    let mut chars = phrase.chars();
    let first = chars.next()?;
    let mut sentence: String = first.to_uppercase().chain(chars).collect();
    if !sentence.ends_with(['.', '!', '?']) {
        sentence.push('.');
    }
    Some(nfc(&sentence))
}
