//! The canonical content record and its rendered form.
//!
//! ```text
//! ContentRecord
//! ├── title: String
//! ├── description: String
//! └── tags: Vec<String>   (insertion order, no duplicates once normalized)
//!
//!         ↓ render(target)
//!
//! RenderedRecord
//! ├── title: String
//! ├── description: String
//! └── tags: String        ("a, b, c" for the marketplace, "#a #b #c" for social)
//! ```
//!
//! A `ContentRecord` carries no validity guarantee of its own. Only records
//! returned by the pipeline as valid have been checked against a target's
//! [`RuleSet`](crate::RuleSet).
use serde::{Deserialize, Serialize};

use crate::target::Target;

/// Title, description and tag list of one piece of marketing content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl ContentRecord {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Renders the record for display on `target`, joining tags with the
    /// target's separator.
    ///
    /// ```rust
    /// use rules::{ContentRecord, Target};
    ///
    /// let record = ContentRecord::new("Mug", "A mug.", ["mug", "gift"]);
    /// assert_eq!(record.render(Target::Marketplace).tags, "mug, gift");
    ///
    /// let post = ContentRecord::new("Mug", "A mug.", ["#mug", "#gift"]);
    /// assert_eq!(post.render(Target::Instagram).tags, "#mug #gift");
    /// ```
    pub fn render(&self, target: Target) -> RenderedRecord {
        RenderedRecord {
            title: self.title.clone(),
            description: self.description.clone(),
            tags: join_tags(target, &self.tags),
        }
    }
}

/// Display form of a [`ContentRecord`], with the tag list joined into one
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedRecord {
    pub title: String,
    pub description: String,
    pub tags: String,
}

/// Joins tags with the separator `target` expects.
pub fn join_tags(target: Target, tags: &[String]) -> String {
    let separator = if target.is_social() { " " } else { ", " };
    tags.join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_uses_target_separator() {
        let tags = vec!["#a".to_string(), "#b".to_string()];
        assert_eq!(join_tags(Target::Pinterest, &tags), "#a #b");
        assert_eq!(join_tags(Target::Marketplace, &tags), "#a, #b");
        assert_eq!(join_tags(Target::Facebook, &[]), "");
    }

    #[test]
    fn render_keeps_text_fields() {
        let record = ContentRecord::new("Title", "Body", ["x"]);
        let rendered = record.render(Target::Facebook);
        assert_eq!(rendered.title, "Title");
        assert_eq!(rendered.description, "Body");
        assert_eq!(rendered.tags, "x");
    }
}
