//! Rule catalog for generated marketing content.
//!
//! Every publishing [`Target`] owns one [`RuleSet`]: length and count bounds,
//! required and banned vocabulary, required phrase groups, tag categories,
//! stylistic repair hints, a fallback policy and a default record. The rules
//! are data only. Validation lives in the `validate` crate and repair in the
//! `normalize` crate; both read the same catalog.
//!
//! ```rust
//! use rules::{Catalog, Target};
//!
//! let catalog = Catalog::builtin();
//! let rules = catalog.get(Target::Pinterest);
//! assert!(rules.title.contains(42));
//! assert!(!rules.title.contains(101));
//! ```

mod catalog;
mod error;
mod record;
mod ruleset;
mod target;

pub use crate::catalog::Catalog;
pub use crate::error::RuleSetError;
pub use crate::record::{join_tags, ContentRecord, RenderedRecord};
pub use crate::ruleset::{
    char_len, has_json_syntax, tag_key, CountBounds, FailureAction, FallbackPolicy, FieldScope,
    LengthBounds, PhraseGroup, RuleSet, StyleRules, TagCategory, VocabularyRule,
};
pub use crate::target::Target;
