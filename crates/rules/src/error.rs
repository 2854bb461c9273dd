//! Errors raised while building or checking rule sets.
//!
//! These are configuration-time problems. They surface when the catalog is
//! assembled at start-up, never while validating a piece of content.
use thiserror::Error;

use crate::target::Target;

/// A rule set that cannot be used as written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RuleSetError {
    /// Target name not recognised by [`Target::from_str`](std::str::FromStr).
    #[error("unknown target `{0}`; expected marketplace, instagram, facebook or pinterest")]
    UnknownTarget(String),

    /// A `min > max` bound, or a zero maximum.
    #[error("{target}: {field} bounds {min}..={max} are inconsistent")]
    InvalidBounds {
        target: Target,
        field: &'static str,
        min: usize,
        max: usize,
    },

    /// A vocabulary rule, phrase group or tag category with nothing to match.
    #[error("{target}: {rule} has no entries")]
    EmptyRule { target: Target, rule: String },

    /// Two tag categories share a name, so coverage cannot tell them apart.
    #[error("{target}: tag category `{name}` is declared more than once")]
    DuplicateCategory { target: Target, name: String },

    /// A stylistic suffix that would not satisfy its own marker check, so
    /// normalization could never settle.
    #[error("{target}: {kind} suffix does not contain any of its markers")]
    SuffixMissingMarker { target: Target, kind: &'static str },

    /// The suffixes and phrase sentences alone do not fit into the
    /// description budget.
    #[error("{target}: appended sentences need {needed} chars but description max is {max}")]
    SuffixTooLong {
        target: Target,
        needed: usize,
        max: usize,
    },

    /// The target's default record breaks the target's own limits.
    #[error("{target}: default record rejected: {reason}")]
    DefaultRecordRejected { target: Target, reason: String },
}
