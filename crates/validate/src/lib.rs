//! Validation stages for model-generated marketing content.
//!
//! ```text
//! raw text ─► validate_structure ─► validate_schema ─► validate_business_rules
//!               INVALID_JSON          VALIDATION_ERROR     VALIDATION_ERROR
//!               MISSING_INPUT
//! ```
//!
//! Each stage is a pure function over its input and a [`rules::RuleSet`].
//! Stages report typed [`ContentError`]s or lists of [`Violation`]s; they
//! never repair anything. Repair lives in the `normalize` crate and the
//! orchestration that decides between repair, substitution and rejection
//! lives in the `contentgate` crate.
//!
//! ```rust
//! use rules::{Catalog, Target};
//! use validate::{validate_content, ErrorKind};
//!
//! let catalog = Catalog::builtin();
//! let err = validate_content(
//!     r#"{"title":"x","description":"short","tags":"a,b"}"#,
//!     catalog.get(Target::Marketplace),
//! )
//! .unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ValidationError);
//! ```

mod business;
mod error;
mod schema;
mod structure;
mod violation;

use rules::{ContentRecord, RuleSet};

pub use crate::business::{classify_tag, validate_business_rules, OTHER_CATEGORY};
pub use crate::error::{ContentError, ErrorKind};
pub use crate::schema::{coerce_tags, validate_record, validate_schema, SchemaFailure};
pub use crate::structure::{extract_json_span, validate_structure, REQUIRED_FIELDS};
pub use crate::violation::{Field, Violation};

/// Runs all three stages without repair.
///
/// The first failing stage decides the error; violations within a stage are
/// all reported.
pub fn validate_content(input: &str, rules: &RuleSet) -> Result<ContentRecord, ContentError> {
    let object = validate_structure(input)?;
    let record = validate_schema(&object, rules)?;
    validate_business_rules(&record, rules)?;
    Ok(record)
}
