//! Workspace umbrella crate for contentgate.
//!
//! This crate stitches the rule catalog, the validation stages and the
//! normalizer into one [`Pipeline`] so callers can turn raw model output into
//! a listing or post record with a single call.
//!
//! ```rust
//! use contentgate::{ErrorKind, Pipeline, Target};
//!
//! let pipeline = Pipeline::builtin();
//! let outcome = pipeline.process_output(
//!     r#"{"title":"x","description":"short","tags":"a,b"}"#,
//!     Target::Marketplace,
//! );
//! assert_eq!(outcome.error_kind(), Some(ErrorKind::ValidationError));
//! let diagnostic = outcome.diagnostic().expect("rejections carry a diagnostic");
//! assert_eq!(diagnostic.error_code(), "VALIDATION_ERROR");
//! ```

mod config;
mod diagnostic;
mod pipeline;

pub use normalize::{Normalized, Repair, fallback, normalize, normalize_with_repairs, truncate_with_ellipsis};
pub use rules::{
    Catalog, ContentRecord, CountBounds, FailureAction, FallbackPolicy, FieldScope, LengthBounds,
    PhraseGroup, RenderedRecord, RuleSet, RuleSetError, StyleRules, TagCategory, Target,
    VocabularyRule,
};
pub use validate::{
    ContentError, ErrorKind, Field, SchemaFailure, Violation, classify_tag, coerce_tags,
    extract_json_span, validate_business_rules, validate_content, validate_record,
    validate_schema, validate_structure,
};

pub use crate::config::{
    ConfigLoadError, DEFAULT_ALLOWED_MODEL, DEFAULT_MAX_INPUT_BYTES, PipelineConfig,
};
pub use crate::diagnostic::{DiagnosticReport, DiagnosticReporter, input_digest};
pub use crate::pipeline::{Pipeline, PipelineObserver, Stage, ValidationOutcome};
