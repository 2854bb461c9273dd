//! Error taxonomy for content validation.
//!
//! Every failure leaves the pipeline as one of five stable codes:
//!
//! | Code | Raised when |
//! |------|-------------|
//! | `INVALID_JSON` | the input holds no parseable JSON object |
//! | `MISSING_INPUT` | `title`, `description` or `tags` is absent |
//! | `VALIDATION_ERROR` | a structural or business rule is broken |
//! | `MODEL_ERROR` | the declared model is not on the allow-list |
//! | `UNKNOWN_ERROR` | anything else, with the original message kept |
//!
//! The kind is fixed where the failure is detected. Nothing downstream
//! inspects message text to decide what went wrong.
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::violation::Violation;

/// Closed set of machine-readable failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidJson,
    MissingInput,
    ValidationError,
    ModelError,
    UnknownError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::InvalidJson,
        ErrorKind::MissingInput,
        ErrorKind::ValidationError,
        ErrorKind::ModelError,
        ErrorKind::UnknownError,
    ];

    /// Stable wire code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidJson => "INVALID_JSON",
            ErrorKind::MissingInput => "MISSING_INPUT",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::ModelError => "MODEL_ERROR",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Short text suitable for end users. Carries no input data.
    pub fn summary(&self) -> &'static str {
        match self {
            ErrorKind::InvalidJson => "The generated content could not be read.",
            ErrorKind::MissingInput => "The generated content is incomplete.",
            ErrorKind::ValidationError => "The generated content does not meet the listing rules.",
            ErrorKind::ModelError => "The requested model is not available.",
            ErrorKind::UnknownError => "Something went wrong while checking the content.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A typed validation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentError {
    /// No JSON object could be read from the input.
    #[error("invalid JSON: {reason}")]
    InvalidJson {
        reason: String,
        /// Parser message, kept for diagnostics.
        cause: Option<String>,
    },

    #[error("missing required field(s): {}", .missing.join(", "))]
    MissingInput { missing: Vec<String> },

    #[error("{} rule violation(s): {}", .violations.len(), join_violations(.violations))]
    Validation { violations: Vec<Violation> },

    #[error("model `{declared}` is not authorized (allowed: `{allowed}`)")]
    UnauthorizedModel { declared: String, allowed: String },

    #[error("unexpected failure: {message}")]
    Unknown { message: String },
}

impl ContentError {
    /// Wraps an uncategorized failure, keeping its message.
    pub fn unknown(err: impl fmt::Display) -> Self {
        ContentError::Unknown {
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ContentError::InvalidJson { .. } => ErrorKind::InvalidJson,
            ContentError::MissingInput { .. } => ErrorKind::MissingInput,
            ContentError::Validation { .. } => ErrorKind::ValidationError,
            ContentError::UnauthorizedModel { .. } => ErrorKind::ModelError,
            ContentError::Unknown { .. } => ErrorKind::UnknownError,
        }
    }

    /// Violations carried by a `VALIDATION_ERROR`; empty for other kinds.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ContentError::Validation { violations } => violations,
            _ => &[],
        }
    }

    /// Kind-specific diagnostic context.
    ///
    /// ```rust
    /// use validate::ContentError;
    ///
    /// let err = ContentError::MissingInput { missing: vec!["tags".into()] };
    /// assert_eq!(err.context()["missing_fields"][0], "tags");
    /// ```
    pub fn context(&self) -> Map<String, Value> {
        let mut context = Map::new();
        match self {
            ContentError::InvalidJson { reason, cause } => {
                context.insert("reason".into(), Value::from(reason.as_str()));
                if let Some(cause) = cause {
                    context.insert("cause".into(), Value::from(cause.as_str()));
                }
            }
            ContentError::MissingInput { missing } => {
                context.insert("missing_fields".into(), Value::from(missing.clone()));
            }
            ContentError::Validation { violations } => {
                let details = violations
                    .iter()
                    .map(|v| serde_json::to_value(v).unwrap_or(Value::Null))
                    .collect::<Vec<_>>();
                context.insert("violation_details".into(), Value::Array(details));
            }
            ContentError::UnauthorizedModel { declared, allowed } => {
                context.insert("declared_model".into(), Value::from(declared.as_str()));
                context.insert("allowed_model".into(), Value::from(allowed.as_str()));
            }
            ContentError::Unknown { message } => {
                context.insert("cause".into(), Value::from(message.as_str()));
            }
        }
        context
    }
}

impl From<Vec<Violation>> for ContentError {
    fn from(violations: Vec<Violation>) -> Self {
        ContentError::Validation { violations }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
