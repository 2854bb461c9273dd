//! Diagnostic reports: the only way a failure leaves the pipeline as data.
//!
//! A [`DiagnosticReport`] serializes with a fixed key order:
//!
//! ```json
//! {
//!   "error_code": "VALIDATION_ERROR",
//!   "message": "The generated content does not meet the listing rules. ...",
//!   "request_id": "1b4e28ba-2fa1-4d3b-a3f5-ef19b5a7633b",
//!   "timestamp": 1760868000000,
//!   "context": { "target": "marketplace", "violations": ["..."] }
//! }
//! ```
//!
//! Reports are built by [`DiagnosticReporter::report`], which mints a fresh
//! request id and timestamp on every call. Fields are private so a report
//! cannot be hand-assembled or edited after the fact.

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validate::{ErrorKind, Violation};

/// Structured record of one failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    error_code: ErrorKind,
    message: String,
    request_id: Uuid,
    /// Milliseconds since the Unix epoch.
    timestamp: i64,
    context: Map<String, Value>,
}

impl DiagnosticReport {
    pub fn kind(&self) -> ErrorKind {
        self.error_code
    }

    pub fn error_code(&self) -> &'static str {
        self.error_code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Short text for end users: what happened and the reference id to
    /// quote to support. Never includes input text or internal causes.
    pub fn user_message(&self) -> String {
        format!(
            "{} Reference: {}",
            self.error_code.summary(),
            self.request_id
        )
    }

    /// Compact JSON in canonical key order.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.fallback_json())
    }

    /// Indented JSON in canonical key order.
    pub fn to_json_string_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.fallback_json())
    }

    // Map keys are strings and values are already JSON, so serialization
    // cannot fail in practice; keep the code and id if it ever does.
    fn fallback_json(&self) -> String {
        format!(
            r#"{{"error_code":"{}","request_id":"{}"}}"#,
            self.error_code(),
            self.request_id
        )
    }
}

/// Builds [`DiagnosticReport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticReporter;

impl DiagnosticReporter {
    /// Creates a report for `kind`.
    ///
    /// `violations` are rendered into `context.violations` (human messages,
    /// in order) when non-empty. Keys already present in `context` are kept.
    pub fn report(
        kind: ErrorKind,
        violations: &[Violation],
        mut context: Map<String, Value>,
    ) -> DiagnosticReport {
        let message = if violations.is_empty() {
            kind.summary().to_string()
        } else {
            let details = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            format!("{} {details}", kind.summary())
        };

        if !violations.is_empty() {
            let messages = violations.iter().map(|v| Value::from(v.to_string()));
            context.insert("violations".into(), Value::Array(messages.collect()));
        }

        DiagnosticReport {
            error_code: kind,
            message,
            request_id: Uuid::new_v4(),
            timestamp: Utc::now().timestamp_millis(),
            context,
        }
    }
}

/// Hex SHA-256 of `input`, used to correlate logs with an input without
/// recording the input itself.
pub fn input_digest(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}
