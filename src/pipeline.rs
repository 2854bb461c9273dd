//! Stage orchestration: validate, repair, substitute or reject.
//!
//! ```text
//!  model check ─► size check ─► structure ─► schema ─► business rules
//!                                               │            │
//!                                   repairable? └──► normalize ◄┘
//!                                                       │
//!                                                  re-validate ─► Valid
//!
//!  any failure ─► DiagnosticReport ─► policy ─► Substituted | Invalid
//! ```
//!
//! The target's [`FallbackPolicy`] decides what a failure becomes.
//! Structural failures (bad size, no JSON object, missing keys) follow
//! `on_structural_failure`; rule violations that repair could not fix follow
//! `on_unrepairable`. Model and unknown errors are always rejected.

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::{Duration, Instant};

use normalize::{Normalized, fallback, normalize_with_repairs};
use rules::{Catalog, ContentRecord, FailureAction, FallbackPolicy, RuleSet, Target};
use serde_json::Value;
use tracing::{debug, info, info_span, warn};
use validate::{
    ContentError, ErrorKind, SchemaFailure, Violation, validate_business_rules, validate_record,
    validate_schema, validate_structure,
};

use crate::config::{ConfigLoadError, DEFAULT_ALLOWED_MODEL, DEFAULT_MAX_INPUT_BYTES, PipelineConfig};
use crate::diagnostic::{DiagnosticReport, DiagnosticReporter, input_digest};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Model,
    Input,
    Structure,
    Schema,
    Business,
    Normalize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Model => "model",
            Stage::Input => "input",
            Stage::Structure => "structure",
            Stage::Schema => "schema",
            Stage::Business => "business",
            Stage::Normalize => "normalize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer for pipeline stages and outcomes.
///
/// Injected per pipeline with [`Pipeline::with_observer`]; there is no
/// global registry.
pub trait PipelineObserver: Send + Sync {
    fn record_stage(&self, stage: Stage, latency: Duration, result: Result<(), ErrorKind>);
    fn record_outcome(&self, target: Target, outcome: &'static str);
}

/// What the pipeline returns for one input.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The record passed every rule, possibly after repair.
    Valid(ContentRecord),
    /// The target's default record, returned under the fallback policy. The
    /// diagnostic is for logs and is not an error for the caller.
    Substituted {
        record: ContentRecord,
        diagnostic: DiagnosticReport,
    },
    /// A typed failure.
    Invalid {
        kind: ErrorKind,
        violations: Vec<Violation>,
        diagnostic: DiagnosticReport,
    },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    pub fn is_substituted(&self) -> bool {
        matches!(self, ValidationOutcome::Substituted { .. })
    }

    /// The usable record, if any.
    pub fn record(&self) -> Option<&ContentRecord> {
        match self {
            ValidationOutcome::Valid(record) | ValidationOutcome::Substituted { record, .. } => {
                Some(record)
            }
            ValidationOutcome::Invalid { .. } => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&DiagnosticReport> {
        match self {
            ValidationOutcome::Valid(_) => None,
            ValidationOutcome::Substituted { diagnostic, .. }
            | ValidationOutcome::Invalid { diagnostic, .. } => Some(diagnostic),
        }
    }

    /// Kind of a rejected input; `None` for usable outcomes.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ValidationOutcome::Invalid { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationOutcome::Invalid { violations, .. } => violations,
            _ => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ValidationOutcome::Valid(_) => "valid",
            ValidationOutcome::Substituted { .. } => "substituted",
            ValidationOutcome::Invalid { .. } => "invalid",
        }
    }

    /// Usable record, or the diagnostic of a rejection.
    pub fn into_result(self) -> Result<ContentRecord, DiagnosticReport> {
        match self {
            ValidationOutcome::Valid(record) | ValidationOutcome::Substituted { record, .. } => {
                Ok(record)
            }
            ValidationOutcome::Invalid { diagnostic, .. } => Err(diagnostic),
        }
    }
}

struct StageFailure {
    stage: Stage,
    error: ContentError,
}

impl StageFailure {
    fn new(stage: Stage, error: impl Into<ContentError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

struct StageSpan<'a> {
    observer: &'a dyn PipelineObserver,
    stage: Stage,
    start: Instant,
}

impl StageSpan<'_> {
    fn record(self, result: Result<(), ErrorKind>) {
        self.observer
            .record_stage(self.stage, self.start.elapsed(), result);
    }
}

fn finish_stage(span: Option<StageSpan<'_>>, result: Result<(), ErrorKind>) {
    if let Some(span) = span {
        span.record(result);
    }
}

/// Validation and normalization pipeline over an immutable rule catalog.
///
/// `Pipeline` is `Send + Sync`; share one instance across threads.
///
/// ```rust
/// use contentgate::{Pipeline, Target};
///
/// let pipeline = Pipeline::builtin();
/// let outcome = pipeline.process_output("not json at all", Target::Instagram);
/// // Instagram substitutes its default post instead of failing.
/// assert!(outcome.is_substituted());
/// assert_eq!(outcome.record(), Some(pipeline.default_record(Target::Instagram)));
/// ```
#[derive(Clone)]
pub struct Pipeline {
    catalog: Catalog,
    allowed_model: String,
    max_input_bytes: Option<usize>,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("allowed_model", &self.allowed_model)
            .field("max_input_bytes", &self.max_input_bytes)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Pipeline {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            allowed_model: DEFAULT_ALLOWED_MODEL.to_string(),
            max_input_bytes: Some(DEFAULT_MAX_INPUT_BYTES),
            observer: None,
        }
    }

    /// Pipeline over [`Catalog::builtin`].
    pub fn builtin() -> Self {
        Self::new(Catalog::builtin())
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigLoadError> {
        config.validate()?;
        Ok(Self {
            catalog: config.build_catalog()?,
            allowed_model: config.allowed_model.trim().to_string(),
            max_input_bytes: config.max_input_bytes,
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_allowed_model(mut self, model: impl Into<String>) -> Self {
        self.allowed_model = model.into();
        self
    }

    pub fn with_max_input_bytes(mut self, max: Option<usize>) -> Self {
        self.max_input_bytes = max;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self, target: Target) -> &RuleSet {
        self.catalog.get(target)
    }

    pub fn allowed_model(&self) -> &str {
        &self.allowed_model
    }

    pub fn default_record(&self, target: Target) -> &ContentRecord {
        self.catalog.default_record(target)
    }

    /// Fails closed unless `declared` names the allowed model.
    pub fn check_model(&self, declared: &str) -> Result<(), ContentError> {
        if declared.trim() == self.allowed_model {
            Ok(())
        } else {
            Err(ContentError::UnauthorizedModel {
                declared: declared.to_string(),
                allowed: self.allowed_model.clone(),
            })
        }
    }

    /// Validates raw model output for `target`.
    pub fn process_output(&self, input: &str, target: Target) -> ValidationOutcome {
        self.traced(input.as_bytes(), target, || self.evaluate(input, target))
    }

    /// Like [`process_output`](Self::process_output), first checking the
    /// declared model against the allow-list.
    pub fn process_output_from_model(
        &self,
        model: &str,
        input: &str,
        target: Target,
    ) -> ValidationOutcome {
        self.traced(input.as_bytes(), target, || {
            self.model_stage(model)?;
            self.evaluate(input, target)
        })
    }

    /// Validates raw bytes. Bytes that are not UTF-8 fail with
    /// `INVALID_JSON`.
    pub fn process_bytes(&self, input: &[u8], target: Target) -> ValidationOutcome {
        self.traced(input, target, || self.evaluate_bytes(input, target))
    }

    /// Reads all of `reader` and validates it. Read failures surface as
    /// `UNKNOWN_ERROR` with the I/O message kept.
    pub fn process_reader<R: Read>(&self, reader: R, target: Target) -> ValidationOutcome {
        self.read_and_process(reader, None, target)
    }

    /// [`process_reader`](Self::process_reader) with a model check.
    pub fn process_reader_from_model<R: Read>(
        &self,
        model: &str,
        reader: R,
        target: Target,
    ) -> ValidationOutcome {
        self.read_and_process(reader, Some(model), target)
    }

    fn read_and_process<R: Read>(
        &self,
        mut reader: R,
        model: Option<&str>,
        target: Target,
    ) -> ValidationOutcome {
        let mut buffer = Vec::new();
        // One byte past the limit is enough to report the input as too large.
        let read = match self.max_input_bytes {
            Some(max) => reader
                .take((max as u64).saturating_add(1))
                .read_to_end(&mut buffer),
            None => reader.read_to_end(&mut buffer),
        };
        self.traced(&buffer, target, || {
            if let Some(model) = model {
                self.model_stage(model)?;
            }
            if let Err(err) = read {
                return Err(StageFailure::new(
                    Stage::Input,
                    ContentError::unknown(format!("failed to read input: {err}")),
                ));
            }
            self.evaluate_bytes(&buffer, target)
        })
    }

    fn traced(
        &self,
        input: &[u8],
        target: Target,
        evaluate: impl FnOnce() -> Result<Normalized, StageFailure>,
    ) -> ValidationOutcome {
        let input_sha256 = input_digest(input);
        let span = info_span!(
            "contentgate.process",
            %target,
            input_len = input.len(),
            input_sha256 = %input_sha256
        );
        let _entered = span.enter();
        let started = Instant::now();

        let outcome = match evaluate() {
            Ok(normalized) => {
                let repairs: Vec<&str> = normalized.repairs.iter().map(|r| r.label()).collect();
                info!(
                    repairs = ?repairs,
                    elapsed_micros = elapsed_micros(started),
                    "content_valid"
                );
                ValidationOutcome::Valid(normalized.record)
            }
            Err(failure) => self.fail(failure, target, input.len(), &input_sha256, started),
        };

        if let Some(observer) = &self.observer {
            observer.record_outcome(target, outcome.label());
        }
        outcome
    }

    fn start_stage(&self, stage: Stage) -> Option<StageSpan<'_>> {
        self.observer.as_deref().map(|observer| StageSpan {
            observer,
            stage,
            start: Instant::now(),
        })
    }

    fn model_stage(&self, model: &str) -> Result<(), StageFailure> {
        let span = self.start_stage(Stage::Model);
        let checked = self.check_model(model);
        finish_stage(span, checked.as_ref().map_err(ContentError::kind).copied());
        checked.map_err(|err| StageFailure::new(Stage::Model, err))
    }

    fn evaluate_bytes(&self, input: &[u8], target: Target) -> Result<Normalized, StageFailure> {
        let text = std::str::from_utf8(input).map_err(|err| {
            StageFailure::new(
                Stage::Input,
                ContentError::InvalidJson {
                    reason: "input is not valid UTF-8".into(),
                    cause: Some(err.to_string()),
                },
            )
        })?;
        self.evaluate(text, target)
    }

    fn evaluate(&self, input: &str, target: Target) -> Result<Normalized, StageFailure> {
        let rules = self.catalog.get(target);

        let span = self.start_stage(Stage::Input);
        let size = self.check_size(input);
        finish_stage(span, size.as_ref().map_err(ContentError::kind).copied());
        size.map_err(|err| StageFailure::new(Stage::Input, err))?;

        let span = self.start_stage(Stage::Structure);
        let structured = validate_structure(input);
        finish_stage(span, structured.as_ref().map(|_| ()).map_err(ContentError::kind));
        let object = structured.map_err(|err| StageFailure::new(Stage::Structure, err))?;

        let span = self.start_stage(Stage::Schema);
        let schema = validate_schema(&object, rules);
        finish_stage(
            span,
            schema
                .as_ref()
                .map(|_| ())
                .map_err(|_| ErrorKind::ValidationError),
        );
        let record = match schema {
            Ok(record) => record,
            Err(SchemaFailure {
                violations,
                draft: Some(draft),
            }) if rules.fallback.repair && violations.iter().all(Violation::is_recoverable) => {
                debug!(
                    violations = violations.len(),
                    "schema violations routed to normalizer"
                );
                return self.repair(&draft, target, rules);
            }
            Err(failure) => return Err(StageFailure::new(Stage::Schema, failure)),
        };

        let span = self.start_stage(Stage::Business);
        let business = validate_business_rules(&record, rules);
        finish_stage(
            span,
            business
                .as_ref()
                .map_err(|_| ErrorKind::ValidationError)
                .copied(),
        );
        if let Err(violations) = business {
            if !(rules.fallback.repair && violations.iter().all(Violation::is_recoverable)) {
                return Err(StageFailure::new(Stage::Business, violations));
            }
            debug!(
                violations = violations.len(),
                "business violations routed to normalizer"
            );
        }

        self.repair(&record, target, rules)
    }

    /// Normalizes `draft` and validates the result again. Nothing leaves this
    /// function as valid without passing every rule.
    fn repair(
        &self,
        draft: &ContentRecord,
        target: Target,
        rules: &RuleSet,
    ) -> Result<Normalized, StageFailure> {
        let span = self.start_stage(Stage::Normalize);
        let normalized = normalize_with_repairs(draft, target, rules);
        let checked = validate_record(&normalized.record, rules);
        finish_stage(
            span,
            checked
                .as_ref()
                .map_err(|_| ErrorKind::ValidationError)
                .copied(),
        );
        checked.map_err(|violations| StageFailure::new(Stage::Normalize, violations))?;
        Ok(normalized)
    }

    fn check_size(&self, input: &str) -> Result<(), ContentError> {
        match self.max_input_bytes {
            Some(max) if input.len() > max => Err(ContentError::from(vec![
                Violation::InputTooLarge {
                    len: input.len(),
                    max,
                },
            ])),
            _ => Ok(()),
        }
    }

    fn fail(
        &self,
        failure: StageFailure,
        target: Target,
        input_len: usize,
        input_sha256: &str,
        started: Instant,
    ) -> ValidationOutcome {
        let StageFailure { stage, error } = failure;
        let kind = error.kind();
        let rules = self.catalog.get(target);

        let mut context = error.context();
        context.insert("target".into(), Value::from(target.as_str()));
        context.insert("stage".into(), Value::from(stage.as_str()));
        context.insert("input_len".into(), Value::from(input_len));
        context.insert("input_sha256".into(), Value::from(input_sha256));

        let violations = error.violations().to_vec();
        let diagnostic = DiagnosticReporter::report(kind, &violations, context);
        let action = failure_action(kind, stage, &rules.fallback);

        warn!(
            error_code = kind.code(),
            stage = stage.as_str(),
            violations = violations.len(),
            request_id = %diagnostic.request_id(),
            action = ?action,
            elapsed_micros = elapsed_micros(started),
            "content_invalid"
        );

        match action {
            FailureAction::SubstituteDefault => ValidationOutcome::Substituted {
                record: fallback(target, rules),
                diagnostic,
            },
            FailureAction::Reject => ValidationOutcome::Invalid {
                kind,
                violations,
                diagnostic,
            },
        }
    }
}

/// Chooses between substitution and rejection for a failure.
fn failure_action(kind: ErrorKind, stage: Stage, policy: &FallbackPolicy) -> FailureAction {
    match (kind, stage) {
        (ErrorKind::ModelError | ErrorKind::UnknownError, _) => FailureAction::Reject,
        (_, Stage::Model | Stage::Input | Stage::Structure) => policy.on_structural_failure,
        (_, Stage::Schema | Stage::Business | Stage::Normalize) => policy.on_unrepairable,
    }
}

fn elapsed_micros(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        stages: Mutex<Vec<(Stage, Result<(), ErrorKind>)>>,
        outcomes: Mutex<Vec<(Target, &'static str)>>,
    }

    impl PipelineObserver for RecordingObserver {
        fn record_stage(&self, stage: Stage, _latency: Duration, result: Result<(), ErrorKind>) {
            self.stages.lock().unwrap().push((stage, result));
        }

        fn record_outcome(&self, target: Target, outcome: &'static str) {
            self.outcomes.lock().unwrap().push((target, outcome));
        }
    }

    fn valid_marketplace_json() -> String {
        let record = Catalog::builtin().default_record(Target::Marketplace).clone();
        serde_json::to_string(&record).unwrap()
    }

    #[test]
    fn failure_action_follows_stage_and_kind() {
        let policy = FallbackPolicy::substituting();
        assert_eq!(
            failure_action(ErrorKind::InvalidJson, Stage::Structure, &policy),
            FailureAction::SubstituteDefault
        );
        assert_eq!(
            failure_action(ErrorKind::ModelError, Stage::Model, &policy),
            FailureAction::Reject
        );
        assert_eq!(
            failure_action(ErrorKind::UnknownError, Stage::Input, &policy),
            FailureAction::Reject
        );

        let mixed = FallbackPolicy {
            repair: true,
            on_structural_failure: FailureAction::Reject,
            on_unrepairable: FailureAction::SubstituteDefault,
        };
        assert_eq!(
            failure_action(ErrorKind::MissingInput, Stage::Structure, &mixed),
            FailureAction::Reject
        );
        assert_eq!(
            failure_action(ErrorKind::ValidationError, Stage::Business, &mixed),
            FailureAction::SubstituteDefault
        );
    }

    #[test]
    fn observer_sees_every_stage_of_a_valid_run() {
        let observer = Arc::new(RecordingObserver::default());
        let pipeline = Pipeline::builtin().with_observer(observer.clone());

        let outcome = pipeline.process_output(&valid_marketplace_json(), Target::Marketplace);
        assert!(outcome.is_valid(), "{outcome:?}");

        let stages: Vec<Stage> = observer
            .stages
            .lock()
            .unwrap()
            .iter()
            .map(|(stage, result)| {
                assert!(result.is_ok());
                *stage
            })
            .collect();
        assert_eq!(
            stages,
            [
                Stage::Input,
                Stage::Structure,
                Stage::Schema,
                Stage::Business,
                Stage::Normalize
            ]
        );
        assert_eq!(
            *observer.outcomes.lock().unwrap(),
            [(Target::Marketplace, "valid")]
        );
    }

    #[test]
    fn observer_sees_failing_stage_kind() {
        let observer = Arc::new(RecordingObserver::default());
        let pipeline = Pipeline::builtin().with_observer(observer.clone());

        let outcome = pipeline.process_output("{\"title\":\"x\"}", Target::Marketplace);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::MissingInput));
        let stages = observer.stages.lock().unwrap();
        assert_eq!(
            stages.last(),
            Some(&(Stage::Structure, Err(ErrorKind::MissingInput)))
        );
    }

    #[test]
    fn model_check_fails_closed() {
        let pipeline = Pipeline::builtin();
        assert!(pipeline.check_model("gpt-4o-mini").is_ok());
        assert!(pipeline.check_model(" gpt-4o-mini ").is_ok());
        assert!(pipeline.check_model("GPT-4O-MINI").is_err());
        assert!(pipeline.check_model("").is_err());
    }

    #[test]
    fn oversized_input_is_validation_error() {
        let pipeline = Pipeline::builtin().with_max_input_bytes(Some(16));
        let outcome = pipeline.process_output(&valid_marketplace_json(), Target::Marketplace);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::ValidationError));
        assert!(matches!(
            outcome.violations(),
            [Violation::InputTooLarge { max: 16, .. }]
        ));
    }

    #[test]
    fn reader_is_capped_at_limit() {
        let pipeline = Pipeline::builtin().with_max_input_bytes(Some(32));
        let input = "x".repeat(10_000);
        let outcome = pipeline.process_reader(input.as_bytes(), Target::Marketplace);
        match outcome.violations() {
            [Violation::InputTooLarge { len, max }] => {
                assert_eq!(*len, 33);
                assert_eq!(*max, 32);
            }
            other => panic!("unexpected violations: {other:?}"),
        }
    }

    #[test]
    fn diagnostic_context_names_target_and_stage() {
        let outcome = Pipeline::builtin().process_output("nope", Target::Marketplace);
        let diagnostic = outcome.diagnostic().expect("diagnostic");
        assert_eq!(diagnostic.context()["target"], "marketplace");
        assert_eq!(diagnostic.context()["stage"], "structure");
        assert_eq!(diagnostic.context()["input_len"], 4);
        assert_eq!(
            diagnostic.context()["input_sha256"].as_str().map(str::len),
            Some(64)
        );
    }
}
