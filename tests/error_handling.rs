use std::io::{self, Read};

use contentgate::{ErrorKind, Pipeline, Target, ValidationOutcome, Violation};

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "upstream closed"))
    }
}

fn rejected(outcome: &ValidationOutcome) -> ErrorKind {
    outcome
        .error_kind()
        .unwrap_or_else(|| panic!("expected rejection, got {outcome:?}"))
}

#[test]
fn plain_prose_is_invalid_json() {
    let outcome = Pipeline::builtin().process_output(
        "I'm sorry, I can't produce a listing for that.",
        Target::Marketplace,
    );
    assert_eq!(rejected(&outcome), ErrorKind::InvalidJson);

    let diagnostic = outcome.diagnostic().unwrap();
    assert_eq!(diagnostic.error_code(), "INVALID_JSON");
    assert_eq!(diagnostic.context()["reason"], "no JSON object found in input");
    assert!(diagnostic.context().contains_key("cause"));
}

#[test]
fn broken_embedded_object_keeps_parser_cause() {
    let outcome = Pipeline::builtin().process_output(
        r#"Here you go: {"title": "Mug", "description": } thanks"#,
        Target::Marketplace,
    );
    assert_eq!(rejected(&outcome), ErrorKind::InvalidJson);
    let context = outcome.diagnostic().unwrap().context();
    assert_eq!(context["reason"], "embedded JSON object does not parse");
    assert!(context["cause"].as_str().is_some_and(|c| !c.is_empty()));
}

#[test]
fn empty_input_is_invalid_json() {
    let outcome = Pipeline::builtin().process_output("   ", Target::Marketplace);
    assert_eq!(rejected(&outcome), ErrorKind::InvalidJson);
}

#[test]
fn missing_keys_are_listed_in_order() {
    let outcome =
        Pipeline::builtin().process_output(r#"{"description":"only this"}"#, Target::Marketplace);
    assert_eq!(rejected(&outcome), ErrorKind::MissingInput);

    let diagnostic = outcome.diagnostic().unwrap();
    assert_eq!(
        diagnostic.context()["missing_fields"],
        serde_json::json!(["title", "tags"])
    );
    assert!(diagnostic.message().starts_with(ErrorKind::MissingInput.summary()));
}

#[test]
fn wrong_field_type_is_validation_error() {
    let outcome = Pipeline::builtin().process_output(
        r#"{"title":42,"description":"A mug.","tags":"mug"}"#,
        Target::Marketplace,
    );
    assert_eq!(rejected(&outcome), ErrorKind::ValidationError);
    assert!(outcome.violations().iter().any(|v| matches!(
        v,
        Violation::FieldType {
            field: contentgate::Field::Title,
            ..
        }
    )));
}

#[test]
fn unauthorized_model_fails_closed_on_every_target() {
    let pipeline = Pipeline::builtin();
    for target in Target::ALL {
        let default = serde_json::to_string(pipeline.default_record(target)).unwrap();
        let outcome = pipeline.process_output_from_model("gpt-3.5-turbo", &default, target);
        assert_eq!(rejected(&outcome), ErrorKind::ModelError, "{target}");

        let context = outcome.diagnostic().unwrap().context();
        assert_eq!(context["declared_model"], "gpt-3.5-turbo");
        assert_eq!(context["allowed_model"], "gpt-4o-mini");
        assert_eq!(context["stage"], "model");
    }
}

#[test]
fn authorized_model_is_processed() {
    let pipeline = Pipeline::builtin().with_allowed_model("house-model-v2");
    let default = serde_json::to_string(pipeline.default_record(Target::Facebook)).unwrap();
    let outcome = pipeline.process_output_from_model("house-model-v2", &default, Target::Facebook);
    assert!(outcome.is_valid(), "{outcome:?}");
}

#[test]
fn reader_failure_is_unknown_error() {
    // Social targets substitute on most failures but never hide unknown ones.
    let outcome = Pipeline::builtin().process_reader(FailingReader, Target::Instagram);
    assert_eq!(rejected(&outcome), ErrorKind::UnknownError);

    let diagnostic = outcome.diagnostic().unwrap();
    assert!(diagnostic.context()["cause"]
        .as_str()
        .is_some_and(|cause| cause.contains("upstream closed")));
}

#[test]
fn invalid_utf8_is_invalid_json() {
    let outcome = Pipeline::builtin().process_bytes(&[b'{', 0xff, 0xfe, b'}'], Target::Marketplace);
    assert_eq!(rejected(&outcome), ErrorKind::InvalidJson);
    assert_eq!(outcome.diagnostic().unwrap().context()["stage"], "input");
}

#[test]
fn structural_failure_on_social_target_substitutes() {
    let pipeline = Pipeline::builtin();
    let outcome = pipeline.process_output(r#"{"title":"Only a title"}"#, Target::Pinterest);
    let ValidationOutcome::Substituted { record, diagnostic } = outcome else {
        panic!("expected substitution, got {outcome:?}");
    };
    assert_eq!(&record, pipeline.default_record(Target::Pinterest));
    assert_eq!(diagnostic.kind(), ErrorKind::MissingInput);
}

#[test]
fn diagnostic_serializes_required_fields() {
    let outcome = Pipeline::builtin().process_output("{}", Target::Marketplace);
    let diagnostic = outcome.diagnostic().unwrap();
    let json: serde_json::Value = serde_json::from_str(&diagnostic.to_json_string()).unwrap();

    assert_eq!(json["error_code"], "MISSING_INPUT");
    assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));
    assert_eq!(
        json["request_id"].as_str(),
        Some(diagnostic.request_id().to_string().as_str())
    );
    assert!(json["timestamp"].as_i64().is_some_and(|ts| ts > 0));
    assert!(json["context"].is_object());
}

#[test]
fn every_report_gets_a_fresh_request_id() {
    let pipeline = Pipeline::builtin();
    let first = pipeline.process_output("nope", Target::Marketplace);
    let second = pipeline.process_output("nope", Target::Marketplace);
    assert_ne!(
        first.diagnostic().unwrap().request_id(),
        second.diagnostic().unwrap().request_id()
    );
    assert_eq!(
        first.diagnostic().unwrap().context()["input_sha256"],
        second.diagnostic().unwrap().context()["input_sha256"]
    );
}

#[test]
fn user_message_carries_reference() {
    let outcome = Pipeline::builtin().process_output("nope", Target::Marketplace);
    let diagnostic = outcome.diagnostic().unwrap();
    let message = diagnostic.user_message();
    assert!(message.contains(&diagnostic.request_id().to_string()));
    assert!(!message.contains("no JSON object"));
}
