//! Unit tests for client event classification and the serialized view.

use chrono::{DateTime, Utc};
use serde_json::json;

use probe_console::models::event::{ClientEvent, ErrorReport, EventBody, EventLevel};

fn error_report(kind: &str, message: &str) -> ErrorReport {
    ErrorReport {
        kind: kind.into(),
        message: message.into(),
        stack: None,
    }
}

#[test]
fn report_body_classifies_as_message() {
    let event = ClientEvent::report(512, json!({ "action": "jump" }));
    assert_eq!(event.level(), EventLevel::Message);
}

#[test]
fn error_body_classifies_as_exception() {
    let event = ClientEvent::error(512, error_report("NullReference", "boom"));
    assert_eq!(event.level(), EventLevel::Exception);
}

#[test]
fn serialized_view_excludes_pid() {
    let event = ClientEvent::report(512, json!({ "action": "jump" }));
    let view = event.to_payload().expect("serializable");

    let object = view.as_object().expect("view is an object");
    assert!(!object.contains_key("pid"), "pid must not leak: {view}");
    assert_eq!(view["body"]["action"], "jump");
}

#[test]
fn serialized_view_omits_absent_time() {
    let event = ClientEvent::report(512, json!({ "hp": 40 }));
    let view = event.to_payload().expect("serializable");

    assert!(
        !view.as_object().expect("object").contains_key("time"),
        "absent time must be omitted: {view}"
    );
}

#[test]
fn serialized_view_keeps_client_time() {
    let at: DateTime<Utc> = "2026-03-05T06:07:08.042Z".parse().expect("timestamp");
    let mut event = ClientEvent::report(512, json!({ "hp": 40 }));
    event.time = Some(at);

    let view = event.to_payload().expect("serializable");
    let time = view["time"].as_str().expect("time serialized as string");
    let parsed: DateTime<Utc> = time.parse().expect("round-trippable timestamp");
    assert_eq!(parsed, at);
}

#[test]
fn error_report_serializes_camel_case_and_omits_missing_stack() {
    let mut report = error_report("InvalidOp", "stale handle");
    let view = serde_json::to_value(&report).expect("serializable");
    assert_eq!(view, json!({ "kind": "InvalidOp", "message": "stale handle" }));

    report.stack = Some("at Game.Update()".into());
    let view = serde_json::to_value(&report).expect("serializable");
    assert_eq!(view["stack"], "at Game.Update()");
}

#[test]
fn body_deserialization_is_shape_driven() {
    let error: EventBody =
        serde_json::from_value(json!({ "kind": "NullReference", "message": "boom" }))
            .expect("error shape");
    assert!(error.is_error());

    let report: EventBody =
        serde_json::from_value(json!({ "action": "jump", "height": 2 })).expect("report shape");
    assert!(!report.is_error());

    let scalar: EventBody = serde_json::from_value(json!("plain line")).expect("scalar report");
    assert!(!scalar.is_error());
}

#[test]
fn event_deserializes_with_optional_time() {
    let event: ClientEvent =
        serde_json::from_value(json!({ "pid": 512, "body": { "action": "jump" } }))
            .expect("event without time");
    assert_eq!(event.pid, 512);
    assert!(event.time.is_none());

    let event: ClientEvent = serde_json::from_value(json!({
        "pid": 512,
        "time": "2026-03-05T06:07:08Z",
        "body": { "kind": "Oops", "message": "bad" },
    }))
    .expect("event with time");
    assert!(event.time.is_some());
    assert_eq!(event.level(), EventLevel::Exception);
}
