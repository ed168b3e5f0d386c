//! Unit tests for feed line rendering.

use chrono::{DateTime, Utc};

use probe_console::feed::{client_line, server_line, StdoutFeed, TraceSink};

fn fixed_time() -> DateTime<Utc> {
    "2026-03-05T06:07:08.042Z".parse().expect("timestamp")
}

#[test]
fn server_line_has_dash_separator() {
    let line = server_line(fixed_time(), "server starting");
    assert_eq!(line, "2026-03-05 06:07:08.042 - server starting");
}

#[test]
fn client_line_brackets_pid_and_name() {
    let line = client_line(fixed_time(), 512, "game", "connect(game.exe)");
    assert_eq!(line, "2026-03-05 06:07:08.042[512-game]connect(game.exe)");
}

#[test]
fn client_line_appends_detail_verbatim() {
    let payload = serde_json::json!({ "body": { "hp": 40 } });
    let line = client_line(fixed_time(), 512, "game", &payload.to_string());
    assert!(line.ends_with(r#"[512-game]{"body":{"hp":40}}"#), "got {line}");
}

#[test]
fn timestamps_render_with_millisecond_precision() {
    let whole_second: DateTime<Utc> = "2026-03-05T06:07:08Z".parse().expect("timestamp");
    let line = server_line(whole_second, "tick");
    assert_eq!(line, "2026-03-05 06:07:08.000 - tick");
}

#[test]
fn stdout_feed_is_a_trace_sink() {
    let sink: Box<dyn TraceSink> = Box::new(StdoutFeed);
    sink.emit("2026-03-05 06:07:08.000 - smoke line");
}
