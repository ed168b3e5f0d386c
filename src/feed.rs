//! Live trace feed mirrored to stdout.
//!
//! Client activity is echoed line by line as it is processed, independent
//! of store durability. Diagnostics go to stderr via `tracing`, so stdout
//! carries feed lines only and stays pipeable.

use std::io::Write as _;

use chrono::{DateTime, Utc};

/// Timestamp layout shared by every feed line.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Render a server status line: `{ts} - {message}`.
#[must_use]
pub fn server_line(at: DateTime<Utc>, message: &str) -> String {
    let ts = at.format(TIMESTAMP_FORMAT);
    format!("{ts} - {message}")
}

/// Render a client activity line: `{ts}[{pid}-{name}]{detail}`.
#[must_use]
pub fn client_line(at: DateTime<Utc>, pid: u32, name: &str, detail: &str) -> String {
    let ts = at.format(TIMESTAMP_FORMAT);
    format!("{ts}[{pid}-{name}]{detail}")
}

/// Receives rendered feed lines.
///
/// Implementations must be `Send + Sync` so the sink can be shared across
/// task boundaries via `Arc`.
pub trait TraceSink: Send + Sync {
    /// Emit one already-rendered line.
    fn emit(&self, line: &str);
}

/// Feed sink writing to the process stdout.
#[derive(Debug, Default)]
pub struct StdoutFeed;

impl TraceSink for StdoutFeed {
    fn emit(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        // The feed is best-effort; a closed pipe must not fail ingestion.
        let _ = writeln!(handle, "{line}");
    }
}
