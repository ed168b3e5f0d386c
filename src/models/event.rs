//! Client-reported events and their persisted classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Classification of a client log record.
///
/// Lifecycle levels (`Connect`, `Hooked`, `Disconnect`) are produced by the
/// server itself; `Message` and `Exception` classify what clients report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    /// Client announced that its instrumentation has come up.
    Connect,
    /// Server armed exit tracking for the client.
    Hooked,
    /// Client process exited.
    Disconnect,
    /// Ordinary client-reported event.
    Message,
    /// Client-reported error condition.
    Exception,
}

/// Body of a client-reported event.
///
/// Deserialization is shape-driven: an object carrying `kind` and
/// `message` is an error report, anything else is ordinary report data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EventBody {
    /// An error condition reported by the client.
    Error(ErrorReport),
    /// Arbitrary structured report data.
    Report(serde_json::Value),
}

impl EventBody {
    /// Whether this body carries an error report.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Structured error details reported by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// Error class or category name.
    pub kind: String,
    /// Human-readable error message.
    pub message: String,
    /// Stack trace captured at the error site, if the client had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// A single client-reported event as delivered at the ingestion boundary.
///
/// Serializing an event yields its persisted view: camelCase keys in
/// declaration order. The pid is routing metadata only; the stored record
/// carries it in a dedicated column, so the view omits it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientEvent {
    /// Reporting process id.
    #[serde(skip_serializing)]
    pub pid: u32,
    /// Client-supplied timestamp; absent means "stamp when staged".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    /// Event body.
    pub body: EventBody,
}

impl ClientEvent {
    /// Construct an ordinary report event with no client timestamp.
    #[must_use]
    pub fn report(pid: u32, body: serde_json::Value) -> Self {
        Self {
            pid,
            time: None,
            body: EventBody::Report(body),
        }
    }

    /// Construct an error event with no client timestamp.
    #[must_use]
    pub fn error(pid: u32, report: ErrorReport) -> Self {
        Self {
            pid,
            time: None,
            body: EventBody::Error(report),
        }
    }

    /// Level this event is classified under when persisted.
    #[must_use]
    pub fn level(&self) -> EventLevel {
        if self.body.is_error() {
            EventLevel::Exception
        } else {
            EventLevel::Message
        }
    }

    /// Render the persisted view of this event as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Serialize`](crate::AppError::Serialize) if the
    /// body cannot be represented as JSON.
    pub fn to_payload(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
