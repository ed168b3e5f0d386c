//! Records staged for the two persisted log streams.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::models::event::{ClientEvent, EventLevel};
use crate::models::session::Session;
use crate::Result;

/// A row of the server-level log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRecord {
    /// Commit timestamp.
    pub logged_at: DateTime<Utc>,
    /// Free-text status message.
    pub message: String,
}

/// A fully staged row of the per-session client log stream.
///
/// Staging resolves everything up front: the session name is baked in at
/// construction and never re-derived, and the payload is the final JSON
/// document bound at commit.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    /// Event timestamp: client-supplied, or the staging time.
    pub logged_at: DateTime<Utc>,
    /// Reporting process id.
    pub pid: u32,
    /// Session name captured at staging time.
    pub name: String,
    /// Record classification.
    pub level: EventLevel,
    /// JSON document persisted into the payload column.
    pub payload: serde_json::Value,
}

impl ClientRecord {
    /// Stage a connect record carrying the announced image name.
    #[must_use]
    pub fn connect(session: &Session, image: &str) -> Self {
        Self {
            logged_at: Utc::now(),
            pid: session.pid,
            name: session.name.clone(),
            level: EventLevel::Connect,
            payload: json!({ "image": image }),
        }
    }

    /// Stage a hooked record marking that exit tracking is armed.
    #[must_use]
    pub fn hooked(session: &Session) -> Self {
        Self::minimal(session, EventLevel::Hooked)
    }

    /// Stage a disconnect record for an exited session.
    #[must_use]
    pub fn disconnect(session: &Session) -> Self {
        Self::minimal(session, EventLevel::Disconnect)
    }

    /// Stage a reported event under its session.
    ///
    /// A missing client timestamp is filled with the staging time, so the
    /// stored `logged_at` reflects when the event entered the pipeline
    /// rather than when the batch committed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Serialize`](crate::AppError::Serialize) if the
    /// event body cannot be rendered as JSON.
    pub fn from_event(event: &ClientEvent, session: &Session) -> Result<Self> {
        Ok(Self {
            logged_at: event.time.unwrap_or_else(Utc::now),
            pid: session.pid,
            name: session.name.clone(),
            level: event.level(),
            payload: event.to_payload()?,
        })
    }

    fn minimal(session: &Session, level: EventLevel) -> Self {
        Self {
            logged_at: Utc::now(),
            pid: session.pid,
            name: session.name.clone(),
            level,
            payload: json!({}),
        }
    }
}
