//! Live session model.

/// A live instrumented client process tracked by the registry.
///
/// The pid is the session key: at most one live session exists per pid,
/// and the name is captured once at registration and reused for every
/// record the session produces afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// OS process id of the client.
    pub pid: u32,
    /// Short image name, resolved when the session was registered.
    pub name: String,
}

impl Session {
    /// Construct a session from resolved process facts.
    #[must_use]
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}
