//! Live-session registry with drain notification.
//!
//! One lock guards the session map and each session's exit-watch claim.
//! The drain wait follows monitor semantics: arm the wakeup, check
//! emptiness under the lock, then park.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};
use tracing::debug;

use crate::models::session::Session;
use crate::process::ProcessHost;
use crate::Result;

struct Tracked {
    session: Session,
    watched: bool,
}

/// The set of currently-live instrumented client sessions, keyed by pid.
pub struct SessionRegistry {
    host: Arc<dyn ProcessHost>,
    live: Mutex<HashMap<u32, Tracked>>,
    drained: Notify,
}

impl SessionRegistry {
    /// Construct an empty registry over the given process capability.
    #[must_use]
    pub fn new(host: Arc<dyn ProcessHost>) -> Self {
        Self {
            host,
            live: Mutex::new(HashMap::new()),
            drained: Notify::new(),
        }
    }

    /// Return the session for `pid`, registering it on first reference.
    ///
    /// Registration resolves the process while holding the registry lock,
    /// so two concurrent first references produce exactly one session. A
    /// session first seen here carries no exit watch until
    /// [`arm_watch`](Self::arm_watch) claims it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoSuchProcess`](crate::AppError::NoSuchProcess)
    /// if `pid` is not currently running.
    pub async fn resolve_or_register(&self, pid: u32) -> Result<Session> {
        let mut live = self.live.lock().await;
        if let Some(tracked) = live.get(&pid) {
            return Ok(tracked.session.clone());
        }

        let info = self.host.find(pid).await?;
        let session = Session::new(info.pid, info.name);
        live.insert(
            pid,
            Tracked {
                session: session.clone(),
                watched: false,
            },
        );
        debug!(pid, name = %session.name, "session registered");

        Ok(session)
    }

    /// Claim the exit watch for a registered session.
    ///
    /// The first claim returns `true`; later claims, and claims for pids
    /// that are not registered, return `false`. This is what makes a
    /// repeated attach a no-op.
    pub async fn arm_watch(&self, pid: u32) -> bool {
        let mut live = self.live.lock().await;
        match live.get_mut(&pid) {
            Some(tracked) if !tracked.watched => {
                tracked.watched = true;
                true
            }
            _ => false,
        }
    }

    /// Remove a session, waking drain waiters when the last one goes.
    ///
    /// Returns whether this call performed the removal, so racing exit
    /// paths cannot double-remove.
    pub async fn remove(&self, pid: u32) -> bool {
        let mut live = self.live.lock().await;
        let removed = live.remove(&pid).is_some();
        if removed && live.is_empty() {
            // Wake while still holding the lock: a waiter that has not
            // armed yet will observe the empty map on its own check.
            self.drained.notify_waiters();
        }
        removed
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.live.lock().await.len()
    }

    /// Whether no sessions are live.
    pub async fn is_empty(&self) -> bool {
        self.live.lock().await.is_empty()
    }

    /// Block until the registry holds zero sessions.
    ///
    /// Returns immediately when already empty. The wakeup is armed before
    /// the emptiness check, so a removal landing between the check and the
    /// park is never lost.
    pub async fn wait_until_empty(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.live.lock().await.is_empty() {
                return;
            }
            notified.await;
        }
    }
}
