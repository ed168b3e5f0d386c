//! Server boundary operations: attach, connect notices, batch ingestion.
//!
//! [`ProbeServer`] bundles the registry, event store, live feed, and
//! process capability behind the operations the ingestion layer calls.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::feed::{self, TraceSink};
use crate::models::event::ClientEvent;
use crate::models::record::ClientRecord;
use crate::models::session::Session;
use crate::orchestrator::registry::SessionRegistry;
use crate::persistence::event_log::EventLog;
use crate::process::ProcessHost;
use crate::Result;

/// Control-plane facade over the session registry and event pipeline.
pub struct ProbeServer {
    registry: Arc<SessionRegistry>,
    store: Arc<EventLog>,
    feed: Arc<dyn TraceSink>,
    host: Arc<dyn ProcessHost>,
}

impl ProbeServer {
    /// Bundle the shared components into a server.
    #[must_use]
    pub fn new(
        registry: Arc<SessionRegistry>,
        store: Arc<EventLog>,
        feed: Arc<dyn TraceSink>,
        host: Arc<dyn ProcessHost>,
    ) -> Self {
        Self {
            registry,
            store,
            feed,
            host,
        }
    }

    /// Access the live-session registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Attach to a running client: register its session, arm the exit
    /// watch, and record that the session is hooked.
    ///
    /// Attaching to an already-watched session is a no-op, so repeated
    /// attach calls never stack watchers or duplicate hooked records.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoSuchProcess`](crate::AppError::NoSuchProcess)
    /// if `pid` is not running, and `AppError::Db` if the hooked record
    /// cannot be committed. The exit watch stays armed in the latter case.
    pub async fn attach(&self, pid: u32) -> Result<()> {
        let session = self.registry.resolve_or_register(pid).await?;
        if !self.registry.arm_watch(pid).await {
            info!(pid, "attach repeated for live session; watch already armed");
            return Ok(());
        }
        self.spawn_exit_watcher(session.clone());

        self.store
            .append_batch(std::slice::from_ref(&ClientRecord::hooked(&session)))
            .await?;
        info!(pid, name = %session.name, "session hooked");

        Ok(())
    }

    /// Record a client's connect announcement under its session.
    ///
    /// The session is registered on first reference, so a connect arriving
    /// before attach still lands under the right name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoSuchProcess`](crate::AppError::NoSuchProcess)
    /// if `pid` is not running, and `AppError::Db` if the record cannot be
    /// committed.
    pub async fn report_connect(&self, pid: u32, image: &str) -> Result<()> {
        let session = self.registry.resolve_or_register(pid).await?;
        let record = ClientRecord::connect(&session, image);

        self.feed.emit(&feed::client_line(
            record.logged_at,
            session.pid,
            &session.name,
            &format!("connect({image})"),
        ));
        self.store
            .append_batch(std::slice::from_ref(&record))
            .await?;

        Ok(())
    }

    /// Ingest a batch of client-reported events.
    ///
    /// Each event is staged under its (possibly freshly registered)
    /// session and echoed to the feed, then the whole batch commits in one
    /// transaction. An empty batch is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoSuchProcess`](crate::AppError::NoSuchProcess)
    /// if any event names a pid that is not running,
    /// `AppError::Serialize` if an event body cannot be rendered, and
    /// `AppError::Db` if the commit fails. No record of the batch is
    /// persisted on any of these; feed lines already emitted stand.
    pub async fn submit(&self, batch: &[ClientEvent]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut records = Vec::with_capacity(batch.len());
        for event in batch {
            let session = self.registry.resolve_or_register(event.pid).await?;
            let record = ClientRecord::from_event(event, &session)?;
            self.feed.emit(&feed::client_line(
                record.logged_at,
                record.pid,
                &record.name,
                &record.payload.to_string(),
            ));
            records.push(record);
        }
        self.store.append_batch(&records).await?;

        Ok(())
    }

    /// Record a server status event and mirror it to the live feed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the record cannot be committed.
    pub async fn server_event(&self, message: &str) -> Result<()> {
        self.feed.emit(&feed::server_line(Utc::now(), message));
        self.store.append_server(message).await
    }

    /// Block until every watched session has disconnected.
    pub async fn wait_until_drained(&self) {
        self.registry.wait_until_empty().await;
    }

    /// Watch one session's process until it exits, then run the
    /// disconnect path: feed line, disconnect record, removal, wakeup.
    fn spawn_exit_watcher(&self, session: Session) {
        let registry = Arc::clone(&self.registry);
        let store = Arc::clone(&self.store);
        let feed = Arc::clone(&self.feed);
        let host = Arc::clone(&self.host);

        tokio::spawn(async move {
            host.wait_exit(session.pid).await;

            feed.emit(&feed::client_line(
                Utc::now(),
                session.pid,
                &session.name,
                "disconnect",
            ));
            if let Err(err) = store
                .append_batch(std::slice::from_ref(&ClientRecord::disconnect(&session)))
                .await
            {
                warn!(pid = session.pid, %err, "failed to record disconnect");
            }
            if registry.remove(session.pid).await {
                info!(pid = session.pid, name = %session.name, "session disconnected");
            }
        });
    }
}
