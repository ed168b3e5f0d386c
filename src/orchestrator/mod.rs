//! Session orchestration modules.
//!
//! Covers the live-session registry, exit watching, and the event
//! ingestion pipeline behind the server boundary.

pub mod registry;
pub mod server;
