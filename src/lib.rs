#![forbid(unsafe_code)]

//! Control-plane library for the probe console server.
//!
//! Tracks instrumented client processes as live sessions, persists their
//! lifecycle and reported events into a `SQLite` event store, mirrors
//! activity to a line-oriented stdout feed, and drains once the last
//! attached client has exited.

pub mod config;
pub mod errors;
pub mod feed;
pub mod models;
pub mod orchestrator;
pub mod persistence;
pub mod process;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
