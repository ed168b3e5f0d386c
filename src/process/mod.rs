//! Process capability: liveness lookup and exit watching.
//!
//! The [`ProcessHost`] trait decouples session bookkeeping from the
//! operating system. Production code uses [`SystemProcessHost`]; tests
//! substitute scripted fakes.

pub mod host;

use std::future::Future;
use std::pin::Pin;

use crate::Result;

pub use host::SystemProcessHost;

/// Facts about a live process, captured at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    /// OS process id.
    pub pid: u32,
    /// Short image name (executable stem).
    pub name: String,
}

/// Capability to resolve live processes and observe their termination.
pub trait ProcessHost: Send + Sync {
    /// Resolve a currently-running process by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoSuchProcess`](crate::AppError::NoSuchProcess)
    /// if no live process has this id.
    fn find(&self, pid: u32) -> Pin<Box<dyn Future<Output = Result<ProcessInfo>> + Send + '_>>;

    /// Resolve once the process with this id has terminated.
    ///
    /// Must resolve promptly for a process that is already gone, so a
    /// watch armed after death still observes the exit.
    fn wait_exit(&self, pid: u32) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}
