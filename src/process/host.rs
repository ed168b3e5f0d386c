//! Operating-system implementation of the process capability.
//!
//! Children this server launched are held as `tokio::process::Child`
//! handles and reaped by awaiting them. Foreign pids are probed with the
//! zero-signal liveness check at a configurable interval.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{ProcessHost, ProcessInfo};
use crate::{AppError, Result};

/// Environment variable telling launched clients where plugin
/// configuration lives.
pub const PLUGIN_DIR_ENV: &str = "PROBE_PLUGIN_DIR";

struct Spawned {
    name: String,
    child: Child,
}

/// Process host backed by the real operating system.
pub struct SystemProcessHost {
    spawned: Mutex<HashMap<u32, Spawned>>,
    poll: Duration,
}

impl SystemProcessHost {
    /// Construct a host with the given foreign-pid poll interval.
    #[must_use]
    pub fn new(poll: Duration) -> Self {
        Self {
            spawned: Mutex::new(HashMap::new()),
            poll,
        }
    }

    /// Launch a client process and begin tracking it.
    ///
    /// The child is not killed on drop: the server's whole purpose is to
    /// outwait it. Its standard streams are detached so stdout stays
    /// reserved for the feed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Spawn` if the process cannot be started or
    /// exits before it can be tracked.
    pub async fn launch(
        &self,
        program: &str,
        args: &[String],
        plugin_dir: &Path,
    ) -> Result<ProcessInfo> {
        let mut command = Command::new(program);
        command
            .args(args)
            .env(PLUGIN_DIR_ENV, plugin_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);

        let child = command
            .spawn()
            .map_err(|err| AppError::Spawn(format!("failed to launch {program}: {err}")))?;
        let Some(pid) = child.id() else {
            return Err(AppError::Spawn(format!(
                "{program} exited before it could be tracked"
            )));
        };
        let name = image_name(program);

        self.spawned.lock().await.insert(
            pid,
            Spawned {
                name: name.clone(),
                child,
            },
        );
        info!(pid, name = %name, "client process launched");

        Ok(ProcessInfo { pid, name })
    }
}

impl ProcessHost for SystemProcessHost {
    fn find(&self, pid: u32) -> Pin<Box<dyn Future<Output = Result<ProcessInfo>> + Send + '_>> {
        Box::pin(async move {
            let mut spawned = self.spawned.lock().await;
            if let Some(entry) = spawned.get_mut(&pid) {
                // try_wait distinguishes still-running from exited without
                // blocking; an error on the handle counts as exited.
                return match entry.child.try_wait() {
                    Ok(None) => Ok(ProcessInfo {
                        pid,
                        name: entry.name.clone(),
                    }),
                    Ok(Some(_)) | Err(_) => Err(AppError::NoSuchProcess(pid)),
                };
            }
            drop(spawned);

            if probe_alive(pid) {
                Ok(ProcessInfo {
                    pid,
                    name: image_of(pid).unwrap_or_else(|| format!("pid-{pid}")),
                })
            } else {
                Err(AppError::NoSuchProcess(pid))
            }
        })
    }

    fn wait_exit(&self, pid: u32) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let owned = self.spawned.lock().await.remove(&pid);
            if let Some(mut entry) = owned {
                match entry.child.wait().await {
                    Ok(status) => info!(pid, %status, "launched client exited"),
                    Err(err) => warn!(pid, %err, "failed to await launched client"),
                }
                return;
            }

            while probe_alive(pid) {
                tokio::time::sleep(self.poll).await;
            }
        })
    }
}

fn image_name(program: &str) -> String {
    Path::new(program)
        .file_stem()
        .map_or_else(|| program.to_owned(), |stem| stem.to_string_lossy().into_owned())
}

/// Zero-signal liveness probe. `EPERM` means the process exists but is
/// owned elsewhere, which still counts as alive.
#[cfg(unix)]
fn probe_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) | Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Foreign pids cannot be probed off unix; report gone so watchers
/// resolve instead of hanging.
#[cfg(not(unix))]
fn probe_alive(_pid: u32) -> bool {
    false
}

#[cfg(target_os = "linux")]
fn image_of(pid: u32) -> Option<String> {
    std::fs::read_to_string(format!("/proc/{pid}/comm"))
        .ok()
        .map(|raw| raw.trim().to_owned())
        .filter(|name| !name.is_empty())
}

#[cfg(not(target_os = "linux"))]
fn image_of(_pid: u32) -> Option<String> {
    None
}
