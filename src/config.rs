//! Global configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

fn default_exit_poll_ms() -> u64 {
    250
}

/// Global configuration parsed from the TOML file named on the command line.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Path to the `SQLite` database file holding both log streams.
    pub db_path: PathBuf,
    /// Directory of plugin configuration for instrumented clients.
    ///
    /// Opaque to this server: it is validated to exist and exported to
    /// spawned clients via `PROBE_PLUGIN_DIR`, nothing else.
    pub plugin_dir: PathBuf,
    /// Liveness poll interval (milliseconds) for exit-watching processes
    /// this server did not spawn itself.
    #[serde(default = "default_exit_poll_ms")]
    pub exit_poll_ms: u64,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and normalize paths.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Absolute path to the plugin configuration directory.
    #[must_use]
    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    /// Poll interval for foreign-pid exit watching.
    #[must_use]
    pub fn exit_poll(&self) -> Duration {
        Duration::from_millis(self.exit_poll_ms)
    }

    fn validate(&mut self) -> Result<()> {
        if self.exit_poll_ms == 0 {
            return Err(AppError::Config(
                "exit_poll_ms must be greater than zero".into(),
            ));
        }

        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("db_path must not be empty".into()));
        }

        let canonical_plugin_dir = self
            .plugin_dir
            .canonicalize()
            .map_err(|err| AppError::Config(format!("plugin_dir invalid: {err}")))?;
        self.plugin_dir = canonical_plugin_dir;

        Ok(())
    }
}
