use std::path::{Path, PathBuf};
use std::time::Duration;

use confique::Config;

#[derive(thiserror::Error, Debug)]
#[error("Error loading config file {0:?}: {1}")]
pub struct ConfigLoadError(pub(crate) Option<PathBuf>, pub(crate) String);

/// Host-side settings for the lifecycle controller.
///
/// Values are layered: environment variables override the config file, which
/// overrides the defaults below.
#[derive(Config, Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Directory systemd unit files are written to.
    #[config(default = "/etc/systemd/system", env = "SVCAPP_UNIT_DIR")]
    pub unit_dir: PathBuf,
    /// Milliseconds between state queries while waiting for a stop to complete.
    #[config(default = 50, env = "SVCAPP_POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,
    /// Stop timeout in milliseconds used when the host doesn't report its own.
    #[config(default = 20000, env = "SVCAPP_DEFAULT_STOP_TIMEOUT_MS")]
    pub default_stop_timeout_ms: u64,
}

impl ClientConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let mut builder = Self::builder().env();
        if let Some(path) = path {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| ConfigLoadError(path.map(ToOwned::to_owned), e.to_string()))
    }

    pub fn template() -> String {
        confique::toml::template::<Self>(confique::toml::FormatOptions::default())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn default_stop_timeout(&self) -> Duration {
        Duration::from_millis(self.default_stop_timeout_ms)
    }
}

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;
