use std::path::PathBuf;
use std::time::Duration;

use svcapp_core::{RecoveryPolicy, Result};

use crate::config::ClientConfig;
use crate::{DEFAULT_POLL_INTERVAL, DEFAULT_STOP_TIMEOUT, Manager, get_manager};

pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";

#[derive(Clone, Debug)]
pub struct Builder {
    #[cfg_attr(not(target_os = "linux"), allow(unused))]
    pub(crate) unit_dir: PathBuf,
    #[cfg_attr(not(windows), allow(unused))]
    pub(crate) poll_interval: Duration,
    #[cfg_attr(not(windows), allow(unused))]
    pub(crate) default_stop_timeout: Duration,
    #[cfg_attr(not(windows), allow(unused))]
    pub(crate) recovery_policy: RecoveryPolicy,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            unit_dir: PathBuf::from(DEFAULT_UNIT_DIR),
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_stop_timeout: DEFAULT_STOP_TIMEOUT,
            recovery_policy: RecoveryPolicy::default(),
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(self, config: &ClientConfig) -> Self {
        self.with_unit_dir(config.unit_dir.clone())
            .with_poll_interval(config.poll_interval())
            .with_default_stop_timeout(config.default_stop_timeout())
    }

    pub fn with_unit_dir(mut self, unit_dir: impl Into<PathBuf>) -> Self {
        self.unit_dir = unit_dir.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_default_stop_timeout(mut self, timeout: Duration) -> Self {
        self.default_stop_timeout = timeout;
        self
    }

    pub fn with_recovery_policy(mut self, recovery_policy: RecoveryPolicy) -> Self {
        self.recovery_policy = recovery_policy;
        self
    }

    pub fn build(self) -> Result<Box<dyn Manager>> {
        get_manager(self)
    }
}
