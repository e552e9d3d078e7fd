#[cfg(windows)]
mod api;
#[cfg(windows)]
pub use api::*;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use svcapp_core::{Error, InstallParams, RecoveryPolicy, Result, State, validate_name};
use tap::TapFallible;
use tracing::{debug, info, warn};

use crate::{
    Builder, DEFAULT_POLL_INTERVAL, DEFAULT_STOP_TIMEOUT, Manager, PrivilegeGate, StopWaiter,
    WaitOutcome, stop_timeout,
};

#[derive(thiserror::Error, Debug)]
pub enum ScmError {
    #[error("The specified service does not exist")]
    DoesNotExist,
    #[error("Access to the service control manager was denied")]
    AccessDenied,
    #[error(transparent)]
    Other(#[from] io::Error),
}

pub type ScmResult<T> = std::result::Result<T, ScmError>;

impl From<ScmError> for Error {
    fn from(value: ScmError) -> Self {
        match value {
            ScmError::DoesNotExist => Error::NotInstalled,
            ScmError::AccessDenied => Error::InsufficientPrivileges,
            ScmError::Other(e) => Error::System(e),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub name: String,
    pub display_name: String,
    pub executable: String,
    pub arguments: Vec<String>,
    pub autostart: bool,
}

impl From<&InstallParams> for ServiceDefinition {
    fn from(params: &InstallParams) -> Self {
        Self {
            name: params.name().to_owned(),
            display_name: params.display_name().to_owned(),
            executable: params.executable().to_owned(),
            arguments: params.split_args().map(ToOwned::to_owned).collect(),
            autostart: true,
        }
    }
}

/// Client side of the service control manager protocol.
///
/// Every call opens its own connection; no handles are kept between calls.
pub trait ServiceControl: Send + Sync {
    /// Succeeds when the caller may create and modify services.
    fn check_access(&self) -> ScmResult<()>;
    fn open(&self, name: &str) -> ScmResult<()>;
    fn create(&self, definition: &ServiceDefinition) -> ScmResult<()>;
    fn set_description(&self, name: &str, description: &str) -> ScmResult<()>;
    fn set_recovery(&self, name: &str, policy: &RecoveryPolicy) -> ScmResult<()>;
    fn query(&self, name: &str) -> ScmResult<State>;
    fn start(&self, name: &str) -> ScmResult<()>;
    /// Sends the stop control and returns the state reported in the reply.
    fn stop(&self, name: &str) -> ScmResult<State>;
    fn delete(&self, name: &str) -> ScmResult<()>;
    /// Raw `WaitToKillServiceTimeout` host setting, if it can be read.
    fn wait_to_kill_timeout(&self) -> Option<String>;
}

/// Authorizes through the service control manager itself: the caller is privileged
/// when it may connect with rights to create services.
pub struct ScmAccessGate<S> {
    scm: Arc<S>,
}

impl<S> ScmAccessGate<S> {
    pub fn new(scm: Arc<S>) -> Self {
        Self { scm }
    }
}

impl<S: ServiceControl> PrivilegeGate for ScmAccessGate<S> {
    fn check_privileges(&self) -> Result<()> {
        self.scm.check_access().map_err(Error::from)
    }
}

pub struct WindowsServiceManager<S> {
    scm: Arc<S>,
    gate: Arc<dyn PrivilegeGate>,
    poll_interval: Duration,
    default_stop_timeout: Duration,
    recovery_policy: RecoveryPolicy,
}

impl<S> Clone for WindowsServiceManager<S> {
    fn clone(&self) -> Self {
        Self {
            scm: self.scm.clone(),
            gate: self.gate.clone(),
            poll_interval: self.poll_interval,
            default_stop_timeout: self.default_stop_timeout,
            recovery_policy: self.recovery_policy.clone(),
        }
    }
}

impl<S: ServiceControl + 'static> WindowsServiceManager<S> {
    pub fn new(scm: Arc<S>) -> Self {
        Self {
            gate: Arc::new(ScmAccessGate::new(scm.clone())),
            scm,
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_stop_timeout: DEFAULT_STOP_TIMEOUT,
            recovery_policy: RecoveryPolicy::default(),
        }
    }

    #[cfg_attr(not(windows), allow(unused))]
    pub(crate) fn from_builder(builder: Builder, scm: S) -> Self {
        Self::new(Arc::new(scm))
            .with_poll_interval(builder.poll_interval)
            .with_default_stop_timeout(builder.default_stop_timeout)
            .with_recovery_policy(builder.recovery_policy)
    }

    pub fn with_privilege_gate(mut self, gate: impl PrivilegeGate + 'static) -> Self {
        self.gate = Arc::new(gate);
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

    fn is_installed(&self, name: &str) -> Result<bool> {
        if validate_name(name).is_err() {
            return Ok(false);
        }
        match self.scm.open(name) {
            Ok(()) => Ok(true),
            Err(ScmError::DoesNotExist) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn probe(&self, name: &str) -> Result<State> {
        match self.scm.query(name) {
            Ok(state) => Ok(state),
            Err(ScmError::DoesNotExist) => Ok(State::NotInstalled),
            Err(e) => Err(e.into()),
        }
    }

    fn stop_waiter(&self) -> StopWaiter {
        let raw = self.scm.wait_to_kill_timeout();
        StopWaiter::new(
            self.poll_interval,
            stop_timeout(raw.as_deref(), self.default_stop_timeout),
        )
    }

    fn configure(&self, params: &InstallParams) -> Result<()> {
        let name = params.name();
        self.scm.set_description(name, params.description())?;
        self.scm.set_recovery(name, &self.recovery_policy)?;
        Ok(())
    }
}

impl<S: ServiceControl + 'static> Manager for WindowsServiceManager<S> {
    fn install(&self, params: &InstallParams) -> Result<()> {
        let name = params.name();
        if self.is_installed(name)? {
            return Err(Error::AlreadyInstalled);
        }
        self.gate.check_privileges()?;

        let definition = ServiceDefinition::from(params);
        debug!("Creating service {definition:?}");
        self.scm.create(&definition)?;

        if let Err(e) = self.configure(params) {
            warn!("Deleting service {name} after failed configuration");
            self.scm
                .delete(name)
                .tap_err(|delete_err| warn!("Error deleting service {name}: {delete_err}"))
                .ok();
            return Err(e);
        }

        info!("Installed service {name}");
        Ok(())
    }

    fn start(&self, name: &str) -> Result<()> {
        if !self.is_installed(name)? {
            return Err(Error::NotInstalled);
        }
        self.gate.check_privileges()?;
        if self.probe(name)? == State::Running {
            return Err(Error::AlreadyRunning);
        }

        self.scm.start(name)?;
        info!("Started service {name}");
        Ok(())
    }

    fn stop(&self, name: &str) -> Result<()> {
        if !self.is_installed(name)? {
            return Err(Error::NotInstalled);
        }
        self.gate.check_privileges()?;
        match self.probe(name)? {
            State::Stopped => return Err(Error::AlreadyStopped),
            State::NotInstalled => return Err(Error::NotInstalled),
            _ => {}
        }

        let state = self.scm.stop(name)?;
        let waiter = self.stop_waiter();
        match waiter.wait(state, || self.probe(name))? {
            WaitOutcome::Stopped => info!("Stopped service {name}"),
            WaitOutcome::TimedOut => warn!(
                "Service {name} did not report stopped within {:?}",
                waiter.timeout()
            ),
        }
        Ok(())
    }

    fn status(&self, name: &str) -> Result<State> {
        if !self.is_installed(name)? {
            return Ok(State::NotInstalled);
        }
        self.gate.check_privileges()?;
        self.probe(name)
    }

    fn uninstall(&self, name: &str) -> Result<()> {
        if !self.is_installed(name)? {
            return Err(Error::NotInstalled);
        }
        self.gate.check_privileges()?;

        self.scm.delete(name)?;
        info!("Uninstalled service {name}");
        Ok(())
    }
}
