mod builder;
pub use builder::*;
mod command;
pub use command::*;
pub mod config;
mod platform;
pub use platform::*;
mod privilege;
pub use privilege::*;
mod stop_waiter;
pub use stop_waiter::*;
#[cfg(test)]
mod fakes;

pub use svcapp_core::{Error, InstallParams, RecoveryAction, RecoveryPolicy, Result, State};

/// The operation set every host backend exposes.
///
/// Each call re-reads whatever it needs from the host; nothing is cached between calls.
pub trait Manager: Send + Sync {
    fn install(&self, params: &InstallParams) -> Result<()>;
    fn start(&self, name: &str) -> Result<()>;
    fn stop(&self, name: &str) -> Result<()>;
    fn status(&self, name: &str) -> Result<State>;
    fn uninstall(&self, name: &str) -> Result<()>;
}
