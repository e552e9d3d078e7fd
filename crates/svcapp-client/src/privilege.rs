use std::sync::Arc;

use svcapp_core::{Error, Result};
use tracing::debug;

use crate::{Command, CommandRunner};

/// Decides whether the caller may change service configuration.
pub trait PrivilegeGate: Send + Sync {
    fn check_privileges(&self) -> Result<()>;
}

/// Grants access when the effective group id reported by `id -g` is the superuser group.
///
/// This checks the group rather than the user, so a root process whose primary group
/// is not 0 is rejected and a non-root member of group 0 is accepted.
#[derive(Clone)]
pub struct GroupIdGate {
    runner: Arc<dyn CommandRunner>,
}

impl GroupIdGate {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl PrivilegeGate for GroupIdGate {
    fn check_privileges(&self) -> Result<()> {
        let command = Command::new("id", ["-g"]);
        let output = match self.runner.run(&command) {
            Ok(output) if output.success => output,
            Ok(output) => {
                debug!("{command} exited with an error: {}", output.stderr.trim());
                return Err(Error::UnsupportedSystem);
            }
            Err(e) => {
                debug!("Unable to run {command}: {e}");
                return Err(Error::UnsupportedSystem);
            }
        };

        let gid: u32 = output
            .stdout
            .trim()
            .parse()
            .map_err(|_| Error::InvalidSystemResponse)?;
        if gid == 0 {
            Ok(())
        } else {
            Err(Error::InsufficientPrivileges)
        }
    }
}

#[cfg(test)]
#[path = "./privilege_test.rs"]
mod privilege_test;
