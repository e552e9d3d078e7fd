use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use svcapp_core::{Error, InstallParams, Result, State, validate_name};
use tap::TapFallible;
use tracing::{debug, info, warn};

use crate::{
    Builder, Command, CommandOutput, CommandRunner, DEFAULT_UNIT_DIR, GroupIdGate, Manager,
    PrivilegeGate, SystemCommandRunner,
};

/// Manages services defined as unit files and controlled through `systemctl`.
#[derive(Clone)]
pub struct SystemdServiceManager {
    runner: Arc<dyn CommandRunner>,
    gate: Arc<dyn PrivilegeGate>,
    unit_dir: PathBuf,
}

impl Default for SystemdServiceManager {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_DIR)
    }
}

impl SystemdServiceManager {
    pub fn new(unit_dir: impl Into<PathBuf>) -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
        Self {
            gate: Arc::new(GroupIdGate::new(runner.clone())),
            runner,
            unit_dir: unit_dir.into(),
        }
    }

    #[cfg_attr(not(target_os = "linux"), allow(unused))]
    pub(crate) fn from_builder(builder: Builder) -> Self {
        Self::new(builder.unit_dir)
    }

    /// Replaces the runner used for `systemctl` and the default `id -g` privilege check.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.gate = Arc::new(GroupIdGate::new(runner.clone()));
        self.runner = runner;
        self
    }

    pub fn with_privilege_gate(mut self, gate: impl PrivilegeGate + 'static) -> Self {
        self.gate = Arc::new(gate);
        self
    }

    pub fn unit_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(unit_file_name(name))
    }

    /// A name that could resolve outside the unit directory is never installed.
    fn is_installed(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.unit_path(name).is_file()
    }

    /// Only `Running` or `Stopped` are ever reported. A status query that fails for any
    /// reason is indistinguishable from a stopped service.
    fn probe(&self, name: &str) -> State {
        let unit = unit_file_name(name);
        let command = systemctl(["--lines=0", "status", unit.as_str()]);
        match self.runner.run(&command) {
            Ok(output) if output.success && output.stdout.contains("Active: active") => {
                State::Running
            }
            Ok(_) => State::Stopped,
            Err(e) => {
                warn!("Unable to query status with {command}: {e}");
                State::Stopped
            }
        }
    }

    fn systemctl<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> Result<CommandOutput> {
        let command = systemctl(args);
        debug!("Running {command}");
        let output = self
            .runner
            .run(&command)
            .map_err(|e| io::Error::new(e.kind(), format!("Error running {command}: {e}")))?;
        if output.success {
            Ok(output)
        } else {
            Err(Error::system(format!(
                "{command} failed: {}",
                output.stderr.trim()
            )))
        }
    }

    fn write_unit(&self, path: &Path, contents: &str) -> io::Result<()> {
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = self.unit_dir.join(format!(".{file_name}.tmp"));

        let result = fs::File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(contents.as_bytes())?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&temp_path, path));
        if result.is_err() {
            fs::remove_file(&temp_path).ok();
        }
        result.map_err(|e| {
            io::Error::new(e.kind(), format!("Error writing unit file {path:?}: {e}"))
        })
    }

    fn register_unit(&self, unit: &str) -> Result<()> {
        self.systemctl(["daemon-reload"])?;
        self.systemctl(["enable", unit])?;
        Ok(())
    }
}

impl Manager for SystemdServiceManager {
    fn install(&self, params: &InstallParams) -> Result<()> {
        let name = params.name();
        if self.is_installed(name) {
            return Err(Error::AlreadyInstalled);
        }
        self.gate.check_privileges()?;

        let path = self.unit_path(name);
        self.write_unit(&path, &unit_file_contents(params))?;

        if let Err(e) = self.register_unit(&unit_file_name(name)) {
            warn!("Removing unit file {path:?} after failed registration");
            fs::remove_file(&path)
                .tap_err(|remove_err| warn!("Error removing unit file {path:?}: {remove_err}"))
                .ok();
            self.systemctl(["daemon-reload"])
                .tap_err(|reload_err| warn!("Error reloading units: {reload_err}"))
                .ok();
            return Err(e);
        }

        info!("Installed service {name} at {path:?}");
        Ok(())
    }

    fn start(&self, name: &str) -> Result<()> {
        if !self.is_installed(name) {
            return Err(Error::NotInstalled);
        }
        self.gate.check_privileges()?;
        if self.probe(name) == State::Running {
            return Err(Error::AlreadyRunning);
        }

        self.systemctl(["start", unit_file_name(name).as_str()])?;
        info!("Started service {name}");
        Ok(())
    }

    fn stop(&self, name: &str) -> Result<()> {
        if !self.is_installed(name) {
            return Err(Error::NotInstalled);
        }
        self.gate.check_privileges()?;
        if self.probe(name) != State::Running {
            return Err(Error::AlreadyStopped);
        }

        // systemctl stop blocks until the unit is down
        self.systemctl(["stop", unit_file_name(name).as_str()])?;
        info!("Stopped service {name}");
        Ok(())
    }

    fn status(&self, name: &str) -> Result<State> {
        if !self.is_installed(name) {
            return Err(Error::NotInstalled);
        }
        self.gate.check_privileges()?;
        Ok(self.probe(name))
    }

    fn uninstall(&self, name: &str) -> Result<()> {
        if !self.is_installed(name) {
            return Err(Error::NotInstalled);
        }
        self.gate.check_privileges()?;

        // A failure after this point leaves the unit disabled but still on disk.
        self.systemctl(["disable", unit_file_name(name).as_str()])?;
        let path = self.unit_path(name);
        fs::remove_file(&path).map_err(|e| {
            io::Error::new(e.kind(), format!("Error removing unit file {path:?}: {e}"))
        })?;
        info!("Uninstalled service {name}");
        Ok(())
    }
}

fn unit_file_name(name: &str) -> String {
    format!("{name}.service")
}

fn systemctl<'a>(args: impl IntoIterator<Item = &'a str>) -> Command {
    Command::new("systemctl", args)
}

pub fn unit_file_contents(params: &InstallParams) -> String {
    format!(
        "[Unit]\n\
         Description={}\n\
         \n\
         [Service]\n\
         ExecStart={}\n\
         Restart=on-failure\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        params.description(),
        params.command_line()
    )
}

#[cfg(test)]
#[path = "./systemd_test.rs"]
mod systemd_test;
