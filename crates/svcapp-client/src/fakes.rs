use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};

use crate::{
    Command, CommandOutput, CommandRunner, RecoveryPolicy, ScmError, ServiceControl,
    ServiceDefinition, State,
};

#[derive(Default)]
struct SystemctlState {
    gid: Option<String>,
    active: HashSet<String>,
    enabled: HashSet<String>,
    failing: HashSet<String>,
    history: Vec<Command>,
}

/// Stands in for `systemctl` and `id`, keeping unit state in memory.
pub(crate) struct FakeSystemctl {
    state: Mutex<SystemctlState>,
}

impl FakeSystemctl {
    pub(crate) fn root() -> Arc<Self> {
        Self::with_gid(Some("0"))
    }

    /// `None` makes `id` impossible to spawn.
    pub(crate) fn with_gid(gid: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SystemctlState {
                gid: gid.map(ToOwned::to_owned),
                ..Default::default()
            }),
        })
    }

    pub(crate) fn fail(&self, verb: &str) {
        self.state.lock().unwrap().failing.insert(verb.to_owned());
    }

    pub(crate) fn set_active(&self, unit: &str) {
        self.state.lock().unwrap().active.insert(unit.to_owned());
    }

    pub(crate) fn is_active(&self, unit: &str) -> bool {
        self.state.lock().unwrap().active.contains(unit)
    }

    pub(crate) fn is_enabled(&self, unit: &str) -> bool {
        self.state.lock().unwrap().enabled.contains(unit)
    }

    pub(crate) fn history(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .history
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Every systemctl invocation that could change host state.
    pub(crate) fn mutations(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .history
            .iter()
            .filter(|c| c.program == "systemctl" && verb(c) != Some("status"))
            .map(ToString::to_string)
            .collect()
    }
}

fn verb(command: &Command) -> Option<&str> {
    command
        .args
        .iter()
        .map(String::as_str)
        .find(|a| !a.starts_with("--"))
}

impl CommandRunner for FakeSystemctl {
    fn run(&self, command: &Command) -> io::Result<CommandOutput> {
        let mut state = self.state.lock().unwrap();
        state.history.push(command.clone());

        if command.program == "id" {
            return match &state.gid {
                Some(gid) => Ok(CommandOutput {
                    success: true,
                    stdout: format!("{gid}\n"),
                    stderr: String::new(),
                }),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "id not found")),
            };
        }

        let verb = verb(command).unwrap_or_default().to_owned();
        if state.failing.contains(&verb) {
            return Ok(CommandOutput {
                success: false,
                stdout: String::new(),
                stderr: format!("Failed to {verb} unit"),
            });
        }
        let unit = command.args.last().cloned().unwrap_or_default();
        match verb.as_str() {
            "enable" => {
                state.enabled.insert(unit);
            }
            "disable" => {
                state.enabled.remove(&unit);
            }
            "start" => {
                state.active.insert(unit);
            }
            "stop" => {
                state.active.remove(&unit);
            }
            "status" => {
                let active = state.active.contains(&unit);
                return Ok(CommandOutput {
                    success: active,
                    stdout: if active {
                        format!("● {unit}\n     Loaded: loaded\n     Active: active (running)\n")
                    } else {
                        format!("○ {unit}\n     Loaded: loaded\n     Active: inactive (dead)\n")
                    },
                    stderr: String::new(),
                });
            }
            _ => {}
        }
        Ok(CommandOutput {
            success: true,
            ..Default::default()
        })
    }
}

#[derive(Clone, Debug)]
pub(crate) struct FakeService {
    pub(crate) definition: ServiceDefinition,
    pub(crate) description: String,
    pub(crate) recovery: Option<RecoveryPolicy>,
    pub(crate) state: State,
}

#[derive(Default)]
struct ScmState {
    services: HashMap<String, FakeService>,
    access_denied: bool,
    failing: HashSet<&'static str>,
    /// Queries answered with `StopPending` after a stop before `Stopped` is reported.
    stop_pending_polls: Option<usize>,
    wait_to_kill: Option<String>,
    calls: Vec<String>,
}

/// In-memory service control manager.
#[derive(Default)]
pub(crate) struct FakeScm {
    state: Mutex<ScmState>,
}

impl FakeScm {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn deny_access(&self) {
        self.state.lock().unwrap().access_denied = true;
    }

    pub(crate) fn fail(&self, call: &'static str) {
        self.state.lock().unwrap().failing.insert(call);
    }

    pub(crate) fn set_stop_pending_polls(&self, polls: Option<usize>) {
        self.state.lock().unwrap().stop_pending_polls = polls;
    }

    pub(crate) fn set_wait_to_kill(&self, value: &str) {
        self.state.lock().unwrap().wait_to_kill = Some(value.to_owned());
    }

    pub(crate) fn set_state(&self, name: &str, service_state: State) {
        if let Some(service) = self.state.lock().unwrap().services.get_mut(name) {
            service.state = service_state;
        }
    }

    pub(crate) fn service(&self, name: &str) -> Option<FakeService> {
        self.state.lock().unwrap().services.get(name).cloned()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c.as_str(), "check_access" | "open" | "query"))
            .collect()
    }

    fn enter(&self, call: &'static str) -> Result<std::sync::MutexGuard<'_, ScmState>, ScmError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_owned());
        // Unprivileged callers can still look services up and read their state.
        if state.access_denied && !matches!(call, "open" | "query") {
            return Err(ScmError::AccessDenied);
        }
        if state.failing.contains(call) {
            return Err(ScmError::Other(io::Error::other(format!("{call} failed"))));
        }
        Ok(state)
    }
}

impl ServiceControl for FakeScm {
    fn check_access(&self) -> Result<(), ScmError> {
        self.enter("check_access").map(|_| ())
    }

    fn open(&self, name: &str) -> Result<(), ScmError> {
        let state = self.enter("open")?;
        if state.services.contains_key(name) {
            Ok(())
        } else {
            Err(ScmError::DoesNotExist)
        }
    }

    fn create(&self, definition: &ServiceDefinition) -> Result<(), ScmError> {
        let mut state = self.enter("create")?;
        state.services.insert(
            definition.name.clone(),
            FakeService {
                definition: definition.clone(),
                description: String::new(),
                recovery: None,
                state: State::Stopped,
            },
        );
        Ok(())
    }

    fn set_description(&self, name: &str, description: &str) -> Result<(), ScmError> {
        let mut state = self.enter("set_description")?;
        let service = state.services.get_mut(name).ok_or(ScmError::DoesNotExist)?;
        service.description = description.to_owned();
        Ok(())
    }

    fn set_recovery(&self, name: &str, policy: &RecoveryPolicy) -> Result<(), ScmError> {
        let mut state = self.enter("set_recovery")?;
        let service = state.services.get_mut(name).ok_or(ScmError::DoesNotExist)?;
        service.recovery = Some(policy.clone());
        Ok(())
    }

    fn query(&self, name: &str) -> Result<State, ScmError> {
        let mut guard = self.enter("query")?;
        let state = &mut *guard;
        let service = state.services.get_mut(name).ok_or(ScmError::DoesNotExist)?;
        if service.state == State::StopPending {
            match state.stop_pending_polls {
                Some(0) => service.state = State::Stopped,
                Some(polls) => state.stop_pending_polls = Some(polls - 1),
                None => {}
            }
        }
        Ok(service.state)
    }

    fn start(&self, name: &str) -> Result<(), ScmError> {
        let mut state = self.enter("start")?;
        let service = state.services.get_mut(name).ok_or(ScmError::DoesNotExist)?;
        service.state = State::Running;
        Ok(())
    }

    fn stop(&self, name: &str) -> Result<State, ScmError> {
        let mut state = self.enter("stop")?;
        let service = state.services.get_mut(name).ok_or(ScmError::DoesNotExist)?;
        service.state = State::StopPending;
        Ok(State::StopPending)
    }

    fn delete(&self, name: &str) -> Result<(), ScmError> {
        let mut state = self.enter("delete")?;
        state
            .services
            .remove(name)
            .map(|_| ())
            .ok_or(ScmError::DoesNotExist)
    }

    fn wait_to_kill_timeout(&self) -> Option<String> {
        self.state.lock().unwrap().wait_to_kill.clone()
    }
}
