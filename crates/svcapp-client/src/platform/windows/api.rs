use std::ffi::OsString;
use std::io;

use registry::{Data, Hive, Security};
use svcapp_core::{RecoveryPolicy, State};
use tracing::debug;
use windows_service::service::{
    Service, ServiceAccess, ServiceAction, ServiceActionType, ServiceErrorControl,
    ServiceFailureActions, ServiceFailureResetPeriod, ServiceInfo, ServiceStartType,
    ServiceState, ServiceType,
};
use windows_service::service_manager::{ServiceManager, ServiceManagerAccess};

use super::{ScmError, ServiceControl, ServiceDefinition};

const ERROR_ACCESS_DENIED: i32 = 5;
const ERROR_SERVICE_DOES_NOT_EXIST: i32 = 1060;
const CONTROL_KEY: &str = r"SYSTEM\CurrentControlSet\Control";
const WAIT_TO_KILL_VALUE: &str = "WaitToKillServiceTimeout";

/// Talks to the local service control manager through `windows-service`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowsServiceApi;

impl WindowsServiceApi {
    fn manager(&self, access: ServiceManagerAccess) -> Result<ServiceManager, ScmError> {
        ServiceManager::local_computer(None::<&str>, access).map_err(scm_error)
    }

    fn service(&self, name: &str, access: ServiceAccess) -> Result<Service, ScmError> {
        self.manager(ServiceManagerAccess::CONNECT)?
            .open_service(name, access)
            .map_err(scm_error)
    }
}

fn scm_error(error: windows_service::Error) -> ScmError {
    match error {
        windows_service::Error::Winapi(e) => match e.raw_os_error() {
            Some(ERROR_SERVICE_DOES_NOT_EXIST) => ScmError::DoesNotExist,
            Some(ERROR_ACCESS_DENIED) => ScmError::AccessDenied,
            _ => ScmError::Other(e),
        },
        e => ScmError::Other(io::Error::other(e)),
    }
}

fn map_state(state: ServiceState) -> State {
    match state {
        ServiceState::Stopped => State::Stopped,
        ServiceState::StartPending => State::StartPending,
        ServiceState::StopPending => State::StopPending,
        ServiceState::Running => State::Running,
        ServiceState::ContinuePending => State::ContinuePending,
        ServiceState::PausePending => State::PausePending,
        ServiceState::Paused => State::Paused,
    }
}

impl ServiceControl for WindowsServiceApi {
    fn check_access(&self) -> Result<(), ScmError> {
        self.manager(ServiceManagerAccess::CONNECT | ServiceManagerAccess::CREATE_SERVICE)
            .map(|_| ())
    }

    fn open(&self, name: &str) -> Result<(), ScmError> {
        self.service(name, ServiceAccess::QUERY_STATUS).map(|_| ())
    }

    fn create(&self, definition: &ServiceDefinition) -> Result<(), ScmError> {
        let info = ServiceInfo {
            name: OsString::from(&definition.name),
            display_name: OsString::from(&definition.display_name),
            service_type: ServiceType::OWN_PROCESS,
            start_type: if definition.autostart {
                ServiceStartType::AutoStart
            } else {
                ServiceStartType::OnDemand
            },
            error_control: ServiceErrorControl::Normal,
            executable_path: (&definition.executable).into(),
            launch_arguments: definition.arguments.iter().map(OsString::from).collect(),
            dependencies: vec![],
            account_name: None,
            account_password: None,
        };
        self.manager(ServiceManagerAccess::CONNECT | ServiceManagerAccess::CREATE_SERVICE)?
            .create_service(&info, ServiceAccess::QUERY_STATUS)
            .map(|_| ())
            .map_err(scm_error)
    }

    fn set_description(&self, name: &str, description: &str) -> Result<(), ScmError> {
        self.service(name, ServiceAccess::CHANGE_CONFIG)?
            .set_description(description)
            .map_err(scm_error)
    }

    fn set_recovery(&self, name: &str, policy: &RecoveryPolicy) -> Result<(), ScmError> {
        let actions = policy
            .actions
            .iter()
            .map(|action| ServiceAction {
                action_type: ServiceActionType::Restart,
                delay: action.delay,
            })
            .collect();
        // Restart actions need START on top of CHANGE_CONFIG.
        self.service(name, ServiceAccess::CHANGE_CONFIG | ServiceAccess::START)?
            .update_failure_actions(ServiceFailureActions {
                reset_period: ServiceFailureResetPeriod::After(policy.reset_period),
                reboot_msg: None,
                command: None,
                actions: Some(actions),
            })
            .map_err(scm_error)
    }

    fn query(&self, name: &str) -> Result<State, ScmError> {
        match self.service(name, ServiceAccess::QUERY_STATUS)?.query_status() {
            Ok(status) => Ok(map_state(status.current_state)),
            Err(windows_service::Error::ParseValue(..)) => Ok(State::Unknown),
            Err(e) => Err(scm_error(e)),
        }
    }

    fn start(&self, name: &str) -> Result<(), ScmError> {
        self.service(name, ServiceAccess::START)?
            .start::<String>(&[])
            .map_err(scm_error)
    }

    fn stop(&self, name: &str) -> Result<State, ScmError> {
        match self.service(name, ServiceAccess::STOP)?.stop() {
            Ok(status) => Ok(map_state(status.current_state)),
            Err(windows_service::Error::ParseValue(..)) => Ok(State::Unknown),
            Err(e) => Err(scm_error(e)),
        }
    }

    fn delete(&self, name: &str) -> Result<(), ScmError> {
        self.service(name, ServiceAccess::DELETE)?
            .delete()
            .map_err(scm_error)
    }

    fn wait_to_kill_timeout(&self) -> Option<String> {
        let key = Hive::LocalMachine
            .open(CONTROL_KEY, Security::Read)
            .map_err(|e| debug!("Unable to open {CONTROL_KEY}: {e}"))
            .ok()?;
        match key.value(WAIT_TO_KILL_VALUE) {
            Ok(Data::String(value)) => Some(value.to_string_lossy()),
            Ok(other) => {
                debug!("Unexpected {WAIT_TO_KILL_VALUE} value: {other}");
                None
            }
            Err(e) => {
                debug!("Unable to read {WAIT_TO_KILL_VALUE}: {e}");
                None
            }
        }
    }
}
