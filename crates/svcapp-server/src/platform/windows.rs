use std::ffi::OsString;
use std::sync::mpsc;
use std::time::Duration;

use svcapp_core::Signal;
use svcapp_signals::SignalListener;
use tap::TapFallible;
use tracing::{error, info};
use windows_service::service::{
    ServiceControl, ServiceControlAccept, ServiceExitCode, ServiceState, ServiceStatus,
    ServiceType,
};
use windows_service::service_control_handler::{
    self, ServiceControlHandlerResult, ServiceStatusHandle,
};
use windows_service::{define_windows_service, service_dispatcher};

use crate::ServiceError;

define_windows_service!(ffi_service_main, service_main);

/// Win32 error returned by the dispatcher when the process was not started by the
/// service control manager.
const ERROR_FAILED_SERVICE_CONTROLLER_CONNECT: i32 = 1063;

/// Hands the process to the service dispatcher and blocks until the service stops.
///
/// A stop or shutdown control from the service control manager is reported as `SIGTERM`.
/// Launched from a console instead, the process runs in the foreground until a console
/// control event arrives.
pub fn run(name: &str) -> Result<Signal, ServiceError> {
    info!("Starting service dispatcher for {name}");
    match service_dispatcher::start(name, ffi_service_main) {
        Ok(()) => Ok(Signal::SIGTERM),
        Err(e) if started_from_console(&e) => {
            info!("{name} was not started as a service, running in the foreground");
            let signal = SignalListener::termination()
                .wait_blocking(|| info!("Waiting for a console control event"))
                .map_err(ServiceError::SignalFailure)?;
            info!("Stopping {name} after {signal}");
            Ok(signal)
        }
        Err(e) => Err(ServiceError::DispatcherFailure(name.to_owned(), Box::new(e))),
    }
}

fn started_from_console(error: &windows_service::Error) -> bool {
    matches!(
        error,
        windows_service::Error::Winapi(e)
            if e.raw_os_error() == Some(ERROR_FAILED_SERVICE_CONTROLLER_CONNECT)
    )
}

fn service_main(arguments: Vec<OsString>) {
    // The dispatcher passes the service name first.
    let name = arguments
        .first()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Err(e) = run_service(&name) {
        error!("{e}");
    }
}

fn run_service(name: &str) -> Result<(), ServiceError> {
    let (stop_tx, stop_rx) = mpsc::channel();
    let event_handler = move |control_event| match control_event {
        ServiceControl::Interrogate => ServiceControlHandlerResult::NoError,
        ServiceControl::Stop | ServiceControl::Shutdown => {
            info!("Received {control_event:?} from service manager");
            stop_tx
                .send(())
                .tap_err(|e| error!("Error forwarding stop request: {e:?}"))
                .ok();
            ServiceControlHandlerResult::NoError
        }
        _ => ServiceControlHandlerResult::NotImplemented,
    };

    let status_handle = service_control_handler::register(name, event_handler)
        .map_err(|e| ServiceError::RegistrationFailure(name.to_owned(), Box::new(e)))?;

    set_status(
        &status_handle,
        ServiceState::Running,
        ServiceControlAccept::STOP | ServiceControlAccept::SHUTDOWN,
    );
    stop_rx.recv().ok();

    set_status(
        &status_handle,
        ServiceState::StopPending,
        ServiceControlAccept::empty(),
    );
    set_status(
        &status_handle,
        ServiceState::Stopped,
        ServiceControlAccept::empty(),
    );
    Ok(())
}

fn set_status(handle: &ServiceStatusHandle, state: ServiceState, accept: ServiceControlAccept) {
    info!("Setting status to {state:?}");
    handle
        .set_service_status(ServiceStatus {
            service_type: ServiceType::OWN_PROCESS,
            current_state: state,
            controls_accepted: accept,
            exit_code: ServiceExitCode::Win32(0),
            checkpoint: 0,
            wait_hint: Duration::default(),
            process_id: None,
        })
        .tap_err(|e| error!("Error setting status to {state:?}: {e:?}"))
        .ok();
}

#[cfg(test)]
#[path = "./windows_test.rs"]
mod windows_test;
