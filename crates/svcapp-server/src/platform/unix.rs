use svcapp_core::Signal;
use svcapp_signals::SignalListener;
use tracing::info;

use crate::ServiceError;

/// Runs until a termination signal arrives and returns it.
///
/// Readiness is reported to systemd once the signal handlers are in place, and shutdown
/// once a signal has arrived. Both are no-ops without a notify socket.
pub fn run(name: &str) -> Result<Signal, ServiceError> {
    info!("Running {name}");
    let listener = SignalListener::termination();

    let signal = listener
        .wait_blocking(notify_ready)
        .map_err(ServiceError::SignalFailure)?;

    #[cfg(target_os = "linux")]
    {
        use tap::TapFallible;
        sd_notify::notify(false, &[sd_notify::NotifyState::Stopping])
            .tap_err(|e| tracing::warn!("Error sending stopping notification: {e:?}"))
            .ok();
    }

    info!("Stopping {name} after {signal}");
    Ok(signal)
}

fn notify_ready() {
    info!("Signal handlers registered");
    #[cfg(target_os = "linux")]
    {
        use tap::TapFallible;
        sd_notify::notify(false, &[sd_notify::NotifyState::Ready])
            .tap_err(|e| tracing::error!("Error sending ready notification: {e:?}"))
            .ok();
    }
}

#[cfg(test)]
#[path = "./unix_test.rs"]
mod unix_test;
