use std::io;

use svcapp_core::BoxedError;

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("Error waiting for a termination request: {0}")]
    SignalFailure(#[source] io::Error),
    #[error("Error registering the control handler for {0}: {1}")]
    RegistrationFailure(String, #[source] BoxedError),
    #[error("Error starting the service dispatcher for {0}: {1}")]
    DispatcherFailure(String, #[source] BoxedError),
}
