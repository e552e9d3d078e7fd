use std::io;

/// Failures a caller can react to without inspecting host-specific details.
///
/// Anything the host rejects outside of these precondition checks is passed through
/// untouched as [`Error::System`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("service is already installed")]
    AlreadyInstalled,
    #[error("service is not installed")]
    NotInstalled,
    #[error("insufficient privileges")]
    InsufficientPrivileges,
    #[error("unsupported system")]
    UnsupportedSystem,
    #[error("invalid system response")]
    InvalidSystemResponse,
    #[error("service is already running")]
    AlreadyRunning,
    #[error("service has already been stopped")]
    AlreadyStopped,
    #[error(transparent)]
    System(#[from] io::Error),
}

impl Error {
    pub fn system(message: impl Into<String>) -> Self {
        Error::System(io::Error::other(message.into()))
    }

    /// True for the closed set of precondition kinds, false for opaque host failures.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, Error::System(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
