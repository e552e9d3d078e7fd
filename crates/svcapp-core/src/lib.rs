mod error;
pub use error::*;

mod install_params;
pub use install_params::*;

mod recovery;
pub use recovery::*;

mod signal;
pub use signal::*;

mod state;
pub use state::*;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;
