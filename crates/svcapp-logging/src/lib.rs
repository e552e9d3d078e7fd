mod logger_builder;
mod logger_guard;

pub use logger_builder::*;
pub use logger_guard::*;
pub use tracing_subscriber;
