mod platform;
pub use platform::run;

mod service_error;
pub use service_error::*;

pub use svcapp_core::Signal;
