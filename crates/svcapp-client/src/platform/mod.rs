mod systemd;
pub use systemd::*;
mod windows;
pub use self::windows::*;

use svcapp_core::Result;

use crate::{Builder, Manager};

pub fn builder() -> Builder {
    Builder::new()
}

pub(crate) fn get_manager(builder: Builder) -> Result<Box<dyn Manager>> {
    #[cfg(target_os = "linux")]
    return Ok(Box::new(SystemdServiceManager::from_builder(builder)));
    #[cfg(windows)]
    return Ok(Box::new(WindowsServiceManager::from_builder(
        builder,
        WindowsServiceApi,
    )));
    #[cfg(not(any(target_os = "linux", windows)))]
    {
        let _ = builder;
        Err(svcapp_core::Error::UnsupportedSystem)
    }
}
