use std::io;

use svcapp_core::Signal;
use tokio::signal::windows;

/// Console control events all map to an interrupt.
pub(crate) async fn next_signal(on_listening: impl FnOnce()) -> io::Result<Signal> {
    let mut ctrl_c = windows::ctrl_c()?;
    let mut ctrl_break = windows::ctrl_break()?;
    let mut ctrl_close = windows::ctrl_close()?;
    let mut ctrl_shutdown = windows::ctrl_shutdown()?;
    on_listening();

    tokio::select! {
        _ = ctrl_c.recv() => {}
        _ = ctrl_break.recv() => {}
        _ = ctrl_close.recv() => {}
        _ = ctrl_shutdown.recv() => {}
    }
    Ok(Signal::SIGINT)
}
