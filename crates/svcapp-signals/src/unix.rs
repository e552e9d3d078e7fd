use std::ffi::c_int;
use std::io;

use futures::stream::StreamExt;
use signal_hook::consts::signal::{SIGINT, SIGQUIT, SIGTERM};
use svcapp_core::Signal;

pub const TERMINATION_SIGNALS: &[c_int] = &[SIGTERM, SIGINT, SIGQUIT];

pub(crate) async fn next_signal(
    signals: &[c_int],
    on_listening: impl FnOnce(),
) -> io::Result<Signal> {
    let signals = signal_hook_tokio::Signals::new(signals)?;
    on_listening();
    let handle = signals.handle();
    let mut signals = signals.fuse();

    let raw = signals
        .next()
        .await
        .ok_or_else(|| io::Error::other("signal stream closed"))?;
    handle.close();

    let name = signal_hook::low_level::signal_name(raw).unwrap_or("unknown");
    Ok(name.into())
}
