use std::io;

use svcapp_core::Signal;
use tap::TapFallible;
use tokio::sync::oneshot;
use tracing::{info, warn};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix::next_signal;
#[cfg(unix)]
pub use unix::TERMINATION_SIGNALS;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows::next_signal;

/// Waits for a termination request and hands it to at most one subscriber.
///
/// Handlers are registered when waiting starts, so the listener can be created outside
/// of a runtime.
pub struct SignalListener {
    #[cfg(unix)]
    signals: Vec<std::ffi::c_int>,
    tx: Option<oneshot::Sender<Signal>>,
    rx: Option<oneshot::Receiver<Signal>>,
}

impl SignalListener {
    #[cfg(unix)]
    pub fn termination() -> Self {
        Self::with_signals(TERMINATION_SIGNALS)
    }

    #[cfg(windows)]
    pub fn termination() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            tx: Some(tx),
            rx: Some(rx),
        }
    }

    /// Listens for an arbitrary set of signal numbers instead of the termination set.
    #[cfg(unix)]
    pub fn with_signals(signals: &[std::ffi::c_int]) -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            signals: signals.to_vec(),
            tx: Some(tx),
            rx: Some(rx),
        }
    }

    /// Returns `None` once the receiver has already been handed out.
    pub fn subscribe(&mut self) -> Option<oneshot::Receiver<Signal>> {
        self.rx.take()
    }

    pub async fn wait(self) -> io::Result<Signal> {
        self.wait_with(|| {}).await
    }

    /// Like [`wait`](Self::wait), but calls `on_listening` as soon as the handlers are
    /// registered. Signals raised after that point are never lost.
    pub async fn wait_with(mut self, on_listening: impl FnOnce()) -> io::Result<Signal> {
        #[cfg(unix)]
        let signal = next_signal(&self.signals, on_listening).await?;
        #[cfg(windows)]
        let signal = next_signal(on_listening).await?;
        info!("Received {signal}");

        if let Some(tx) = self.tx.take() {
            tx.send(signal.clone())
                .tap_err(|_| warn!("Signal subscriber went away before {signal} arrived"))
                .ok();
        }
        Ok(signal)
    }

    /// Runs [`wait_with`](Self::wait_with) on a dedicated current-thread runtime.
    pub fn wait_blocking(self, on_listening: impl FnOnce()) -> io::Result<Signal> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(self.wait_with(on_listening))
    }
}
