use std::thread;
use std::time::{Duration, Instant};

use svcapp_core::{Result, State};
use tracing::trace;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Used when the host's `WaitToKillServiceTimeout` can't be read.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_millis(20_000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Stopped,
    TimedOut,
}

/// Polls a service after a stop request until it reports a stopped state or the
/// deadline passes.
#[derive(Clone, Debug)]
pub struct StopWaiter {
    interval: Duration,
    timeout: Duration,
}

impl StopWaiter {
    /// The deadline is the host's own stop timeout plus two polling intervals.
    pub fn new(interval: Duration, host_timeout: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            interval,
            timeout: host_timeout + interval * 2,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn wait(
        &self,
        initial: State,
        mut probe: impl FnMut() -> Result<State>,
    ) -> Result<WaitOutcome> {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut next_tick = started + self.interval;
        let mut state = initial;

        while !state.is_stopped() {
            if next_tick >= deadline {
                sleep_until(deadline);
                return Ok(WaitOutcome::TimedOut);
            }
            sleep_until(next_tick);
            next_tick += self.interval;
            state = probe()?;
            trace!("Service state after {:?}: {state}", started.elapsed());
        }
        Ok(WaitOutcome::Stopped)
    }
}

fn sleep_until(instant: Instant) {
    let now = Instant::now();
    if instant > now {
        thread::sleep(instant - now);
    }
}

/// Parses the host's stop timeout, given in milliseconds.
pub fn stop_timeout(raw: Option<&str>, default: Duration) -> Duration {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "./stop_waiter_test.rs"]
mod stop_waiter_test;
