use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryAction {
    pub delay: Duration,
}

impl RecoveryAction {
    pub fn restart_after(delay: Duration) -> Self {
        Self { delay }
    }
}

/// Restart-on-failure behaviour the host applies after the service exits abnormally.
///
/// Only written at install time. The host walks `actions` in order for each
/// consecutive failure, repeats the last one, and starts over once `reset_period`
/// has passed without a failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoveryPolicy {
    pub actions: Vec<RecoveryAction>,
    pub reset_period: Duration,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        let short = RecoveryAction::restart_after(Duration::from_secs(5));
        let long = RecoveryAction::restart_after(Duration::from_secs(60));
        Self {
            actions: vec![short, short, short, long],
            reset_period: Duration::from_secs(24 * 60 * 60),
        }
    }
}
