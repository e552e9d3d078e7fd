use serde::{Deserialize, Serialize};

/// Run state of a service as reported by the host service manager.
///
/// The unit-file host only ever reports `NotInstalled`, `Stopped` and `Running`;
/// the pending and paused states are only observable through the control manager.
#[derive(
    strum::Display,
    strum::EnumProperty,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum State {
    #[strum(props(color = "blue"), serialize = "uninstalled")]
    NotInstalled,
    #[strum(props(color = "red"), serialize = "stopped")]
    Stopped,
    #[strum(props(color = "yellow"), serialize = "start pending")]
    StartPending,
    #[strum(props(color = "green"), serialize = "running")]
    Running,
    #[strum(props(color = "yellow"), serialize = "stop pending")]
    StopPending,
    #[strum(props(color = "yellow"), serialize = "continue pending")]
    ContinuePending,
    #[strum(props(color = "yellow"), serialize = "pause pending")]
    PausePending,
    #[strum(props(color = "magenta"), serialize = "paused")]
    Paused,
    #[strum(props(color = "white"), serialize = "unknown")]
    Unknown,
}

impl State {
    /// A service that no longer exists is as stopped as it will ever get.
    pub fn is_stopped(&self) -> bool {
        matches!(self, State::Stopped | State::NotInstalled)
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            State::StartPending | State::StopPending | State::ContinuePending | State::PausePending
        )
    }

    #[cfg(feature = "cli")]
    pub fn pretty_print(&self) -> String {
        use owo_colors::{AnsiColors, OwoColorize};
        use strum::EnumProperty;

        let val = self.to_string();
        let color: AnsiColors = self.get_str("color").unwrap_or("white").into();
        val.color(color).to_string()
    }
}

#[cfg(test)]
#[path = "./state_test.rs"]
mod state_test;
