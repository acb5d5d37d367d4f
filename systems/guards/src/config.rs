//! Tunables shared by every guard in a level.

use std::time::Duration;

use heist_system_perception::AggroBox;
use serde::{Deserialize, Serialize};

/// Movement speeds, timer lengths and perception range of guards.
///
/// Durations are stored in whole milliseconds so the configuration reads
/// naturally from TOML.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Time between steps while patrolling or returning.
    pub patrol_interval_ms: u64,
    /// Time between steps while chasing the player.
    pub chase_interval_ms: u64,
    /// How long a guard keeps chasing after last seeing the player.
    pub alert_duration_ms: u64,
    /// How long a bribe suppresses perception and capture.
    pub bribe_duration_ms: u64,
    /// Range in which the guard attempts to spot the player.
    pub aggro: AggroBox,
}

impl GuardConfig {
    /// Step interval while patrolling or returning.
    #[must_use]
    pub const fn patrol_interval(&self) -> Duration {
        Duration::from_millis(self.patrol_interval_ms)
    }

    /// Step interval while alerted.
    #[must_use]
    pub const fn chase_interval(&self) -> Duration {
        Duration::from_millis(self.chase_interval_ms)
    }

    /// Length of the alert countdown.
    #[must_use]
    pub const fn alert_duration(&self) -> Duration {
        Duration::from_millis(self.alert_duration_ms)
    }

    /// Length of the bribe overlay.
    #[must_use]
    pub const fn bribe_duration(&self) -> Duration {
        Duration::from_millis(self.bribe_duration_ms)
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            patrol_interval_ms: 150,
            chase_interval_ms: 100,
            alert_duration_ms: 3_000,
            bribe_duration_ms: 750,
            aggro: AggroBox::default(),
        }
    }
}
