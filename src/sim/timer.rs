//! Frame-driven countdowns
//!
//! Every delayed action in the simulation is one of these, owned by the
//! game state and advanced by the frame loop. Nothing fires asynchronously,
//! so a reset that cancels a countdown is final.

use serde::{Deserialize, Serialize};

/// A one-shot countdown in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Countdown {
    /// Not scheduled
    #[default]
    Cancelled,
    /// Counting down
    Running { remaining_ms: f32 },
    /// Frozen with time left; resumes where it stopped
    Paused { remaining_ms: f32 },
}

impl Countdown {
    pub fn start(duration_ms: f32) -> Self {
        Countdown::Running {
            remaining_ms: duration_ms.max(0.0),
        }
    }

    pub fn cancel(&mut self) {
        *self = Countdown::Cancelled;
    }

    pub fn pause(&mut self) {
        if let Countdown::Running { remaining_ms } = *self {
            *self = Countdown::Paused { remaining_ms };
        }
    }

    pub fn resume(&mut self) {
        if let Countdown::Paused { remaining_ms } = *self {
            *self = Countdown::Running { remaining_ms };
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Countdown::Running { .. })
    }

    /// Running or paused
    pub fn is_pending(&self) -> bool {
        !matches!(self, Countdown::Cancelled)
    }

    pub fn remaining_ms(&self) -> Option<f32> {
        match *self {
            Countdown::Running { remaining_ms } | Countdown::Paused { remaining_ms } => {
                Some(remaining_ms)
            }
            Countdown::Cancelled => None,
        }
    }

    /// Advance by `dt_ms`. Returns true exactly once, on the frame the
    /// countdown reaches zero; it is cancelled afterwards. Paused and
    /// cancelled countdowns never fire.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        if let Countdown::Running { remaining_ms } = self {
            *remaining_ms -= dt_ms;
            if *remaining_ms <= 0.0 {
                *self = Countdown::Cancelled;
                return true;
            }
        }
        false
    }
}
