//! Brick descent hazard
//!
//! Runs on its own clock, independent of ball movement: every interval the
//! whole brick field drops by one row. If the next drop would put a live
//! brick on the paddle's line the game ends, no matter how many lives are
//! left.

use serde::{Deserialize, Serialize};

use super::bricks::BrickField;
use super::timer::Countdown;

/// What a hazard update did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescentOutcome {
    /// Timer still counting (or not running)
    Idle,
    /// The field moved down one row
    Descended,
    /// A live brick would reach the defense line; hazard is now cancelled
    Breached,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescentHazard {
    timer: Countdown,
    interval_ms: f32,
}

impl DescentHazard {
    /// A hazard that is not yet running
    pub fn new(interval_ms: f32) -> Self {
        Self {
            timer: Countdown::Cancelled,
            interval_ms,
        }
    }

    /// Cancel any pending step and schedule a fresh full interval
    pub fn restart(&mut self) {
        self.timer = Countdown::start(self.interval_ms);
    }

    pub fn pause(&mut self) {
        self.timer.pause();
    }

    pub fn resume(&mut self) {
        self.timer.resume();
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Time until the next step (None when cancelled)
    pub fn remaining_ms(&self) -> Option<f32> {
        self.timer.remaining_ms()
    }

    /// Advance the hazard clock; on expiry either lower the field or report
    /// a breach of `defense_line`.
    pub fn advance(
        &mut self,
        dt_ms: f32,
        field: &mut BrickField,
        defense_line: f32,
    ) -> DescentOutcome {
        if !self.timer.advance(dt_ms) {
            return DescentOutcome::Idle;
        }

        if field.descent_would_breach(defense_line) {
            self.timer.cancel();
            return DescentOutcome::Breached;
        }

        field.descend();
        self.timer = Countdown::start(self.interval_ms);
        DescentOutcome::Descended
    }
}
