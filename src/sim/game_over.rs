//! Loss detection
//!
//! An orb is dangerous when its top edge is above the danger line and it is
//! moving slowly vertically, i.e. resting there rather than falling through.
//! Any dangerous orb advances a grace counter; a tick with none resets it to
//! zero outright. Exceeding the grace threshold loses the run.

use serde::{Deserialize, Serialize};

use super::orb::Orb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DangerState {
    Safe,
    Accumulating,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOverMonitor {
    pub counter: u32,
    pub state: DangerState,
    grace_ticks: u32,
}

impl GameOverMonitor {
    pub fn new(grace_ticks: u32) -> Self {
        Self {
            counter: 0,
            state: DangerState::Safe,
            grace_ticks,
        }
    }

    /// True if this orb counts toward the grace counter
    pub fn is_dangerous(orb: &Orb, danger_line: f32, danger_speed: f32) -> bool {
        orb.is_physical() && orb.top() < danger_line && orb.vel.y.abs() < danger_speed
    }

    /// Evaluate one tick. Returns the resulting state.
    pub fn evaluate(&mut self, orbs: &[Orb], danger_line: f32, danger_speed: f32) -> DangerState {
        if self.state == DangerState::Lost {
            return self.state;
        }

        let dangerous = orbs
            .iter()
            .filter(|o| Self::is_dangerous(o, danger_line, danger_speed))
            .count();

        if dangerous == 0 {
            if self.counter > 0 {
                log::debug!("Danger cleared after {} ticks", self.counter);
            }
            self.counter = 0;
            self.state = DangerState::Safe;
            return self.state;
        }

        self.counter += 1;
        log::debug!(
            "Danger: {}/{} ({} slow orbs above line)",
            self.counter,
            self.grace_ticks,
            dangerous
        );

        self.state = if self.counter > self.grace_ticks {
            DangerState::Lost
        } else {
            DangerState::Accumulating
        };
        self.state
    }

    /// Countdown progress for display, 0..=1
    pub fn progress(&self) -> f32 {
        if self.grace_ticks == 0 {
            return if self.counter > 0 { 1.0 } else { 0.0 };
        }
        (self.counter as f32 / self.grace_ticks as f32).min(1.0)
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.state = DangerState::Safe;
    }
}
