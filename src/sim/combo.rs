//! Combo tracking
//!
//! Two clocks drive the combo. The streak window is measured on the session
//! clock in milliseconds; the display timer counts ticks. A merge inside the
//! window extends the streak, a merge outside it restarts at 1, and the tick
//! timer running out drops the streak to 0.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboTracker {
    pub count: u32,
    pub multiplier: u32,
    pub timer_ticks: u32,
    pub last_merge_ms: Option<f64>,
    window_ms: f64,
    timer_budget: u32,
    max_multiplier: u32,
}

impl ComboTracker {
    pub fn new(window_ms: f32, timer_budget: u32, max_multiplier: u32) -> Self {
        Self {
            count: 0,
            multiplier: 1,
            timer_ticks: 0,
            last_merge_ms: None,
            window_ms: window_ms as f64,
            timer_budget,
            max_multiplier: max_multiplier.max(1),
        }
    }

    /// Record a merge at `now_ms` and return the multiplier it earns
    pub fn register_merge(&mut self, now_ms: f64) -> u32 {
        let within_window = self
            .last_merge_ms
            .is_some_and(|last| now_ms - last < self.window_ms);

        self.count = if within_window { self.count + 1 } else { 1 };
        self.multiplier = self.count.clamp(1, self.max_multiplier);
        self.timer_ticks = self.timer_budget;
        self.last_merge_ms = Some(now_ms);
        self.multiplier
    }

    /// Count down the display timer. Returns true on the tick the streak expires.
    pub fn tick(&mut self) -> bool {
        if self.timer_ticks == 0 {
            return false;
        }
        self.timer_ticks -= 1;
        if self.timer_ticks == 0 {
            self.count = 0;
            self.multiplier = 1;
            return true;
        }
        false
    }

    /// Remaining timer as a fraction of the full budget
    pub fn timer_fraction(&self) -> f32 {
        if self.timer_budget == 0 {
            return 0.0;
        }
        self.timer_ticks as f32 / self.timer_budget as f32
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.multiplier = 1;
        self.timer_ticks = 0;
        self.last_merge_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ComboTracker {
        ComboTracker::new(3000.0, 180, 5)
    }

    #[test]
    fn test_first_merge_starts_at_one() {
        let mut combo = tracker();
        assert_eq!(combo.register_merge(0.0), 1);
        assert_eq!(combo.count, 1);
        assert_eq!(combo.timer_ticks, 180);
    }

    #[test]
    fn test_chain_within_window() {
        let mut combo = tracker();
        let multipliers: Vec<u32> = [0.0, 1000.0, 2500.0]
            .iter()
            .map(|&t| combo.register_merge(t))
            .collect();
        assert_eq!(multipliers, vec![1, 2, 3]);
    }

    #[test]
    fn test_multiplier_caps() {
        let mut combo = tracker();
        for i in 0..8 {
            combo.register_merge(i as f64 * 100.0);
        }
        assert_eq!(combo.count, 8);
        assert_eq!(combo.multiplier, 5);
    }

    #[test]
    fn test_late_merge_restarts_at_one() {
        let mut combo = tracker();
        combo.register_merge(0.0);
        combo.register_merge(2000.0);
        assert_eq!(combo.count, 2);

        // 3000ms after the previous merge is outside the window
        assert_eq!(combo.register_merge(5000.0), 1);
        assert_eq!(combo.count, 1);
    }

    #[test]
    fn test_timer_expiry_resets_on_exact_tick() {
        let mut combo = tracker();
        combo.register_merge(0.0);
        combo.register_merge(10.0);

        for _ in 0..179 {
            assert!(!combo.tick());
        }
        assert_eq!(combo.count, 2, "not before the timer reaches zero");
        assert_eq!(combo.multiplier, 2);

        assert!(combo.tick());
        assert_eq!(combo.count, 0);
        assert_eq!(combo.multiplier, 1);

        // Idle ticks after expiry do nothing
        assert!(!combo.tick());
    }

    #[test]
    fn test_merge_refreshes_timer() {
        let mut combo = tracker();
        combo.register_merge(0.0);
        for _ in 0..100 {
            combo.tick();
        }
        combo.register_merge(1700.0);
        assert_eq!(combo.timer_ticks, 180);
        assert!((combo.timer_fraction() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_merge_after_expiry_within_window_continues_from_zero() {
        let mut combo = ComboTracker::new(3000.0, 2, 5);
        combo.register_merge(0.0);
        combo.tick();
        combo.tick();
        assert_eq!(combo.count, 0);
        // Wall clock still inside the window: streak restarts from the expired count
        assert_eq!(combo.register_merge(500.0), 1);
    }
}
