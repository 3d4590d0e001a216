//! Mode button
//!
//! A single push button cycles the car through its modes:
//! standby, trace, obstacle avoidance, remote control and back to standby.
//! Presses closer together than the debounce window are ignored.

use embassy_time::{Duration, Instant};

use crate::system::state::{CarStatus, RobotStatus};
use crate::log_debug;

/// Minimum time between two accepted presses
pub const DEBOUNCE: Duration = Duration::from_millis(200);

/// Debounced mode-cycle button
pub struct ModeButton {
    debounce: Duration,
    last_press: Option<Instant>,
}

impl ModeButton {
    pub const fn new() -> Self {
        Self::with_debounce(DEBOUNCE)
    }

    pub const fn with_debounce(debounce: Duration) -> Self {
        Self {
            debounce,
            last_press: None,
        }
    }

    /// Handles a press at `now`
    ///
    /// Returns the newly requested status, or `None` when the press fell into
    /// the debounce window.
    pub fn press(&mut self, robot: &RobotStatus, now: Instant) -> Option<CarStatus> {
        if let Some(last) = self.last_press {
            if now.saturating_duration_since(last) < self.debounce {
                log_debug!("button bounce ignored");
                return None;
            }
        }
        self.last_press = Some(now);

        let next = robot.status().next();
        robot.set_status(next);
        Some(next)
    }
}

impl Default for ModeButton {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presses_cycle_through_modes() {
        let robot = RobotStatus::new();
        let mut button = ModeButton::new();
        let mut now = Instant::from_millis(1_000);

        let mut seen = std::vec::Vec::new();
        for _ in 0..4 {
            seen.push(button.press(&robot, now));
            now += Duration::from_millis(250);
        }
        assert_eq!(
            seen,
            [
                Some(CarStatus::Trace),
                Some(CarStatus::ObstacleAvoidance),
                Some(CarStatus::WifiControl),
                Some(CarStatus::Stop)
            ]
        );
        assert_eq!(robot.status(), CarStatus::Stop);
    }

    #[test]
    fn bounces_are_ignored() {
        let robot = RobotStatus::new();
        let mut button = ModeButton::new();
        let start = Instant::from_millis(5_000);

        assert_eq!(button.press(&robot, start), Some(CarStatus::Trace));
        assert_eq!(button.press(&robot, start + Duration::from_millis(50)), None);
        assert_eq!(button.press(&robot, start + Duration::from_millis(199)), None);
        assert_eq!(robot.status(), CarStatus::Trace);

        assert_eq!(
            button.press(&robot, start + Duration::from_millis(200)),
            Some(CarStatus::ObstacleAvoidance)
        );
    }
}
