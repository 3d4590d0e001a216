//! Operating modes
//!
//! Every mode implements [`Mode`]: `enter` when it becomes active, `tick`
//! once per scheduling quantum while it stays active and `exit` when the
//! status moves away. Phases a mode does not need keep the default no-op.

use embassy_time::{Duration, Instant, Timer};

use crate::system::config::RobotConfig;
use crate::system::peripherals::{Board, Peripherals};
use crate::system::state::{CarStatus, RobotStatus};
use crate::log_debug;

pub mod obstacle;
pub mod remote;
pub mod standby;
pub mod trace;

pub use obstacle::ObstacleMode;
pub use remote::RemoteMode;
pub use standby::StandbyMode;
pub use trace::TraceMode;

/// Per-activation bookkeeping of a mode
///
/// Created when a mode is entered and dropped when it exits.
#[derive(Debug, Clone, Copy)]
pub struct ModeContext {
    pub enter_time: Instant,
    pub last_telemetry_time: Instant,
    pub is_running: bool,
    pub telemetry_interval: Duration,
}

impl ModeContext {
    pub fn new(now: Instant, telemetry_interval: Duration) -> Self {
        Self {
            enter_time: now,
            last_telemetry_time: now,
            is_running: true,
            telemetry_interval,
        }
    }

    /// Whether the telemetry interval has elapsed at `now`
    pub fn telemetry_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_telemetry_time) >= self.telemetry_interval
    }

    /// Stamps the telemetry time if the interval elapsed
    pub fn stamp_telemetry(&mut self, now: Instant) -> bool {
        if self.telemetry_due(now) {
            self.last_telemetry_time = now;
            true
        } else {
            false
        }
    }

    /// Time spent in the mode so far
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.enter_time)
    }
}

/// Behaviour of one operating mode
pub trait Mode<B: Board> {
    /// Status under which this mode runs
    fn status(&self) -> CarStatus;

    async fn enter(
        &mut self,
        _robot: &RobotStatus,
        _peripherals: &mut Peripherals<B>,
        _ctx: &mut ModeContext,
    ) {
    }

    async fn tick(
        &mut self,
        _robot: &RobotStatus,
        _peripherals: &mut Peripherals<B>,
        _ctx: &mut ModeContext,
    ) {
    }

    async fn exit(
        &mut self,
        _robot: &RobotStatus,
        _peripherals: &mut Peripherals<B>,
        _ctx: &mut ModeContext,
    ) {
    }
}

/// Runs `mode` until the robot status leaves the mode's status
///
/// Enters the mode, ticks it once per `main_loop_period` while the status
/// still matches, then exits it. The status is checked before every tick, so
/// a change is noticed within one quantum.
pub async fn run_mode_loop<B: Board, M: Mode<B>>(
    robot: &RobotStatus,
    mode: &mut M,
    peripherals: &mut Peripherals<B>,
    config: &RobotConfig,
) {
    let expected = mode.status();
    let mut ctx = ModeContext::new(Instant::now(), config.telemetry_interval);
    log_debug!("run loop start: {}", expected.name());

    mode.enter(robot, peripherals, &mut ctx).await;

    while robot.status() == expected {
        mode.tick(robot, peripherals, &mut ctx).await;
        ctx.stamp_telemetry(Instant::now());
        Timer::after(config.main_loop_period).await;
    }

    ctx.is_running = false;
    mode.exit(robot, peripherals, &mut ctx).await;
    log_debug!("run loop end: {}", expected.name());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_has_no_telemetry_due() {
        let start = Instant::from_millis(10_000);
        let ctx = ModeContext::new(start, Duration::from_millis(500));
        assert!(ctx.is_running);
        assert_eq!(ctx.enter_time, start);
        assert!(!ctx.telemetry_due(start + Duration::from_millis(499)));
        assert!(ctx.telemetry_due(start + Duration::from_millis(500)));
    }

    #[test]
    fn stamping_restarts_the_interval() {
        let start = Instant::from_millis(0);
        let mut ctx = ModeContext::new(start, Duration::from_millis(100));

        assert!(!ctx.stamp_telemetry(start + Duration::from_millis(50)));
        assert!(ctx.stamp_telemetry(start + Duration::from_millis(120)));
        assert_eq!(ctx.last_telemetry_time, start + Duration::from_millis(120));
        assert!(!ctx.telemetry_due(start + Duration::from_millis(200)));
        assert_eq!(ctx.elapsed(start + Duration::from_millis(200)), Duration::from_millis(200));
    }
}
