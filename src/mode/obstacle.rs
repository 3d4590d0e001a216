//! Obstacle avoidance
//!
//! Drives forward until the ultrasonic sensor reports something closer than
//! the configured threshold, then runs a fixed escape script:
//!
//! 1. stop, short pause, back off, stop
//! 2. look left and right with the servo and measure both sides
//! 3. turn toward the side with more room, stop
//!
//! A failed measurement reads as 0 cm and is treated as a clear path.

use embassy_time::{Instant, Timer};
use nanorand::{Rng, WyRand};

use crate::mode::{Mode, ModeContext};
use crate::system::config::RobotConfig;
use crate::system::peripherals::{Board, DistanceSensor, MotorDriver, Peripherals};
use crate::system::state::{CarStatus, RobotStatus};
use crate::telemetry;
use crate::{log_debug, log_info};

/// Side picked after a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TurnDirection {
    Left,
    Right,
}

/// Distances measured while looking to each side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanResult {
    pub left_cm: f32,
    pub right_cm: f32,
}

impl ScanResult {
    /// Side with more clearance, `None` when both read the same
    pub fn clearer_side(&self) -> Option<TurnDirection> {
        if self.left_cm > self.right_cm {
            Some(TurnDirection::Left)
        } else if self.right_cm > self.left_cm {
            Some(TurnDirection::Right)
        } else {
            None
        }
    }
}

/// Whether `distance_cm` counts as an obstacle for `threshold_cm`
pub fn is_blocked(distance_cm: f32, threshold_cm: u16) -> bool {
    distance_cm > 0.0 && distance_cm < threshold_cm as f32
}

/// Obstacle avoidance mode
pub struct ObstacleMode {
    config: RobotConfig,
    rng: WyRand,
    last_scan: Option<ScanResult>,
    avoidance_count: u32,
}

impl ObstacleMode {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            config: *config,
            rng: WyRand::new_seed(Instant::now().as_ticks()),
            last_scan: None,
            avoidance_count: 0,
        }
    }

    /// Result of the most recent side scan
    pub fn last_scan(&self) -> Option<ScanResult> {
        self.last_scan
    }

    /// Number of escape scripts run since the mode was created
    pub fn avoidance_count(&self) -> u32 {
        self.avoidance_count
    }

    async fn measure_at<B: Board>(
        &self,
        angle: u8,
        robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
    ) -> f32 {
        peripherals.point_servo(angle, robot);
        Timer::after(self.config.servo_settle).await;
        Timer::after(self.config.sensor_settle).await;
        let distance = peripherals.sonar.distance_cm();
        robot.update_distance(distance);
        distance
    }

    async fn scan<B: Board>(
        &self,
        robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
    ) -> ScanResult {
        let left_cm = self.measure_at(self.config.scan_left_angle, robot, peripherals).await;
        let right_cm = self.measure_at(self.config.scan_right_angle, robot, peripherals).await;
        peripherals.point_servo(self.config.servo_center, robot);
        Timer::after(self.config.servo_settle).await;
        ScanResult { left_cm, right_cm }
    }

    async fn avoid<B: Board>(&mut self, robot: &RobotStatus, peripherals: &mut Peripherals<B>) {
        let motor = &mut peripherals.motor;
        motor.stop();
        Timer::after(self.config.pre_backward_pause).await;
        motor.backward();
        Timer::after(self.config.backward_time).await;
        motor.stop();

        let scan = self.scan(robot, peripherals).await;
        let direction = match scan.clearer_side() {
            Some(direction) => direction,
            None if self.rng.generate::<bool>() => TurnDirection::Left,
            None => TurnDirection::Right,
        };
        log_info!(
            "scan left {} cm, right {} cm, turning {}",
            scan.left_cm,
            scan.right_cm,
            match direction {
                TurnDirection::Left => "left",
                TurnDirection::Right => "right",
            }
        );

        let motor = &mut peripherals.motor;
        match direction {
            TurnDirection::Left => motor.left(),
            TurnDirection::Right => motor.right(),
        }
        Timer::after(self.config.turn_time).await;
        motor.stop();

        self.last_scan = Some(scan);
        self.avoidance_count += 1;
    }
}

impl<B: Board> Mode<B> for ObstacleMode {
    fn status(&self) -> CarStatus {
        CarStatus::ObstacleAvoidance
    }

    async fn enter(
        &mut self,
        robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
        _ctx: &mut ModeContext,
    ) {
        peripherals.point_servo(self.config.servo_center, robot);
        Timer::after(self.config.servo_settle).await;
        log_info!("obstacle mode on, threshold {} cm", self.config.obstacle_threshold_cm);
    }

    async fn tick(
        &mut self,
        robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
        ctx: &mut ModeContext,
    ) {
        let distance = peripherals.sonar.distance_cm();
        robot.update_distance(distance);

        if is_blocked(distance, self.config.obstacle_threshold_cm) {
            log_debug!("obstacle at {} cm", distance);
            self.avoid(robot, peripherals).await;
        } else {
            peripherals.motor.forward();
        }

        if ctx.telemetry_due(Instant::now()) {
            telemetry::send_line(&mut peripherals.link, telemetry::obstacle_line(distance));
        }
    }

    async fn exit(
        &mut self,
        robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
        _ctx: &mut ModeContext,
    ) {
        peripherals.motor.stop();
        peripherals.point_servo(self.config.servo_center, robot);
        log_info!("obstacle mode off");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundary() {
        assert!(is_blocked(18.0, 20));
        assert!(is_blocked(19.99, 20));
        assert!(!is_blocked(20.0, 20));
        assert!(!is_blocked(25.0, 20));
    }

    #[test]
    fn failed_reading_counts_as_clear() {
        assert!(!is_blocked(0.0, 20));
        assert!(!is_blocked(-1.0, 20));
    }

    #[test]
    fn clearer_side() {
        let left = ScanResult {
            left_cm: 80.0,
            right_cm: 12.0,
        };
        let right = ScanResult {
            left_cm: 0.0,
            right_cm: 5.0,
        };
        let tie = ScanResult {
            left_cm: 30.0,
            right_cm: 30.0,
        };
        assert_eq!(left.clearer_side(), Some(TurnDirection::Left));
        assert_eq!(right.clearer_side(), Some(TurnDirection::Right));
        assert_eq!(tie.clearer_side(), None);
    }
}
