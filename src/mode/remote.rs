//! Remote control
//!
//! Applies drive commands from the remote command cell. Commands are
//! last-writer-wins; when none has arrived for `remote_timeout` the car is
//! stopped and the servo centered until the next command.

use embassy_time::Instant;

use crate::mode::{Mode, ModeContext};
use crate::system::config::{RobotConfig, SERVO_MAX_ANGLE};
use crate::system::peripherals::{Board, MotorDriver, Peripherals};
use crate::system::remote_command::{CommandSource, RemoteCommand};
use crate::system::state::{CarStatus, RobotStatus};
use crate::telemetry;
use crate::{log_info, log_warn};

/// Maps a servo deflection (-100..=100) around `center` onto 0..=180 degrees
pub fn servo_angle(center: u8, deflection: i8) -> u8 {
    let deflection = (deflection as i32).clamp(-100, 100);
    let angle = center as i32 + deflection * 90 / 100;
    angle.clamp(0, SERVO_MAX_ANGLE as i32) as u8
}

/// Remote control mode
pub struct RemoteMode {
    config: RobotConfig,
    last_command_time: Instant,
    last_command: RemoteCommand,
    failsafe_engaged: bool,
}

impl RemoteMode {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            config: *config,
            last_command_time: Instant::now(),
            last_command: RemoteCommand::STOP,
            failsafe_engaged: false,
        }
    }

    /// Whether the car is currently held stopped for lack of commands
    pub fn failsafe_engaged(&self) -> bool {
        self.failsafe_engaged
    }

    pub fn last_command(&self) -> RemoteCommand {
        self.last_command
    }

    fn apply<B: Board>(
        &mut self,
        command: RemoteCommand,
        robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
    ) {
        peripherals
            .motor
            .set_differential(command.motor1, command.motor2);
        peripherals.point_servo(servo_angle(self.config.servo_center, command.servo), robot);
        self.last_command = command;
    }
}

impl<B: Board> Mode<B> for RemoteMode {
    fn status(&self) -> CarStatus {
        CarStatus::WifiControl
    }

    async fn enter(
        &mut self,
        _robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
        _ctx: &mut ModeContext,
    ) {
        peripherals.motor.stop();
        self.last_command_time = Instant::now();
        self.last_command = RemoteCommand::STOP;
        self.failsafe_engaged = false;
        log_info!("remote mode on, waiting for commands");
    }

    async fn tick(
        &mut self,
        robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
        ctx: &mut ModeContext,
    ) {
        let now = Instant::now();

        if let Some(command) = peripherals.commands.pop_command() {
            if self.failsafe_engaged {
                log_info!("remote commands resumed");
                self.failsafe_engaged = false;
            }
            self.apply(command, robot, peripherals);
            self.last_command_time = now;
        } else if !self.failsafe_engaged
            && now.saturating_duration_since(self.last_command_time) > self.config.remote_timeout
        {
            log_warn!(
                "no remote command for {} ms, stopping",
                self.config.remote_timeout.as_millis()
            );
            self.apply(RemoteCommand::STOP, robot, peripherals);
            self.failsafe_engaged = true;
        }

        if ctx.telemetry_due(now) {
            let line = telemetry::remote_line(
                self.last_command.motor1,
                self.last_command.motor2,
                peripherals.servo_angle(),
            );
            telemetry::send_line(&mut peripherals.link, line);
        }
    }

    async fn exit(
        &mut self,
        _robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
        _ctx: &mut ModeContext,
    ) {
        peripherals.motor.stop();
        log_info!("remote mode off");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn servo_mapping() {
        assert_eq!(servo_angle(90, 0), 90);
        assert_eq!(servo_angle(90, 100), 180);
        assert_eq!(servo_angle(90, -100), 0);
        assert_eq!(servo_angle(90, 50), 135);
        assert_eq!(servo_angle(90, -50), 45);
    }

    #[test]
    fn servo_mapping_clamps() {
        assert_eq!(servo_angle(120, 100), 180);
        assert_eq!(servo_angle(60, -100), 0);
        assert_eq!(servo_angle(90, i8::MIN), 0);
    }
}
