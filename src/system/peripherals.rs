//! Hardware collaborator interfaces
//!
//! The mode logic talks to the car only through these traits. Sensor getters
//! return the last sampled value and never block; actuator setters apply the
//! command and clamp out-of-range input themselves.

use crate::system::remote_command::CommandSource;
use crate::system::state::{CarStatus, LineReading, RobotStatus};

/// Drive motors
pub trait MotorDriver {
    fn forward(&mut self);
    fn backward(&mut self);
    fn left(&mut self);
    fn right(&mut self);
    fn stop(&mut self);
    /// Sets left and right motor speeds, each -100..=100
    fn set_differential(&mut self, left: i8, right: i8);
}

/// Steering servo carrying the ultrasonic sensor
pub trait ServoDriver {
    /// Moves to `angle` degrees, clamped to 0..=180
    fn set_angle(&mut self, angle: u8);
    fn angle(&self) -> u8;
}

/// Ultrasonic distance sensor
pub trait DistanceSensor {
    /// Distance in centimeters, 0.0 when the measurement failed
    fn distance_cm(&mut self) -> f32;
}

/// Three-sensor infrared line array
pub trait LineSensors {
    fn left(&mut self) -> LineReading;
    fn middle(&mut self) -> LineReading;
    fn right(&mut self) -> LineReading;
}

/// Status display
pub trait Display {
    /// Shows the static page describing `status`
    fn show_mode_page(&mut self, status: CarStatus);
    /// Shows the standby page with network state
    fn render_standby(&mut self, wifi: &str, ip: &str);
}

/// Text lines of the static page shown for `status`
pub fn mode_page(status: CarStatus) -> [&'static str; 3] {
    match status {
        CarStatus::Stop => ["Mode: Standby", "WiFi: Check...", "Press KEY1"],
        CarStatus::Trace => ["Mode: Trace", "Infrared ON", "KEY1 -> Next"],
        CarStatus::ObstacleAvoidance => ["Mode: Obstacle", "Ultrasonic ON", "KEY1 -> Next"],
        CarStatus::WifiControl => ["Mode: WiFi Ctrl", "Waiting cmd...", "KEY1 -> Stop"],
        CarStatus::BtControl => ["Mode: Bluetooth", "Current: Disabled", "KEY1 -> Stop"],
    }
}

/// Network connection used for status and telemetry
pub trait NetworkLink {
    fn is_connected(&self) -> bool;
    fn ip_address(&self) -> Option<&str>;
    /// Sends one text line, returns `false` when it could not be sent
    fn send_text(&mut self, text: &str) -> bool;
}

/// Set of collaborator types wired into one car
pub trait Board {
    type Motor: MotorDriver;
    type Servo: ServoDriver;
    type Sonar: DistanceSensor;
    type Line: LineSensors;
    type Display: Display;
    type Link: NetworkLink;
    type Commands: CommandSource;
}

/// Collaborator instances of one car
pub struct Peripherals<B: Board> {
    pub motor: B::Motor,
    pub servo: B::Servo,
    pub sonar: B::Sonar,
    pub line: B::Line,
    pub display: B::Display,
    pub link: B::Link,
    pub commands: B::Commands,
}

impl<B: Board> Peripherals<B> {
    /// Moves the servo and records the angle the driver settled on
    pub fn point_servo(&mut self, angle: u8, robot: &RobotStatus) {
        self.servo.set_angle(angle);
        robot.update_servo_angle(self.servo.angle());
    }

    pub fn servo_angle(&self) -> u8 {
        self.servo.angle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_has_a_titled_page() {
        for value in 0..=4 {
            let status = CarStatus::from_u8(value).unwrap();
            assert!(mode_page(status)[0].starts_with("Mode: "));
        }
        assert_eq!(mode_page(CarStatus::WifiControl)[2], "KEY1 -> Stop");
    }
}
