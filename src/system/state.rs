//! Robot State Management
//!
//! Holds the car's current operating mode together with the latest sensor and
//! actuator snapshot.
//!
//! # State Components
//! - Operating mode: which behaviour is active (standby, trace, obstacle, remote)
//! - Servo angle: last commanded angle of the ultrasonic sweep servo
//! - Distance: last ultrasonic reading in centimeters
//! - Line sensors: last left/middle/right infrared readings
//!
//! All components live behind one blocking mutex, so a copy taken with
//! [`RobotStatus::state_copy`] is always consistent across fields. The mode is
//! only changed through [`RobotStatus::set_status`], which also requests a UI
//! refresh.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::log_info;

/// Operating modes of the car
///
/// The discriminant is the value used by remote mode switch commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CarStatus {
    /// Standby: motors stopped, network status on the display
    Stop = 0,
    /// Follow a black line with the infrared array
    Trace = 1,
    /// Drive forward and steer around obstacles using the ultrasonic sensor
    ObstacleAvoidance = 2,
    /// Drive from commands received over the network
    WifiControl = 3,
    /// Bluetooth control, no implementation on this car
    BtControl = 4,
}

impl CarStatus {
    /// Converts a wire value into a status, rejecting unknown values
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Stop),
            1 => Some(Self::Trace),
            2 => Some(Self::ObstacleAvoidance),
            3 => Some(Self::WifiControl),
            4 => Some(Self::BtControl),
            _ => None,
        }
    }

    /// Next mode in the button cycle: Stop, Trace, Obstacle, Remote, back to Stop
    pub fn next(self) -> Self {
        match self {
            Self::Stop => Self::Trace,
            Self::Trace => Self::ObstacleAvoidance,
            Self::ObstacleAvoidance => Self::WifiControl,
            Self::WifiControl | Self::BtControl => Self::Stop,
        }
    }

    /// Short name used in logs and telemetry
    pub fn name(self) -> &'static str {
        match self {
            Self::Stop => "standby",
            Self::Trace => "trace",
            Self::ObstacleAvoidance => "obstacle",
            Self::WifiControl => "remote",
            Self::BtControl => "bluetooth",
        }
    }
}

/// Reading of one infrared line sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineReading {
    /// Sensor is above the black line
    OnBlack,
    /// Sensor is above the white floor
    #[default]
    OnWhite,
}

impl LineReading {
    pub fn is_black(self) -> bool {
        self == Self::OnBlack
    }

    /// Telemetry encoding: 0 for black, 1 for white
    pub fn as_level(self) -> u8 {
        match self {
            Self::OnBlack => 0,
            Self::OnWhite => 1,
        }
    }
}

/// Snapshot of the car's latest known values
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RobotState {
    /// Current operating mode
    pub mode: CarStatus,
    /// Servo angle in degrees (0-180)
    pub servo_angle: u8,
    /// Last ultrasonic distance in centimeters, 0 when the reading failed
    pub distance: f32,
    pub ir_left: LineReading,
    pub ir_middle: LineReading,
    pub ir_right: LineReading,
}

impl RobotState {
    pub const fn new() -> Self {
        Self {
            mode: CarStatus::Stop,
            servo_angle: 90,
            distance: 0.0,
            ir_left: LineReading::OnWhite,
            ir_middle: LineReading::OnWhite,
            ir_right: LineReading::OnWhite,
        }
    }
}

impl Default for RobotState {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared robot status
///
/// Constructed once and handed out by reference. Firmware keeps it in a
/// `static`; tests create one per case.
pub struct RobotStatus {
    state: Mutex<CriticalSectionRawMutex, RefCell<RobotState>>,
    ui_refresh: Signal<CriticalSectionRawMutex, CarStatus>,
}

impl RobotStatus {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(RobotState::new())),
            ui_refresh: Signal::new(),
        }
    }

    /// Current operating mode
    pub fn status(&self) -> CarStatus {
        self.state.lock(|state| state.borrow().mode)
    }

    /// Switches the operating mode
    ///
    /// Returns `true` when the mode changed. Setting the current mode again
    /// leaves everything untouched.
    pub fn set_status(&self, new_status: CarStatus) -> bool {
        let previous = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            let previous = state.mode;
            state.mode = new_status;
            previous
        });

        if previous == new_status {
            return false;
        }

        log_info!("mode change: {} -> {}", previous.name(), new_status.name());
        self.ui_refresh.signal(new_status);
        true
    }

    pub fn update_servo_angle(&self, angle: u8) {
        self.state.lock(|state| state.borrow_mut().servo_angle = angle);
    }

    pub fn update_distance(&self, distance: f32) {
        self.state.lock(|state| state.borrow_mut().distance = distance);
    }

    pub fn update_ir_status(&self, left: LineReading, middle: LineReading, right: LineReading) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.ir_left = left;
            state.ir_middle = middle;
            state.ir_right = right;
        });
    }

    /// Consistent copy of the whole snapshot
    pub fn state_copy(&self) -> RobotState {
        self.state.lock(|state| *state.borrow())
    }

    /// Takes a pending UI refresh request, if any
    pub fn take_ui_refresh(&self) -> Option<CarStatus> {
        self.ui_refresh.try_take()
    }

    /// Requests a UI refresh for the current mode
    pub fn request_ui_refresh(&self) {
        self.ui_refresh.signal(self.status());
    }
}

impl Default for RobotStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_standby() {
        let robot = RobotStatus::new();
        assert_eq!(robot.status(), CarStatus::Stop);
        assert_eq!(robot.state_copy(), RobotState::new());
        assert_eq!(robot.take_ui_refresh(), None);
    }

    #[test]
    fn set_status_is_idempotent() {
        let robot = RobotStatus::new();
        assert!(robot.set_status(CarStatus::Trace));
        assert_eq!(robot.take_ui_refresh(), Some(CarStatus::Trace));

        assert!(!robot.set_status(CarStatus::Trace));
        assert_eq!(robot.take_ui_refresh(), None);
        assert_eq!(robot.state_copy().mode, CarStatus::Trace);
    }

    #[test]
    fn ui_refresh_keeps_latest_mode() {
        let robot = RobotStatus::new();
        robot.set_status(CarStatus::Trace);
        robot.set_status(CarStatus::WifiControl);
        assert_eq!(robot.take_ui_refresh(), Some(CarStatus::WifiControl));
        assert_eq!(robot.take_ui_refresh(), None);
    }

    #[test]
    fn setters_write_their_fields() {
        let robot = RobotStatus::new();
        robot.update_servo_angle(150);
        robot.update_distance(42.5);
        robot.update_ir_status(LineReading::OnBlack, LineReading::OnWhite, LineReading::OnBlack);

        let state = robot.state_copy();
        assert_eq!(state.servo_angle, 150);
        assert_eq!(state.distance, 42.5);
        assert_eq!(state.ir_left, LineReading::OnBlack);
        assert_eq!(state.ir_middle, LineReading::OnWhite);
        assert_eq!(state.ir_right, LineReading::OnBlack);
    }

    #[test]
    fn status_wire_values() {
        for value in 0..=4u8 {
            let status = CarStatus::from_u8(value).unwrap();
            assert_eq!(status as u8, value);
        }
        assert_eq!(CarStatus::from_u8(5), None);
        assert_eq!(CarStatus::from_u8(0xFF), None);
    }

    #[test]
    fn button_cycle_skips_bluetooth() {
        let mut status = CarStatus::Stop;
        let mut seen = [CarStatus::Stop; 4];
        for slot in seen.iter_mut() {
            status = status.next();
            *slot = status;
        }
        assert_eq!(
            seen,
            [
                CarStatus::Trace,
                CarStatus::ObstacleAvoidance,
                CarStatus::WifiControl,
                CarStatus::Stop
            ]
        );
        assert_eq!(CarStatus::BtControl.next(), CarStatus::Stop);
    }
}
