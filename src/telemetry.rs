//! Telemetry lines
//!
//! Modes report their inputs as single-line JSON objects, e.g.
//! `{"mode":"trace","left":0,"mid":1,"right":1}`. Lines are built in a
//! fixed-size buffer; a payload that does not fit is dropped rather than
//! sent truncated.

use core::fmt::Write;

use embassy_time::{Duration, Instant};
use heapless::String;

use crate::system::peripherals::NetworkLink;
use crate::system::state::{CarStatus, LineReading, RobotState};

/// Capacity of one telemetry line
pub const LINE_CAPACITY: usize = 128;

pub type TelemetryLine = String<LINE_CAPACITY>;

/// Distance in hundredths of a centimeter, rounded
pub fn distance_x100(distance_cm: f32) -> i32 {
    libm::roundf(distance_cm * 100.0) as i32
}

/// Builds `{"mode":"<mode>",<fields>}` followed by a newline
pub fn mode_line(mode: &str, fields: core::fmt::Arguments<'_>) -> Option<TelemetryLine> {
    let mut line = TelemetryLine::new();
    write!(line, "{{\"mode\":\"{}\",{}}}\n", mode, fields).ok()?;
    Some(line)
}

pub fn trace_line(
    left: LineReading,
    middle: LineReading,
    right: LineReading,
) -> Option<TelemetryLine> {
    mode_line(
        CarStatus::Trace.name(),
        format_args!(
            "\"left\":{},\"mid\":{},\"right\":{}",
            left.as_level(),
            middle.as_level(),
            right.as_level()
        ),
    )
}

pub fn obstacle_line(distance_cm: f32) -> Option<TelemetryLine> {
    mode_line(
        CarStatus::ObstacleAvoidance.name(),
        format_args!("\"dist_x100\":{}", distance_x100(distance_cm)),
    )
}

pub fn remote_line(motor1: i8, motor2: i8, servo_angle: u8) -> Option<TelemetryLine> {
    mode_line(
        CarStatus::WifiControl.name(),
        format_args!("\"m1\":{},\"m2\":{},\"servo\":{}", motor1, motor2, servo_angle),
    )
}

/// Infrared readings packed as bit0 = left, bit1 = middle, bit2 = right (set = black)
pub fn ir_bits(state: &RobotState) -> u8 {
    (state.ir_left.is_black() as u8)
        | (state.ir_middle.is_black() as u8) << 1
        | (state.ir_right.is_black() as u8) << 2
}

/// Full state line published by [`StateReporter`]
pub fn state_line(state: &RobotState) -> Option<TelemetryLine> {
    let mut line = TelemetryLine::new();
    write!(
        line,
        "{{\"type\":\"state\",\"mode\":\"{}\",\"servo\":{},\"dist_x100\":{},\"ir\":{}}}\n",
        state.mode.name(),
        state.servo_angle,
        distance_x100(state.distance),
        ir_bits(state)
    )
    .ok()?;
    Some(line)
}

/// Sends `line` over `link` when present, returns whether it went out
pub fn send_line<L: NetworkLink>(link: &mut L, line: Option<TelemetryLine>) -> bool {
    match line {
        Some(line) => link.send_text(&line),
        None => false,
    }
}

/// Publishes the robot state when it changed or has not been sent for a while
pub struct StateReporter {
    interval: Duration,
    last: Option<(RobotState, Instant)>,
}

impl StateReporter {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether `state` should be published at `now`
    pub fn is_due(&self, state: &RobotState, now: Instant) -> bool {
        match &self.last {
            None => true,
            Some((last_state, last_time)) => {
                last_state != state || now.saturating_duration_since(*last_time) >= self.interval
            }
        }
    }

    /// Publishes `state` if due; returns `true` when a line was sent
    pub fn report<L: NetworkLink>(
        &mut self,
        link: &mut L,
        state: &RobotState,
        now: Instant,
    ) -> bool {
        if !link.is_connected() || !self.is_due(state, now) {
            return false;
        }
        let sent = send_line(link, state_line(state));
        if sent {
            self.last = Some((*state, now));
        }
        sent
    }
}
