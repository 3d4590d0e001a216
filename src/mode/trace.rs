//! Line tracing
//!
//! Follows a black line with the three-sensor infrared array. Purely
//! reactive: every tick maps the current readings to one motor action.

use embassy_time::Instant;

use crate::mode::{Mode, ModeContext};
use crate::system::config::{RobotConfig, TraceTable};
use crate::system::peripherals::{Board, LineSensors, MotorDriver, Peripherals};
use crate::system::state::{CarStatus, LineReading, RobotStatus};
use crate::telemetry;
use crate::log_info;

/// Motor action chosen for a set of line readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TraceAction {
    Forward,
    Left,
    Right,
    Stop,
}

/// Maps left/middle/right readings to an action
pub fn decide(
    table: TraceTable,
    left: LineReading,
    middle: LineReading,
    right: LineReading,
) -> TraceAction {
    match table {
        TraceTable::MiddlePriority => {
            if middle.is_black() {
                TraceAction::Forward
            } else if left.is_black() {
                TraceAction::Left
            } else if right.is_black() {
                TraceAction::Right
            } else {
                TraceAction::Stop
            }
        }
        TraceTable::EdgePair => match (left.is_black(), right.is_black()) {
            (true, true) => TraceAction::Forward,
            (true, false) => TraceAction::Left,
            (false, true) => TraceAction::Right,
            (false, false) => TraceAction::Forward,
        },
    }
}

/// Line tracing mode
pub struct TraceMode {
    table: TraceTable,
    last_action: Option<TraceAction>,
}

impl TraceMode {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            table: config.trace_table,
            last_action: None,
        }
    }

    pub fn last_action(&self) -> Option<TraceAction> {
        self.last_action
    }
}

impl<B: Board> Mode<B> for TraceMode {
    fn status(&self) -> CarStatus {
        CarStatus::Trace
    }

    async fn enter(
        &mut self,
        _robot: &RobotStatus,
        _peripherals: &mut Peripherals<B>,
        _ctx: &mut ModeContext,
    ) {
        self.last_action = None;
        log_info!("trace mode on");
    }

    async fn tick(
        &mut self,
        robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
        ctx: &mut ModeContext,
    ) {
        let left = peripherals.line.left();
        let middle = peripherals.line.middle();
        let right = peripherals.line.right();
        robot.update_ir_status(left, middle, right);

        let action = decide(self.table, left, middle, right);
        let motor = &mut peripherals.motor;
        match action {
            TraceAction::Forward => motor.forward(),
            TraceAction::Left => motor.left(),
            TraceAction::Right => motor.right(),
            TraceAction::Stop => motor.stop(),
        }
        self.last_action = Some(action);

        if ctx.telemetry_due(Instant::now()) {
            telemetry::send_line(&mut peripherals.link, telemetry::trace_line(left, middle, right));
        }
    }

    async fn exit(
        &mut self,
        _robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
        _ctx: &mut ModeContext,
    ) {
        peripherals.motor.stop();
        log_info!("trace mode off");
    }
}
