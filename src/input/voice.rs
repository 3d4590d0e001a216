//! Voice module commands
//!
//! The voice recognition module sends one byte per recognised phrase:
//!
//! | byte        | meaning                                   |
//! |-------------|-------------------------------------------|
//! | `0x00`      | stop                                      |
//! | `0x01`      | forward                                   |
//! | `0x02`      | backward                                  |
//! | `0x03`      | timed left turn, then previous motion     |
//! | `0x04`      | timed right turn, then previous motion    |
//! | `0x10-0x13` | switch to standby/trace/obstacle/remote   |
//! | `0xFF`      | emergency stop                            |
//!
//! Motion bytes force remote control mode. A motion stays active for
//! [`COMMAND_TIMEOUT`]; [`VoiceControl::tick`] turns the active motion into
//! [`RemoteCommand`]s for the command cell.

use embassy_time::{Duration, Instant};

use crate::system::remote_command::RemoteCommand;
use crate::system::state::{CarStatus, RobotStatus};
use crate::{log_debug, log_info, log_warn};

/// How long a motion command stays active
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);
/// Duration of a timed turn
pub const TURN_TIME: Duration = Duration::from_millis(400);

const SPEED_HIGH: i8 = 100;
const SPEED_TURN: i8 = 50;

/// Decoded voice byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoiceCommand {
    Stop,
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    SwitchMode(CarStatus),
    EmergencyStop,
}

impl VoiceCommand {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Stop),
            0x01 => Some(Self::Forward),
            0x02 => Some(Self::Backward),
            0x03 => Some(Self::TurnLeft),
            0x04 => Some(Self::TurnRight),
            0x10 => Some(Self::SwitchMode(CarStatus::Stop)),
            0x11 => Some(Self::SwitchMode(CarStatus::Trace)),
            0x12 => Some(Self::SwitchMode(CarStatus::ObstacleAvoidance)),
            0x13 => Some(Self::SwitchMode(CarStatus::WifiControl)),
            0xFF => Some(Self::EmergencyStop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Turn {
    ends_at: Instant,
    saved: (i8, i8),
}

/// Voice command state
pub struct VoiceControl {
    active: bool,
    speeds: (i8, i8),
    expires_at: Instant,
    turn: Option<Turn>,
    last_byte: Option<u8>,
    stop_pending: bool,
}

impl VoiceControl {
    pub const fn new() -> Self {
        Self {
            active: false,
            speeds: (0, 0),
            expires_at: Instant::from_ticks(0),
            turn: None,
            last_byte: None,
            stop_pending: false,
        }
    }

    /// Whether a motion command is currently in effect
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current left/right speeds, zero when inactive
    pub fn motor_command(&self) -> (i8, i8) {
        if self.active {
            self.speeds
        } else {
            (0, 0)
        }
    }

    fn set_speeds(&mut self, left: i8, right: i8, now: Instant) {
        self.speeds = (left, right);
        self.active = true;
        self.expires_at = now + COMMAND_TIMEOUT;
    }

    fn start_turn(&mut self, left: i8, right: i8, now: Instant) {
        let saved = if self.active { self.speeds } else { (0, 0) };
        self.turn = Some(Turn {
            ends_at: now + TURN_TIME,
            saved,
        });
        self.set_speeds(left, right, now);
    }

    fn clear(&mut self) {
        self.stop_pending |= self.active;
        self.active = false;
        self.speeds = (0, 0);
        self.turn = None;
    }

    /// Handles every byte of one received chunk
    pub fn handle_bytes(&mut self, bytes: &[u8], robot: &RobotStatus, now: Instant) {
        for &byte in bytes {
            self.handle_byte(byte, robot, now);
        }
    }

    /// Handles one received byte
    pub fn handle_byte(&mut self, byte: u8, robot: &RobotStatus, now: Instant) {
        if self.last_byte != Some(byte) {
            log_debug!("voice byte {}", byte);
            self.last_byte = Some(byte);
        }

        let Some(command) = VoiceCommand::from_byte(byte) else {
            log_warn!("unknown voice byte {}", byte);
            return;
        };

        match command {
            VoiceCommand::EmergencyStop => {
                log_warn!("voice emergency stop");
                self.clear();
                self.stop_pending = true;
                self.last_byte = None;
                robot.set_status(CarStatus::WifiControl);
            }
            VoiceCommand::SwitchMode(status) => {
                self.clear();
                robot.set_status(status);
            }
            motion => {
                if robot.set_status(CarStatus::WifiControl) {
                    log_info!("voice motion, switching to remote control");
                }
                match motion {
                    VoiceCommand::Stop => {
                        self.turn = None;
                        self.set_speeds(0, 0, now);
                    }
                    VoiceCommand::Forward => {
                        self.turn = None;
                        self.set_speeds(SPEED_HIGH, SPEED_HIGH, now);
                    }
                    VoiceCommand::Backward => {
                        self.turn = None;
                        self.set_speeds(-SPEED_HIGH, -SPEED_HIGH, now);
                    }
                    VoiceCommand::TurnLeft => self.start_turn(-SPEED_TURN, SPEED_TURN, now),
                    VoiceCommand::TurnRight => self.start_turn(SPEED_TURN, -SPEED_TURN, now),
                    VoiceCommand::SwitchMode(_) | VoiceCommand::EmergencyStop => {}
                }
            }
        }
    }

    /// Advances timers and returns the command to publish at `now`
    ///
    /// Yields the active motion while one is in effect and a single stop
    /// command once the motion ended, timed out or was cancelled.
    pub fn tick(&mut self, now: Instant) -> Option<RemoteCommand> {
        let was_active = self.active;

        if let Some(turn) = self.turn {
            if now >= turn.ends_at {
                self.turn = None;
                self.speeds = turn.saved;
                if turn.saved == (0, 0) {
                    self.active = false;
                }
            }
        }

        if self.active && now >= self.expires_at {
            log_info!("voice command timed out");
            self.clear();
            self.last_byte = None;
        }

        let stop_pending = core::mem::take(&mut self.stop_pending);
        if self.active {
            Some(RemoteCommand::new(self.speeds.0, self.speeds.1, 0))
        } else if was_active || stop_pending {
            Some(RemoteCommand::STOP)
        } else {
            None
        }
    }
}

impl Default for VoiceControl {
    fn default() -> Self {
        Self::new()
    }
}
