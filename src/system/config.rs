//! Robot configuration
//!
//! Runtime tunables of the mode logic plus the persisted subset stored in
//! non-volatile memory.
//!
//! # Persistent record layout (little-endian, 28 bytes)
//! | offset | size | field                 |
//! |--------|------|-----------------------|
//! | 0      | 4    | magic `0x524F4254`    |
//! | 4      | 2    | version (1)           |
//! | 6      | 2    | checksum              |
//! | 8      | 2    | obstacle threshold cm |
//! | 10     | 2    | servo center angle    |
//! | 12     | 16   | reserved, zero        |
//!
//! The checksum is the 16-bit wrapping sum of all record bytes with the
//! checksum field itself zeroed.

use core::fmt;

use embassy_time::Duration;

/// Default obstacle distance threshold (cm)
pub const DEFAULT_OBSTACLE_THRESHOLD_CM: u16 = 20;
/// Default servo center angle (degrees)
pub const DEFAULT_SERVO_CENTER: u8 = 90;
/// Largest angle the servo accepts
pub const SERVO_MAX_ANGLE: u8 = 180;

/// Line tracing decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TraceTable {
    /// Middle sensor decides first, then left, then right, stop when lost
    #[default]
    MiddlePriority,
    /// Only the outer sensors decide, keep driving forward when lost
    EdgePair,
}

/// Runtime configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotConfig {
    /// Obstacle closer than this triggers avoidance (cm)
    pub obstacle_threshold_cm: u16,
    /// Servo angle looking straight ahead
    pub servo_center: u8,
    /// Servo angle used to look left during a scan
    pub scan_left_angle: u8,
    /// Servo angle used to look right during a scan
    pub scan_right_angle: u8,
    /// Time for the servo to reach a new angle
    pub servo_settle: Duration,
    /// Extra wait before sampling the sonar after a servo move
    pub sensor_settle: Duration,
    /// Pause between stopping and backing away from an obstacle
    pub pre_backward_pause: Duration,
    pub backward_time: Duration,
    pub turn_time: Duration,
    /// Remote control stops the car when no command arrived for this long
    pub remote_timeout: Duration,
    pub telemetry_interval: Duration,
    /// Scheduling quantum of the mode loop
    pub main_loop_period: Duration,
    /// Standby page refresh interval
    pub standby_refresh: Duration,
    pub trace_table: TraceTable,
}

impl RobotConfig {
    pub const fn new() -> Self {
        Self {
            obstacle_threshold_cm: DEFAULT_OBSTACLE_THRESHOLD_CM,
            servo_center: DEFAULT_SERVO_CENTER,
            scan_left_angle: 150,
            scan_right_angle: 30,
            servo_settle: Duration::from_millis(350),
            sensor_settle: Duration::from_millis(50),
            pre_backward_pause: Duration::from_millis(200),
            backward_time: Duration::from_millis(400),
            turn_time: Duration::from_millis(400),
            remote_timeout: Duration::from_millis(500),
            telemetry_interval: Duration::from_millis(500),
            main_loop_period: Duration::from_millis(20),
            standby_refresh: Duration::from_millis(500),
            trace_table: TraceTable::MiddlePriority,
        }
    }

    pub fn with_obstacle_threshold(mut self, cm: u16) -> Self {
        self.obstacle_threshold_cm = cm;
        self
    }

    pub fn with_servo_center(mut self, angle: u8) -> Self {
        self.servo_center = angle.min(SERVO_MAX_ANGLE);
        self
    }

    pub fn with_trace_table(mut self, table: TraceTable) -> Self {
        self.trace_table = table;
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn with_telemetry_interval(mut self, interval: Duration) -> Self {
        self.telemetry_interval = interval;
        self
    }

    pub fn with_main_loop_period(mut self, period: Duration) -> Self {
        self.main_loop_period = period;
        self
    }

    pub fn with_standby_refresh(mut self, interval: Duration) -> Self {
        self.standby_refresh = interval;
        self
    }

    /// Sets every delay of the avoidance script at once
    pub fn with_maneuver_timing(
        mut self,
        servo_settle: Duration,
        sensor_settle: Duration,
        pause: Duration,
        drive: Duration,
    ) -> Self {
        self.servo_settle = servo_settle;
        self.sensor_settle = sensor_settle;
        self.pre_backward_pause = pause;
        self.backward_time = drive;
        self.turn_time = drive;
        self
    }

    /// Applies the persisted values on top of this configuration
    pub fn apply_record(mut self, record: &NvRecord) -> Self {
        self.obstacle_threshold_cm = record.obstacle_threshold_cm();
        self.servo_center = record.servo_center_angle();
        self
    }

    /// Persisted subset of this configuration
    pub fn to_record(&self) -> NvRecord {
        NvRecord::new(self.obstacle_threshold_cm, self.servo_center as u16)
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors of the persistent configuration path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Fewer bytes than one record
    Truncated,
    BadMagic,
    BadVersion,
    BadChecksum,
    /// The backing store failed to read or write
    Store,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => f.write_str("config record truncated"),
            Self::BadMagic => f.write_str("config record magic mismatch"),
            Self::BadVersion => f.write_str("unsupported config record version"),
            Self::BadChecksum => f.write_str("config record checksum mismatch"),
            Self::Store => f.write_str("config store access failed"),
        }
    }
}

/// Persisted configuration record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NvRecord {
    obstacle_threshold_cm: u16,
    servo_center_angle: u16,
}

impl NvRecord {
    pub const MAGIC: u32 = 0x524F_4254;
    pub const VERSION: u16 = 1;
    pub const SIZE: usize = 28;

    const CHECKSUM_RANGE: core::ops::Range<usize> = 6..8;

    pub const fn new(obstacle_threshold_cm: u16, servo_center_angle: u16) -> Self {
        Self {
            obstacle_threshold_cm,
            servo_center_angle,
        }
    }

    /// Threshold in cm; an unset (zero) value falls back to the default
    pub fn obstacle_threshold_cm(&self) -> u16 {
        if self.obstacle_threshold_cm == 0 {
            DEFAULT_OBSTACLE_THRESHOLD_CM
        } else {
            self.obstacle_threshold_cm
        }
    }

    /// Center angle in degrees; values past the servo range fall back to the default
    pub fn servo_center_angle(&self) -> u8 {
        if self.servo_center_angle > SERVO_MAX_ANGLE as u16 {
            DEFAULT_SERVO_CENTER
        } else {
            self.servo_center_angle as u8
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buffer = [0u8; Self::SIZE];
        buffer[0..4].copy_from_slice(&Self::MAGIC.to_le_bytes());
        buffer[4..6].copy_from_slice(&Self::VERSION.to_le_bytes());
        buffer[8..10].copy_from_slice(&self.obstacle_threshold_cm.to_le_bytes());
        buffer[10..12].copy_from_slice(&self.servo_center_angle.to_le_bytes());

        let checksum = checksum16(&buffer);
        buffer[Self::CHECKSUM_RANGE].copy_from_slice(&checksum.to_le_bytes());
        buffer
    }

    pub fn decode(buffer: &[u8]) -> Result<Self, ConfigError> {
        if buffer.len() < Self::SIZE {
            return Err(ConfigError::Truncated);
        }

        let mut record = [0u8; Self::SIZE];
        record.copy_from_slice(&buffer[..Self::SIZE]);

        let magic = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        if magic != Self::MAGIC {
            return Err(ConfigError::BadMagic);
        }
        let version = u16::from_le_bytes([record[4], record[5]]);
        if version != Self::VERSION {
            return Err(ConfigError::BadVersion);
        }

        let saved = u16::from_le_bytes([record[6], record[7]]);
        record[Self::CHECKSUM_RANGE].fill(0);
        if checksum16(&record) != saved {
            return Err(ConfigError::BadChecksum);
        }

        Ok(Self {
            obstacle_threshold_cm: u16::from_le_bytes([record[8], record[9]]),
            servo_center_angle: u16::from_le_bytes([record[10], record[11]]),
        })
    }
}

impl Default for NvRecord {
    fn default() -> Self {
        Self::new(DEFAULT_OBSTACLE_THRESHOLD_CM, DEFAULT_SERVO_CENTER as u16)
    }
}

fn checksum16(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, &byte| sum.wrapping_add(byte as u16))
}
