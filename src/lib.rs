//! Smart car mode manager
//!
//! Owns the car's operating mode (standby, line tracing, obstacle avoidance,
//! remote control), switches between modes on request and runs the active
//! one against a set of hardware collaborators.
//!
//! The crate is `no_std`; host builds link `std` only for tests. The
//! RP2350 firmware lives in `main.rs` behind the `rp2350` feature.

#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

pub mod logging;

/// Input sources that change the mode or feed drive commands
pub mod input;
/// Mode manager driving the active mode
pub mod manager;
/// Mode trait, run loop and mode implementations
pub mod mode;
/// Persistent configuration storage
pub mod storage;
/// Shared state, configuration and collaborator interfaces
pub mod system;
/// Telemetry line formatting and state reporting
pub mod telemetry;

pub use manager::RobotManager;
pub use system::config::RobotConfig;
pub use system::remote_command::{CommandCell, RemoteCommand};
pub use system::state::{CarStatus, LineReading, RobotState, RobotStatus};
