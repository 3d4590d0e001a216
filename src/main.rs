//! Smart car firmware entry point
//!
//! Loads the configuration, wires the board and spawns the control tasks.

#![no_std]
#![no_main]

use crate::board::flash::FlashStore;
use crate::board::resources::{
    AssignedResources, FlashResources, LineSensorResources, ModeButtonResources,
    MotorDriverResources, SweepServoResources, UltrasonicDistanceSensorResources, VoiceResources,
};
use crate::board::sensors::hc_sr04_sample;
use crate::task::{
    control::robot_control, mode_button::mode_button_handle, voice_listen::voice_listen,
};
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use smart_car::{storage, CommandCell, RobotConfig, RobotStatus};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Board wiring
mod board;
/// Task implementations
mod task;

/// Shared robot status
pub static ROBOT: RobotStatus = RobotStatus::new();

/// Latest remote command
pub static COMMANDS: CommandCell = CommandCell::new();

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Split the resources into separate groups for each task
    let r = split_resources!(p);

    let mut store = FlashStore::new(r.flash);
    let config = storage::load_config(&mut store, RobotConfig::default());

    // Start sampling before the modes start reading distances
    spawner.spawn(hc_sr04_sample(r.us_distance_sensor)).unwrap();
    spawner
        .spawn(robot_control(r.motor_driver, r.sweep_servo, r.line_sensors, config))
        .unwrap();
    spawner.spawn(mode_button_handle(r.mode_button)).unwrap();
    spawner.spawn(voice_listen(r.voice)).unwrap();
}
