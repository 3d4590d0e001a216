//! RP2350 board wiring
pub mod console;
pub mod flash;
pub mod motor;
pub mod resources;
pub mod sensors;
pub mod servo;

use smart_car::system::peripherals::Board;
use smart_car::CommandCell;

/// Collaborator types of the Pico 2 car
pub struct CarBoard;

impl Board for CarBoard {
    type Motor = motor::Tb6612Motor;
    type Servo = servo::PioServo;
    type Sonar = sensors::SonarReader;
    type Line = sensors::IrArray;
    type Display = console::ConsoleDisplay;
    type Link = console::OfflineLink;
    type Commands = &'static CommandCell;
}
