//! Core system components shared by all modes
pub mod config;
pub mod peripherals;
pub mod remote_command;
pub mod state;
