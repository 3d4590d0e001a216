//! Firmware tasks
pub mod control;
pub mod mode_button;
pub mod voice_listen;
