//! Inputs that request mode changes or feed remote commands
pub mod mode_button;
pub mod voice;

pub use mode_button::ModeButton;
pub use voice::VoiceControl;
