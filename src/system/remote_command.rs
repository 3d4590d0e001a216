//! Remote Command Module
//!
//! Latest-value slot for drive commands coming from remote control sources
//! (network, voice module). Producers overwrite whatever has not been read
//! yet and the consumer takes and clears, so a slow consumer only ever sees
//! the freshest command. Built on an embassy-sync `Signal`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Drive command from a remote source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemoteCommand {
    /// Left motor speed (-100..=100)
    pub motor1: i8,
    /// Right motor speed (-100..=100)
    pub motor2: i8,
    /// Servo deflection from center (-100..=100)
    pub servo: i8,
}

impl RemoteCommand {
    pub const STOP: Self = Self::new(0, 0, 0);

    pub const fn new(motor1: i8, motor2: i8, servo: i8) -> Self {
        Self {
            motor1,
            motor2,
            servo,
        }
    }
}

/// Last-writer-wins command slot
pub struct CommandCell {
    slot: Signal<CriticalSectionRawMutex, RemoteCommand>,
}

impl CommandCell {
    pub const fn new() -> Self {
        Self { slot: Signal::new() }
    }

    /// Stores a command, replacing any unread one
    pub fn push(&self, command: RemoteCommand) {
        self.slot.signal(command);
    }

    /// Takes the pending command, leaving the slot empty
    pub fn pop(&self) -> Option<RemoteCommand> {
        self.slot.try_take()
    }

    pub fn has_pending(&self) -> bool {
        self.slot.signaled()
    }
}

impl Default for CommandCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking source of remote commands
pub trait CommandSource {
    /// Returns the newest command, or `None` when nothing arrived since the last call
    fn pop_command(&self) -> Option<RemoteCommand>;
}

impl CommandSource for CommandCell {
    fn pop_command(&self) -> Option<RemoteCommand> {
        self.pop()
    }
}

impl<T: CommandSource + ?Sized> CommandSource for &T {
    fn pop_command(&self) -> Option<RemoteCommand> {
        (**self).pop_command()
    }
}
