//! Configuration record in on-board flash
//!
//! The record lives at the start of the last flash sector. Writing erases
//! the whole sector first.

use embassy_rp::flash::{Blocking, Error, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use smart_car::storage::ConfigStore;
use smart_car::system::config::NvRecord;

use crate::board::resources::FlashResources;

/// Flash size as configured in memory.x
const FLASH_SIZE: usize = 2048 * 1024;

/// Offset of the configuration sector
const CONFIG_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

pub struct FlashStore {
    flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>,
}

impl FlashStore {
    pub fn new(r: FlashResources) -> Self {
        Self {
            flash: Flash::new_blocking(r.flash),
        }
    }
}

impl ConfigStore for FlashStore {
    type Error = Error;

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        let len = buffer.len().min(NvRecord::SIZE);
        self.flash.blocking_read(CONFIG_OFFSET, &mut buffer[..len])?;
        Ok(len)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.flash
            .blocking_erase(CONFIG_OFFSET, CONFIG_OFFSET + ERASE_SIZE as u32)?;
        self.flash.blocking_write(CONFIG_OFFSET, data)
    }
}
