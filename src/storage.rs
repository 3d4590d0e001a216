//! Persistent configuration storage
//!
//! Loads and saves the [`NvRecord`] through a [`ConfigStore`] backend. A
//! missing or damaged record is replaced with defaults so the car always
//! boots with a usable configuration.

use crate::system::config::{ConfigError, NvRecord, RobotConfig};
use crate::{log_info, log_warn};

/// Raw storage for one configuration record
pub trait ConfigStore {
    type Error;

    /// Reads the stored record into `buffer`, returning the number of bytes read
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;
    /// Replaces the stored record
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// Reads the persisted record
pub fn read_record<S: ConfigStore>(store: &mut S) -> Result<NvRecord, ConfigError> {
    let mut buffer = [0u8; NvRecord::SIZE];
    let len = store.read(&mut buffer).map_err(|_| ConfigError::Store)?;
    NvRecord::decode(&buffer[..len])
}

/// Writes `record` to the store
pub fn write_record<S: ConfigStore>(store: &mut S, record: &NvRecord) -> Result<(), ConfigError> {
    store
        .write(&record.encode())
        .map_err(|_| ConfigError::Store)
}

/// Loads the configuration, applying persisted values on top of `base`
///
/// An unreadable record is overwritten with defaults and `base` keeps its
/// default persisted values.
pub fn load_config<S: ConfigStore>(store: &mut S, base: RobotConfig) -> RobotConfig {
    match read_record(store) {
        Ok(record) => {
            let config = base.apply_record(&record);
            log_info!(
                "config loaded: threshold {} cm, servo center {}",
                config.obstacle_threshold_cm,
                config.servo_center
            );
            config
        }
        Err(err) => {
            log_warn!("config record unusable ({}), writing defaults", err);
            let record = NvRecord::default();
            if let Err(err) = write_record(store, &record) {
                log_warn!("writing default config failed: {}", err);
            }
            base.apply_record(&record)
        }
    }
}

/// Persists the storable part of `config`
pub fn save_config<S: ConfigStore>(store: &mut S, config: &RobotConfig) -> Result<(), ConfigError> {
    write_record(store, &config.to_record())?;
    log_info!(
        "config saved: threshold {} cm, servo center {}",
        config.obstacle_threshold_cm,
        config.servo_center
    );
    Ok(())
}

/// RAM-backed store for boards without persistent memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Option<[u8; NvRecord::SIZE]>,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self { data: None }
    }

    /// Raw bytes currently stored
    pub fn contents(&self) -> Option<&[u8]> {
        self.data.as_ref().map(|data| data.as_slice())
    }
}

impl ConfigStore for MemoryStore {
    type Error = ConfigError;

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        let data = self.data.as_ref().ok_or(ConfigError::Store)?;
        let len = data.len().min(buffer.len());
        buffer[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let mut stored = [0u8; NvRecord::SIZE];
        let len = data.len().min(stored.len());
        stored[..len].copy_from_slice(&data[..len]);
        self.data = Some(stored);
        Ok(())
    }
}
