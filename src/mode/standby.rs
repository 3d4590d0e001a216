//! Standby
//!
//! Runs while the car is stopped: motors off, network status refreshed on
//! the display at a fixed interval.

use core::fmt::Write;

use embassy_time::{Duration, Instant};
use heapless::String;

use crate::mode::{Mode, ModeContext};
use crate::system::config::RobotConfig;
use crate::system::peripherals::{Board, Display, MotorDriver, NetworkLink, Peripherals};
use crate::system::state::{CarStatus, RobotStatus};
use crate::log_info;

/// Display line capacity
const LINE_LEN: usize = 32;

/// Standby routine
pub struct StandbyMode {
    refresh: Duration,
    last_render: Option<Instant>,
}

impl StandbyMode {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            refresh: config.standby_refresh,
            last_render: None,
        }
    }

    fn render_due(&self, now: Instant) -> bool {
        match self.last_render {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.refresh,
        }
    }

    /// Renders the network page when the refresh interval elapsed
    pub fn refresh<B: Board>(&mut self, peripherals: &mut Peripherals<B>, now: Instant) {
        if !self.render_due(now) {
            return;
        }
        self.last_render = Some(now);

        let wifi = if peripherals.link.is_connected() {
            "WiFi: Connected"
        } else {
            "WiFi: Connecting"
        };

        let mut ip: String<LINE_LEN> = String::new();
        let written = match peripherals.link.ip_address() {
            Some(addr) => write!(ip, "IP: {}", addr),
            None => ip.push_str("IP: Pending").map_err(|_| core::fmt::Error),
        };
        if written.is_err() {
            ip.clear();
            let _ = ip.push_str("IP: ?");
        }

        peripherals.display.render_standby(wifi, &ip);
    }
}

impl<B: Board> Mode<B> for StandbyMode {
    fn status(&self) -> CarStatus {
        CarStatus::Stop
    }

    async fn enter(
        &mut self,
        _robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
        _ctx: &mut ModeContext,
    ) {
        peripherals.motor.stop();
        self.last_render = None;
        log_info!("standby");
    }

    async fn tick(
        &mut self,
        _robot: &RobotStatus,
        peripherals: &mut Peripherals<B>,
        _ctx: &mut ModeContext,
    ) {
        self.refresh(peripherals, Instant::now());
    }
}
