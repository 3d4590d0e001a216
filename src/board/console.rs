//! Display and network stand-ins
//!
//! This board has no screen and no radio. Pages go to the defmt log and the
//! network link reports itself offline.

use smart_car::system::peripherals::{mode_page, Display, NetworkLink};
use smart_car::{log_debug, log_info, CarStatus};

/// Prints display pages to the log
pub struct ConsoleDisplay;

impl Display for ConsoleDisplay {
    fn show_mode_page(&mut self, status: CarStatus) {
        let [title, detail, hint] = mode_page(status);
        log_info!("[display] {} | {} | {}", title, detail, hint);
    }

    fn render_standby(&mut self, wifi: &str, ip: &str) {
        log_debug!("[display] {} | {}", wifi, ip);
    }
}

/// Network link of a board without a radio
pub struct OfflineLink;

impl NetworkLink for OfflineLink {
    fn is_connected(&self) -> bool {
        false
    }

    fn ip_address(&self) -> Option<&str> {
        None
    }

    fn send_text(&mut self, text: &str) -> bool {
        log_debug!("[telemetry] {}", text);
        false
    }
}
