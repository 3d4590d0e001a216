//! Mode button handling
//!
//! Each press of the button advances the operating mode.

use embassy_rp::gpio::{Input, Pull};
use embassy_time::{Duration, Instant, Timer};
use smart_car::input::ModeButton;
use smart_car::log_info;

use crate::board::resources::ModeButtonResources;
use crate::ROBOT;

/// Settle time after an edge before the level is trusted
const DEBOUNCE_DELAY: Duration = Duration::from_millis(30);

#[embassy_executor::task]
pub async fn mode_button_handle(r: ModeButtonResources) {
    // Button pulls the pin to ground when pressed
    let mut btn = Input::new(r.btn, Pull::Up);
    let mut button = ModeButton::new();

    loop {
        btn.wait_for_falling_edge().await;
        Timer::after(DEBOUNCE_DELAY).await;
        if btn.is_high() {
            continue;
        }

        if let Some(status) = button.press(&ROBOT, Instant::now()) {
            log_info!("button: mode {}", status.name());
        }
        btn.wait_for_high().await;
    }
}
