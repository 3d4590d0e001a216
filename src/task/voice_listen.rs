//! Voice module listener
//!
//! Receives command bytes from the voice recognition module and, while a
//! voice motion is active, keeps the remote command cell fed at the mode
//! loop cadence.

use embassy_futures::select::{select, Either};
use embassy_rp::uart::{Config, UartRx};
use embassy_time::{Duration, Instant, Timer};
use smart_car::input::VoiceControl;
use smart_car::{log_info, log_warn};

use crate::board::resources::{Irqs, VoiceResources};
use crate::{COMMANDS, ROBOT};

/// Interval at which active voice motion is republished
const PUBLISH_INTERVAL: Duration = Duration::from_millis(20);

#[embassy_executor::task]
pub async fn voice_listen(r: VoiceResources) {
    let mut config = Config::default();
    config.baudrate = 9600;
    let mut rx = UartRx::new(r.uart, r.rx_pin, Irqs, r.dma, config);
    let mut voice = VoiceControl::new();
    let mut byte = [0u8; 1];
    log_info!("Voice listener started");

    loop {
        let received = select(rx.read(&mut byte), Timer::after(PUBLISH_INTERVAL)).await;
        match received {
            Either::First(Ok(())) => voice.handle_byte(byte[0], &ROBOT, Instant::now()),
            Either::First(Err(_)) => log_warn!("voice uart read error"),
            Either::Second(()) => {}
        }

        if let Some(command) = voice.tick(Instant::now()) {
            COMMANDS.push(command);
        }
    }
}
