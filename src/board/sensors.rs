//! Ultrasonic and infrared sensors
//!
//! The HC-SR04 is sampled by its own task; [`SonarReader`] hands the last
//! filtered sample to the modes without waiting. The TCRT5000 outputs are
//! plain GPIO reads.

use core::cell::Cell;

use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{with_timeout, Duration, Instant, Timer};
use moving_median::MovingMedian;
use smart_car::system::peripherals::{DistanceSensor, LineSensors};
use smart_car::{log_debug, LineReading};

use crate::board::resources::{LineSensorResources, UltrasonicDistanceSensorResources};

/// Time between measurements
const MEASUREMENT_INTERVAL: Duration = Duration::from_millis(60);

/// Size of median filter window (3 samples balances noise reduction vs. latency)
const MEDIAN_WINDOW_SIZE: usize = 3;

/// Longest echo worth waiting for, a bit past the 400 cm range
const ECHO_TIMEOUT: Duration = Duration::from_millis(30);

/// Usable sensor range in cm
const MIN_RANGE_CM: f32 = 2.0;
const MAX_RANGE_CM: f32 = 400.0;

/// Last filtered distance, 0 when the last measurement failed
static LAST_DISTANCE: Mutex<CriticalSectionRawMutex, Cell<f32>> = Mutex::new(Cell::new(0.0));

/// Reads the sample published by [`hc_sr04_sample`]
pub struct SonarReader;

impl DistanceSensor for SonarReader {
    fn distance_cm(&mut self) -> f32 {
        LAST_DISTANCE.lock(|distance| distance.get())
    }
}

/// One trigger/echo cycle, `None` on timeout or out-of-range echo
async fn measure(trigger: &mut Output<'static>, echo: &mut Input<'static>) -> Option<f32> {
    trigger.set_high();
    Timer::after_micros(10).await;
    trigger.set_low();

    with_timeout(ECHO_TIMEOUT, echo.wait_for_high()).await.ok()?;
    let start = Instant::now();
    with_timeout(ECHO_TIMEOUT, echo.wait_for_low()).await.ok()?;
    let echo_us = start.elapsed().as_micros() as f32;

    // sound travels 0.0343 cm/us, halved for the round trip
    let distance = echo_us * 0.0343 / 2.0;
    (MIN_RANGE_CM..=MAX_RANGE_CM).contains(&distance).then_some(distance)
}

#[embassy_executor::task]
pub async fn hc_sr04_sample(r: UltrasonicDistanceSensorResources) {
    let mut trigger = Output::new(r.trigger_pin, Level::Low);
    let mut echo = Input::new(r.echo_pin, Pull::None);
    let mut median_filter = MovingMedian::<f64, MEDIAN_WINDOW_SIZE>::new();

    loop {
        let distance = match measure(&mut trigger, &mut echo).await {
            Some(distance_cm) => {
                median_filter.add_value(distance_cm as f64);
                median_filter.median() as f32
            }
            None => {
                log_debug!("sonar measurement failed");
                0.0
            }
        };
        LAST_DISTANCE.lock(|last| last.set(distance));

        Timer::after(MEASUREMENT_INTERVAL).await;
    }
}

/// Three TCRT5000 outputs, high over black
pub struct IrArray {
    left: Input<'static>,
    middle: Input<'static>,
    right: Input<'static>,
}

impl IrArray {
    pub fn new(r: LineSensorResources) -> Self {
        Self {
            left: Input::new(r.left_pin, Pull::Down),
            middle: Input::new(r.middle_pin, Pull::Down),
            right: Input::new(r.right_pin, Pull::Down),
        }
    }
}

fn reading(input: &Input<'static>) -> LineReading {
    if input.is_high() {
        LineReading::OnBlack
    } else {
        LineReading::OnWhite
    }
}

impl LineSensors for IrArray {
    fn left(&mut self) -> LineReading {
        reading(&self.left)
    }

    fn middle(&mut self) -> LineReading {
        reading(&self.middle)
    }

    fn right(&mut self) -> LineReading {
        reading(&self.right)
    }
}
