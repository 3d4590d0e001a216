//! Sweep servo on a PIO state machine
//!
//! The Pico 2 is short on PWM slices, so the SG90 is driven from PIO, the
//! same way the embassy rp examples substitute PWM.

use core::time::Duration;

use embassy_rp::pio::{Instance, Pio};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::pwm::{PioPwm, PioPwmProgram};
use smart_car::system::config::SERVO_MAX_ANGLE;
use smart_car::system::peripherals::ServoDriver;

use crate::board::resources::{Irqs, SweepServoResources};

const DEFAULT_MIN_PULSE_WIDTH: u64 = 500; // SG90 pulse at 0 degrees
const DEFAULT_MAX_PULSE_WIDTH: u64 = 2500; // SG90 pulse at 180 degrees
const DEFAULT_MAX_DEGREE_ROTATION: u64 = 180;
const REFRESH_INTERVAL: u64 = 20000; // The period of each cycle

pub struct ServoBuilder<'d, T: Instance, const SM: usize> {
    pwm: PioPwm<'d, T, SM>,
    period: Duration,
    min_pulse_width: Duration,
    max_pulse_width: Duration,
    max_degree_rotation: u64,
}

impl<'d, T: Instance, const SM: usize> ServoBuilder<'d, T, SM> {
    pub fn new(pwm: PioPwm<'d, T, SM>) -> Self {
        Self {
            pwm,
            period: Duration::from_micros(REFRESH_INTERVAL),
            min_pulse_width: Duration::from_micros(DEFAULT_MIN_PULSE_WIDTH),
            max_pulse_width: Duration::from_micros(DEFAULT_MAX_PULSE_WIDTH),
            max_degree_rotation: DEFAULT_MAX_DEGREE_ROTATION,
        }
    }

    pub fn build(mut self) -> Servo<'d, T, SM> {
        self.pwm.set_period(self.period);
        Servo {
            pwm: self.pwm,
            min_pulse_width: self.min_pulse_width,
            max_pulse_width: self.max_pulse_width,
            max_degree_rotation: self.max_degree_rotation,
        }
    }
}

pub struct Servo<'d, T: Instance, const SM: usize> {
    pwm: PioPwm<'d, T, SM>,
    min_pulse_width: Duration,
    max_pulse_width: Duration,
    max_degree_rotation: u64,
}

impl<'d, T: Instance, const SM: usize> Servo<'d, T, SM> {
    pub fn start(&mut self) {
        self.pwm.start();
    }

    pub fn rotate(&mut self, degree: u64) {
        let degree = degree.min(self.max_degree_rotation);
        let min = self.min_pulse_width.as_micros() as u64;
        let span = self.max_pulse_width.as_micros() as u64 - min;
        let pulse = min + degree * span / self.max_degree_rotation;
        self.pwm.write(Duration::from_micros(pulse));
    }
}

/// Servo driver used by the modes
pub struct PioServo {
    servo: Servo<'static, PIO0, 0>,
    angle: u8,
}

impl PioServo {
    pub fn new(r: SweepServoResources, center: u8) -> Self {
        let Pio { mut common, sm0, .. } = Pio::new(r.pio, Irqs);
        let prg = PioPwmProgram::new(&mut common);
        let pwm_pio = PioPwm::new(&mut common, sm0, r.pin, &prg);
        let mut servo = ServoBuilder::new(pwm_pio).build();
        servo.start();

        let mut driver = Self { servo, angle: center };
        driver.set_angle(center);
        driver
    }
}

impl ServoDriver for PioServo {
    fn set_angle(&mut self, angle: u8) {
        self.angle = angle.min(SERVO_MAX_ANGLE);
        self.servo.rotate(self.angle as u64);
    }

    fn angle(&self) -> u8 {
        self.angle
    }
}
