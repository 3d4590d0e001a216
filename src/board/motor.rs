//! Drive motors on a TB6612FNG
//!
//! Left motor on channel A, right motor on channel B. Turns stop one side and
//! drive the other, stop brakes both sides.

use embassy_rp::gpio::{self, Output};
use embassy_rp::pwm::{self, PwmOutput};
use smart_car::log_warn;
use smart_car::system::peripherals::MotorDriver;
use tb6612fng::{DriveCommand, Motor, Tb6612fng};

use crate::board::resources::MotorDriverResources;

/// Speed used by the fixed-direction commands
const CRUISE_SPEED: u8 = 100;

/// PWM frequency, cheaper DC motors work better at lower frequencies
const PWM_FREQ_HZ: u32 = 10_000;

type Pin = Output<'static>;
type Channel = Motor<Pin, Pin, PwmOutput<'static>>;
type Driver = Tb6612fng<Pin, Pin, PwmOutput<'static>, Pin, Pin, PwmOutput<'static>, Pin>;

/// Converts a signed speed into a driver command
fn command_for(speed: i8) -> DriveCommand {
    let speed = speed.clamp(-100, 100);
    match speed {
        0 => DriveCommand::Stop,
        s if s > 0 => DriveCommand::Forward(s as u8),
        s => DriveCommand::Backward(s.unsigned_abs()),
    }
}

pub struct Tb6612Motor {
    control: Driver,
}

impl Tb6612Motor {
    pub fn new(r: MotorDriverResources) -> Self {
        // Calculate minimum divider needed to keep period under 16-bit limit (65535)
        let clock_freq_hz = embassy_rp::clocks::clk_sys_freq();
        let divider = ((clock_freq_hz / PWM_FREQ_HZ) / 65535 + 1) as u8;
        let period = (clock_freq_hz / (PWM_FREQ_HZ * divider as u32)) as u16 - 1;

        let mut pwm_config = pwm::Config::default();
        pwm_config.divider = divider.into();
        pwm_config.top = period;

        let stby = gpio::Output::new(r.standby_pin, gpio::Level::Low);

        let left_fwd = gpio::Output::new(r.left_forward_pin, gpio::Level::Low);
        let left_bckw = gpio::Output::new(r.left_backward_pin, gpio::Level::Low);
        let (left_pwm, _) =
            pwm::Pwm::new_output_a(r.left_slice, r.left_pwm_pin, pwm_config.clone()).split();
        let left_pwm = left_pwm.expect("Left PWM channel A not configured");
        let left_motor =
            Motor::new(left_fwd, left_bckw, left_pwm).expect("Left motor init failed");

        let right_fwd = gpio::Output::new(r.right_forward_pin, gpio::Level::Low);
        let right_bckw = gpio::Output::new(r.right_backward_pin, gpio::Level::Low);
        let (_, right_pwm) =
            pwm::Pwm::new_output_b(r.right_slice, r.right_pwm_pin, pwm_config).split();
        let right_pwm = right_pwm.expect("Right PWM channel B not configured");
        let right_motor =
            Motor::new(right_fwd, right_bckw, right_pwm).expect("Right motor init failed");

        let mut control =
            Tb6612fng::new(left_motor, right_motor, stby).expect("Motor driver init failed");
        control.disable_standby().expect("Motor driver standby pin failed");

        Self { control }
    }

    fn drive(&mut self, left: DriveCommand, right: DriveCommand) {
        if drive_channel(&mut self.control.motor_a, left).is_err()
            | drive_channel(&mut self.control.motor_b, right).is_err()
        {
            log_warn!("motor driver rejected command");
        }
    }
}

fn drive_channel(motor: &mut Channel, command: DriveCommand) -> Result<(), ()> {
    motor.drive(command).map_err(|_| ())
}

impl MotorDriver for Tb6612Motor {
    fn forward(&mut self) {
        self.drive(DriveCommand::Forward(CRUISE_SPEED), DriveCommand::Forward(CRUISE_SPEED));
    }

    fn backward(&mut self) {
        self.drive(DriveCommand::Backward(CRUISE_SPEED), DriveCommand::Backward(CRUISE_SPEED));
    }

    fn left(&mut self) {
        self.drive(DriveCommand::Stop, DriveCommand::Forward(CRUISE_SPEED));
    }

    fn right(&mut self) {
        self.drive(DriveCommand::Forward(CRUISE_SPEED), DriveCommand::Stop);
    }

    fn stop(&mut self) {
        self.drive(DriveCommand::Brake, DriveCommand::Brake);
    }

    fn set_differential(&mut self, left: i8, right: i8) {
        self.drive(command_for(left), command_for(right));
    }
}
