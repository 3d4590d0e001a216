//! Hardware Resource Management
//!
//! Allocates the RP2350 pins and peripherals to the car's components.
//!
//! # Resource Groups
//! - Distance Sensor: HC-SR04 ultrasonic sensor pins
//! - Sweep Servo: SG90 servo driven from a PIO state machine
//! - Motor Control: TB6612FNG dual motor driver pins and PWM slices
//! - Line Sensors: three TCRT5000 infrared outputs
//! - Mode Button: push button cycling the operating mode
//! - Voice Module: UART receive line of the voice recognition module
//! - Flash: configuration record storage

use assign_resources::assign_resources;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, PIO0, UART1};
use embassy_rp::pio::InterruptHandler as PioInterruptHandler;
use embassy_rp::uart::InterruptHandler as UartInterruptHandler;

assign_resources! {
    /// HC-SR04 ultrasonic distance sensor pins
    us_distance_sensor: UltrasonicDistanceSensorResources {
       trigger_pin: PIN_15,
       echo_pin: PIN_14,
    },
    /// Servo carrying the ultrasonic sensor
    sweep_servo: SweepServoResources {
        pin: PIN_5,
        pio: PIO0,
    },
    /// TB6612FNG dual motor driver pins and PWM channels
    motor_driver: MotorDriverResources {
        standby_pin: PIN_22,
        // Motor drive PWM
        left_slice: PWM_SLICE6,
        left_pwm_pin: PIN_28,
        left_forward_pin: PIN_21,
        left_backward_pin: PIN_20,
        // Motor drive PWM
        right_slice: PWM_SLICE5,
        right_pwm_pin: PIN_27,
        right_forward_pin: PIN_19,
        right_backward_pin: PIN_18,
    },
    /// TCRT5000 infrared line sensors, digital outputs
    line_sensors: LineSensorResources {
        left_pin: PIN_6,
        middle_pin: PIN_7,
        right_pin: PIN_8,
    },
    /// Mode cycle button
    mode_button: ModeButtonResources {
        btn: PIN_16,
    },
    /// Voice recognition module, receive only
    voice: VoiceResources {
        uart: UART1,
        rx_pin: PIN_9,
        dma: DMA_CH0,
    },
    /// On-board flash holding the configuration record
    flash: FlashResources {
        flash: FLASH,
    },
}

bind_interrupts!(pub struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    UART1_IRQ => UartInterruptHandler<UART1>;
});
