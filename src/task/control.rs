//! Mode control task
//!
//! Builds the car's collaborators and runs the robot manager at its fixed
//! cadence for the lifetime of the firmware.

use smart_car::system::peripherals::Peripherals;
use smart_car::{log_info, RobotConfig, RobotManager};

use crate::board::console::{ConsoleDisplay, OfflineLink};
use crate::board::motor::Tb6612Motor;
use crate::board::resources::{LineSensorResources, MotorDriverResources, SweepServoResources};
use crate::board::sensors::{IrArray, SonarReader};
use crate::board::servo::PioServo;
use crate::board::CarBoard;
use crate::{COMMANDS, ROBOT};

#[embassy_executor::task]
pub async fn robot_control(
    motor: MotorDriverResources,
    servo: SweepServoResources,
    line: LineSensorResources,
    config: RobotConfig,
) {
    let peripherals: Peripherals<CarBoard> = Peripherals {
        motor: Tb6612Motor::new(motor),
        servo: PioServo::new(servo, config.servo_center),
        sonar: SonarReader,
        line: IrArray::new(line),
        display: ConsoleDisplay,
        link: OfflineLink,
        commands: &COMMANDS,
    };

    let mut manager = RobotManager::new(&ROBOT, peripherals, config);
    log_info!("Robot control started");
    manager.run().await
}
