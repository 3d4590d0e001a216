//! Recording collaborators shared by the integration tests
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embassy_time::Duration;
use smart_car::system::peripherals::{
    Board, Display, DistanceSensor, LineSensors, MotorDriver, NetworkLink, Peripherals, ServoDriver,
};
use smart_car::{CarStatus, CommandCell, LineReading, RobotConfig};

/// Actuator call seen by the mocks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
    Differential(i8, i8),
    Servo(u8),
}

impl Action {
    pub fn is_motor(&self) -> bool {
        !matches!(self, Action::Servo(_))
    }
}

pub type Shared<T> = Rc<RefCell<T>>;

pub struct MockMotor {
    log: Shared<Vec<Action>>,
}

impl MotorDriver for MockMotor {
    fn forward(&mut self) {
        self.log.borrow_mut().push(Action::Forward);
    }
    fn backward(&mut self) {
        self.log.borrow_mut().push(Action::Backward);
    }
    fn left(&mut self) {
        self.log.borrow_mut().push(Action::Left);
    }
    fn right(&mut self) {
        self.log.borrow_mut().push(Action::Right);
    }
    fn stop(&mut self) {
        self.log.borrow_mut().push(Action::Stop);
    }
    fn set_differential(&mut self, left: i8, right: i8) {
        self.log
            .borrow_mut()
            .push(Action::Differential(left.clamp(-100, 100), right.clamp(-100, 100)));
    }
}

pub struct MockServo {
    angle: u8,
    log: Shared<Vec<Action>>,
}

impl ServoDriver for MockServo {
    fn set_angle(&mut self, angle: u8) {
        self.angle = angle.min(180);
        self.log.borrow_mut().push(Action::Servo(self.angle));
    }
    fn angle(&self) -> u8 {
        self.angle
    }
}

/// Returns queued readings in order, then `fallback`
pub struct MockSonar {
    readings: Shared<VecDeque<f32>>,
    fallback: f32,
}

impl DistanceSensor for MockSonar {
    fn distance_cm(&mut self) -> f32 {
        self.readings.borrow_mut().pop_front().unwrap_or(self.fallback)
    }
}

pub struct MockLine {
    readings: Rc<Cell<(LineReading, LineReading, LineReading)>>,
}

impl LineSensors for MockLine {
    fn left(&mut self) -> LineReading {
        self.readings.get().0
    }
    fn middle(&mut self) -> LineReading {
        self.readings.get().1
    }
    fn right(&mut self) -> LineReading {
        self.readings.get().2
    }
}

pub struct MockDisplay {
    pages: Shared<Vec<CarStatus>>,
    standby: Shared<Vec<(String, String)>>,
}

impl Display for MockDisplay {
    fn show_mode_page(&mut self, status: CarStatus) {
        self.pages.borrow_mut().push(status);
    }
    fn render_standby(&mut self, wifi: &str, ip: &str) {
        self.standby.borrow_mut().push((wifi.to_string(), ip.to_string()));
    }
}

pub struct MockLink {
    ip: Rc<Cell<Option<&'static str>>>,
    sent: Shared<Vec<String>>,
}

impl NetworkLink for MockLink {
    fn is_connected(&self) -> bool {
        self.ip.get().is_some()
    }
    fn ip_address(&self) -> Option<&str> {
        self.ip.get()
    }
    fn send_text(&mut self, text: &str) -> bool {
        self.sent.borrow_mut().push(text.to_string());
        true
    }
}

pub struct MockBoard;

impl Board for MockBoard {
    type Motor = MockMotor;
    type Servo = MockServo;
    type Sonar = MockSonar;
    type Line = MockLine;
    type Display = MockDisplay;
    type Link = MockLink;
    type Commands = &'static CommandCell;
}

/// Handles the test keeps to drive and inspect the mocks
pub struct Rig {
    pub actions: Shared<Vec<Action>>,
    pub distances: Shared<VecDeque<f32>>,
    pub line: Rc<Cell<(LineReading, LineReading, LineReading)>>,
    pub pages: Shared<Vec<CarStatus>>,
    pub standby: Shared<Vec<(String, String)>>,
    pub ip: Rc<Cell<Option<&'static str>>>,
    pub sent: Shared<Vec<String>>,
    pub commands: &'static CommandCell,
}

impl Rig {
    pub fn actions(&self) -> Vec<Action> {
        self.actions.borrow().clone()
    }

    pub fn motor_actions(&self) -> Vec<Action> {
        self.actions.borrow().iter().copied().filter(Action::is_motor).collect()
    }

    pub fn clear_actions(&self) {
        self.actions.borrow_mut().clear();
    }

    pub fn set_line(&self, left: LineReading, middle: LineReading, right: LineReading) {
        self.line.set((left, middle, right));
    }

    pub fn queue_distances(&self, readings: &[f32]) {
        self.distances.borrow_mut().extend(readings.iter().copied());
    }
}

/// Builds mock peripherals; the sonar reports `clear_distance` once its queue is empty
pub fn rig(clear_distance: f32) -> (Rig, Peripherals<MockBoard>) {
    let rig = Rig {
        actions: Rc::new(RefCell::new(Vec::new())),
        distances: Rc::new(RefCell::new(VecDeque::new())),
        line: Rc::new(Cell::new((
            LineReading::OnWhite,
            LineReading::OnWhite,
            LineReading::OnWhite,
        ))),
        pages: Rc::new(RefCell::new(Vec::new())),
        standby: Rc::new(RefCell::new(Vec::new())),
        ip: Rc::new(Cell::new(None)),
        sent: Rc::new(RefCell::new(Vec::new())),
        commands: Box::leak(Box::new(CommandCell::new())),
    };

    let peripherals = Peripherals {
        motor: MockMotor {
            log: rig.actions.clone(),
        },
        servo: MockServo {
            angle: 90,
            log: rig.actions.clone(),
        },
        sonar: MockSonar {
            readings: rig.distances.clone(),
            fallback: clear_distance,
        },
        line: MockLine {
            readings: rig.line.clone(),
        },
        display: MockDisplay {
            pages: rig.pages.clone(),
            standby: rig.standby.clone(),
        },
        link: MockLink {
            ip: rig.ip.clone(),
            sent: rig.sent.clone(),
        },
        commands: rig.commands,
    };

    (rig, peripherals)
}

/// Configuration with millisecond delays so scenarios run quickly
pub fn fast_config() -> RobotConfig {
    let step = Duration::from_millis(1);
    RobotConfig::default()
        .with_maneuver_timing(step, step, step, step)
        .with_main_loop_period(step)
        .with_telemetry_interval(Duration::from_secs(3600))
}
