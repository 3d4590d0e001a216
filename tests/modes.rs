mod common;

use std::thread::sleep;
use std::time::Duration as StdDuration;

use common::{fast_config, rig, Action};
use embassy_futures::block_on;
use embassy_time::{Duration, Instant};
use smart_car::mode::trace::TraceAction;
use smart_car::mode::{Mode, ModeContext, ObstacleMode, RemoteMode, TraceMode};
use smart_car::system::config::TraceTable;
use smart_car::{RemoteCommand, RobotStatus};

use smart_car::LineReading::{OnBlack as B, OnWhite as W};

fn context() -> ModeContext {
    ModeContext::new(Instant::now(), Duration::from_secs(3600))
}

#[test]
fn obstacle_below_threshold_runs_escape_script() {
    let robot = RobotStatus::new();
    let (rig, mut peripherals) = rig(100.0);
    let config = fast_config().with_obstacle_threshold(20);
    let mut mode = ObstacleMode::new(&config);
    let mut ctx = context();

    // tick readings 25, 18, 25 with the scan reading 60 on the left and 10 on the right
    rig.queue_distances(&[25.0, 18.0, 60.0, 10.0, 25.0]);

    block_on(async {
        mode.enter(&robot, &mut peripherals, &mut ctx).await;
        for _ in 0..3 {
            mode.tick(&robot, &mut peripherals, &mut ctx).await;
        }
    });

    assert_eq!(
        rig.motor_actions(),
        [
            Action::Forward,
            Action::Stop,
            Action::Backward,
            Action::Stop,
            Action::Left,
            Action::Stop,
            Action::Forward,
        ]
    );
    let servo: Vec<_> = rig.actions().into_iter().filter(|a| !a.is_motor()).collect();
    assert_eq!(
        servo,
        [Action::Servo(90), Action::Servo(150), Action::Servo(30), Action::Servo(90)]
    );

    let scan = mode.last_scan().unwrap();
    assert_eq!((scan.left_cm, scan.right_cm), (60.0, 10.0));
    assert_eq!(mode.avoidance_count(), 1);

    let state = robot.state_copy();
    assert_eq!(state.distance, 25.0);
    assert_eq!(state.servo_angle, 90);
}

#[test]
fn obstacle_turns_toward_wider_right_side() {
    let robot = RobotStatus::new();
    let (rig, mut peripherals) = rig(100.0);
    let mut mode = ObstacleMode::new(&fast_config());
    let mut ctx = context();
    rig.queue_distances(&[12.0, 15.0, 90.0]);

    block_on(mode.tick(&robot, &mut peripherals, &mut ctx));

    assert_eq!(
        rig.motor_actions(),
        [Action::Stop, Action::Backward, Action::Stop, Action::Right, Action::Stop]
    );
}

#[test]
fn obstacle_at_threshold_or_failed_reading_drives_forward() {
    let robot = RobotStatus::new();
    let (rig, mut peripherals) = rig(100.0);
    let mut mode = ObstacleMode::new(&fast_config());
    let mut ctx = context();
    rig.queue_distances(&[20.0, 0.0, 400.0]);

    block_on(async {
        for _ in 0..3 {
            mode.tick(&robot, &mut peripherals, &mut ctx).await;
        }
    });

    assert_eq!(rig.motor_actions(), [Action::Forward; 3]);
    assert_eq!(mode.avoidance_count(), 0);
}

#[test]
fn obstacle_exit_stops_and_recenters() {
    let robot = RobotStatus::new();
    let (rig, mut peripherals) = rig(100.0);
    let mut mode = ObstacleMode::new(&fast_config().with_servo_center(85));
    let mut ctx = context();

    block_on(mode.exit(&robot, &mut peripherals, &mut ctx));

    assert_eq!(rig.actions(), [Action::Stop, Action::Servo(85)]);
    assert_eq!(robot.state_copy().servo_angle, 85);
}

#[test]
fn trace_follows_middle_priority_table() {
    let robot = RobotStatus::new();
    let (rig, mut peripherals) = rig(100.0);
    let mut mode = TraceMode::new(&fast_config());
    let mut ctx = context();

    let cases = [
        ((B, B, B), Action::Forward),
        ((W, B, W), Action::Forward),
        ((B, W, W), Action::Left),
        ((B, W, B), Action::Left),
        ((W, W, B), Action::Right),
        ((W, W, W), Action::Stop),
    ];
    for ((l, m, r), expected) in cases {
        rig.clear_actions();
        rig.set_line(l, m, r);
        block_on(mode.tick(&robot, &mut peripherals, &mut ctx));
        assert_eq!(rig.actions(), [expected], "inputs {:?}", (l, m, r));

        let state = robot.state_copy();
        assert_eq!((state.ir_left, state.ir_middle, state.ir_right), (l, m, r));
    }
}

#[test]
fn trace_edge_pair_table_keeps_driving_when_lost() {
    let robot = RobotStatus::new();
    let (rig, mut peripherals) = rig(100.0);
    let mut mode = TraceMode::new(&fast_config().with_trace_table(TraceTable::EdgePair));
    let mut ctx = context();

    block_on(mode.enter(&robot, &mut peripherals, &mut ctx));
    assert_eq!(mode.last_action(), None);

    rig.set_line(W, B, W);
    block_on(mode.tick(&robot, &mut peripherals, &mut ctx));
    assert_eq!(mode.last_action(), Some(TraceAction::Forward));
    rig.set_line(W, W, B);
    block_on(mode.tick(&robot, &mut peripherals, &mut ctx));

    assert_eq!(rig.actions(), [Action::Forward, Action::Right]);
    assert_eq!(mode.last_action(), Some(TraceAction::Right));
}

#[test]
fn trace_sends_telemetry_when_due() {
    let robot = RobotStatus::new();
    let (rig, mut peripherals) = rig(100.0);
    let mut mode = TraceMode::new(&fast_config());
    let mut ctx = ModeContext::new(Instant::now(), Duration::from_millis(0));

    rig.set_line(B, W, W);
    block_on(mode.tick(&robot, &mut peripherals, &mut ctx));

    assert_eq!(
        rig.sent.borrow().as_slice(),
        ["{\"mode\":\"trace\",\"left\":0,\"mid\":1,\"right\":1}\n"]
    );
}

#[test]
fn remote_applies_commands_and_fails_safe() {
    let robot = RobotStatus::new();
    let (rig, mut peripherals) = rig(100.0);
    let config = fast_config().with_remote_timeout(Duration::from_millis(30));
    let mut mode = RemoteMode::new(&config);
    let mut ctx = context();

    block_on(mode.enter(&robot, &mut peripherals, &mut ctx));
    rig.commands.push(RemoteCommand::new(80, -20, 50));
    block_on(mode.tick(&robot, &mut peripherals, &mut ctx));
    assert_eq!(
        rig.actions(),
        [Action::Stop, Action::Differential(80, -20), Action::Servo(135)]
    );
    assert_eq!(robot.state_copy().servo_angle, 135);

    // quiet period shorter than the timeout keeps the last command
    rig.clear_actions();
    block_on(mode.tick(&robot, &mut peripherals, &mut ctx));
    assert!(rig.actions().is_empty());

    sleep(StdDuration::from_millis(45));
    block_on(mode.tick(&robot, &mut peripherals, &mut ctx));
    block_on(mode.tick(&robot, &mut peripherals, &mut ctx));
    assert_eq!(rig.actions(), [Action::Differential(0, 0), Action::Servo(90)]);
    assert!(mode.failsafe_engaged());
    assert_eq!(robot.state_copy().servo_angle, 90);

    rig.clear_actions();
    rig.commands.push(RemoteCommand::new(40, 40, 0));
    block_on(mode.tick(&robot, &mut peripherals, &mut ctx));
    assert_eq!(rig.actions(), [Action::Differential(40, 40), Action::Servo(90)]);
    assert!(!mode.failsafe_engaged());
}

#[test]
fn remote_uses_only_the_latest_command() {
    let robot = RobotStatus::new();
    let (rig, mut peripherals) = rig(100.0);
    let mut mode = RemoteMode::new(&fast_config());
    let mut ctx = context();

    rig.commands.push(RemoteCommand::new(10, 10, 0));
    rig.commands.push(RemoteCommand::new(-60, -60, -100));
    block_on(mode.tick(&robot, &mut peripherals, &mut ctx));

    assert_eq!(rig.actions(), [Action::Differential(-60, -60), Action::Servo(0)]);
    assert_eq!(mode.last_command(), RemoteCommand::new(-60, -60, -100));
}
