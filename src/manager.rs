//! Robot Manager
//!
//! Single owner of the mode transition protocol. Each [`RobotManager::tick`]
//! reads the requested status once; on a change it exits the old mode and
//! enters the new one, in that order, and then ticks whichever mode is
//! active. Dispatch is a `match` over [`CarStatus`], so every status maps to
//! a known mode or to nothing at all. The robot state is published over the
//! network link after every tick when it changed.

use embassy_time::{Instant, Timer};

use crate::mode::{
    run_mode_loop, Mode, ModeContext, ObstacleMode, RemoteMode, StandbyMode, TraceMode,
};
use crate::system::config::RobotConfig;
use crate::system::peripherals::{Board, Display, MotorDriver, Peripherals};
use crate::system::state::{CarStatus, RobotState, RobotStatus};
use crate::telemetry::StateReporter;
use crate::{log_info, log_warn};

/// Mode lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Enter,
    Tick,
    Exit,
}

async fn run_phase<B: Board, M: Mode<B>>(
    mode: &mut M,
    phase: Phase,
    robot: &RobotStatus,
    peripherals: &mut Peripherals<B>,
    ctx: &mut ModeContext,
) {
    match phase {
        Phase::Enter => mode.enter(robot, peripherals, ctx).await,
        Phase::Tick => mode.tick(robot, peripherals, ctx).await,
        Phase::Exit => mode.exit(robot, peripherals, ctx).await,
    }
}

/// Owns the collaborators and modes and runs the active one
pub struct RobotManager<'a, B: Board> {
    robot: &'a RobotStatus,
    peripherals: Peripherals<B>,
    config: RobotConfig,
    standby: StandbyMode,
    trace: TraceMode,
    obstacle: ObstacleMode,
    remote: RemoteMode,
    last_status: Option<CarStatus>,
    ctx: ModeContext,
    reporter: StateReporter,
}

impl<'a, B: Board> RobotManager<'a, B> {
    /// Puts the car into a safe initial state and switches to standby
    pub fn new(
        robot: &'a RobotStatus,
        mut peripherals: Peripherals<B>,
        config: RobotConfig,
    ) -> Self {
        peripherals.motor.stop();
        peripherals.point_servo(config.servo_center, robot);
        robot.set_status(CarStatus::Stop);
        robot.request_ui_refresh();
        log_info!("robot manager ready");

        Self {
            robot,
            peripherals,
            standby: StandbyMode::new(&config),
            trace: TraceMode::new(&config),
            obstacle: ObstacleMode::new(&config),
            remote: RemoteMode::new(&config),
            config,
            last_status: Some(CarStatus::Stop),
            ctx: ModeContext::new(Instant::now(), config.telemetry_interval),
            reporter: StateReporter::new(config.telemetry_interval),
        }
    }

    pub fn status(&self) -> CarStatus {
        self.robot.status()
    }

    /// Requests a mode change, returns `true` if the status changed
    pub fn set_status(&self, status: CarStatus) -> bool {
        self.robot.set_status(status)
    }

    pub fn state_copy(&self) -> RobotState {
        self.robot.state_copy()
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    pub fn peripherals(&self) -> &Peripherals<B> {
        &self.peripherals
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<B> {
        &mut self.peripherals
    }

    /// Mode that is entered and not yet exited, if any
    pub fn active_status(&self) -> Option<CarStatus> {
        self.last_status
    }

    async fn dispatch(&mut self, status: CarStatus, phase: Phase) {
        let robot = self.robot;
        let peripherals = &mut self.peripherals;
        let ctx = &mut self.ctx;
        match status {
            CarStatus::Stop => run_phase(&mut self.standby, phase, robot, peripherals, ctx).await,
            CarStatus::Trace => run_phase(&mut self.trace, phase, robot, peripherals, ctx).await,
            CarStatus::ObstacleAvoidance => {
                run_phase(&mut self.obstacle, phase, robot, peripherals, ctx).await
            }
            CarStatus::WifiControl => {
                run_phase(&mut self.remote, phase, robot, peripherals, ctx).await
            }
            CarStatus::BtControl => {}
        }
    }

    /// Shows a pending mode page on the display
    fn refresh_display(&mut self) {
        if let Some(status) = self.robot.take_ui_refresh() {
            self.peripherals.display.show_mode_page(status);
        }
    }

    /// One step of the manager, called every `main_loop_period`
    pub async fn tick(&mut self) {
        self.refresh_display();

        let current = self.robot.status();
        if self.last_status != Some(current) {
            if let Some(previous) = self.last_status.take() {
                log_info!("switching {} -> {}", previous.name(), current.name());
                self.ctx.is_running = false;
                self.dispatch(previous, Phase::Exit).await;
            }
            self.ctx = ModeContext::new(Instant::now(), self.config.telemetry_interval);
            self.dispatch(current, Phase::Enter).await;
            self.last_status = Some(current);
            if current == CarStatus::BtControl {
                log_warn!("bluetooth control is not available on this car");
            }
        }

        self.dispatch(current, Phase::Tick).await;

        let now = Instant::now();
        self.ctx.stamp_telemetry(now);
        let state = self.robot.state_copy();
        self.reporter.report(&mut self.peripherals.link, &state, now);
    }

    /// Runs the manager forever at the configured cadence
    pub async fn run(&mut self) -> ! {
        loop {
            self.tick().await;
            Timer::after(self.config.main_loop_period).await;
        }
    }

    /// Runs the currently requested mode until the status changes
    ///
    /// Blocking alternative to [`Self::tick`]: one call covers a whole mode
    /// activation from enter to exit, so no mode is active afterwards.
    pub async fn run_active_mode(&mut self) {
        self.refresh_display();
        if let Some(previous) = self.last_status.take() {
            self.ctx.is_running = false;
            self.dispatch(previous, Phase::Exit).await;
        }

        let status = self.robot.status();
        let robot = self.robot;
        let config = self.config;
        let peripherals = &mut self.peripherals;
        match status {
            CarStatus::Stop => run_mode_loop(robot, &mut self.standby, peripherals, &config).await,
            CarStatus::Trace => run_mode_loop(robot, &mut self.trace, peripherals, &config).await,
            CarStatus::ObstacleAvoidance => {
                run_mode_loop(robot, &mut self.obstacle, peripherals, &config).await
            }
            CarStatus::WifiControl => {
                run_mode_loop(robot, &mut self.remote, peripherals, &config).await
            }
            CarStatus::BtControl => Timer::after(config.main_loop_period).await,
        }
        self.last_status = None;
    }
}
