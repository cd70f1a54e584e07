//! Game state and session control
//!
//! `GameState` owns every simulation component. Collaborators reach it only
//! through input events, `tick`, the session calls and read-only accessors.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::CameraRig;
use super::clock::FrameClock;
use super::obstacles::ObstaclePool;
use super::scroll::ScrollEngine;
use super::speed::SpeedController;
use super::vehicle::{InputEvent, VehicleController};
use crate::config::{ConfigError, RunnerConfig};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Built, waiting for `start()`
    Ready,
    /// Frames advance the simulation
    Running,
    /// Frames are ignored until `resume()`
    Paused,
}

/// Seed wrapper handing out independent RNG streams
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    const WORLD_STREAM: u64 = 1;
    const OBSTACLE_STREAM: u64 = 2;

    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn stream(&self, stream: u64) -> Pcg32 {
        Pcg32::new(self.seed, stream)
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub(super) config: RunnerConfig,
    pub(super) rng_state: RngState,
    pub(super) phase: SessionPhase,
    pub(super) clock: FrameClock,
    pub(super) speed: SpeedController,
    pub(super) vehicle: VehicleController,
    pub(super) world: ScrollEngine,
    pub(super) obstacles: ObstaclePool,
    pub(super) camera: CameraRig,
    /// Distance covered this run
    pub(super) distance: f64,
}

impl GameState {
    /// Build a session, refusing invalid configuration
    pub fn new(config: RunnerConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng_state = RngState::new(seed);
        let vehicle = VehicleController::new(&config);
        let mut camera = CameraRig::new(&config);
        camera.snap(&vehicle, 0.0);

        Ok(Self {
            rng_state,
            phase: SessionPhase::Ready,
            clock: FrameClock::new(config.max_dt),
            speed: SpeedController::new(&config),
            vehicle,
            world: ScrollEngine::new(&config, rng_state.stream(RngState::WORLD_STREAM)),
            obstacles: ObstaclePool::new(&config, rng_state.stream(RngState::OBSTACLE_STREAM)),
            camera,
            distance: 0.0,
            config,
        })
    }

    /// Begin running (no-op while already running or paused)
    pub fn start(&mut self) {
        if self.phase == SessionPhase::Ready {
            self.phase = SessionPhase::Running;
            log::info!("Run started (seed {})", self.rng_state.seed);
        }
    }

    pub fn pause(&mut self) {
        if self.phase == SessionPhase::Running {
            self.phase = SessionPhase::Paused;
            log::info!("Paused at {:.0}m", self.distance);
        }
    }

    pub fn resume(&mut self) {
        if self.phase == SessionPhase::Paused {
            self.phase = SessionPhase::Running;
            log::info!("Resumed");
        }
    }

    /// Rebuild every component from the session seed and start running
    pub fn restart(&mut self) {
        let seed = self.rng_state.seed;
        self.clock.reset();
        self.speed.reset();
        self.vehicle.reset();
        self.world = ScrollEngine::new(&self.config, self.rng_state.stream(RngState::WORLD_STREAM));
        self.obstacles =
            ObstaclePool::new(&self.config, self.rng_state.stream(RngState::OBSTACLE_STREAM));
        self.camera.snap(&self.vehicle, 0.0);
        self.distance = 0.0;
        self.phase = SessionPhase::Running;
        log::info!("Run restarted (seed {})", seed);
    }

    /// Forward a platform input event to the car
    pub fn handle_input(&mut self, event: InputEvent) {
        self.vehicle.handle_event(event);
    }

    /// Drop held keys, e.g. when the window loses focus
    pub fn release_input(&mut self) {
        self.vehicle.release_all();
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Distance covered this run (HUD)
    pub fn distance_traveled(&self) -> f64 {
        self.distance
    }

    /// Current forward speed (HUD)
    pub fn current_speed(&self) -> f32 {
        self.speed.current
    }

    /// Simulated seconds this run
    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn speed(&self) -> &SpeedController {
        &self.speed
    }

    pub fn vehicle(&self) -> &VehicleController {
        &self.vehicle
    }

    pub fn world(&self) -> &ScrollEngine {
        &self.world
    }

    pub fn obstacles(&self) -> &ObstaclePool {
        &self.obstacles
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }
}
