//! Per-frame update
//!
//! The driver calls `tick` once per rendered frame with the raw frame delta.
//! Speed updates first so the world, the car and the obstacles all consume
//! this frame's speed.

use serde::{Deserialize, Serialize};

use super::obstacles::ObstacleHit;
use super::state::{GameState, SessionPhase};

/// What happened during one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// False when the session was not running and nothing moved
    pub advanced: bool,
    /// Clamped delta actually integrated
    pub dt: f32,
    pub speed: f32,
    pub distance: f64,
    /// Obstacle overlapping the car this frame, if any
    pub collision: Option<ObstacleHit>,
    pub recycled_segments: usize,
    pub retired_obstacles: usize,
}

impl FrameReport {
    fn idle(state: &GameState) -> Self {
        Self {
            advanced: false,
            dt: 0.0,
            speed: state.speed.current,
            distance: state.distance,
            collision: None,
            recycled_segments: 0,
            retired_obstacles: 0,
        }
    }

    /// Polled collision flag
    pub fn hit(&self) -> bool {
        self.collision.is_some()
    }
}

/// Advance the session by one frame
pub fn tick(state: &mut GameState, raw_dt: f32) -> FrameReport {
    if state.phase != SessionPhase::Running {
        return FrameReport::idle(state);
    }

    let dt = state.clock.advance(raw_dt);

    let throttle = state.vehicle.throttle();
    let speed = state.speed.update(throttle, dt);
    let speed_ratio = state.speed.speed_ratio();

    let recycled_segments = state.world.update(speed, dt);

    state
        .vehicle
        .update(dt, speed, speed_ratio, state.clock.elapsed());

    let retired_obstacles = state.obstacles.update(speed, dt);

    state.distance += (speed * dt) as f64;

    state.camera.update(&state.vehicle, speed_ratio, dt);

    let collision = state.obstacles.check_collision(
        state.vehicle.lateral,
        state.config.vehicle_travel_pos,
        state.config.vehicle_hitbox_radius,
    );
    if let Some(hit) = collision {
        log::debug!("Collision with {:?} in slot {}", hit.kind, hit.slot);
    }

    FrameReport {
        advanced: true,
        dt,
        speed,
        distance: state.distance,
        collision,
        recycled_segments,
        retired_obstacles,
    }
}

impl GameState {
    /// Advance one frame (see [`tick`])
    pub fn tick(&mut self, raw_dt: f32) -> FrameReport {
        tick(self, raw_dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::sim::obstacles::ObstacleKind;
    use crate::sim::vehicle::{InputEvent, Key};

    const DT: f32 = 1.0 / 60.0;

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(RunnerConfig::default(), seed).expect("valid config");
        state.start();
        state
    }

    #[test]
    fn test_ready_does_not_advance() {
        let mut state = GameState::new(RunnerConfig::default(), 3).expect("valid config");
        let report = tick(&mut state, DT);
        assert!(!report.advanced);
        assert_eq!(state.elapsed(), 0.0);
        assert_eq!(state.distance_traveled(), 0.0);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut state = running(3);
        for _ in 0..120 {
            tick(&mut state, DT);
        }
        state.pause();

        let segments = state.world().segments().to_vec();
        let obstacles = state.obstacles().slots().to_vec();
        let distance = state.distance_traveled();
        let speed = state.current_speed();
        let lateral = state.vehicle().lateral;

        state.handle_input(InputEvent::KeyDown(Key::Left));
        for _ in 0..60 {
            let report = tick(&mut state, DT);
            assert!(!report.advanced);
        }

        assert_eq!(state.world().segments(), segments.as_slice());
        assert_eq!(state.obstacles().slots(), obstacles.as_slice());
        assert_eq!(state.distance_traveled(), distance);
        assert_eq!(state.current_speed(), speed);
        assert_eq!(state.vehicle().lateral, lateral);

        state.resume();
        assert!(tick(&mut state, DT).advanced);
        assert!(state.vehicle().lateral < lateral);
    }

    #[test]
    fn test_dt_spike_is_clamped() {
        let mut state = running(3);
        let report = tick(&mut state, 5.0);
        assert_eq!(report.dt, 0.1);
        let report = tick(&mut state, -1.0);
        assert_eq!(report.dt, 0.0);
    }

    #[test]
    fn test_distance_accumulates() {
        let mut state = running(3);
        for _ in 0..600 {
            tick(&mut state, DT);
        }
        let report = tick(&mut state, DT);
        assert!(report.distance > 0.0);
        assert_eq!(report.distance, state.distance_traveled());
        assert!(report.speed > 0.0 && report.speed < 80.0);
    }

    #[test]
    fn test_brake_lowers_speed() {
        let mut state = running(3);
        for _ in 0..1200 {
            tick(&mut state, DT);
        }
        let cruising = state.current_speed();
        state.handle_input(InputEvent::KeyDown(Key::Brake));
        for _ in 0..600 {
            tick(&mut state, DT);
        }
        assert!(state.current_speed() < cruising);
        assert!(state.current_speed() >= 24.0);
        assert!((state.speed().target - 24.0).abs() < 1e-4);
    }

    #[test]
    fn test_world_and_obstacles_use_this_frames_speed() {
        let mut state = running(3);
        assert_eq!(state.current_speed(), 0.0);

        let far = state
            .world()
            .segments()
            .iter()
            .position(|s| s.kind == crate::sim::SegmentKind::Marking && s.position.z == -1950.0)
            .expect("far marking");
        let marking_z = state.world().segments()[far].position.z;
        let index = state
            .obstacles
            .spawn(ObstacleKind::Barrier, 0.0)
            .expect("free slot");
        let obstacle_z = state.obstacles().slots()[index].position.z;

        let report = tick(&mut state, DT);
        let delta = report.speed * report.dt;
        // Last frame's speed was zero, so a stale read would not move anything
        assert!(delta > 0.0);
        assert_eq!(report.speed, state.current_speed());
        assert_eq!(state.world().segments()[far].position.z, marking_z + delta);
        assert_eq!(state.obstacles().slots()[index].position.z, obstacle_z + delta);
    }

    #[test]
    fn test_collision_is_polled() {
        let mut state = running(3);
        let index = state
            .obstacles
            .spawn(ObstacleKind::Box, 0.0)
            .expect("free slot");
        // Right under the car
        state.obstacles.slot_mut(index).position.z = -5.0;
        let report = tick(&mut state, 0.0);
        assert!(report.hit());
        assert_eq!(report.collision.map(|h| h.kind), Some(ObstacleKind::Box));

        // Still running; the caller decides what a hit means
        assert_eq!(state.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_restart_is_deterministic() {
        let mut state = running(42);
        for _ in 0..300 {
            tick(&mut state, DT);
        }
        let first: Vec<_> = state.world().segments().to_vec();
        let first_obstacles = state.obstacles().slots().to_vec();

        state.restart();
        assert_eq!(state.distance_traveled(), 0.0);
        for _ in 0..300 {
            tick(&mut state, DT);
        }
        assert_eq!(state.world().segments(), first.as_slice());
        assert_eq!(state.obstacles().slots(), first_obstacles.as_slice());
    }

    #[test]
    fn test_determinism() {
        // Two states with the same seed and input produce identical results
        let mut state1 = running(99999);
        let mut state2 = running(99999);

        let inputs = [
            InputEvent::KeyDown(Key::Right),
            InputEvent::KeyDown(Key::Nitro),
            InputEvent::PointerMove {
                x: 200.0,
                y: 100.0,
                width: 800.0,
                height: 600.0,
            },
            InputEvent::KeyUp(Key::Nitro),
        ];

        for input in inputs {
            state1.handle_input(input);
            state2.handle_input(input);
            for _ in 0..90 {
                tick(&mut state1, DT);
                tick(&mut state2, DT);
            }
        }

        assert_eq!(state1.world().segments(), state2.world().segments());
        assert_eq!(state1.obstacles().slots(), state2.obstacles().slots());
        assert_eq!(state1.vehicle().lateral, state2.vehicle().lateral);
        assert_eq!(state1.distance_traveled(), state2.distance_traveled());
    }
}
