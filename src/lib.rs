//! Neon Runner - An endless cyberpunk city runner
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (world streaming, obstacles, steering, speed)
//! - `config`: Load-once game tuning with construction-time validation
//! - `render`: Plain per-entity data handed to the rendering collaborator

pub mod config;
pub mod render;
pub mod sim;

pub use config::{ConfigError, RunnerConfig};
pub use render::{RenderFrame, RenderInstance, RenderSink};
pub use sim::{FrameReport, GameState, InputEvent, Key, SessionPhase};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the simulation will integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Road dimensions
    pub const ROAD_WIDTH: f32 = 40.0;
    pub const ROAD_MARGIN: f32 = 0.5;

    /// Player car footprint (body mesh is 2.2 x 1.0 x 4.5)
    pub const VEHICLE_HALF_WIDTH: f32 = 1.1;
    pub const VEHICLE_HITBOX_RADIUS: f32 = 0.75;
    /// Car sits slightly ahead of the camera on the travel axis
    pub const VEHICLE_TRAVEL_POS: f32 = -5.0;
    pub const VEHICLE_RIDE_HEIGHT: f32 = 0.5;

    /// Speed defaults
    pub const MAX_SPEED: f32 = 80.0;
    pub const ACCELERATION: f32 = 0.8;
    pub const NITRO_FACTOR: f32 = 1.8;
    pub const BRAKE_FACTOR: f32 = 0.3;

    /// World streaming defaults (world length = 2000)
    pub const CHUNK_SIZE: f32 = 50.0;
    pub const CHUNK_COUNT: u32 = 40;
    pub const SEGMENT_PASS_THRESHOLD: f32 = 50.0;

    /// Obstacle defaults
    pub const POOL_CAPACITY: usize = 30;
    pub const OBSTACLE_SPAWN_DISTANCE: f32 = -150.0;
    pub const OBSTACLE_PASS_THRESHOLD: f32 = 20.0;

    /// Camera defaults
    pub const CAMERA_HEIGHT: f32 = 2.5;
    pub const CAMERA_FOV: f32 = 75.0;
}

/// Linear interpolation from `a` to `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Frame-rate independent smoothing factor in `[0, 1)` for rate `k`
///
/// `lerp(current, target, damp_factor(k, dt))` approaches `target` without
/// overshooting, no matter how `dt` is sliced.
#[inline]
pub fn damp_factor(k: f32, dt: f32) -> f32 {
    if k <= 0.0 || dt <= 0.0 {
        return 0.0;
    }
    1.0 - (-k * dt).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damp_factor_bounds() {
        assert_eq!(damp_factor(0.8, 0.0), 0.0);
        assert_eq!(damp_factor(0.0, 1.0), 0.0);
        let f = damp_factor(0.8, 1.0 / 60.0);
        assert!(f > 0.0 && f < 1.0);
        // Huge steps saturate at 1 but never exceed it
        assert!(damp_factor(10.0, 100.0) <= 1.0);
    }

    #[test]
    fn test_damp_factor_is_split_invariant() {
        // Two half steps land where one full step does
        let k = 2.0;
        let one = lerp(0.0, 1.0, damp_factor(k, 0.2));
        let half = lerp(0.0, 1.0, damp_factor(k, 0.1));
        let two = lerp(half, 1.0, damp_factor(k, 0.1));
        assert!((one - two).abs() < 1e-5);
    }
}
