//! Player car steering
//!
//! Input only ever moves the steering *target*. The car eases toward it a
//! fixed fraction per frame, and banking/bob are derived from that motion.

use serde::{Deserialize, Serialize};

use super::speed::ThrottleState;
use crate::config::RunnerConfig;

/// Logical keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Nitro,
    Brake,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code` to a game key
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Key::Left),
            "ArrowRight" | "KeyD" => Some(Key::Right),
            "ShiftLeft" | "ShiftRight" | "ArrowUp" | "KeyW" => Some(Key::Nitro),
            "Space" | "ArrowDown" | "KeyS" => Some(Key::Brake),
            _ => None,
        }
    }
}

/// Discrete input delivered by the platform layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Pointer position in client pixels with the viewport size
    PointerMove {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Steering state derived from the held keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SteerState {
    Idle,
    SteeringLeft,
    SteeringRight,
}

/// Cosmetic body attitude
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    /// Banking angle (radians), positive when the car lags to the right
    pub tilt: f32,
    /// Vertical offset from the ride height
    pub bob: f32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct HeldKeys {
    left: bool,
    right: bool,
    nitro: bool,
    brake: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleController {
    /// Current lateral offset from the road center
    pub lateral: f32,
    /// Input-driven goal, always within `[-limit, limit]`
    pub target_lateral: f32,
    pub attitude: Attitude,
    /// Accumulated wheel rotation (radians, wrapped)
    pub wheel_spin: f32,
    /// Last pointer position in normalized device coords, `[-1, 1]` each
    pub pointer_ndc: (f32, f32),
    held: HeldKeys,
    limit: f32,
    lateral_accel: f32,
    smoothing: f32,
    pointer_range: f32,
    tilt_gain: f32,
    max_tilt: f32,
    bob_frequency: f32,
    bob_amplitude: f32,
    wheel_spin_rate: f32,
}

impl VehicleController {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            lateral: 0.0,
            target_lateral: 0.0,
            attitude: Attitude::default(),
            wheel_spin: 0.0,
            pointer_ndc: (0.0, 0.0),
            held: HeldKeys::default(),
            limit: config.steering_limit(),
            lateral_accel: config.lateral_accel,
            smoothing: config.steering_smoothing,
            pointer_range: config.pointer_range,
            tilt_gain: config.tilt_gain,
            max_tilt: config.max_tilt,
            bob_frequency: config.bob_frequency,
            bob_amplitude: config.bob_amplitude,
            wheel_spin_rate: config.wheel_spin_rate,
        }
    }

    /// Steering limit either side of the road center
    pub fn limit(&self) -> f32 {
        self.limit
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.set_key(key, true),
            InputEvent::KeyUp(key) => self.set_key(key, false),
            InputEvent::PointerMove {
                x,
                y,
                width,
                height,
            } => {
                let usable = [x, y, width, height].iter().all(|v| v.is_finite())
                    && width > 0.0
                    && height > 0.0;
                if !usable {
                    return;
                }
                let nx = ((x / width) * 2.0 - 1.0).clamp(-1.0, 1.0);
                let ny = ((y / height) * 2.0 - 1.0).clamp(-1.0, 1.0);
                self.pointer_ndc = (nx, ny);
                // Pointer and keys share the target, last writer wins
                self.target_lateral = nx * self.limit * self.pointer_range;
                self.clamp_target();
            }
        }
    }

    fn set_key(&mut self, key: Key, down: bool) {
        match key {
            Key::Left => self.held.left = down,
            Key::Right => self.held.right = down,
            Key::Nitro => self.held.nitro = down,
            Key::Brake => self.held.brake = down,
        }
    }

    /// Release everything (focus loss, restart)
    pub fn release_all(&mut self) {
        self.held = HeldKeys::default();
    }

    pub fn steer_state(&self) -> SteerState {
        match (self.held.left, self.held.right) {
            (true, false) => SteerState::SteeringLeft,
            (false, true) => SteerState::SteeringRight,
            _ => SteerState::Idle,
        }
    }

    pub fn throttle(&self) -> ThrottleState {
        ThrottleState::from_held(self.held.nitro, self.held.brake)
    }

    fn clamp_target(&mut self) {
        self.target_lateral = self.target_lateral.clamp(-self.limit, self.limit);
    }

    /// Advance steering one frame
    ///
    /// `speed_ratio` is `current / max` speed and scales the bob, `elapsed`
    /// is simulated session time.
    pub fn update(&mut self, dt: f32, speed: f32, speed_ratio: f32, elapsed: f32) {
        match self.steer_state() {
            SteerState::SteeringLeft => self.target_lateral -= self.lateral_accel * dt,
            SteerState::SteeringRight => self.target_lateral += self.lateral_accel * dt,
            SteerState::Idle => {}
        }
        self.clamp_target();

        self.lateral += (self.target_lateral - self.lateral) * self.smoothing;

        let raw_tilt =
            ((self.lateral - self.target_lateral) * self.tilt_gain).clamp(-self.max_tilt, self.max_tilt);
        self.attitude.tilt += (raw_tilt - self.attitude.tilt) * self.smoothing;

        let bob_scale = speed_ratio.clamp(0.0, 1.0);
        self.attitude.bob = (elapsed * self.bob_frequency).sin() * self.bob_amplitude * bob_scale;

        self.wheel_spin =
            (self.wheel_spin + speed * dt * self.wheel_spin_rate).rem_euclid(std::f32::consts::TAU);
    }

    pub fn reset(&mut self) {
        self.lateral = 0.0;
        self.target_lateral = 0.0;
        self.attitude = Attitude::default();
        self.wheel_spin = 0.0;
        self.pointer_ndc = (0.0, 0.0);
        self.release_all();
    }
}
