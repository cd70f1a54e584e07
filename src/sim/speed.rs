//! Forward speed integration
//!
//! Speed eases toward a target derived from the max speed and the current
//! throttle. The exponential form is exact for any dt, so `current` can
//! never step past `target`.

use serde::{Deserialize, Serialize};

use crate::config::RunnerConfig;
use crate::{damp_factor, lerp};

/// Throttle modifier selected by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThrottleState {
    #[default]
    Normal,
    Nitro,
    Braking,
}

impl ThrottleState {
    /// Resolve the held keys; braking wins when both are signalled
    pub fn from_held(nitro: bool, brake: bool) -> Self {
        if brake {
            ThrottleState::Braking
        } else if nitro {
            ThrottleState::Nitro
        } else {
            ThrottleState::Normal
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedController {
    pub current: f32,
    pub target: f32,
    start_speed: f32,
    max_speed: f32,
    rate: f32,
    nitro_factor: f32,
    brake_factor: f32,
}

impl SpeedController {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            current: config.start_speed,
            target: config.max_speed,
            start_speed: config.start_speed,
            max_speed: config.max_speed,
            rate: config.acceleration,
            nitro_factor: config.nitro_factor,
            brake_factor: config.brake_factor,
        }
    }

    /// Target speed for a throttle state
    pub fn target_for(&self, throttle: ThrottleState) -> f32 {
        let factor = match throttle {
            ThrottleState::Normal => 1.0,
            ThrottleState::Nitro => self.nitro_factor,
            ThrottleState::Braking => self.brake_factor,
        };
        self.max_speed * factor
    }

    /// Advance one frame and return the new current speed
    pub fn update(&mut self, throttle: ThrottleState, dt: f32) -> f32 {
        self.target = self.target_for(throttle);
        self.current = lerp(self.current, self.target, damp_factor(self.rate, dt));
        self.current
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// `current / max_speed`, above 1 while nitro is effective
    pub fn speed_ratio(&self) -> f32 {
        self.current / self.max_speed
    }

    pub fn reset(&mut self) {
        self.current = self.start_speed;
        self.target = self.max_speed;
    }
}
