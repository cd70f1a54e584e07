//! Chase camera
//!
//! Follows the car's lateral offset part of the way, looks slightly toward
//! the pointer, rolls with the car's banking and widens its FOV with speed.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::speed::ThrottleState;
use super::vehicle::VehicleController;
use crate::config::RunnerConfig;
use crate::damp_factor;

/// Where the camera is and how it looks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    /// Radians, positive turns left
    pub yaw: f32,
    /// Radians, positive looks up
    pub pitch: f32,
    pub roll: f32,
    /// Vertical field of view (degrees)
    pub fov: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRig {
    pub pose: CameraPose,
    height: f32,
    follow: f32,
    smoothing: f32,
    max_yaw: f32,
    max_pitch: f32,
    roll_gain: f32,
    base_fov: f32,
    speed_fov_boost: f32,
    nitro_fov_boost: f32,
}

impl CameraRig {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            pose: CameraPose {
                position: Vec3::new(0.0, config.camera_height, 0.0),
                yaw: 0.0,
                pitch: 0.0,
                roll: 0.0,
                fov: config.base_fov,
            },
            height: config.camera_height,
            follow: config.camera_follow,
            smoothing: config.camera_smoothing,
            max_yaw: config.camera_max_yaw,
            max_pitch: config.camera_max_pitch,
            roll_gain: config.camera_roll_gain,
            base_fov: config.base_fov,
            speed_fov_boost: config.speed_fov_boost,
            nitro_fov_boost: config.nitro_fov_boost,
        }
    }

    /// Pose the rig wants this frame, before smoothing
    pub fn desired_pose(&self, vehicle: &VehicleController, speed_ratio: f32) -> CameraPose {
        let (nx, ny) = vehicle.pointer_ndc;
        let nitro = if vehicle.throttle() == ThrottleState::Nitro {
            self.nitro_fov_boost
        } else {
            0.0
        };
        CameraPose {
            position: Vec3::new(
                vehicle.lateral * self.follow,
                self.height + vehicle.attitude.bob * 0.5,
                0.0,
            ),
            yaw: -nx * self.max_yaw,
            pitch: -ny * self.max_pitch,
            roll: vehicle.attitude.tilt * self.roll_gain,
            fov: self.base_fov + speed_ratio.clamp(0.0, 1.0) * self.speed_fov_boost + nitro,
        }
    }

    /// Ease toward the desired pose
    pub fn update(&mut self, vehicle: &VehicleController, speed_ratio: f32, dt: f32) {
        let target = self.desired_pose(vehicle, speed_ratio);
        let t = damp_factor(self.smoothing, dt);
        let pose = &mut self.pose;
        pose.position = pose.position.lerp(target.position, t);
        pose.yaw += (target.yaw - pose.yaw) * t;
        pose.pitch += (target.pitch - pose.pitch) * t;
        pose.roll += (target.roll - pose.roll) * t;
        pose.fov += (target.fov - pose.fov) * t;
    }

    /// Jump straight to the desired pose (restart)
    pub fn snap(&mut self, vehicle: &VehicleController, speed_ratio: f32) {
        self.pose = self.desired_pose(vehicle, speed_ratio);
    }
}
