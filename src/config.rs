//! Game tuning loaded once at construction
//!
//! Every field has a default matching the shipped game, and a JSON document
//! only needs to name the values it overrides. Invalid values are rejected
//! before any simulation state is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Why a configuration was refused
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("{field} must be non-zero")]
    Zero { field: &'static str },
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange { field: &'static str, min: f32, max: f32 },
    #[error("road is too narrow for the vehicle: steering limit {limit}")]
    RoadTooNarrow { limit: f32 },
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Static tuning for one game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    // === Frame ===
    /// Largest dt integrated in one frame (seconds)
    pub max_dt: f32,

    // === Road & vehicle ===
    pub road_width: f32,
    /// Gap kept between the car and the road edge
    pub road_margin: f32,
    pub vehicle_half_width: f32,
    pub vehicle_hitbox_radius: f32,
    /// Car position on the travel axis (camera sits at 0)
    pub vehicle_travel_pos: f32,
    /// Rate the steering target moves while a key is held (units/s)
    pub lateral_accel: f32,
    /// Per-frame fraction of the remaining gap closed, keep in (0, 1)
    pub steering_smoothing: f32,
    /// Fraction of the steering limit reachable with the pointer
    pub pointer_range: f32,
    pub tilt_gain: f32,
    pub max_tilt: f32,
    pub bob_frequency: f32,
    pub bob_amplitude: f32,
    pub wheel_spin_rate: f32,

    // === Speed ===
    pub start_speed: f32,
    pub max_speed: f32,
    /// Exponential approach rate toward the target speed (1/s)
    pub acceleration: f32,
    pub nitro_factor: f32,
    pub brake_factor: f32,

    // === World streaming ===
    pub chunk_size: f32,
    pub chunk_count: u32,
    /// Segments at or past this travel coordinate are recycled
    pub pass_threshold: f32,
    /// Slots per spawn cycle
    pub cycle_length: u32,
    /// Leading slots of each cycle that are dense city blocks
    pub dense_slots: u32,
    /// Every n-th slot is a landmark bridge (0 disables)
    pub landmark_every: u32,
    /// Lateral distance from road center to building fronts
    pub building_setback: f32,
    pub building_height_min: f32,
    pub building_height_max: f32,
    pub landmark_height: f32,
    pub building_variants: u32,
    pub prop_variants: u32,
    /// Road texture offset per unit travelled
    pub road_texture_scale: f32,

    // === Obstacles ===
    pub pool_capacity: usize,
    pub spawn_distance: f32,
    pub obstacle_pass_threshold: f32,
    pub spawn_base_interval: f32,
    pub spawn_min_interval: f32,
    pub spawn_speed_divisor: f32,
    /// Spawn timer only runs above this speed
    pub spawn_min_speed: f32,
    /// Fraction of the road width obstacles may be placed across
    pub spawn_lateral_spread: f32,

    // === Camera ===
    pub camera_height: f32,
    pub camera_follow: f32,
    pub camera_smoothing: f32,
    pub camera_max_yaw: f32,
    pub camera_max_pitch: f32,
    pub camera_roll_gain: f32,
    pub base_fov: f32,
    pub speed_fov_boost: f32,
    pub nitro_fov_boost: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_dt: MAX_FRAME_DT,

            road_width: ROAD_WIDTH,
            road_margin: ROAD_MARGIN,
            vehicle_half_width: VEHICLE_HALF_WIDTH,
            vehicle_hitbox_radius: VEHICLE_HITBOX_RADIUS,
            vehicle_travel_pos: VEHICLE_TRAVEL_POS,
            lateral_accel: 30.0,
            steering_smoothing: 0.1,
            pointer_range: 0.8,
            tilt_gain: 0.05,
            max_tilt: 0.4,
            bob_frequency: 12.0,
            bob_amplitude: 0.05,
            wheel_spin_rate: 0.5,

            start_speed: 0.0,
            max_speed: MAX_SPEED,
            acceleration: ACCELERATION,
            nitro_factor: NITRO_FACTOR,
            brake_factor: BRAKE_FACTOR,

            chunk_size: CHUNK_SIZE,
            chunk_count: CHUNK_COUNT,
            pass_threshold: SEGMENT_PASS_THRESHOLD,
            cycle_length: 20,
            dense_slots: 15,
            landmark_every: 40,
            building_setback: 28.0,
            building_height_min: 20.0,
            building_height_max: 120.0,
            landmark_height: 180.0,
            building_variants: 6,
            prop_variants: 4,
            road_texture_scale: 0.05,

            pool_capacity: POOL_CAPACITY,
            spawn_distance: OBSTACLE_SPAWN_DISTANCE,
            obstacle_pass_threshold: OBSTACLE_PASS_THRESHOLD,
            spawn_base_interval: 1.5,
            spawn_min_interval: 0.35,
            spawn_speed_divisor: 100.0,
            spawn_min_speed: 1.0,
            spawn_lateral_spread: 0.7,

            camera_height: CAMERA_HEIGHT,
            camera_follow: 0.6,
            camera_smoothing: 6.0,
            camera_max_yaw: 0.15,
            camera_max_pitch: 0.08,
            camera_roll_gain: 0.5,
            base_fov: CAMERA_FOV,
            speed_fov_boost: 10.0,
            nitro_fov_boost: 8.0,
        }
    }
}

impl RunnerConfig {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loading config from {}", path.display());
        Self::from_json(&json)
    }

    /// Half the road width
    pub fn road_half_width(&self) -> f32 {
        self.road_width / 2.0
    }

    /// Furthest the steering target may sit from the road center
    pub fn steering_limit(&self) -> f32 {
        self.road_half_width() - self.vehicle_half_width - self.road_margin
    }

    /// Length of the streamed world loop
    pub fn world_length(&self) -> f32 {
        self.chunk_size * self.chunk_count as f32
    }

    /// Reject values that would make recycling, pooling or steering undefined
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Fields with no range of their own still have to be real numbers
        for (field, value) in [
            ("vehicle_travel_pos", self.vehicle_travel_pos),
            ("tilt_gain", self.tilt_gain),
            ("bob_frequency", self.bob_frequency),
            ("wheel_spin_rate", self.wheel_spin_rate),
            ("pass_threshold", self.pass_threshold),
            ("building_setback", self.building_setback),
            ("building_height_max", self.building_height_max),
            ("landmark_height", self.landmark_height),
            ("road_texture_scale", self.road_texture_scale),
            ("spawn_distance", self.spawn_distance),
            ("obstacle_pass_threshold", self.obstacle_pass_threshold),
            ("spawn_base_interval", self.spawn_base_interval),
            ("spawn_min_speed", self.spawn_min_speed),
            ("camera_height", self.camera_height),
            ("camera_follow", self.camera_follow),
            ("camera_max_yaw", self.camera_max_yaw),
            ("camera_max_pitch", self.camera_max_pitch),
            ("camera_roll_gain", self.camera_roll_gain),
            ("speed_fov_boost", self.speed_fov_boost),
            ("nitro_fov_boost", self.nitro_fov_boost),
        ] {
            finite(field, value)?;
        }

        positive("max_dt", self.max_dt)?;
        positive("road_width", self.road_width)?;
        non_negative("road_margin", self.road_margin)?;
        positive("vehicle_half_width", self.vehicle_half_width)?;
        positive("vehicle_hitbox_radius", self.vehicle_hitbox_radius)?;
        non_negative("lateral_accel", self.lateral_accel)?;
        unit("steering_smoothing", self.steering_smoothing)?;
        unit("pointer_range", self.pointer_range)?;
        non_negative("max_tilt", self.max_tilt)?;
        non_negative("landmark_height", self.landmark_height)?;
        non_negative("bob_amplitude", self.bob_amplitude)?;

        let limit = self.steering_limit();
        if limit <= 0.0 {
            return Err(ConfigError::RoadTooNarrow { limit });
        }

        non_negative("start_speed", self.start_speed)?;
        positive("max_speed", self.max_speed)?;
        positive("acceleration", self.acceleration)?;
        positive("nitro_factor", self.nitro_factor)?;
        unit("brake_factor", self.brake_factor)?;

        positive("chunk_size", self.chunk_size)?;
        if self.chunk_count == 0 {
            return Err(ConfigError::Zero {
                field: "chunk_count",
            });
        }
        if self.cycle_length == 0 {
            return Err(ConfigError::Zero {
                field: "cycle_length",
            });
        }
        if self.dense_slots > self.cycle_length {
            return Err(ConfigError::OutOfRange {
                field: "dense_slots",
                value: self.dense_slots as f32,
                min: 0.0,
                max: self.cycle_length as f32,
            });
        }
        positive("building_height_min", self.building_height_min)?;
        if self.building_height_min > self.building_height_max {
            return Err(ConfigError::InvertedRange {
                field: "building_height",
                min: self.building_height_min,
                max: self.building_height_max,
            });
        }
        if self.building_variants == 0 {
            return Err(ConfigError::Zero {
                field: "building_variants",
            });
        }
        if self.prop_variants == 0 {
            return Err(ConfigError::Zero {
                field: "prop_variants",
            });
        }

        if self.pool_capacity == 0 {
            return Err(ConfigError::Zero {
                field: "pool_capacity",
            });
        }
        if self.spawn_distance >= self.obstacle_pass_threshold {
            return Err(ConfigError::InvertedRange {
                field: "spawn_distance",
                min: self.spawn_distance,
                max: self.obstacle_pass_threshold,
            });
        }
        positive("spawn_min_interval", self.spawn_min_interval)?;
        positive("spawn_speed_divisor", self.spawn_speed_divisor)?;
        if self.spawn_min_interval > self.spawn_base_interval {
            return Err(ConfigError::InvertedRange {
                field: "spawn_interval",
                min: self.spawn_min_interval,
                max: self.spawn_base_interval,
            });
        }
        unit("spawn_lateral_spread", self.spawn_lateral_spread)?;

        non_negative("camera_smoothing", self.camera_smoothing)?;
        if !(1.0..=170.0).contains(&self.base_fov) {
            return Err(ConfigError::OutOfRange {
                field: "base_fov",
                value: self.base_fov,
                min: 1.0,
                max: 170.0,
            });
        }

        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: f32::INFINITY,
        })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RunnerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world_length(), 2000.0);
        assert!((config.steering_limit() - 18.4).abs() < 1e-4);
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = RunnerConfig::from_json(r#"{ "max_speed": 120.0, "chunk_count": 10 }"#)
            .expect("valid config");
        assert_eq!(config.max_speed, 120.0);
        assert_eq!(config.chunk_count, 10);
        assert_eq!(config.road_width, ROAD_WIDTH);
    }

    #[test]
    fn test_rejects_negative_chunk_size() {
        let config = RunnerConfig {
            chunk_size: -50.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "chunk_size",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_empty_pool() {
        let config = RunnerConfig {
            pool_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero {
                field: "pool_capacity"
            })
        ));
    }

    #[test]
    fn test_rejects_narrow_road() {
        let config = RunnerConfig {
            road_width: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RoadTooNarrow { .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        // 1e39 overflows f32 and parses as infinity
        for json in [
            r#"{ "chunk_size": 1e39 }"#,
            r#"{ "max_dt": 1e39 }"#,
            r#"{ "building_height_max": 1e39 }"#,
            r#"{ "landmark_height": 1e39 }"#,
            r#"{ "pass_threshold": -1e39 }"#,
            r#"{ "spawn_distance": -1e39 }"#,
            r#"{ "spawn_base_interval": 1e39 }"#,
            r#"{ "steering_smoothing": 1e39 }"#,
        ] {
            assert!(
                matches!(
                    RunnerConfig::from_json(json),
                    Err(ConfigError::NonFinite { .. })
                ),
                "accepted {json}"
            );
        }

        let config = RunnerConfig {
            acceleration: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite {
                field: "acceleration",
                ..
            })
        ));
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        assert!(matches!(
            RunnerConfig::from_file("/nonexistent/neon-runner.json"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            RunnerConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_values() {
        let config = RunnerConfig {
            nitro_factor: 2.0,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let back = RunnerConfig::from_json(&json).expect("parse");
        assert_eq!(config, back);
    }
}
