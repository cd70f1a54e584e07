//! Frame-driven simulation module
//!
//! All gameplay logic lives here. This module must stay platform-free:
//! - One `tick(dt)` per rendered frame, dt clamped before use
//! - Seeded RNG only (cosmetic rolls included)
//! - Pools and segment lists allocated once, mutated in place
//! - No rendering, audio or DOM dependencies

pub mod camera;
pub mod clock;
pub mod obstacles;
pub mod scroll;
pub mod speed;
pub mod state;
pub mod tick;
pub mod vehicle;

pub use camera::{CameraPose, CameraRig};
pub use clock::FrameClock;
pub use obstacles::{ObstacleHit, ObstacleKind, ObstaclePool, ObstacleSlot, PARKED_POSITION};
pub use scroll::{RoadSurface, ScrollEngine, SegmentKind, SlotPattern, WorldSegment};
pub use speed::{SpeedController, ThrottleState};
pub use state::{GameState, RngState, SessionPhase};
pub use tick::{FrameReport, tick};
pub use vehicle::{Attitude, InputEvent, Key, SteerState, VehicleController};
