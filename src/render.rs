//! Rendering collaborator boundary
//!
//! The simulation never touches meshes or materials. After each tick the
//! driver captures a `RenderFrame` of plain per-entity data and hands it to
//! whatever `RenderSink` is drawing; a sink whose assets are still loading
//! simply draws less.

use bytemuck::{Pod, Zeroable};

use crate::sim::{CameraPose, GameState, SegmentKind};

/// Which list an instance belongs to
pub mod layer {
    pub const SCENERY: u32 = 0;
    pub const OBSTACLE: u32 = 1;
    pub const VEHICLE: u32 = 2;
}

/// One drawable entity, laid out for direct upload as GPU instance data
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    pub travel_axis: f32,
    pub lateral: f32,
    pub vertical: f32,
    /// Radians (spin for obstacles, bank for the car)
    pub rotation: f32,
    /// Height for buildings/bridges, visual radius for obstacles, 1 otherwise
    pub scale: f32,
    pub visual_variant: u32,
    /// Kind tag within the layer
    pub kind: u32,
    pub layer: u32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub scenery: Vec<RenderInstance>,
    pub obstacles: Vec<RenderInstance>,
    pub vehicle: RenderInstance,
    pub wheel_spin: f32,
    pub camera: CameraPose,
    /// Road texture V offset in `[0, 1)`
    pub road_offset: f32,
}

impl RenderFrame {
    /// Empty frame with room for a session's entities
    pub fn for_state(state: &GameState) -> Self {
        let mut frame = Self {
            scenery: Vec::with_capacity(state.world().segments().len()),
            obstacles: Vec::with_capacity(state.obstacles().capacity()),
            vehicle: RenderInstance::default(),
            wheel_spin: 0.0,
            camera: state.camera().pose,
            road_offset: 0.0,
        };
        frame.capture(state);
        frame
    }

    /// Refill from the current state, reusing the existing allocations
    pub fn capture(&mut self, state: &GameState) {
        self.scenery.clear();
        self.scenery.extend(state.world().segments().iter().map(|segment| {
            let scale = match segment.kind {
                SegmentKind::Building { height, .. }
                | SegmentKind::Bridge { height } => height,
                SegmentKind::Prop { .. } | SegmentKind::Marking => 1.0,
            };
            RenderInstance {
                travel_axis: segment.position.z,
                lateral: segment.position.x,
                vertical: segment.position.y,
                rotation: 0.0,
                scale,
                visual_variant: segment.kind.variant(),
                kind: segment.kind.tag(),
                layer: layer::SCENERY,
            }
        }));

        self.obstacles.clear();
        self.obstacles.extend(state.obstacles().active().map(|slot| RenderInstance {
            travel_axis: slot.position.z,
            lateral: slot.position.x,
            vertical: slot.position.y,
            rotation: slot.rotation,
            scale: slot.kind.visual_radius(),
            visual_variant: 0,
            kind: slot.kind.tag(),
            layer: layer::OBSTACLE,
        }));

        let vehicle = state.vehicle();
        let config = state.config();
        self.vehicle = RenderInstance {
            travel_axis: config.vehicle_travel_pos,
            lateral: vehicle.lateral,
            vertical: crate::consts::VEHICLE_RIDE_HEIGHT + vehicle.attitude.bob,
            rotation: vehicle.attitude.tilt,
            scale: 1.0,
            visual_variant: vehicle.throttle() as u32,
            kind: 0,
            layer: layer::VEHICLE,
        };
        self.wheel_spin = vehicle.wheel_spin;
        self.camera = state.camera().pose;
        self.road_offset = state.world().road().offset;
    }

    /// Byte views of the scenery, obstacle and car instances, in draw order
    pub fn instance_bytes(&self) -> [&[u8]; 3] {
        [
            bytemuck::cast_slice(&self.scenery),
            bytemuck::cast_slice(&self.obstacles),
            bytemuck::bytes_of(&self.vehicle),
        ]
    }

    /// Pack every instance into `out`, reusing its allocation
    pub fn write_instances(&self, out: &mut Vec<u8>) {
        out.clear();
        for bytes in self.instance_bytes() {
            out.extend_from_slice(bytes);
        }
    }
}

/// Something that draws frames
pub trait RenderSink {
    /// Whether assets are loaded; the simulation runs either way
    fn is_ready(&self) -> bool {
        true
    }

    fn draw(&mut self, frame: &RenderFrame);
}
