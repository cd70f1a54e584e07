//! Endless world streaming
//!
//! A fixed ring of scenery segments is laid out along the travel axis, one
//! group per chunk slot. Each frame everything slides toward the camera
//! (+Z); a segment that reaches the pass threshold is moved back by whole
//! world lengths, so slot spacing never drifts however the chunk size and
//! count are tuned.
//!
//! Slot contents follow a repeating pattern keyed by spawn index: a run of
//! dense city blocks, a run of sparse roadside props, and a landmark bridge
//! every `landmark_every` slots.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::RunnerConfig;

/// Visual category of a segment, with its cosmetic parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Neon tower lining the road
    Building { height: f32, variant: u32 },
    /// Roadside prop (lamp, billboard, barrier light)
    Prop { variant: u32 },
    /// Oversized structure spanning the road
    Bridge { height: f32 },
    /// Lane marking on the road surface
    Marking,
}

impl SegmentKind {
    /// Stable numeric tag for the render collaborator
    pub fn tag(&self) -> u32 {
        match self {
            SegmentKind::Building { .. } => 0,
            SegmentKind::Prop { .. } => 1,
            SegmentKind::Bridge { .. } => 2,
            SegmentKind::Marking => 3,
        }
    }

    /// Visual variant index (0 for kinds without variants)
    pub fn variant(&self) -> u32 {
        match self {
            SegmentKind::Building { variant, .. } | SegmentKind::Prop { variant } => *variant,
            SegmentKind::Bridge { .. } | SegmentKind::Marking => 0,
        }
    }

    /// True when both kinds are the same category, ignoring parameters
    pub fn same_category(&self, other: &SegmentKind) -> bool {
        self.tag() == other.tag()
    }
}

/// What a chunk slot spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotPattern {
    /// Buildings on both sides
    Dense,
    /// Props on both sides, open skyline
    Sparse,
    /// Bridge over the road
    Landmark,
}

impl SlotPattern {
    pub fn classify(spawn_index: u32, config: &RunnerConfig) -> Self {
        let every = config.landmark_every;
        if every > 0 && spawn_index % every == every - 1 {
            SlotPattern::Landmark
        } else if spawn_index % config.cycle_length < config.dense_slots {
            SlotPattern::Dense
        } else {
            SlotPattern::Sparse
        }
    }
}

/// One piece of streamed scenery
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldSegment {
    /// Slot in the spawn sequence, fixed for the segment's lifetime
    pub spawn_index: u32,
    pub kind: SegmentKind,
    /// x = lateral offset, y = vertical (cosmetic), z = travel axis
    pub position: Vec3,
}

/// Scrolling road texture
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RoadSurface {
    /// Texture V offset, wrapped to `[0, 1)`
    pub offset: f32,
}

impl RoadSurface {
    pub fn advance(&mut self, distance: f32, scale: f32) {
        self.offset = (self.offset + distance * scale).rem_euclid(1.0);
    }
}

/// Ranges used when rolling cosmetic parameters
#[derive(Debug, Clone, Copy)]
struct RollParams {
    height_min: f32,
    height_max: f32,
    building_variants: u32,
    prop_variants: u32,
}

impl RollParams {
    fn from_config(config: &RunnerConfig) -> Self {
        Self {
            height_min: config.building_height_min,
            height_max: config.building_height_max,
            building_variants: config.building_variants,
            prop_variants: config.prop_variants,
        }
    }

    /// Re-roll cosmetics in place; the category never changes
    fn reroll(&self, segment: &mut WorldSegment, rng: &mut Pcg32) {
        match &mut segment.kind {
            SegmentKind::Building { height, variant } => {
                *height = rng.random_range(self.height_min..=self.height_max);
                *variant = rng.random_range(0..self.building_variants);
                segment.position.y = *height / 2.0;
            }
            SegmentKind::Prop { variant } => {
                *variant = rng.random_range(0..self.prop_variants);
            }
            SegmentKind::Bridge { .. } | SegmentKind::Marking => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrollEngine {
    segments: Vec<WorldSegment>,
    world_length: f32,
    pass_threshold: f32,
    road_texture_scale: f32,
    road: RoadSurface,
    rolls: RollParams,
    rng: Pcg32,
    recycled_total: u64,
}

impl ScrollEngine {
    /// Lay out every slot of the world. `config` must already be validated.
    pub fn new(config: &RunnerConfig, mut rng: Pcg32) -> Self {
        let rolls = RollParams::from_config(config);
        let half_road = config.road_half_width();
        let prop_offset = half_road + 2.0;
        let mut segments = Vec::with_capacity(config.chunk_count as usize * 3);

        for spawn_index in 0..config.chunk_count {
            let z = -(spawn_index as f32) * config.chunk_size;

            segments.push(WorldSegment {
                spawn_index,
                kind: SegmentKind::Marking,
                position: Vec3::new(0.0, 0.01, z),
            });

            match SlotPattern::classify(spawn_index, config) {
                SlotPattern::Dense => {
                    for side in [-1.0, 1.0] {
                        let mut segment = WorldSegment {
                            spawn_index,
                            kind: SegmentKind::Building {
                                height: 0.0,
                                variant: 0,
                            },
                            position: Vec3::new(side * config.building_setback, 0.0, z),
                        };
                        rolls.reroll(&mut segment, &mut rng);
                        segments.push(segment);
                    }
                }
                SlotPattern::Sparse => {
                    for side in [-1.0, 1.0] {
                        let mut segment = WorldSegment {
                            spawn_index,
                            kind: SegmentKind::Prop { variant: 0 },
                            position: Vec3::new(side * prop_offset, 0.0, z),
                        };
                        rolls.reroll(&mut segment, &mut rng);
                        segments.push(segment);
                    }
                }
                SlotPattern::Landmark => {
                    log::debug!("Landmark bridge at slot {} (z={})", spawn_index, z);
                    segments.push(WorldSegment {
                        spawn_index,
                        kind: SegmentKind::Bridge {
                            height: config.landmark_height,
                        },
                        position: Vec3::new(0.0, config.landmark_height / 2.0, z),
                    });
                }
            }
        }

        log::info!(
            "World streamed: {} segments over {} slots ({} units)",
            segments.len(),
            config.chunk_count,
            config.world_length()
        );

        Self {
            segments,
            world_length: config.world_length(),
            pass_threshold: config.pass_threshold,
            road_texture_scale: config.road_texture_scale,
            road: RoadSurface::default(),
            rolls,
            rng,
            recycled_total: 0,
        }
    }

    /// Scroll the world by `speed * dt`, returning how many segments recycled
    pub fn update(&mut self, speed: f32, dt: f32) -> usize {
        let delta = speed * dt;
        // Covers zero speed, and never scrolls backwards
        if !(delta > 0.0) {
            return 0;
        }

        let mut recycled = 0;
        for segment in &mut self.segments {
            segment.position.z += delta;
            if segment.position.z >= self.pass_threshold {
                // Whole laps in one step so a dt spike still lands in the window
                let laps = ((segment.position.z - self.pass_threshold) / self.world_length)
                    .floor()
                    + 1.0;
                segment.position.z -= laps * self.world_length;
                self.rolls.reroll(segment, &mut self.rng);
                recycled += 1;
            }
        }

        self.road.advance(delta, self.road_texture_scale);
        self.recycled_total += recycled as u64;
        recycled
    }

    pub fn segments(&self) -> &[WorldSegment] {
        &self.segments
    }

    pub fn road(&self) -> RoadSurface {
        self.road
    }

    pub fn world_length(&self) -> f32 {
        self.world_length
    }

    pub fn pass_threshold(&self) -> f32 {
        self.pass_threshold
    }

    /// Segments recycled since construction
    pub fn recycled_total(&self) -> u64 {
        self.recycled_total
    }
}
