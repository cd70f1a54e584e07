//! Pooled obstacles
//!
//! Every obstacle slot is allocated once. Spawning claims the first idle
//! slot and silently does nothing when the pool is full; slots that pass the
//! camera are parked far below the road until they are claimed again.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::RunnerConfig;

/// Where idle slots wait, out of sight and out of reach
pub const PARKED_POSITION: Vec3 = Vec3::new(0.0, -1000.0, 0.0);

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Neon crate
    #[default]
    Box,
    /// Wide road barricade
    Barrier,
    /// Spinning mine
    Mine,
}

impl ObstacleKind {
    /// Radius of the drawn model
    pub fn visual_radius(&self) -> f32 {
        match self {
            ObstacleKind::Box => 2.0,
            ObstacleKind::Barrier => 3.0,
            ObstacleKind::Mine => 1.2,
        }
    }

    /// Collision radius, kept inside the visual radius so grazes don't count
    pub fn hitbox_radius(&self) -> f32 {
        match self {
            ObstacleKind::Box => 1.4,
            ObstacleKind::Barrier => 2.4,
            ObstacleKind::Mine => 0.8,
        }
    }

    /// Cosmetic spin (radians/sec)
    pub fn spin_rate(&self) -> f32 {
        match self {
            ObstacleKind::Mine => 3.0,
            ObstacleKind::Box | ObstacleKind::Barrier => 0.0,
        }
    }

    /// Stable numeric tag for the render collaborator
    pub fn tag(&self) -> u32 {
        match self {
            ObstacleKind::Box => 0,
            ObstacleKind::Barrier => 1,
            ObstacleKind::Mine => 2,
        }
    }

    /// Weighted pick from a roll in `0..100` (60% box, 30% barrier, 10% mine)
    pub fn from_roll(roll: u32) -> Self {
        match roll {
            0..60 => ObstacleKind::Box,
            60..90 => ObstacleKind::Barrier,
            _ => ObstacleKind::Mine,
        }
    }
}

/// A pool entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSlot {
    pub active: bool,
    pub kind: ObstacleKind,
    /// x = lateral offset, y = vertical, z = travel axis
    pub position: Vec3,
    pub rotation: f32,
}

impl ObstacleSlot {
    fn parked() -> Self {
        Self {
            active: false,
            kind: ObstacleKind::default(),
            position: PARKED_POSITION,
            rotation: 0.0,
        }
    }

    fn park(&mut self) {
        self.active = false;
        self.position = PARKED_POSITION;
        self.rotation = 0.0;
    }

    /// Whether this obstacle overlaps a vehicle hitbox at `(lateral, travel)`
    pub fn hits(&self, lateral: f32, travel: f32, vehicle_radius: f32) -> bool {
        if !self.active {
            return false;
        }
        let reach = self.kind.hitbox_radius() + vehicle_radius;
        (self.position.x - lateral).abs() < reach && (self.position.z - travel).abs() < reach
    }
}

/// A collision found by [`ObstaclePool::check_collision`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleHit {
    pub slot: usize,
    pub kind: ObstacleKind,
}

#[derive(Debug, Clone)]
pub struct ObstaclePool {
    slots: Vec<ObstacleSlot>,
    /// Seconds since the last spawn attempt
    spawn_timer: f32,
    rng: Pcg32,
    spawn_distance: f32,
    pass_threshold: f32,
    base_interval: f32,
    min_interval: f32,
    speed_divisor: f32,
    min_speed: f32,
    lateral_span: f32,
    spawned_total: u64,
    skipped_total: u64,
}

impl ObstaclePool {
    pub fn new(config: &RunnerConfig, rng: Pcg32) -> Self {
        Self {
            slots: vec![ObstacleSlot::parked(); config.pool_capacity],
            spawn_timer: 0.0,
            rng,
            spawn_distance: config.spawn_distance,
            pass_threshold: config.obstacle_pass_threshold,
            base_interval: config.spawn_base_interval,
            min_interval: config.spawn_min_interval,
            speed_divisor: config.spawn_speed_divisor,
            min_speed: config.spawn_min_speed,
            lateral_span: config.road_width * config.spawn_lateral_spread,
            spawned_total: 0,
            skipped_total: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    pub fn slots(&self) -> &[ObstacleSlot] {
        &self.slots
    }

    pub fn active(&self) -> impl Iterator<Item = &ObstacleSlot> {
        self.slots.iter().filter(|s| s.active)
    }

    /// Seconds between spawns at `speed`; faster means denser, down to the floor
    pub fn spawn_interval(&self, speed: f32) -> f32 {
        (self.base_interval - speed / self.speed_divisor).max(self.min_interval)
    }

    /// Claim the first idle slot at the spawn distance
    ///
    /// Returns `None` without side effects when every slot is busy.
    pub fn spawn(&mut self, kind: ObstacleKind, lateral: f32) -> Option<usize> {
        let Some(index) = self.slots.iter().position(|s| !s.active) else {
            self.skipped_total += 1;
            log::debug!("Obstacle pool exhausted ({} slots), spawn skipped", self.slots.len());
            return None;
        };

        self.slots[index] = ObstacleSlot {
            active: true,
            kind,
            position: Vec3::new(lateral, 1.0, self.spawn_distance),
            rotation: 0.0,
        };
        self.spawned_total += 1;
        Some(index)
    }

    /// Spawn a weighted-random obstacle somewhere across the road
    pub fn spawn_random(&mut self) -> Option<usize> {
        let kind = ObstacleKind::from_roll(self.rng.random_range(0..100));
        let lateral = (self.rng.random::<f32>() - 0.5) * self.lateral_span;
        self.spawn(kind, lateral)
    }

    /// Advance active obstacles, retire the ones behind the camera, and run
    /// the spawn timer. Returns how many slots were retired.
    pub fn update(&mut self, speed: f32, dt: f32) -> usize {
        let delta = (speed * dt).max(0.0);
        let mut retired = 0;

        for slot in self.slots.iter_mut().filter(|s| s.active) {
            slot.position.z += delta;
            slot.rotation =
                (slot.rotation + slot.kind.spin_rate() * dt).rem_euclid(std::f32::consts::TAU);
            if slot.position.z > self.pass_threshold {
                slot.park();
                retired += 1;
            }
        }

        // The timer idles at a standstill so obstacles don't stack up at the spawn line
        if speed > self.min_speed {
            self.spawn_timer += dt;
            if self.spawn_timer >= self.spawn_interval(speed) {
                self.spawn_timer = 0.0;
                self.spawn_random();
            }
        }

        retired
    }

    /// First active obstacle overlapping the vehicle hitbox
    pub fn check_collision(
        &self,
        lateral: f32,
        travel: f32,
        vehicle_radius: f32,
    ) -> Option<ObstacleHit> {
        self.slots
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.hits(lateral, travel, vehicle_radius))
            .map(|(slot, s)| ObstacleHit { slot, kind: s.kind })
    }

    #[cfg(test)]
    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut ObstacleSlot {
        &mut self.slots[index]
    }

    /// Total successful spawns
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Spawns skipped because the pool was full
    pub fn skipped_total(&self) -> u64 {
        self.skipped_total
    }
}
