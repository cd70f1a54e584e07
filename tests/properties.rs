//! Property tests for the simulation invariants

use neon_runner::RunnerConfig;
use neon_runner::sim::{
    InputEvent, Key, ObstacleKind, ObstaclePool, ScrollEngine, SegmentKind, SpeedController,
    ThrottleState, VehicleController,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn throttle_strategy() -> impl Strategy<Value = ThrottleState> {
    prop_oneof![
        Just(ThrottleState::Normal),
        Just(ThrottleState::Nitro),
        Just(ThrottleState::Braking),
    ]
}

fn key_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        Just(Key::Left),
        Just(Key::Right),
        Just(Key::Nitro),
        Just(Key::Brake),
    ]
}

/// Pointer coordinates, occasionally garbage from the platform layer
fn coord_strategy() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => -500.0f32..3000.0,
        1 => Just(f32::NAN),
        1 => Just(f32::INFINITY),
        1 => Just(f32::NEG_INFINITY),
    ]
}

fn extent_strategy() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => 1.0f32..2000.0,
        1 => Just(0.0f32),
        1 => Just(f32::NAN),
        1 => Just(f32::INFINITY),
    ]
}

fn event_strategy() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        key_strategy().prop_map(InputEvent::KeyDown),
        key_strategy().prop_map(InputEvent::KeyUp),
        (coord_strategy(), coord_strategy(), extent_strategy(), extent_strategy()).prop_map(
            |(x, y, width, height)| InputEvent::PointerMove {
                x,
                y,
                width,
                height
            }
        ),
    ]
}

fn marking_positions(world: &ScrollEngine) -> Vec<f32> {
    let mut zs: Vec<f32> = world
        .segments()
        .iter()
        .filter(|s| s.kind == SegmentKind::Marking)
        .map(|s| s.position.z)
        .collect();
    zs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    zs
}

proptest! {
    #[test]
    fn recycling_preserves_spacing(
        chunk_size in 5.0f32..200.0,
        chunk_count in 1u32..60,
        steps in prop::collection::vec((0.0f32..300.0, 0.0f32..0.1), 1..200),
        seed in any::<u64>(),
    ) {
        let config = RunnerConfig {
            chunk_size,
            chunk_count,
            // Initial layout already sits inside the window
            pass_threshold: chunk_size,
            ..Default::default()
        };
        let mut world = ScrollEngine::new(&config, Pcg32::seed_from_u64(seed));
        let count = world.segments().len();
        let world_length = world.world_length();
        let pass = world.pass_threshold();
        let tolerance = 0.1 + chunk_size * 1e-3;

        for (speed, dt) in steps {
            world.update(speed, dt);
            prop_assert_eq!(world.segments().len(), count);
            for segment in world.segments() {
                prop_assert!(segment.position.z < pass);
                prop_assert!(segment.position.z >= pass - world_length - tolerance);
            }
        }

        let zs = marking_positions(&world);
        prop_assert_eq!(zs.len(), chunk_count as usize);
        for pair in zs.windows(2) {
            prop_assert!((pair[1] - pair[0] - chunk_size).abs() < tolerance,
                "spacing {} vs chunk {}", pair[1] - pair[0], chunk_size);
        }
        // The wrap-around gap closes the loop
        if let (Some(first), Some(last)) = (zs.first(), zs.last()) {
            let wrap = first + world_length - last;
            prop_assert!((wrap - chunk_size).abs() < tolerance);
        }
    }

    #[test]
    fn speed_never_overshoots(
        start in 0.0f32..200.0,
        steps in prop::collection::vec((throttle_strategy(), 0.0f32..1.0), 1..100),
    ) {
        let mut speed = SpeedController::new(&RunnerConfig::default());
        speed.current = start;
        for (throttle, dt) in steps {
            let before = speed.current;
            let target = speed.target_for(throttle);
            let after = speed.update(throttle, dt);
            let lo = before.min(target);
            let hi = before.max(target);
            prop_assert!(after >= lo && after <= hi, "{} not in [{}, {}]", after, lo, hi);
        }
    }

    #[test]
    fn lateral_target_stays_clamped(
        script in prop::collection::vec((event_strategy(), 0.0f32..0.1), 1..300),
    ) {
        let mut vehicle = VehicleController::new(&RunnerConfig::default());
        let limit = vehicle.limit();
        for (event, dt) in script {
            vehicle.handle_event(event);
            prop_assert!(vehicle.target_lateral.abs() <= limit);
            vehicle.update(dt, 80.0, 1.0, 0.0);
            prop_assert!(vehicle.target_lateral.abs() <= limit);
            prop_assert!(vehicle.lateral.abs() <= limit + 1e-4);
            prop_assert!(vehicle.attitude.tilt.is_finite());
        }
    }

    #[test]
    fn pool_never_exceeds_capacity(
        capacity in 1usize..40,
        ops in prop::collection::vec(prop::option::of((0.0f32..200.0, 0.0f32..0.1)), 1..300),
        seed in any::<u64>(),
    ) {
        let config = RunnerConfig {
            pool_capacity: capacity,
            ..Default::default()
        };
        let mut pool = ObstaclePool::new(&config, Pcg32::seed_from_u64(seed));
        for op in ops {
            match op {
                None => {
                    let full = pool.active_count() == capacity;
                    let before = pool.slots().to_vec();
                    let spawned = pool.spawn(ObstacleKind::Barrier, 0.0);
                    if full {
                        prop_assert!(spawned.is_none());
                        prop_assert_eq!(pool.slots(), before.as_slice());
                    } else {
                        prop_assert!(spawned.is_some());
                    }
                }
                Some((speed, dt)) => {
                    pool.update(speed, dt);
                }
            }
            prop_assert_eq!(pool.capacity(), capacity);
            prop_assert!(pool.active_count() <= capacity);
            for slot in pool.slots() {
                prop_assert!(!(slot.active && slot.position == neon_runner::sim::PARKED_POSITION));
            }
        }
    }

    #[test]
    fn zero_speed_is_idempotent(
        dts in prop::collection::vec(0.0f32..1.0, 1..50),
        seed in any::<u64>(),
    ) {
        let config = RunnerConfig::default();
        let mut world = ScrollEngine::new(&config, Pcg32::seed_from_u64(seed));
        let before = world.segments().to_vec();
        for dt in dts {
            prop_assert_eq!(world.update(0.0, dt), 0);
        }
        prop_assert_eq!(world.segments(), before.as_slice());
    }
}
