//! End-to-end scenarios for the island build and the per-tick simulation.

use cgmath::{InnerSpace, Point3};
use nether_island::engine_state::{
    config::{CreatureConfig, EngineConfig, HazardConfig},
    hazards::cascade::spawn_cascade,
    mode::{ExitReason, Mode, ModeTransition, PointerCapture},
    voxels::{
        block::block_kind::BlockKind,
        generation::{
            plan::StructurePlan,
            terrain::{generate_terrain, TerrainLayer},
        },
        world::World,
    },
    EngineState,
};

#[derive(Default)]
struct RecordingPointer {
    captures: usize,
    releases: usize,
}

impl PointerCapture for RecordingPointer {
    fn capture(&mut self) {
        self.captures += 1;
    }
    fn release(&mut self) {
        self.releases += 1;
    }
}

fn seeded_config() -> EngineConfig {
    EngineConfig {
        seed: Some(42),
        ..Default::default()
    }
}

fn engine_with(world: World) -> EngineState {
    EngineState::from_world(seeded_config(), world, &[], 800, 600)
}

fn single_block_engine(config: EngineConfig) -> EngineState {
    let mut world = World::with_all_kinds(CreatureConfig::default());
    world.place_block(BlockKind::Netherrack, Point3::new(0, 0, 0));
    EngineState::from_world(config, world, &[], 800, 600)
}

fn enter_first_person(engine: &mut EngineState, pointer: &mut RecordingPointer) {
    engine.player_actions.toggle_mode = true;
    let report = engine.tick(pointer);
    assert_eq!(report.transitions, vec![ModeTransition::Activated]);
    assert_eq!(engine.mode(), Mode::FirstPerson);
}

#[test]
fn terrain_core_is_always_filled_and_rim_fills_at_reduced_rate() {
    let layer = TerrainLayer::new(0, 5.0, 3.0, 0.6);
    let rim: Vec<Point3<i32>> = (-5..=5)
        .flat_map(|x| (-5..=5).map(move |z| (x, z)))
        .filter(|(x, z)| x * x + z * z == 25)
        .map(|(x, z)| Point3::new(x, 0, z))
        .collect();
    assert_eq!(rim.len(), 12);

    let mut rng = fastrand::Rng::with_seed(2024);
    let runs = 10_000;
    let mut filled = 0usize;
    for _ in 0..runs {
        let mut plan = StructurePlan::new();
        generate_terrain(std::slice::from_ref(&layer), BlockKind::Netherrack, &mut plan, &mut rng);

        for x in -3..=3 {
            for z in -3..=3 {
                if x * x + z * z <= 9 {
                    assert!(plan.get(Point3::new(x, 0, z)).is_some());
                }
            }
        }
        for (cell, _) in plan.iter() {
            assert!(((cell.x * cell.x + cell.z * cell.z) as f32).sqrt() <= 5.0);
        }
        filled += rim.iter().filter(|cell| plan.get(**cell).is_some()).count();
    }

    let rate = filled as f32 / (runs * rim.len()) as f32;
    assert!((rate - 0.3).abs() < 0.01, "rim fill rate {rate}");
}

#[test]
fn player_dropped_onto_block_comes_to_rest_on_top() {
    let mut world = World::with_all_kinds(CreatureConfig::default());
    world.place_block(BlockKind::Netherrack, Point3::new(0, 0, 0));
    let mut engine = engine_with(world);
    let mut pointer = RecordingPointer::default();
    enter_first_person(&mut engine, &mut pointer);

    let state = engine.player_mut().state_mut();
    state.position = Point3::new(0.0, 5.0, 0.0);
    state.vertical_velocity = 0.0;

    for _ in 0..200 {
        engine.tick(&mut pointer);
    }

    let state = engine.player().state();
    assert!(state.on_ground);
    assert_eq!(state.position.y, 1.0);
    assert_eq!(state.vertical_velocity, 0.0);
    assert_eq!(engine.mode(), Mode::FirstPerson);
}

#[test]
fn hazard_contact_returns_to_orbit_exactly_once() {
    let mut world = World::with_all_kinds(CreatureConfig::default());
    world.place_block(BlockKind::Netherrack, Point3::new(0, 0, 0));
    world.place_block(BlockKind::Lava, Point3::new(3, 0, 0));
    let mut engine = engine_with(world);
    let mut pointer = RecordingPointer::default();
    enter_first_person(&mut engine, &mut pointer);

    engine.player_mut().state_mut().position = Point3::new(3.0, 0.5, 0.0);
    let report = engine.tick(&mut pointer);
    assert_eq!(
        report.transitions,
        vec![ModeTransition::Deactivated(ExitReason::HazardContact)]
    );
    assert_eq!(engine.mode(), Mode::Orbit);
    assert_eq!(pointer.releases, 1);

    let eye = engine.player().eye();
    let target = engine.camera_state.orbit.target;
    let handed = (engine.camera_state.orbit.position() - target).normalize();
    assert!((handed - (eye - target).normalize()).magnitude() < 1e-3);

    for _ in 0..30 {
        let report = engine.tick(&mut pointer);
        assert!(report.transitions.is_empty());
        assert!(report.physics.is_none());
    }
    assert_eq!(engine.transitions(), 2);
    assert_eq!(pointer.releases, 1);
    assert_eq!(pointer.captures, 1);
}

#[test]
fn grounded_jump_applies_impulse_in_the_same_tick() {
    let mut world = World::with_all_kinds(CreatureConfig::default());
    world.place_block(BlockKind::Netherrack, Point3::new(0, 0, 0));
    let mut engine = engine_with(world);
    let mut pointer = RecordingPointer::default();
    enter_first_person(&mut engine, &mut pointer);

    engine.player_mut().state_mut().position = Point3::new(0.0, 1.0, 0.0);
    engine.player_mut().state_mut().vertical_velocity = 0.0;
    engine.tick(&mut pointer);
    assert!(engine.player().state().on_ground);

    engine.player_actions.jump = true;
    engine.tick(&mut pointer);
    let impulse = engine.config().physics.jump_impulse;
    assert_eq!(engine.player().state().vertical_velocity, impulse);
    assert!(engine.player().state().jumping);
}

#[test]
fn grounded_jump_overrides_downward_velocity() {
    let mut engine = single_block_engine(seeded_config());
    let mut pointer = RecordingPointer::default();
    enter_first_person(&mut engine, &mut pointer);
    let impulse = engine.config().physics.jump_impulse;

    let state = engine.player_mut().state_mut();
    state.position = Point3::new(0.0, 1.0, 0.0);
    state.on_ground = true;
    state.vertical_velocity = -0.3;
    assert!(engine.player_mut().jump());
    assert_eq!(engine.player().state().vertical_velocity, impulse);

    // still sinking when the tick starts, but within tolerance of the top face
    let state = engine.player_mut().state_mut();
    state.position = Point3::new(0.0, 1.05, 0.0);
    state.vertical_velocity = -0.3;
    engine.player_actions.jump = true;
    let report = engine.tick(&mut pointer);
    assert_eq!(report.physics.and_then(|outcome| outcome.ground), Some(1.0));
    assert_eq!(engine.player().state().vertical_velocity, impulse);
    assert!(engine.player().state().jumping);
}

#[test]
fn top_face_exactly_at_ground_tolerance_counts_as_ground() {
    let mut config = seeded_config();
    config.physics.ground_tolerance = 0.25;
    let mut engine = single_block_engine(config);
    let mut pointer = RecordingPointer::default();
    enter_first_person(&mut engine, &mut pointer);

    let state = engine.player_mut().state_mut();
    state.position = Point3::new(0.0, 0.75, 0.0);
    state.vertical_velocity = -0.05;
    let report = engine.tick(&mut pointer);
    assert_eq!(report.physics.and_then(|outcome| outcome.ground), Some(1.0));
    let state = engine.player().state();
    assert!(state.on_ground);
    assert_eq!(state.position.y, 1.0);
    assert_eq!(state.vertical_velocity, 0.0);

    let state = engine.player_mut().state_mut();
    state.position = Point3::new(0.0, 0.74, 0.0);
    state.vertical_velocity = 0.0;
    state.on_ground = false;
    let report = engine.tick(&mut pointer);
    assert_eq!(report.physics.and_then(|outcome| outcome.ground), None);
    assert!(!engine.player().state().on_ground);
    assert!(engine.player().state().position.y < 0.74);
}

#[test]
fn configured_marsh_chance_is_the_soul_sand_rate() {
    let config =
        EngineConfig::from_json(r#"{ "terrain": { "marsh": { "inclusionChance": 0.9 } } }"#)
            .unwrap();
    let marsh = config.terrain.marsh;
    let mut rng = fastrand::Rng::with_seed(31);
    let runs = 2_000;
    let mut stamped = 0;
    for _ in 0..runs {
        let mut plan = StructurePlan::new();
        stamped += marsh.scatter(BlockKind::SoulSand, &mut plan, &mut rng);
        assert!(plan.iter().all(|(_, planned)| planned.kind == BlockKind::SoulSand));
    }
    let rate = stamped as f32 / (runs * marsh.steps as usize) as f32;
    assert!((rate - 0.9).abs() < 0.02, "soul sand rate {rate}");
}

#[test]
fn exit_command_in_orbit_changes_nothing() {
    let mut engine = engine_with(World::with_all_kinds(CreatureConfig::default()));
    let mut pointer = RecordingPointer::default();
    let before = engine.camera_state.orbit.clone();
    engine.player_actions.exit_mode = true;
    let report = engine.tick(&mut pointer);
    assert!(report.transitions.is_empty());
    assert_eq!(pointer.releases, 0);
    assert_eq!(engine.camera_state.orbit.target, before.target);
}

#[test]
fn cascade_drops_loop_without_passing_their_floor() {
    let config = HazardConfig {
        fall_speed: [0.05, 0.05],
        drops_per_cascade: 1,
        ..Default::default()
    };
    let mut rng = fastrand::Rng::with_seed(5);
    let mut drops = spawn_cascade(Point3::new(14.0, 0.0, 0.0), &config, 0, &mut rng);
    let drop = &mut drops[0];
    let floor = drop.floor();

    let mut resets = Vec::new();
    for tick in 1..=1_000 {
        if drop.step(tick as f32 * config.time_step, config.sway_amplitude) {
            resets.push(tick);
            assert_eq!(drop.position.y, drop.start_y);
        }
        assert!(drop.position.y >= floor);
        assert!(drop.position.y <= drop.start_y);
    }

    let expected = (config.cascade_height / 0.05).ceil() as i32;
    assert!(resets.len() >= 4);
    for pair in resets.windows(2) {
        let period = pair[1] - pair[0];
        assert!((period - expected).abs() <= 1, "period {period}");
    }
}

#[test]
fn full_island_simulates_with_fixed_populations() {
    let mut engine = EngineState::new(
        seeded_config(),
        nether_island::engine_state::assets::ModelLibrary::default(),
        800,
        600,
    );
    // no models resolved, so nothing could be placed
    assert!(engine.world().instances().is_empty());
    assert!(engine.hazards().particles().is_empty());

    let mut pointer = RecordingPointer::default();
    for _ in 0..10 {
        engine.tick(&mut pointer);
    }
    assert_eq!(engine.tick_count(), 10);
}

#[test]
fn built_island_keeps_cascade_and_particle_counts() {
    let config = seeded_config();
    let mut rng = config.rng();
    let mut world = World::with_all_kinds(config.creatures.clone());
    let layout = nether_island::engine_state::voxels::generation::island::build_island(
        &mut world,
        &config.terrain,
        &mut rng,
    );
    let mut engine = EngineState::from_world(config, world, &layout.cascade_sites, 800, 600);
    let cascades = engine.world().hazards().cascades().len();
    let particles = engine.hazards().particles().len();
    assert_eq!(cascades, layout.cascade_sites.len() * 4);
    assert_eq!(particles, 80);

    let solids = engine.world().solids().len();
    let mut pointer = RecordingPointer::default();
    for _ in 0..500 {
        engine.tick(&mut pointer);
    }
    assert_eq!(engine.world().hazards().cascades().len(), cascades);
    assert_eq!(engine.hazards().particles().len(), particles);
    assert_eq!(engine.world().solids().len(), solids);
    assert!(engine
        .hazards()
        .particles()
        .particles()
        .iter()
        .all(|particle| particle.life <= 1.0));
}
