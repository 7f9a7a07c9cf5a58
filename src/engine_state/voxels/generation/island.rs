//! # Island Layout
//!
//! Assembles the complete floating island: terrain, platforms and paths, the two
//! fortress builds, decorations, the portal, the lava network, creatures and the
//! satellite structures around the island.

use std::f32::consts::{PI, TAU};

use cgmath::{Point3, Rad};
use log::info;

use super::{
    plan::StructurePlan,
    structures::{self, BridgeMaterials, HazardArm, PortalFrame},
    terrain::generate_terrain,
};
use crate::engine_state::{
    config::TerrainConfig,
    voxels::{block::block_kind::BlockKind, world::World},
};

/// Lava columns where the surface breaks off at the rim, two blocks deep.
const LAVA_EDGES: [(i32, i32); 10] = [
    (-11, 2),
    (-11, -3),
    (11, 2),
    (11, -3),
    (3, -11),
    (-3, -11),
    (3, 11),
    (-3, 11),
    (8, -8),
    (-8, 8),
];

/// Small lava pools on the surface.
const LAVA_POOLS: [[(i32, i32); 3]; 4] = [
    [(-8, -8), (-8, -9), (-9, -8)],
    [(8, 8), (8, 9), (9, 8)],
    [(6, -6), (7, -6), (6, -7)],
    [(-6, 6), (-7, 6), (-6, 7)],
];

/// Creature spawns: kind, position, scale. Yaw is random.
const CREATURES: [(BlockKind, [f32; 3], f32); 26] = [
    (BlockKind::Ghast, [-15.0, 15.0, 25.0], 2.0),
    (BlockKind::Ghast, [-15.0, 15.0, -25.0], 2.0),
    (BlockKind::Ghast, [-15.0, 5.0, 25.0], 2.0),
    (BlockKind::Ghast, [8.0, 12.0, 8.0], 2.0),
    (BlockKind::Ghast, [5.0, 11.0, -6.0], 2.0),
    (BlockKind::Ghast, [20.0, 11.0, -6.0], 2.0),
    (BlockKind::Ghast, [-25.0, 25.0, 18.0], 1.5),
    (BlockKind::Ghast, [25.0, 25.0, 18.0], 1.5),
    (BlockKind::Phantom, [-6.0, 13.0, 4.0], 1.2),
    (BlockKind::Phantom, [7.0, 14.0, -3.0], 1.2),
    (BlockKind::Phantom, [-15.0, 10.0, -3.0], 1.2),
    (BlockKind::Phantom, [15.0, 20.0, -3.0], 1.2),
    (BlockKind::Phantom, [15.0, 14.0, -3.0], 1.2),
    (BlockKind::Blaze, [7.0, 5.0, 0.0], 1.5),
    (BlockKind::Blaze, [-7.0, 10.0, 0.0], 1.5),
    (BlockKind::Blaze, [0.0, 15.0, -7.0], 1.5),
    (BlockKind::Blaze, [-35.0, 27.0, -7.0], 1.5),
    (BlockKind::Blaze, [-30.0, 30.0, 7.0], 1.5),
    (BlockKind::Blaze, [-25.0, 27.0, 15.0], 1.5),
    (BlockKind::Blaze, [-30.0, 29.0, -10.0], 1.5),
    (BlockKind::Blaze, [-22.0, 25.0, -7.0], 1.5),
    (BlockKind::Blaze, [30.0, 10.0, 7.0], 1.5),
    (BlockKind::Blaze, [25.0, 10.0, 15.0], 1.5),
    (BlockKind::Blaze, [30.0, 10.0, -10.0], 1.5),
    (BlockKind::Blaze, [22.0, 10.0, -7.0], 1.5),
    (BlockKind::Hoglin, [8.0, 2.0, 6.0], 1.2),
];

/// Large structures floating around the island: kind, position, yaw, scale.
const SATELLITES: [(BlockKind, [f32; 3], f32, f32); 6] = [
    (BlockKind::NetherFortress, [40.0, -37.0, 16.5], PI, 50.0),
    (BlockKind::NetherFortress, [40.0, -37.0, -26.5], TAU, 50.0),
    (BlockKind::NetherTunnel, [37.0, 3.0, -5.0], TAU, 20.0),
    (BlockKind::SkyblockFortress, [-22.0, -19.0, 19.0], TAU, 45.0),
    (BlockKind::SkyblockFortress, [-30.0, -19.0, -21.0], PI, 45.0),
    (BlockKind::NetherTunnel, [-26.5, 17.5, -1.0], TAU, 20.0),
];

/// The portal on the north side of the island.
pub const PORTAL: PortalFrame = PortalFrame {
    origin: Point3 { x: -2, y: 2, z: -8 },
    width: 4,
    height: 5,
};

/// Column of the tall blackstone tower in the middle of the island.
pub const CENTRAL_TOWER: (i32, i32) = (0, 0);

/// What the rest of the engine needs to know about a freshly built island.
#[derive(Clone, Debug, Default)]
pub struct IslandLayout {
    /// Cells where a lava channel spills over the rim. Cascades fall from here.
    pub cascade_sites: Vec<Point3<f32>>,
    /// Number of planned cells that were placed.
    pub blocks_placed: usize,
}

/// Builds the island into `world`.
///
/// The terrain, structures and lava network are stamped into one plan and committed
/// together, then creatures and satellites are placed directly.
pub fn build_island(world: &mut World, terrain: &TerrainConfig, rng: &mut fastrand::Rng) -> IslandLayout {
    let mut plan = StructurePlan::new();

    for layer in &terrain.layers {
        let before = plan.len();
        let stamped = generate_terrain(
            std::slice::from_ref(layer),
            BlockKind::Netherrack,
            &mut plan,
            rng,
        );
        info!(
            "Terrain layer y={}: radius {} (solid core {}), {} cells ({} new)",
            layer.y_offset,
            layer.max_radius,
            layer.solid_radius,
            stamped,
            plan.len() - before
        );
    }
    terrain.marsh.scatter(BlockKind::SoulSand, &mut plan, rng);

    stamp_platforms(&mut plan);
    structures::fortress_tower(&mut plan, Point3::new(-10, 1, -10));
    structures::bridge(&mut plan, Point3::new(7, 2, 7), 7, 3, BridgeMaterials::default());
    stamp_decorations(&mut plan);
    PORTAL.stamp(&mut plan, BlockKind::Obsidian, BlockKind::PortalSurface);

    let rim = terrain
        .layers
        .first()
        .map(|layer| layer.max_radius.floor() as i32)
        .unwrap_or(0);
    let spill_points = stamp_lava(&mut plan, rim);
    stamp_details(&mut plan);

    let blocks_placed = plan.commit(world);

    for (kind, [x, y, z], scale) in CREATURES {
        let yaw = Rad(rng.f32() * TAU);
        world.place(kind, Point3::new(x, y, z), yaw, scale);
    }
    for (kind, [x, y, z], yaw, scale) in SATELLITES {
        world.place(kind, Point3::new(x, y, z), Rad(yaw), scale);
    }

    IslandLayout {
        cascade_sites: spill_points
            .into_iter()
            .map(|cell| Point3::new(cell.x as f32, cell.y as f32, cell.z as f32))
            .collect(),
        blocks_placed,
    }
}

fn stamp_platforms(plan: &mut StructurePlan) {
    let bricks = BlockKind::NetherBricks;
    structures::slab(plan, bricks, Point3::new(-2, 1, -2), 5, 5, 1);
    for corner in [(-1, -8), (-1, 6), (6, -1), (-8, -1)] {
        structures::slab(plan, bricks, Point3::new(corner.0, 1, corner.1), 3, 3, 1);
    }
    for step in -5..=5 {
        plan.stamp(Point3::new(0, 1, step), bricks);
        plan.stamp(Point3::new(step, 1, 0), bricks);
    }
}

fn stamp_decorations(plan: &mut StructurePlan) {
    for sign in [-1, 1] {
        let (x, z) = (5 * sign, 5 * sign);
        plan.stamp(Point3::new(x, 2, z), BlockKind::NetherBricks);
        plan.stamp(Point3::new(x, 2, z + sign), BlockKind::NetherBricks);
        plan.stamp(Point3::new(x + sign, 2, z), BlockKind::NetherBricks);
        plan.stamp(Point3::new(x, 3, z), BlockKind::Blackstone);
        plan.stamp(Point3::new(x, 4, z), BlockKind::Glowstone);
    }

    let (tower_x, tower_z) = CENTRAL_TOWER;
    for y in 2..=5 {
        plan.stamp(Point3::new(tower_x, y, tower_z), BlockKind::Blackstone);
    }
    plan.stamp(Point3::new(tower_x, 6, tower_z), BlockKind::Glowstone);
}

/// Lava channels, rim columns and pools. Returns the channel spill points.
fn stamp_lava(plan: &mut StructurePlan, rim: i32) -> Vec<Point3<i32>> {
    let near_portal = |cell: Point3<i32>| PORTAL.reserves_column(cell.x, cell.z, 1);
    let near_tower = |cell: Point3<i32>| {
        (cell.x - CENTRAL_TOWER.0).abs() <= 1 && (cell.z - CENTRAL_TOWER.1).abs() <= 1
    };
    let arms = HazardArm::cardinal(1, rim, 1, 0);
    let spill_points =
        structures::hazard_channels(plan, BlockKind::Lava, &arms, &[&near_portal, &near_tower]);

    for (x, z) in LAVA_EDGES {
        plan.stamp(Point3::new(x, 0, z), BlockKind::Lava);
        plan.stamp(Point3::new(x, -1, z), BlockKind::Lava);
    }
    for (x, z) in LAVA_POOLS.iter().flatten() {
        plan.stamp(Point3::new(*x, 0, *z), BlockKind::Lava);
    }
    plan.stamp(Point3::new(-2, 1, -9), BlockKind::Lava);
    plan.stamp(Point3::new(2, 1, -9), BlockKind::Lava);

    spill_points
}

fn stamp_details(plan: &mut StructurePlan) {
    for cell in [(4, 2, 4), (-4, 2, -4), (3, 1, -3), (-3, 1, 3)] {
        plan.stamp(cell.into(), BlockKind::SoulSand);
    }
    for cell in [(4, 2, -4), (-4, 2, 4), (6, 1, 6), (-6, 1, -6)] {
        plan.stamp(cell.into(), BlockKind::Glowstone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::config::{CreatureConfig, EngineConfig};

    fn built(seed: u64) -> (World, IslandLayout) {
        let config = EngineConfig::default();
        let mut world = World::with_all_kinds(CreatureConfig::default());
        let mut rng = fastrand::Rng::with_seed(seed);
        let layout = build_island(&mut world, &config.terrain, &mut rng);
        (world, layout)
    }

    #[test]
    fn island_has_every_registry_populated() {
        let (world, layout) = built(1);
        assert!(world.solids().len() > 800);
        assert!(!world.hazards().statics().is_empty());
        assert_eq!(world.creatures().len(), CREATURES.len());
        assert_eq!(layout.cascade_sites.len(), 4);
        let counts = world.count_by_kind();
        assert_eq!(counts[&BlockKind::PortalSurface], 6);
        assert_eq!(counts[&BlockKind::Obsidian], 14);
        assert_eq!(counts[&BlockKind::NetherFortress], 2);
    }

    #[test]
    fn lava_channels_avoid_portal_and_tower() {
        let (world, _) = built(2);
        for hazard in world.hazards().statics() {
            let instance = world.instance(hazard.instance).unwrap();
            let p = instance.transform.position;
            let (x, z) = (p.x as i32, p.z as i32);
            if p.y == 0.0 && (x == 0 || z == 0) {
                assert!(!PORTAL.reserves_column(x, z, 1), "lava at ({x}, {z})");
                assert!(x.abs() > 1 || z.abs() > 1, "lava at ({x}, {z})");
            }
        }
    }

    #[test]
    fn spawn_column_is_walkable() {
        let (world, _) = built(3);
        let top = world
            .solids()
            .iter()
            .filter(|solid| solid.center.x == 0.0 && solid.center.z == 3.0)
            .map(|solid| solid.top())
            .fold(f32::MIN, f32::max);
        assert_eq!(top, 2.0);
    }

    #[test]
    fn missing_kinds_leave_holes_but_build_completes() {
        let config = EngineConfig::default();
        let available = BlockKind::ALL
            .into_iter()
            .filter(|kind| *kind != BlockKind::Lava && *kind != BlockKind::Ghast);
        let mut world = World::new(available, CreatureConfig::default());
        let mut rng = fastrand::Rng::with_seed(4);
        build_island(&mut world, &config.terrain, &mut rng);
        assert!(world.hazards().statics().is_empty());
        assert!(world.skipped_placements()[&BlockKind::Lava] > 0);
        assert_eq!(world.skipped_placements()[&BlockKind::Ghast], 8);
        assert!(!world.solids().is_empty());
    }
}
