//! # Structure Stamping
//!
//! Fixed architectural patterns anchored at a caller-supplied cell. Every routine only
//! writes into the [`StructurePlan`]; none of them looks at what is already there, so
//! the order of calls decides which stamp wins on a shared cell.
//!
//! Corners passed to the routines are the minimum (x, z) corner of the footprint; the
//! footprint extends towards +x and +z.

use std::f32::consts::FRAC_PI_2;

use cgmath::{Point3, Rad};

use super::plan::StructurePlan;
use crate::engine_state::voxels::block::block_kind::BlockKind;

/// Fills a `size_x` by `size_z` rectangle for `layers` rows starting at `corner.y`.
pub fn slab(
    plan: &mut StructurePlan,
    kind: BlockKind,
    corner: Point3<i32>,
    size_x: i32,
    size_z: i32,
    layers: i32,
) {
    for y in corner.y..corner.y + layers {
        for x in corner.x..corner.x + size_x {
            for z in corner.z..corner.z + size_z {
                plan.stamp(Point3::new(x, y, z), kind);
            }
        }
    }
}

/// Perimeter cells of a rectangle at height `y`, x-edges first.
fn perimeter(corner: Point3<i32>, size_x: i32, size_z: i32, y: i32) -> Vec<Point3<i32>> {
    let (x0, z0) = (corner.x, corner.z);
    let (x1, z1) = (corner.x + size_x - 1, corner.z + size_z - 1);
    let mut cells = Vec::new();
    for x in x0..=x1 {
        cells.push(Point3::new(x, y, z0));
        if z1 != z0 {
            cells.push(Point3::new(x, y, z1));
        }
    }
    for z in z0 + 1..z1 {
        cells.push(Point3::new(x0, y, z));
        if x1 != x0 {
            cells.push(Point3::new(x1, y, z));
        }
    }
    cells
}

/// Stamps only the perimeter of the rectangle for `rows` rows starting at `corner.y`.
pub fn hollow_walls(
    plan: &mut StructurePlan,
    kind: BlockKind,
    corner: Point3<i32>,
    size_x: i32,
    size_z: i32,
    rows: i32,
) {
    for y in corner.y..corner.y + rows {
        for cell in perimeter(corner, size_x, size_z, y) {
            plan.stamp(cell, kind);
        }
    }
}

/// Stamps every other perimeter cell at `corner.y`.
///
/// Along the x-edges a cell is kept when its x coordinate is even, along the z-edges
/// when its z coordinate is even. Parity is taken on world coordinates so adjacent
/// structures line up.
pub fn crenellations(
    plan: &mut StructurePlan,
    kind: BlockKind,
    corner: Point3<i32>,
    size_x: i32,
    size_z: i32,
) {
    let z_edges = [corner.z, corner.z + size_z - 1];
    for cell in perimeter(corner, size_x, size_z, corner.y) {
        let on_x_edge = z_edges.contains(&cell.z);
        let along = if on_x_edge { cell.x } else { cell.z };
        if along.rem_euclid(2) == 0 {
            plan.stamp(cell, kind);
        }
    }
}

/// Raises a shaft of `shaft_height` blocks topped with a cap at each footprint corner,
/// starting at `corner.y`.
pub fn corner_towers(
    plan: &mut StructurePlan,
    corner: Point3<i32>,
    size_x: i32,
    size_z: i32,
    shaft: BlockKind,
    shaft_height: i32,
    cap: BlockKind,
) {
    let xs = [corner.x, corner.x + size_x - 1];
    let zs = [corner.z, corner.z + size_z - 1];
    for x in xs {
        for z in zs {
            for y in corner.y..corner.y + shaft_height {
                plan.stamp(Point3::new(x, y, z), shaft);
            }
            plan.stamp(Point3::new(x, corner.y + shaft_height, z), cap);
        }
    }
}

/// Materials of a bridge.
#[derive(Copy, Clone, Debug)]
pub struct BridgeMaterials {
    /// Walkway and railings.
    pub deck: BlockKind,
    /// Pillars and roof.
    pub frame: BlockKind,
    /// Lantern on the roof ridge.
    pub lantern: BlockKind,
}

impl Default for BridgeMaterials {
    fn default() -> Self {
        Self {
            deck: BlockKind::NetherBricks,
            frame: BlockKind::Blackstone,
            lantern: BlockKind::Glowstone,
        }
    }
}

/// Stamps a covered bridge running along +x.
///
/// The deck sits at `corner.y`. Corner pillars rise three blocks above it, the roof
/// sits on top of them with full-length eaves and a ridge that stops one block short
/// of either end, and a lantern crowns the middle of the ridge. Railings stand on
/// every other deck cell along both long sides.
pub fn bridge(
    plan: &mut StructurePlan,
    corner: Point3<i32>,
    length: i32,
    width: i32,
    materials: BridgeMaterials,
) {
    const PILLAR_HEIGHT: i32 = 3;

    slab(plan, materials.deck, corner, length, width, 1);

    let far_x = corner.x + length - 1;
    let far_z = corner.z + width - 1;
    for x in [corner.x, far_x] {
        for z in [corner.z, far_z] {
            for y in corner.y + 1..=corner.y + PILLAR_HEIGHT {
                plan.stamp(Point3::new(x, y, z), materials.frame);
            }
        }
    }

    let roof_y = corner.y + PILLAR_HEIGHT + 1;
    for x in corner.x..=far_x {
        plan.stamp(Point3::new(x, roof_y, corner.z), materials.frame);
        plan.stamp(Point3::new(x, roof_y, far_z), materials.frame);
    }
    for x in corner.x + 1..far_x {
        for z in corner.z + 1..far_z {
            plan.stamp(Point3::new(x, roof_y, z), materials.frame);
        }
    }
    plan.stamp(
        Point3::new(corner.x + length / 2, roof_y + 1, corner.z + width / 2),
        materials.lantern,
    );

    for x in (corner.x + 1..far_x).step_by(2) {
        plan.stamp(Point3::new(x, corner.y + 1, corner.z), materials.deck);
        plan.stamp(Point3::new(x, corner.y + 1, far_z), materials.deck);
    }
}

/// Rectangular portal standing in the x/y plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PortalFrame {
    /// Bottom-left frame cell.
    pub origin: Point3<i32>,
    /// Outer width along x, frame included.
    pub width: i32,
    /// Outer height along y, frame included.
    pub height: i32,
}

impl PortalFrame {
    /// Returns `true` if the column `(x, z)` lies within `margin` cells of the frame.
    pub fn reserves_column(&self, x: i32, z: i32, margin: i32) -> bool {
        x >= self.origin.x - margin
            && x <= self.origin.x + self.width - 1 + margin
            && (z - self.origin.z).abs() <= margin
    }

    /// Stamps the frame and the interior.
    ///
    /// Interior cells are rotated a quarter turn so the surface faces along z.
    pub fn stamp(&self, plan: &mut StructurePlan, frame: BlockKind, interior: BlockKind) {
        let Point3 { x: x0, y: y0, z } = self.origin;
        let x1 = x0 + self.width - 1;
        let y1 = y0 + self.height - 1;
        for x in x0..=x1 {
            plan.stamp(Point3::new(x, y0, z), frame);
        }
        for y in y0 + 1..=y1 {
            plan.stamp(Point3::new(x0, y, z), frame);
            plan.stamp(Point3::new(x1, y, z), frame);
        }
        for x in x0 + 1..x1 {
            plan.stamp(Point3::new(x, y1, z), frame);
        }
        for x in x0 + 1..x1 {
            for y in y0 + 1..y1 {
                plan.stamp_rotated(Point3::new(x, y, z), interior, Rad(FRAC_PI_2));
            }
        }
    }
}

/// Stamps a 5x5 fortress tower on `corner`.
///
/// Two solid courses, four hollow courses with blackstone window frames on the
/// low-z and low-x walls, a crenellated top with blackstone corner turrets capped by
/// glowstone, and a glowstone brazier in the middle of the top course.
pub fn fortress_tower(plan: &mut StructurePlan, corner: Point3<i32>) {
    const SIZE: i32 = 5;
    let bricks = BlockKind::NetherBricks;
    let (x, y, z) = (corner.x, corner.y, corner.z);

    slab(plan, bricks, corner, SIZE, SIZE, 2);
    hollow_walls(plan, bricks, Point3::new(x, y + 2, z), SIZE, SIZE, 4);

    for window_y in [y + 3, y + 4] {
        plan.stamp(Point3::new(x + 2, window_y, z), BlockKind::Blackstone);
        plan.stamp(Point3::new(x, window_y, z + 2), BlockKind::Blackstone);
    }

    let battlement = Point3::new(x, y + 6, z);
    crenellations(plan, bricks, battlement, SIZE, SIZE);
    corner_towers(
        plan,
        battlement,
        SIZE,
        SIZE,
        BlockKind::Blackstone,
        2,
        BlockKind::Glowstone,
    );

    plan.stamp(Point3::new(x + 2, y + 6, z + 2), bricks);
    plan.stamp(Point3::new(x + 2, y + 7, z + 2), BlockKind::Glowstone);
}

/// Straight arm of a hazard channel running outward from the origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HazardArm {
    /// Unit step along x or z, for example `(1, 0)`.
    pub direction: (i32, i32),
    /// First distance from the origin along the arm.
    pub start: i32,
    /// Last distance from the origin along the arm.
    pub end: i32,
    /// Cells across the arm, centred on its axis.
    pub width: i32,
    /// Height of the arm.
    pub y: i32,
}

impl HazardArm {
    /// One arm per cardinal direction.
    pub fn cardinal(start: i32, end: i32, width: i32, y: i32) -> [HazardArm; 4] {
        [(1, 0), (-1, 0), (0, 1), (0, -1)].map(|direction| HazardArm {
            direction,
            start,
            end,
            width,
            y,
        })
    }

    fn cells(&self) -> impl Iterator<Item = (i32, Point3<i32>)> + '_ {
        let (dx, dz) = self.direction;
        let (px, pz) = (-dz, dx);
        let low = -(self.width - 1) / 2;
        let high = self.width / 2;
        (self.start..=self.end).flat_map(move |step| {
            (low..=high).map(move |offset| {
                (
                    offset,
                    Point3::new(dx * step + px * offset, self.y, dz * step + pz * offset),
                )
            })
        })
    }
}

/// Predicate marking cells that a hazard channel must not overwrite.
pub type Exclusion<'a> = &'a dyn Fn(Point3<i32>) -> bool;

/// Stamps hazard channel arms, skipping every cell any exclusion claims.
///
/// # Returns
/// The outermost stamped axis cell of every arm that stamped at least one, which is
/// where the channel spills over the island's edge
pub fn hazard_channels(
    plan: &mut StructurePlan,
    kind: BlockKind,
    arms: &[HazardArm],
    exclusions: &[Exclusion<'_>],
) -> Vec<Point3<i32>> {
    let mut spill_points = Vec::new();
    for arm in arms {
        let mut outermost = None;
        for (offset, cell) in arm.cells() {
            if exclusions.iter().any(|excluded| excluded(cell)) {
                continue;
            }
            plan.stamp(cell, kind);
            if offset == 0 {
                outermost = Some(cell);
            }
        }
        spill_points.extend(outermost);
    }
    spill_points
}
