//! # Terrain Generation
//!
//! The island is a stack of roughly circular layers. Each layer is filled on an integer
//! grid: cells inside the solid radius are always filled, cells in the ring between the
//! solid radius and the max radius are filled with a probability that falls off linearly
//! towards the rim, and cells beyond the max radius are never filled. A scattered ring
//! of soul sand is laid over the top layer afterwards.

use std::f32::consts::TAU;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::plan::StructurePlan;
use crate::engine_state::voxels::block::block_kind::BlockKind;

/// How much the fill probability drops between the solid radius and the max radius.
const EDGE_FALLOFF: f32 = 0.3;

/// One horizontal layer of the island.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainLayer {
    /// Height of the layer's cells.
    pub y_offset: i32,
    /// Cells farther than this from the vertical axis are never filled.
    pub max_radius: f32,
    /// Cells at most this far from the vertical axis are always filled.
    pub solid_radius: f32,
    /// Fill probability just outside the solid radius.
    pub edge_fill_base_chance: f32,
}

impl TerrainLayer {
    /// Creates a layer description.
    pub fn new(y_offset: i32, max_radius: f32, solid_radius: f32, edge_fill_base_chance: f32) -> Self {
        Self {
            y_offset,
            max_radius,
            solid_radius,
            edge_fill_base_chance,
        }
    }

    /// Fill probability of the ring for a cell at `distance` from the axis.
    ///
    /// Falls linearly from `edge_fill_base_chance` at the solid radius to
    /// `edge_fill_base_chance - 0.3` at the max radius.
    pub fn edge_fill_chance(&self, distance: f32) -> f32 {
        let span = self.max_radius - self.solid_radius;
        if span <= 0.0 {
            return self.edge_fill_base_chance;
        }
        self.edge_fill_base_chance - (distance - self.solid_radius) / span * EDGE_FALLOFF
    }

    /// Draws the filled cells of this layer as `(x, z)` pairs in scan order.
    ///
    /// Exactly one random draw is consumed per ring cell, so a seeded generator
    /// reproduces the same layer.
    pub fn sample_cells(&self, rng: &mut fastrand::Rng) -> Vec<(i32, i32)> {
        let extent = self.max_radius.ceil() as i32;
        let mut cells = Vec::new();
        for x in -extent..=extent {
            for z in -extent..=extent {
                let distance = ((x * x + z * z) as f32).sqrt();
                if distance > self.max_radius {
                    continue;
                }
                if distance <= self.solid_radius
                    || rng.f32() < self.edge_fill_chance(distance)
                {
                    cells.push((x, z));
                }
            }
        }
        cells
    }
}

/// Fills every layer into the plan with `kind`.
///
/// # Returns
/// The number of cells stamped
pub fn generate_terrain(
    layers: &[TerrainLayer],
    kind: BlockKind,
    plan: &mut StructurePlan,
    rng: &mut fastrand::Rng,
) -> usize {
    let mut stamped = 0;
    for layer in layers {
        for (x, z) in layer.sample_cells(rng) {
            plan.stamp(Point3::new(x, layer.y_offset, z), kind);
            stamped += 1;
        }
    }
    stamped
}

/// Scattered ring of ground cover around the island centre.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarshRing {
    /// Number of angular steps around the ring.
    pub steps: u32,
    /// Smallest ring radius.
    pub min_radius: f32,
    /// Random extra radius added per step.
    pub radius_spread: f32,
    /// Probability that a step places a cell.
    pub inclusion_chance: f32,
    /// Height of the ring's cells.
    pub y: i32,
}

impl Default for MarshRing {
    fn default() -> Self {
        Self {
            steps: 20,
            min_radius: 8.0,
            radius_spread: 3.0,
            inclusion_chance: 0.5,
            y: 0,
        }
    }
}

impl MarshRing {
    /// Draws the ring cells and stamps them into the plan.
    ///
    /// # Returns
    /// The number of cells stamped
    pub fn scatter(&self, kind: BlockKind, plan: &mut StructurePlan, rng: &mut fastrand::Rng) -> usize {
        let mut stamped = 0;
        for step in 0..self.steps {
            let angle = step as f32 / self.steps as f32 * TAU;
            let radius = self.min_radius + rng.f32() * self.radius_spread;
            let x = (angle.cos() * radius).round() as i32;
            let z = (angle.sin() * radius).round() as i32;
            if rng.f32() < self.inclusion_chance {
                plan.stamp(Point3::new(x, self.y, z), kind);
                stamped += 1;
            }
        }
        stamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_chance_spans_base_to_base_minus_falloff() {
        let layer = TerrainLayer::new(0, 14.0, 10.0, 0.6);
        assert!((layer.edge_fill_chance(10.0) - 0.6).abs() < 1e-6);
        assert!((layer.edge_fill_chance(14.0) - 0.3).abs() < 1e-6);
        assert!((layer.edge_fill_chance(12.0) - 0.45).abs() < 1e-6);
    }

    #[test]
    fn solid_core_is_always_filled() {
        let layer = TerrainLayer::new(0, 14.0, 10.0, 0.6);
        let mut rng = fastrand::Rng::with_seed(11);
        for _ in 0..20 {
            let cells = layer.sample_cells(&mut rng);
            let core = cells
                .iter()
                .filter(|(x, z)| ((x * x + z * z) as f32).sqrt() <= 10.0)
                .count();
            // 317 lattice points lie within radius 10.
            assert_eq!(core, 317);
        }
    }

    #[test]
    fn nothing_is_placed_beyond_max_radius() {
        let layer = TerrainLayer::new(-2, 9.0, 6.0, 0.8);
        let mut rng = fastrand::Rng::with_seed(5);
        let cells = layer.sample_cells(&mut rng);
        assert!(cells
            .iter()
            .all(|(x, z)| ((x * x + z * z) as f32).sqrt() <= 9.0));
    }

    #[test]
    fn seeded_layers_are_reproducible() {
        let layer = TerrainLayer::new(0, 14.0, 10.0, 0.6);
        let a = layer.sample_cells(&mut fastrand::Rng::with_seed(99));
        let b = layer.sample_cells(&mut fastrand::Rng::with_seed(99));
        assert_eq!(a, b);
    }

    #[test]
    fn marsh_ring_stays_within_its_band() {
        let ring = MarshRing::default();
        let mut plan = StructurePlan::new();
        let mut rng = fastrand::Rng::with_seed(2);
        let stamped = ring.scatter(BlockKind::SoulSand, &mut plan, &mut rng);
        assert!(stamped <= 20);
        for (cell, _) in plan.iter() {
            let distance = ((cell.x * cell.x + cell.z * cell.z) as f32).sqrt();
            assert!((7.0..=12.0).contains(&distance), "{distance}");
            assert_eq!(cell.y, 0);
        }
    }

    #[test]
    fn marsh_inclusion_chance_is_the_placement_rate() {
        let ring = MarshRing {
            inclusion_chance: 0.9,
            ..MarshRing::default()
        };
        let mut rng = fastrand::Rng::with_seed(17);
        let runs = 2_000;
        let stamped: usize = (0..runs)
            .map(|_| ring.scatter(BlockKind::SoulSand, &mut StructurePlan::new(), &mut rng))
            .sum();
        let rate = stamped as f32 / (runs * ring.steps as usize) as f32;
        assert!((rate - 0.9).abs() < 0.02, "placement rate {rate}");
    }
}
