//! Cell-keyed staging area for building the island.
//!
//! Routines stamp kinds into integer cells. A later stamp on the same cell replaces the
//! earlier one, so carving a lava channel through terrain or laying a path over it is a
//! plain overwrite. Nothing touches the [`World`] until [`StructurePlan::commit`].

use std::collections::HashMap;

use cgmath::{Point3, Rad};

use crate::engine_state::voxels::{block::block_kind::BlockKind, world::World};

/// What a cell will hold once the plan is committed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlannedBlock {
    /// Kind to place.
    pub kind: BlockKind,
    /// Rotation about the vertical axis.
    pub rotation: Rad<f32>,
}

/// Last-write-wins map from grid cell to planned block.
#[derive(Default)]
pub struct StructurePlan {
    order: Vec<Point3<i32>>,
    cells: HashMap<Point3<i32>, PlannedBlock>,
}

impl StructurePlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps an unrotated block, replacing whatever the cell held.
    pub fn stamp(&mut self, cell: Point3<i32>, kind: BlockKind) {
        self.stamp_rotated(cell, kind, Rad(0.0));
    }

    /// Stamps a rotated block, replacing whatever the cell held.
    pub fn stamp_rotated(&mut self, cell: Point3<i32>, kind: BlockKind, rotation: Rad<f32>) {
        let planned = PlannedBlock { kind, rotation };
        if self.cells.insert(cell, planned).is_none() {
            self.order.push(cell);
        }
    }

    /// What the cell currently holds.
    pub fn get(&self, cell: Point3<i32>) -> Option<PlannedBlock> {
        self.cells.get(&cell).copied()
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cell is occupied.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Occupied cells in first-stamp order with their final contents.
    pub fn iter(&self) -> impl Iterator<Item = (Point3<i32>, PlannedBlock)> + '_ {
        self.order
            .iter()
            .filter_map(|cell| self.cells.get(cell).map(|planned| (*cell, *planned)))
    }

    /// Places every cell into the world, one unit block each.
    ///
    /// # Returns
    /// The number of cells that were actually placed
    pub fn commit(self, world: &mut World) -> usize {
        let mut placed = 0;
        for (cell, planned) in self.iter() {
            let position = Point3::new(cell.x as f32, cell.y as f32, cell.z as f32);
            if world
                .place(planned.kind, position, planned.rotation, 1.0)
                .is_some()
            {
                placed += 1;
            }
        }
        placed
    }
}
