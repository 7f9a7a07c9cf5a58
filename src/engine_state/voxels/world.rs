//! # World Module
//!
//! This module provides the `World` struct, which owns every placed instance and the
//! registries derived from them. It is also the placement engine: every block, creature
//! and satellite structure enters the world through [`World::place`].
//!
//! ## Placement
//!
//! A placement request names a kind, a position, a rotation and a scale. If no model
//! was resolved for the kind, the request is skipped and `None` is returned, so a
//! missing model leaves a hole instead of stopping the build. Otherwise the instance is
//! stored and classified:
//!
//! - Solid kinds register a walkable volume in the [`SolidRegistry`]
//! - Lava registers a [`StaticHazard`] and starts with a texture scroll
//! - Creatures join the creature list and start with a wander state
//! - The portal interior is stored but registered nowhere
//!
//! ## Lifecycle
//!
//! The world is filled once while the island is built. Afterwards only animation state
//! changes: texture scroll offsets, creature transforms and cascade drops.

use std::collections::{BTreeMap, HashSet};

use cgmath::{Point3, Rad};
use log::{debug, warn};

use super::{
    block::{
        block_kind::{BlockCategory, BlockKind, CreatureClass},
        BlockInstance, InstanceHandle, InstanceState, TextureScroll, Transform, WanderState,
    },
    registry::{HazardRegistry, SolidRegistry, SolidVolume, StaticHazard},
};
use crate::engine_state::config::{CreatureConfig, WanderProfile};

/// Owner of all placed instances and their registries.
pub struct World {
    instances: Vec<BlockInstance>,
    solids: SolidRegistry,
    hazards: HazardRegistry,
    creatures: Vec<InstanceHandle>,
    available: HashSet<BlockKind>,
    creature_config: CreatureConfig,
    skipped: BTreeMap<BlockKind, usize>,
}

impl World {
    /// Creates an empty world that can place the given kinds.
    ///
    /// # Arguments
    /// * `available` - Kinds whose model was resolved
    /// * `creature_config` - Wander profiles handed to newly placed creatures
    pub fn new(
        available: impl IntoIterator<Item = BlockKind>,
        creature_config: CreatureConfig,
    ) -> Self {
        World {
            instances: Vec::new(),
            solids: SolidRegistry::new(),
            hazards: HazardRegistry::new(),
            creatures: Vec::new(),
            available: available.into_iter().collect(),
            creature_config,
            skipped: BTreeMap::new(),
        }
    }

    /// Creates an empty world in which every kind is available.
    pub fn with_all_kinds(creature_config: CreatureConfig) -> Self {
        Self::new(BlockKind::ALL, creature_config)
    }

    /// Returns `true` if instances of `kind` can be placed.
    pub fn is_available(&self, kind: BlockKind) -> bool {
        self.available.contains(&kind)
    }

    /// Places an instance and registers it according to its kind.
    ///
    /// # Arguments
    /// * `kind` - What to place
    /// * `position` - Footprint centre (x, z) and base height (y)
    /// * `rotation` - Rotation about the vertical axis
    /// * `scale` - Uniform scale of the unit cube
    ///
    /// # Returns
    /// The handle of the new instance, or `None` if the kind has no model
    pub fn place(
        &mut self,
        kind: BlockKind,
        position: Point3<f32>,
        rotation: Rad<f32>,
        scale: f32,
    ) -> Option<InstanceHandle> {
        if !self.is_available(kind) {
            let skipped = self.skipped.entry(kind).or_insert(0);
            if *skipped == 0 {
                warn!(
                    "No model for {kind} at ({}, {}, {}), skipping placements of it",
                    position.x, position.y, position.z
                );
            } else {
                debug!(
                    "Skipped {kind} at ({}, {}, {})",
                    position.x, position.y, position.z
                );
            }
            *skipped += 1;
            return None;
        }

        let handle = InstanceHandle(self.instances.len());
        let transform = Transform::new(position, rotation, scale);
        let volume = transform.volume();

        let state = match kind.category() {
            BlockCategory::Solid => {
                self.solids
                    .register(SolidVolume::from_aabb(&volume, kind, handle));
                InstanceState::Static
            }
            BlockCategory::Passable => InstanceState::Static,
            BlockCategory::Hazard => {
                self.hazards.register(StaticHazard {
                    instance: handle,
                    volume,
                });
                InstanceState::Hazard(TextureScroll::default())
            }
            BlockCategory::Creature(class) => {
                self.creatures.push(handle);
                let profile = self.wander_profile(class);
                InstanceState::Creature(WanderState {
                    target: position,
                    speed: profile.speed,
                    spawn_height: position.y,
                    radius: profile.radius,
                    vertical_jitter: profile.vertical_jitter,
                })
            }
        };

        self.instances.push(BlockInstance {
            kind,
            transform,
            state,
        });
        Some(handle)
    }

    /// Places an unrotated unit block on an integer grid cell.
    pub fn place_block(&mut self, kind: BlockKind, cell: Point3<i32>) -> Option<InstanceHandle> {
        self.place(
            kind,
            Point3::new(cell.x as f32, cell.y as f32, cell.z as f32),
            Rad(0.0),
            1.0,
        )
    }

    /// Places an instance by manifest name.
    ///
    /// Unknown names are logged and skipped like unavailable kinds.
    pub fn place_named(
        &mut self,
        name: &str,
        position: Point3<f32>,
        rotation: Rad<f32>,
        scale: f32,
    ) -> Option<InstanceHandle> {
        match BlockKind::from_name(name) {
            Some(kind) => self.place(kind, position, rotation, scale),
            None => {
                warn!(
                    "Unknown block kind '{name}' at ({}, {}, {}), placement skipped",
                    position.x, position.y, position.z
                );
                None
            }
        }
    }

    fn wander_profile(&self, class: CreatureClass) -> WanderProfile {
        match class {
            CreatureClass::Aerial => self.creature_config.aerial,
            CreatureClass::Ground => self.creature_config.ground,
        }
    }

    /// All instances in placement order.
    pub fn instances(&self) -> &[BlockInstance] {
        &self.instances
    }

    /// Looks an instance up by handle.
    pub fn instance(&self, handle: InstanceHandle) -> Option<&BlockInstance> {
        self.instances.get(handle.0)
    }

    /// Looks an instance up by handle, mutably.
    pub fn instance_mut(&mut self, handle: InstanceHandle) -> Option<&mut BlockInstance> {
        self.instances.get_mut(handle.0)
    }

    /// Walkable volumes.
    pub fn solids(&self) -> &SolidRegistry {
        &self.solids
    }

    /// Hazard surfaces and cascade drops.
    pub fn hazards(&self) -> &HazardRegistry {
        &self.hazards
    }

    /// Hazard surfaces and cascade drops, mutably.
    pub fn hazards_mut(&mut self) -> &mut HazardRegistry {
        &mut self.hazards
    }

    /// Handles of all creatures.
    pub fn creatures(&self) -> &[InstanceHandle] {
        &self.creatures
    }

    /// Number of placement requests skipped per unavailable kind.
    pub fn skipped_placements(&self) -> &BTreeMap<BlockKind, usize> {
        &self.skipped
    }

    /// Counts placed instances per kind.
    pub fn count_by_kind(&self) -> BTreeMap<BlockKind, usize> {
        let mut counts = BTreeMap::new();
        for instance in &self.instances {
            *counts.entry(instance.kind).or_insert(0) += 1;
        }
        counts
    }
}
