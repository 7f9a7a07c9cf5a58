//! # Registry Module
//!
//! Registries are the lookup tables the simulation reads every tick. The solid registry
//! answers "what can the player stand on", the hazard registry answers "what kills the
//! first-person session". Both are filled by the placement engine while the world is
//! built, and only the cascade drops inside the hazard registry move afterwards.

use cgmath::Point3;

use super::{aabb::Aabb, block::block_kind::BlockKind, block::InstanceHandle};
use crate::engine_state::hazards::cascade::CascadeDrop;

/// Walkable volume recorded for a solid placement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolidVolume {
    /// Centre of the volume.
    pub center: Point3<f32>,
    /// Extent along x.
    pub width: f32,
    /// Extent along y.
    pub height: f32,
    /// Extent along z.
    pub depth: f32,
    /// Kind of the placed instance.
    pub kind: BlockKind,
    /// Instance this volume belongs to.
    pub instance: InstanceHandle,
}

impl SolidVolume {
    /// Builds a volume from an axis aligned box.
    pub fn from_aabb(volume: &Aabb, kind: BlockKind, instance: InstanceHandle) -> Self {
        Self {
            center: volume.center(),
            width: volume.width(),
            height: volume.height(),
            depth: volume.depth(),
            kind,
            instance,
        }
    }

    /// Height of the walkable top face.
    pub fn top(&self) -> f32 {
        self.center.y + self.height * 0.5
    }

    /// Height of the bottom face.
    pub fn bottom(&self) -> f32 {
        self.center.y - self.height * 0.5
    }

    /// Axis aligned box of the volume.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_base(
            Point3::new(self.center.x, self.bottom(), self.center.z),
            self.width,
            self.height,
            self.depth,
        )
    }
}

/// Append-only list of walkable volumes.
#[derive(Default, Debug)]
pub struct SolidRegistry {
    volumes: Vec<SolidVolume>,
}

impl SolidRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, volume: SolidVolume) {
        self.volumes.push(volume);
    }

    /// Iterates over all registered volumes in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &SolidVolume> {
        self.volumes.iter()
    }

    /// Number of registered volumes.
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// Returns `true` if nothing walkable was placed.
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

/// Hazard surface placed by the placement engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StaticHazard {
    /// Instance of the hazard surface.
    pub instance: InstanceHandle,
    /// Volume used for contact checks.
    pub volume: Aabb,
}

/// Static hazard surfaces plus the moving cascade drops.
#[derive(Default, Debug)]
pub struct HazardRegistry {
    statics: Vec<StaticHazard>,
    cascades: Vec<CascadeDrop>,
}

impl HazardRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, hazard: StaticHazard) {
        self.statics.push(hazard);
    }

    /// Replaces the cascade drops. Called once when the hazard system is set up.
    pub(crate) fn install_cascades(&mut self, drops: Vec<CascadeDrop>) {
        self.cascades = drops;
    }

    /// Static hazard surfaces in placement order.
    pub fn statics(&self) -> &[StaticHazard] {
        &self.statics
    }

    /// Cascade drops.
    pub fn cascades(&self) -> &[CascadeDrop] {
        &self.cascades
    }

    /// Cascade drops, mutably. The count never changes after setup.
    pub fn cascades_mut(&mut self) -> &mut [CascadeDrop] {
        &mut self.cascades
    }

    /// Returns `true` if `volume` overlaps any static hazard or cascade drop.
    pub fn touches(&self, volume: &Aabb) -> bool {
        self.statics
            .iter()
            .any(|hazard| hazard.volume.intersects(volume))
            || self
                .cascades
                .iter()
                .any(|drop| drop.volume().intersects(volume))
    }
}
