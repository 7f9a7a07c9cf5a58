//! # Block Module
//!
//! This module provides the placed-instance side of the world: what a block or creature
//! looks like once the placement engine has put it somewhere. Every instance carries its
//! kind, its transform and a small piece of per-instance animation state.

use block_kind::BlockKind;
use cgmath::{Point3, Rad, Vector2};

use super::aabb::Aabb;

pub mod block_kind;

/// Stable index of a placed instance inside the [`World`](super::world::World).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceHandle(pub usize);

/// Position, rotation about the vertical axis and uniform scale of an instance.
///
/// `position` is the centre of the footprint on the horizontal plane and the bottom of
/// the instance on the vertical axis, so a unit block at `(x, y, z)` spans
/// `[x - 0.5, x + 0.5] x [y, y + 1] x [z - 0.5, z + 0.5]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    /// Footprint centre (x, z) and base height (y).
    pub position: Point3<f32>,
    /// Rotation about the vertical axis.
    pub rotation: Rad<f32>,
    /// Uniform scale applied to the unit cube.
    pub scale: f32,
}

impl Transform {
    /// Creates a new transform.
    pub fn new(position: Point3<f32>, rotation: Rad<f32>, scale: f32) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Axis aligned volume occupied by a scaled unit cube at this transform.
    ///
    /// Rotation is ignored; every placed kind is treated as a cube.
    pub fn volume(&self) -> Aabb {
        Aabb::from_base(self.position, self.scale, self.scale, self.scale)
    }
}

/// Accumulated texture offset of an animated hazard surface, wrapped into `[0, 1)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextureScroll {
    /// Current offset in texture space.
    pub offset: Vector2<f32>,
}

impl TextureScroll {
    /// Advances the offset by `delta`, wrapping each component into `[0, 1)`.
    pub fn advance(&mut self, delta: Vector2<f32>) {
        self.offset.x = (self.offset.x + delta.x).rem_euclid(1.0);
        self.offset.y = (self.offset.y + delta.y).rem_euclid(1.0);
    }
}

impl Default for TextureScroll {
    fn default() -> Self {
        Self {
            offset: Vector2::new(0.0, 0.0),
        }
    }
}

/// Wander parameters and current target of a creature.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WanderState {
    /// Point the creature is currently travelling towards.
    pub target: Point3<f32>,
    /// Distance covered per tick.
    pub speed: f32,
    /// Height the creature was spawned at. New targets stay close to it.
    pub spawn_height: f32,
    /// Half-extent of the square new targets are picked from.
    pub radius: f32,
    /// Half-extent of the vertical jitter applied to new targets.
    pub vertical_jitter: f32,
}

/// Per-instance animation state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InstanceState {
    /// Nothing changes after placement.
    Static,
    /// Hazard surface with a scrolling texture.
    Hazard(TextureScroll),
    /// Creature driven by the behavior controller.
    Creature(WanderState),
}

/// A placed block, creature or satellite structure.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockInstance {
    /// What was placed.
    pub kind: BlockKind,
    /// Where it was placed.
    pub transform: Transform,
    /// Animation state.
    pub state: InstanceState,
}

impl BlockInstance {
    /// Axis aligned volume of the instance.
    pub fn volume(&self) -> Aabb {
        self.transform.volume()
    }

    /// Returns the wander state if this instance is a creature.
    pub fn wander(&self) -> Option<&WanderState> {
        match &self.state {
            InstanceState::Creature(wander) => Some(wander),
            _ => None,
        }
    }

    /// Returns the texture scroll if this instance is a hazard surface.
    pub fn texture_scroll(&self) -> Option<&TextureScroll> {
        match &self.state {
            InstanceState::Hazard(scroll) => Some(scroll),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_scroll_wraps_into_unit_range() {
        let mut scroll = TextureScroll::default();
        for _ in 0..1_000 {
            scroll.advance(Vector2::new(0.002, 0.001));
        }
        assert!((0.0..1.0).contains(&scroll.offset.x));
        assert!((0.0..1.0).contains(&scroll.offset.y));
        assert!((scroll.offset.x - 0.0).abs() < 1e-3 || (scroll.offset.x - 1.0).abs() < 1e-3);
        assert!((scroll.offset.y - 0.0).abs() < 1e-3 || (scroll.offset.y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn unit_block_volume_spans_footprint_and_height() {
        let transform = Transform::new(Point3::new(2.0, 1.0, -3.0), Rad(0.0), 1.0);
        let volume = transform.volume();
        assert_eq!(volume.min, Point3::new(1.5, 1.0, -3.5));
        assert_eq!(volume.max, Point3::new(2.5, 2.0, -2.5));
    }
}
