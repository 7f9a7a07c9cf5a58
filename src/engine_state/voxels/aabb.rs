//! Axis aligned bounding boxes shared by placement, physics and hazard checks.

use cgmath::{Point3, Vector3};

/// Axis aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f32>,
    /// Maximum corner.
    pub max: Point3<f32>,
}

impl Aabb {
    /// Creates a box from its two corners.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Creates a box whose footprint is centred on `base.x`/`base.z` and which rises
    /// from `base.y` to `base.y + height`.
    pub fn from_base(base: Point3<f32>, width: f32, height: f32, depth: f32) -> Self {
        let half_width = width * 0.5;
        let half_depth = depth * 0.5;
        Self {
            min: Point3::new(base.x - half_width, base.y, base.z - half_depth),
            max: Point3::new(base.x + half_width, base.y + height, base.z + half_depth),
        }
    }

    /// Creates a box centred on `center`.
    pub fn from_center(center: Point3<f32>, half_extents: Vector3<f32>) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Centre of the box.
    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Extent along x.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Extent along y.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Extent along z.
    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// Returns `true` if the interiors of the two boxes overlap. Touching faces do not count.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Returns a copy moved by `offset`.
    pub fn translated(&self, offset: Vector3<f32>) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_faces_do_not_intersect() {
        let below = Aabb::from_base(Point3::new(0.0, 0.0, 0.0), 1.0, 1.0, 1.0);
        let above = Aabb::from_base(Point3::new(0.0, 1.0, 0.0), 1.0, 1.0, 1.0);
        assert!(!below.intersects(&above));
        let sunk = above.translated(Vector3::new(0.0, -0.01, 0.0));
        assert!(below.intersects(&sunk));
    }

    #[test]
    fn from_base_and_from_center_agree() {
        let a = Aabb::from_base(Point3::new(1.0, 2.0, 3.0), 2.0, 4.0, 6.0);
        let b = Aabb::from_center(Point3::new(1.0, 4.0, 3.0), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(a, b);
        assert_eq!(a.center(), Point3::new(1.0, 4.0, 3.0));
        assert_eq!((a.width(), a.height(), a.depth()), (2.0, 4.0, 6.0));
    }
}
