//! # Camera Implementation
//!
//! This module contains the two cameras and their shared projection:
//! - `Camera`: first-person view placed at the player's eyes
//! - `OrbitCamera`: spherical camera circling a target with damped rotation and zoom
//! - `Projection`: perspective projection settings

use cgmath::*;
use std::f32::consts::PI;

/// Smallest polar angle of the orbit camera, keeping it off the vertical axis.
const POLAR_EPSILON: f32 = 1e-3;

/// First-person camera.
///
/// # Fields
/// - `position`: eye position in world space
/// - `yaw`: horizontal rotation around the Y axis
/// - `pitch`: vertical rotation around the X axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (around X axis) in radians
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Eye position. Any type that converts to `Point3<f32>`.
    /// * `yaw` - Horizontal rotation. Any type that converts to `Rad<f32>`.
    /// * `pitch` - Vertical rotation. Any type that converts to `Rad<f32>`.
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    /// Gets the camera's forward direction vector.
    ///
    /// # Returns
    /// A normalized 3D vector pointing where the camera looks
    pub fn get_view_vec(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// Calculates the view matrix for this camera.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.get_view_vec(), Vector3::unit_y())
    }
}

/// Camera circling a target point.
///
/// Rotation and zoom requests are not applied at once. Each [`OrbitCamera::update`]
/// applies a `damping` fraction of what is still pending, so the camera eases out.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    /// Point the camera looks at
    pub target: Point3<f32>,
    azimuth: f32,
    polar: f32,
    distance: f32,
    min_distance: f32,
    max_distance: f32,
    damping: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_zoom: f32,
}

impl OrbitCamera {
    /// Creates an orbit camera looking from `position` at `target`.
    ///
    /// # Arguments
    /// * `target` - Point to circle
    /// * `position` - Initial camera position
    /// * `min_distance` - Closest allowed distance to the target
    /// * `max_distance` - Farthest allowed distance to the target
    /// * `damping` - Fraction of pending motion applied per update, in `[0, 1]`
    pub fn new(
        target: Point3<f32>,
        position: Point3<f32>,
        min_distance: f32,
        max_distance: f32,
        damping: f32,
    ) -> Self {
        let mut camera = Self {
            target,
            azimuth: 0.0,
            polar: PI / 2.0,
            distance: min_distance,
            min_distance,
            max_distance,
            damping,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_zoom: 0.0,
        };
        camera.move_viewpoint_to(position);
        camera
    }

    /// Moves the camera to `position` without moving the target.
    ///
    /// The distance is clamped into the allowed range and pending motion is dropped.
    pub fn move_viewpoint_to(&mut self, position: Point3<f32>) {
        let offset = position - self.target;
        let radius = offset.magnitude();
        if radius > f32::EPSILON {
            self.azimuth = offset.x.atan2(offset.z);
            self.polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        }
        self.polar = self.polar.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.distance = radius.clamp(self.min_distance, self.max_distance);
        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;
        self.pending_zoom = 0.0;
    }

    /// Requests a rotation in radians. Positive `azimuth` turns left around the target,
    /// positive `polar` tilts the camera down towards the horizon.
    pub fn rotate(&mut self, azimuth: f32, polar: f32) {
        self.pending_azimuth += azimuth;
        self.pending_polar += polar;
    }

    /// Requests a zoom. Positive values move the camera closer, as a fraction of the
    /// current distance.
    pub fn zoom(&mut self, amount: f32) {
        self.pending_zoom += amount;
    }

    /// Applies one step of the pending motion.
    pub fn update(&mut self) {
        let factor = if self.damping > 0.0 { self.damping } else { 1.0 };

        self.azimuth += self.pending_azimuth * factor;
        self.polar = (self.polar + self.pending_polar * factor).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let zoom = self.pending_zoom * factor;
        self.distance = (self.distance * (1.0 - zoom)).clamp(self.min_distance, self.max_distance);

        let keep = 1.0 - factor;
        self.pending_azimuth *= keep;
        self.pending_polar *= keep;
        self.pending_zoom *= keep;
    }

    /// Distance to the target.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Camera position.
    pub fn position(&self) -> Point3<f32> {
        let (polar_sin, polar_cos) = self.polar.sin_cos();
        let (azimuth_sin, azimuth_cos) = self.azimuth.sin_cos();
        self.target
            + Vector3::new(
                polar_sin * azimuth_sin,
                polar_cos,
                polar_sin * azimuth_cos,
            ) * self.distance
    }

    /// Calculates the view matrix for this camera.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }
}

/// Represents a camera's projection matrix and related parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    ///
    /// A zero-sized viewport (minimised window) keeps the previous aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = aspect_ratio(width, height);
        }
    }

    /// Current aspect ratio.
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Calculates the projection matrix.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point3<f32>, b: Point3<f32>) -> bool {
        (a - b).magnitude() < 1e-3
    }

    #[test]
    fn orbit_camera_reproduces_its_start_position() {
        let camera = OrbitCamera::new(
            Point3::new(0.0, 3.0, 0.0),
            Point3::new(25.0, 20.0, 25.0),
            8.0,
            80.0,
            0.05,
        );
        assert!(close(camera.position(), Point3::new(25.0, 20.0, 25.0)));
    }

    #[test]
    fn viewpoint_distance_is_clamped() {
        let mut camera = OrbitCamera::new(
            Point3::new(0.0, 3.0, 0.0),
            Point3::new(25.0, 20.0, 25.0),
            8.0,
            80.0,
            0.05,
        );
        camera.move_viewpoint_to(Point3::new(0.0, 4.6, 3.0));
        assert_eq!(camera.distance(), 8.0);
        let direction = (camera.position() - camera.target).normalize();
        let expected = Vector3::new(0.0, 1.6, 3.0).normalize();
        assert!((direction - expected).magnitude() < 1e-3);
    }

    #[test]
    fn damped_rotation_converges_to_request() {
        let mut camera = OrbitCamera::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 10.0),
            8.0,
            80.0,
            0.05,
        );
        camera.rotate(PI / 2.0, 0.0);
        camera.update();
        assert!(!close(camera.position(), Point3::new(10.0, 0.0, 0.0)));
        for _ in 0..1_000 {
            camera.update();
        }
        assert!(close(camera.position(), Point3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn zoom_respects_limits() {
        let mut camera = OrbitCamera::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 10.0),
            8.0,
            80.0,
            1.0,
        );
        camera.zoom(0.9);
        camera.update();
        assert_eq!(camera.distance(), 8.0);
        camera.zoom(-50.0);
        camera.update();
        assert_eq!(camera.distance(), 80.0);
    }

    #[test]
    fn projection_ignores_zero_sized_viewport() {
        let mut projection = Projection::new(1600, 900, Deg(75.0), 0.1, 1000.0);
        projection.resize(0, 0);
        assert!((projection.aspect() - 16.0 / 9.0).abs() < 1e-6);
        projection.resize(800, 800);
        assert_eq!(projection.aspect(), 1.0);
    }
}
