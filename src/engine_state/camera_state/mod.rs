//! # Camera State Management
//!
//! Holds both cameras and their projections and answers "what does the viewer see"
//! for the active mode.
//!
//! ## Core Components
//! - `Camera`: first-person view that follows the player's eyes
//! - `OrbitCamera`: damped orbit around the island
//! - `Projection`: one per camera, both resized together
//! - `CameraView`: the active camera's position and view-projection matrix

use cgmath::{Deg, Matrix4, Point3};

use super::{config::CameraConfig, mode::Mode, player::PlayerState};
use camera::{Camera, OrbitCamera, Projection};

pub mod camera;

/// What the active camera sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Eye position.
    pub position: Point3<f32>,
    /// Combined view and projection matrix.
    pub view_proj: Matrix4<f32>,
}

/// Both cameras plus their projections.
pub struct CameraState {
    /// First-person camera
    pub first_person: Camera,
    /// Orbit camera
    pub orbit: OrbitCamera,
    first_person_projection: Projection,
    orbit_projection: Projection,
    rotate_speed: f32,
    zoom_speed: f32,
}

impl CameraState {
    /// Creates both cameras from the configuration.
    ///
    /// # Arguments
    /// * `config` - Camera settings
    /// * `width` - Initial viewport width in pixels
    /// * `height` - Initial viewport height in pixels
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        let orbit = OrbitCamera::new(
            Point3::from(config.orbit_target),
            Point3::from(config.orbit_start),
            config.orbit_min_distance,
            config.orbit_max_distance,
            config.orbit_damping,
        );
        let projection = || {
            Projection::new(
                width,
                height,
                Deg(config.fov_degrees),
                config.znear,
                config.zfar,
            )
        };
        Self {
            first_person: Camera::new(Point3::from(config.orbit_start), Deg(0.0), Deg(0.0)),
            orbit,
            first_person_projection: projection(),
            orbit_projection: projection(),
            rotate_speed: config.orbit_rotate_speed,
            zoom_speed: config.orbit_zoom_speed,
        }
    }

    /// Recomputes both projections for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.first_person_projection.resize(width, height);
        self.orbit_projection.resize(width, height);
    }

    /// Places the first-person camera at the player's eyes.
    pub fn follow_player(&mut self, player: &PlayerState, eye_height: f32) {
        self.first_person.position = Point3::new(
            player.position.x,
            player.position.y + eye_height,
            player.position.z,
        );
        self.first_person.yaw = player.yaw;
        self.first_person.pitch = player.pitch;
    }

    /// Feeds pointer drag (pixels) and wheel (lines) input to the orbit camera and
    /// advances its damping by one step.
    pub fn update_orbit(&mut self, drag: Option<(f64, f64)>, scroll: f32) {
        if let Some((dx, dy)) = drag {
            self.orbit.rotate(
                -(dx as f32) * self.rotate_speed,
                -(dy as f32) * self.rotate_speed,
            );
        }
        if scroll != 0.0 {
            self.orbit.zoom(scroll * self.zoom_speed);
        }
        self.orbit.update();
    }

    /// The active camera's view.
    pub fn view(&self, mode: Mode) -> CameraView {
        match mode {
            Mode::Orbit => CameraView {
                position: self.orbit.position(),
                view_proj: self.orbit_projection.calc_matrix() * self.orbit.calc_matrix(),
            },
            Mode::FirstPerson => CameraView {
                position: self.first_person.position,
                view_proj: self.first_person_projection.calc_matrix()
                    * self.first_person.calc_matrix(),
            },
        }
    }
}
