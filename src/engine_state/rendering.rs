//! # Frame Output
//!
//! The engine does not draw. Each tick it hands a [`Frame`] snapshot to a
//! [`FrameRenderer`], which owns whatever graphics backend it likes.

use cgmath::{Point3, Vector2};
use log::{debug, trace};

use super::{
    assets::ModelLibrary,
    camera_state::CameraView,
    hazards::particles::ParticleVertex,
    mode::Mode,
    voxels::world::World,
};

/// Frames between two summary lines of the [`LogRenderer`].
const LOG_EVERY_FRAMES: u64 = 300;

/// A falling drop as it should be drawn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CascadeSprite {
    /// Position including the horizontal sway.
    pub position: Point3<f32>,
    /// Edge length.
    pub size: f32,
    /// Opacity in `[0, 1]`, fading towards the bottom of the fall.
    pub opacity: f32,
}

/// Everything needed to draw one frame.
pub struct Frame<'a> {
    /// Simulation tick the frame shows.
    pub tick: u64,
    /// Active mode.
    pub mode: Mode,
    /// Active camera.
    pub camera: CameraView,
    /// Placed instances.
    pub world: &'a World,
    /// Models to draw the instances with.
    pub models: &'a ModelLibrary,
    /// Falling lava drops.
    pub cascades: Vec<CascadeSprite>,
    /// Lava particles, ready for upload.
    pub particles: Vec<ParticleVertex>,
    /// Texture offset shared by every lava surface.
    pub scroll_offset: Vector2<f32>,
}

impl Frame<'_> {
    /// Particle vertices as raw bytes.
    pub fn particle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.particles)
    }
}

/// Draws frames.
pub trait FrameRenderer {
    /// Draws one frame.
    fn render(&mut self, frame: &Frame);

    /// Adapts to a new viewport size in pixels.
    fn resize(&mut self, width: u32, height: u32);
}

/// Renderer that logs frame statistics instead of drawing.
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
}

impl FrameRenderer for LogRenderer {
    fn render(&mut self, frame: &Frame) {
        self.frames += 1;
        trace!(
            "Frame {} ({}): camera at {:?}, {} particles, {} bytes",
            frame.tick,
            frame.mode,
            frame.camera.position,
            frame.particles.len(),
            frame.particle_bytes().len()
        );
        if self.frames % LOG_EVERY_FRAMES == 1 {
            debug!(
                "Frame {}: {} instances, {} cascade drops, {} particles, mode {}",
                frame.tick,
                frame.world.instances().len(),
                frame.cascades.len(),
                frame.particles.len(),
                frame.mode
            );
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        debug!("Viewport resized to {width}x{height}");
    }
}
