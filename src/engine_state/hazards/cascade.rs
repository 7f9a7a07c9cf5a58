//! Falling lava drops that loop forever below a channel's spill point.

use cgmath::Point3;

use crate::engine_state::{config::HazardConfig, voxels::aabb::Aabb};

/// Radians of sway per unit of animation time.
const SWAY_FREQUENCY: f32 = 3.0;
/// Phase shift between consecutive drops.
const SWAY_PHASE_STEP: f32 = 0.7;
/// Opacity of a drop at the top of its fall.
const BASE_OPACITY: f32 = 0.7;
/// Lowest fraction of the base opacity a drop fades to.
const MIN_FADE: f32 = 0.3;

/// One recycled drop of a cascade.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CascadeDrop {
    /// Collision position. Sway is not applied here.
    pub position: Point3<f32>,
    /// Distance fallen per tick.
    pub fall_speed: f32,
    /// Height the drop resets to.
    pub start_y: f32,
    /// Distance the drop falls before it resets.
    pub cascade_height: f32,
    /// Global index of the drop, used to offset its sway.
    pub phase_index: usize,
    /// Edge length of the drop volume.
    pub size: f32,
    /// Current horizontal render offset along x.
    pub sway: f32,
}

impl CascadeDrop {
    /// Lowest height the drop reaches before it resets.
    pub fn floor(&self) -> f32 {
        self.start_y - self.cascade_height
    }

    /// Advances the drop by one tick.
    ///
    /// # Returns
    /// `true` if the drop fell past its floor and was reset to `start_y`
    pub fn step(&mut self, time: f32, sway_amplitude: f32) -> bool {
        self.position.y -= self.fall_speed;
        let reset = self.position.y < self.floor();
        if reset {
            self.position.y = self.start_y;
        }
        self.sway = (time * SWAY_FREQUENCY + self.phase_index as f32 * SWAY_PHASE_STEP).sin()
            * sway_amplitude;
        reset
    }

    /// Collision volume.
    pub fn volume(&self) -> Aabb {
        Aabb::from_base(self.position, self.size, self.size, self.size)
    }

    /// Where the drop is drawn.
    pub fn render_position(&self) -> Point3<f32> {
        Point3::new(self.position.x + self.sway, self.position.y, self.position.z)
    }

    /// Opacity of the drop, fading as it falls.
    pub fn opacity(&self) -> f32 {
        let progress = (self.position.y - self.floor()) / self.cascade_height;
        BASE_OPACITY * progress.clamp(MIN_FADE, 1.0)
    }
}

/// Creates the drops of one cascade below `site`.
///
/// All drops share one fall range that starts a block below the site. They start
/// evenly spread over that range so the stream looks continuous from the first tick.
///
/// # Arguments
/// * `site` - Base of the hazard block the cascade spills from
/// * `first_phase` - Phase index of the first drop
pub fn spawn_cascade(
    site: Point3<f32>,
    config: &HazardConfig,
    first_phase: usize,
    rng: &mut fastrand::Rng,
) -> Vec<CascadeDrop> {
    let start_y = site.y - 1.0;
    let count = config.drops_per_cascade;
    let spacing = config.cascade_height / count.max(1) as f32;
    let [min_speed, max_speed] = config.fall_speed;

    (0..count)
        .map(|i| CascadeDrop {
            position: Point3::new(site.x, start_y - i as f32 * spacing, site.z),
            fall_speed: min_speed + rng.f32() * (max_speed - min_speed),
            start_y,
            cascade_height: config.cascade_height,
            phase_index: first_phase + i,
            size: config.drop_scale,
            sway: 0.0,
        })
        .collect()
}
