//! # Hazard Flow System
//!
//! Animates the lava once the island is built. Three things move each tick:
//!
//! * **Texture scroll** on every static lava surface (visual only)
//! * **Cascades** of drops falling from the channel spill points, recycled in place
//! * **Particles** rising from random lava surfaces, recycled in place
//!
//! Cascade drops live in the world's [`HazardRegistry`](crate::engine_state::voxels::registry::HazardRegistry)
//! so the player's hazard check sees them. Nothing is allocated after [`HazardFlowSystem::setup`].

use cgmath::{Point3, Vector2};
use log::info;

use crate::engine_state::{
    config::HazardConfig,
    voxels::{
        block::{block_kind::BlockKind, InstanceHandle, InstanceState, TextureScroll},
        world::World,
    },
};
use particles::ParticlePool;

pub mod cascade;
pub mod particles;

/// Owner of the hazard animation state that does not live in the world.
pub struct HazardFlowSystem {
    config: HazardConfig,
    surfaces: Vec<InstanceHandle>,
    anchors: Vec<Point3<f32>>,
    particles: ParticlePool,
    scroll: TextureScroll,
    time: f32,
}

impl HazardFlowSystem {
    /// Seeds cascades and particles from a fully built world.
    ///
    /// Must run after every placement, since particles sample the hazard registry.
    ///
    /// # Arguments
    /// * `world` - The built world. Receives the cascade drops
    /// * `cascade_sites` - Cells the cascades fall from
    /// * `config` - Hazard animation parameters
    /// * `rng` - Source of spawn randomness
    pub fn setup(
        world: &mut World,
        cascade_sites: &[Point3<f32>],
        config: HazardConfig,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let statics = world.hazards().statics();
        let surfaces: Vec<InstanceHandle> = statics.iter().map(|hazard| hazard.instance).collect();
        let anchors: Vec<Point3<f32>> = statics
            .iter()
            .map(|hazard| {
                let center = hazard.volume.center();
                Point3::new(center.x, hazard.volume.min.y, center.z)
            })
            .collect();

        let drops = if world.is_available(BlockKind::Lava) {
            cascade_sites
                .iter()
                .enumerate()
                .flat_map(|(site_index, site)| {
                    cascade::spawn_cascade(
                        *site,
                        &config,
                        site_index * config.drops_per_cascade,
                        rng,
                    )
                })
                .collect()
        } else {
            Vec::new()
        };
        let drop_count = drops.len();
        world.hazards_mut().install_cascades(drops);

        let particles = ParticlePool::seed(&anchors, &config, rng);
        info!(
            "Hazards ready: {} lava surfaces, {} cascade drops, {} particles",
            surfaces.len(),
            drop_count,
            particles.len()
        );

        Self {
            config,
            surfaces,
            anchors,
            particles,
            scroll: TextureScroll::default(),
            time: 0.0,
        }
    }

    /// Advances every hazard animation by one tick.
    pub fn tick(&mut self, world: &mut World, rng: &mut fastrand::Rng) {
        self.time += self.config.time_step;

        let delta = Vector2::from(self.config.scroll_delta);
        self.scroll.advance(delta);
        for handle in &self.surfaces {
            if let Some(instance) = world.instance_mut(*handle) {
                if let InstanceState::Hazard(scroll) = &mut instance.state {
                    scroll.advance(delta);
                }
            }
        }

        let (time, sway) = (self.time, self.config.sway_amplitude);
        for drop in world.hazards_mut().cascades_mut() {
            drop.step(time, sway);
        }

        self.particles.tick(&self.anchors, &self.config, rng);
    }

    /// Particle pool.
    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    /// Texture offset shared by all lava surfaces.
    pub fn scroll_offset(&self) -> Vector2<f32> {
        self.scroll.offset
    }

    /// Animation clock.
    pub fn time(&self) -> f32 {
        self.time
    }
}
