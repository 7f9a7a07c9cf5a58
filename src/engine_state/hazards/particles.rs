//! Fixed-size pool of embers rising from the lava.

use cgmath::{Point3, Vector3};

use crate::engine_state::config::HazardConfig;

/// GPU-ready particle layout: position followed by life.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleVertex {
    /// World position.
    pub position: [f32; 3],
    /// Life in `[0, 1]`, usable as a fade factor.
    pub life: f32,
}

/// One ember.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    /// World position.
    pub position: Point3<f32>,
    /// Displacement per tick.
    pub velocity: Vector3<f32>,
    /// Age in `[0, 1]`.
    pub life: f32,
}

/// Particles recycled in place. The pool never grows or shrinks after seeding.
#[derive(Debug, Default)]
pub struct ParticlePool {
    particles: Vec<Particle>,
}

impl ParticlePool {
    /// Seeds the pool around random anchors.
    ///
    /// With no anchors there is nothing to emit from and the pool stays empty.
    pub fn seed(anchors: &[Point3<f32>], config: &HazardConfig, rng: &mut fastrand::Rng) -> Self {
        if anchors.is_empty() {
            return Self::default();
        }
        let particles = (0..config.particle_count)
            .map(|_| {
                let anchor = anchors[rng.usize(..anchors.len())];
                let mut position = jitter_around(anchor, config.spawn_jitter, rng);
                position.y += rng.f32() * config.spawn_lift;
                Particle {
                    position,
                    velocity: random_velocity(config, rng),
                    life: rng.f32(),
                }
            })
            .collect();
        Self { particles }
    }

    /// Advances every particle by one tick and respawns the expired ones.
    ///
    /// # Returns
    /// How many particles were respawned
    pub fn tick(
        &mut self,
        anchors: &[Point3<f32>],
        config: &HazardConfig,
        rng: &mut fastrand::Rng,
    ) -> usize {
        if anchors.is_empty() {
            return 0;
        }
        let mut respawned = 0;
        for particle in &mut self.particles {
            particle.position += particle.velocity;
            particle.life += config.particle_life_step;
            if particle.life > 1.0 || particle.position.y > config.particle_ceiling {
                let anchor = anchors[rng.usize(..anchors.len())];
                particle.position = jitter_around(anchor, config.spawn_jitter, rng);
                particle.velocity = random_velocity(config, rng);
                particle.life = 0.0;
                respawned += 1;
            }
        }
        respawned
    }

    /// Particles in pool order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Returns `true` if the pool holds no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Packs the particles for upload.
    pub fn vertices(&self) -> Vec<ParticleVertex> {
        self.particles
            .iter()
            .map(|particle| ParticleVertex {
                position: particle.position.into(),
                life: particle.life,
            })
            .collect()
    }
}

fn jitter_around(anchor: Point3<f32>, jitter: f32, rng: &mut fastrand::Rng) -> Point3<f32> {
    Point3::new(
        anchor.x + (rng.f32() * 2.0 - 1.0) * jitter,
        anchor.y,
        anchor.z + (rng.f32() * 2.0 - 1.0) * jitter,
    )
}

fn random_velocity(config: &HazardConfig, rng: &mut fastrand::Rng) -> Vector3<f32> {
    let [min_rise, max_rise] = config.particle_rise;
    Vector3::new(
        (rng.f32() * 2.0 - 1.0) * config.particle_drift,
        min_rise + rng.f32() * (max_rise - min_rise),
        (rng.f32() * 2.0 - 1.0) * config.particle_drift,
    )
}
