//! # Creature Behavior
//!
//! Creatures wander while the camera orbits and stop to stare at the player while the
//! player walks the island. Wandering picks a random target around the creature's
//! current position, flies to it in a straight line and picks another once it arrives.

use cgmath::{InnerSpace, Point3, Rad, Vector3};

use crate::engine_state::{mode::Mode, voxels::block::InstanceState, voxels::world::World};

/// Drives every creature in the world's creature list.
pub struct CreatureController {
    arrival_distance: f32,
}

impl CreatureController {
    /// Creates a controller.
    ///
    /// # Arguments
    /// * `arrival_distance` - Distance at which a creature counts as having reached its target
    pub fn new(arrival_distance: f32) -> Self {
        Self { arrival_distance }
    }

    /// Advances every creature by one tick.
    ///
    /// # Arguments
    /// * `world` - World holding the creatures
    /// * `mode` - Current camera mode
    /// * `player` - Player position, looked at in first-person mode
    /// * `rng` - Source of new wander targets
    pub fn tick(
        &self,
        world: &mut World,
        mode: Mode,
        player: Point3<f32>,
        rng: &mut fastrand::Rng,
    ) {
        let handles = world.creatures().to_vec();
        for handle in handles {
            let Some(instance) = world.instance_mut(handle) else {
                continue;
            };
            let position = instance.transform.position;
            let InstanceState::Creature(wander) = &mut instance.state else {
                continue;
            };

            match mode {
                Mode::FirstPerson => {
                    if let Some(yaw) = facing(player - position) {
                        instance.transform.rotation = yaw;
                    }
                }
                Mode::Orbit => {
                    let to_target = wander.target - position;
                    let distance = to_target.magnitude();
                    if distance < self.arrival_distance {
                        wander.target = Point3::new(
                            position.x + (rng.f32() * 2.0 - 1.0) * wander.radius,
                            wander.spawn_height + (rng.f32() * 2.0 - 1.0) * wander.vertical_jitter,
                            position.z + (rng.f32() * 2.0 - 1.0) * wander.radius,
                        );
                    } else {
                        let step = to_target * (wander.speed.min(distance) / distance);
                        instance.transform.position = position + step;
                        if let Some(yaw) = facing(step) {
                            instance.transform.rotation = yaw;
                        }
                    }
                }
            }
        }
    }
}

/// Yaw that turns a model's +z axis towards `direction` on the horizontal plane.
fn facing(direction: Vector3<f32>) -> Option<Rad<f32>> {
    if direction.x.abs() < f32::EPSILON && direction.z.abs() < f32::EPSILON {
        return None;
    }
    Some(Rad(direction.x.atan2(direction.z)))
}
