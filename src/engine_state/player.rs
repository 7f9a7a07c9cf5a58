//! # First-Person Player
//!
//! Player state plus the per-tick physics that runs while the player walks the island.
//!
//! ## Tick Order
//!
//! 1. **Ground scan**: the highest solid top face under the player's footprint that is
//!    not above the feet plus the ground tolerance
//! 2. **Vertical integration**: grounded players with no upward speed snap to the ground,
//!    everyone else falls under gravity and lands on the scanned ground instead of
//!    passing through it
//! 3. **Jump**: allowed when grounded or nearly motionless vertically
//! 4. **Horizontal movement**: yaw-relative walking, optionally blocked by tall solids
//! 5. **Floor clamp**: the feet never sink below the configured floor
//! 6. **Hazard check**: any overlap with lava or a cascade drop is reported to the caller

use std::f32::consts::FRAC_PI_2;

use cgmath::{Deg, InnerSpace, Point3, Rad, Vector3, Zero};

use crate::engine_state::{
    config::PhysicsConfig,
    voxels::{aabb::Aabb, registry::SolidRegistry, world::World},
};

/// Largest pitch magnitude.
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Movement commands held for the current tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerCommands {
    /// Walk towards the view direction.
    pub forward: bool,
    /// Walk away from the view direction.
    pub back: bool,
    /// Strafe left.
    pub left: bool,
    /// Strafe right.
    pub right: bool,
    /// Jump if possible.
    pub jump: bool,
}

/// Everything that describes the player between ticks.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlayerState {
    /// Feet position. `y` is the vertical height.
    pub position: Point3<f32>,
    /// Vertical speed per tick, positive upwards.
    pub vertical_velocity: f32,
    /// Whether the last ground scan found ground within tolerance.
    pub on_ground: bool,
    /// Whether the player left the ground through a jump and has not landed yet.
    pub jumping: bool,
    /// Horizontal view angle.
    pub yaw: Rad<f32>,
    /// Vertical view angle.
    pub pitch: Rad<f32>,
}

/// What a physics tick observed.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TickOutcome {
    /// Top of the ground found by the scan, if any.
    pub ground: Option<f32>,
    /// Whether the player volume overlapped a hazard at the end of the tick.
    pub hazard_contact: bool,
}

/// Physics controller for first-person mode.
pub struct FirstPersonController {
    config: PhysicsConfig,
    state: PlayerState,
}

impl FirstPersonController {
    /// Creates a controller with the player at the spawn point.
    pub fn new(config: PhysicsConfig) -> Self {
        let state = Self::spawn_state(&config);
        Self { config, state }
    }

    fn spawn_state(config: &PhysicsConfig) -> PlayerState {
        PlayerState {
            position: Point3::from(config.spawn_point),
            vertical_velocity: 0.0,
            on_ground: false,
            jumping: false,
            yaw: Deg(config.spawn_yaw_degrees).into(),
            pitch: Rad(0.0),
        }
    }

    /// Moves the player back to the spawn point, motionless and facing forward.
    pub fn reset(&mut self) {
        self.state = Self::spawn_state(&self.config);
    }

    /// Current state.
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Current state, mutably.
    pub fn state_mut(&mut self) -> &mut PlayerState {
        &mut self.state
    }

    /// Physics parameters.
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Eye position.
    pub fn eye(&self) -> Point3<f32> {
        self.state.position + Vector3::new(0.0, self.config.eye_height, 0.0)
    }

    /// Player volume at the current position.
    pub fn volume(&self) -> Aabb {
        self.volume_at(self.state.position)
    }

    fn volume_at(&self, feet: Point3<f32>) -> Aabb {
        let diameter = self.config.player_radius * 2.0;
        Aabb::from_base(feet, diameter, self.config.player_height, diameter)
    }

    /// Turns the view by a pointer delta in pixels.
    ///
    /// Pitch is clamped just short of straight up and straight down.
    pub fn look(&mut self, dx: f64, dy: f64) {
        let sensitivity = self.config.look_sensitivity;
        self.state.yaw += Rad(dx as f32 * sensitivity);
        self.state.pitch += Rad(-dy as f32 * sensitivity);
        self.state.pitch.0 = self.state.pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2);
    }

    /// Horizontal walking directions derived from the yaw.
    ///
    /// # Returns
    /// The forward and right unit vectors on the horizontal plane
    pub fn walk_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let (sin, cos) = self.state.yaw.0.sin_cos();
        (Vector3::new(cos, 0.0, sin), Vector3::new(-sin, 0.0, cos))
    }

    /// Highest walkable top face under the player.
    ///
    /// A solid counts when its footprint, grown by the player radius, contains the
    /// player's horizontal position and its top is at most the ground tolerance above
    /// the feet.
    pub fn scan_ground(&self, solids: &SolidRegistry) -> Option<f32> {
        let feet = self.state.position;
        let radius = self.config.player_radius;
        let reach = feet.y + self.config.ground_tolerance;
        solids
            .iter()
            .filter(|solid| {
                (feet.x - solid.center.x).abs() < solid.width * 0.5 + radius
                    && (feet.z - solid.center.z).abs() < solid.depth * 0.5 + radius
                    && solid.top() <= reach
            })
            .map(|solid| solid.top())
            .fold(None, |highest: Option<f32>, top| {
                Some(highest.map_or(top, |h| h.max(top)))
            })
    }

    /// Runs one physics tick.
    ///
    /// # Arguments
    /// * `world` - Provides the solid and hazard registries
    /// * `commands` - Inputs held this tick
    ///
    /// # Returns
    /// What the tick observed. The caller handles a hazard contact.
    pub fn tick(&mut self, world: &World, commands: &PlayerCommands) -> TickOutcome {
        let ground = self.scan_ground(world.solids());
        self.integrate_vertical(ground);

        if commands.jump {
            self.jump();
        }

        self.walk(world.solids(), commands);

        if self.state.position.y < self.config.floor_height {
            self.state.position.y = self.config.floor_height;
            self.state.vertical_velocity = self.state.vertical_velocity.max(0.0);
        }

        TickOutcome {
            ground,
            hazard_contact: world.hazards().touches(&self.volume()),
        }
    }

    fn integrate_vertical(&mut self, ground: Option<f32>) {
        let tolerance = self.config.ground_tolerance;
        let state = &mut self.state;
        state.on_ground = ground.is_some_and(|g| state.position.y - g <= tolerance);

        if state.on_ground && state.vertical_velocity <= 0.0 {
            if let Some(g) = ground {
                state.position.y = g;
            }
            state.vertical_velocity = 0.0;
            state.jumping = false;
            return;
        }

        state.vertical_velocity =
            (state.vertical_velocity - self.config.gravity).max(-self.config.terminal_velocity);
        let next = state.position.y + state.vertical_velocity;
        match ground {
            Some(g) if state.vertical_velocity < 0.0 && next < g => {
                state.position.y = g;
                state.vertical_velocity = 0.0;
                state.on_ground = true;
                state.jumping = false;
            }
            _ => state.position.y = next,
        }
    }

    /// Starts a jump if the player is grounded or nearly motionless vertically.
    ///
    /// # Returns
    /// `true` if the jump happened
    pub fn jump(&mut self) -> bool {
        let state = &mut self.state;
        if state.on_ground || state.vertical_velocity.abs() < self.config.velocity_epsilon {
            state.vertical_velocity = self.config.jump_impulse;
            state.jumping = true;
            true
        } else {
            false
        }
    }

    fn walk(&mut self, solids: &SolidRegistry, commands: &PlayerCommands) {
        let (forward, right) = self.walk_axes();
        let mut direction = Vector3::zero();
        if commands.forward {
            direction += forward;
        }
        if commands.back {
            direction -= forward;
        }
        if commands.right {
            direction += right;
        }
        if commands.left {
            direction -= right;
        }
        if direction.magnitude2() == 0.0 {
            return;
        }

        let target = self.state.position + direction.normalize() * self.config.move_speed;
        if self.config.horizontal_collision && self.blocked_at(solids, target) {
            return;
        }
        self.state.position = target;
    }

    fn blocked_at(&self, solids: &SolidRegistry, feet: Point3<f32>) -> bool {
        let step_height = feet.y + self.config.ground_tolerance;
        let volume = self.volume_at(feet);
        solids
            .iter()
            .any(|solid| solid.top() > step_height && solid.aabb().intersects(&volume))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{config::CreatureConfig, voxels::block::block_kind::BlockKind};

    fn single_block_world() -> World {
        let mut world = World::with_all_kinds(CreatureConfig::default());
        world.place_block(BlockKind::Netherrack, Point3::new(0, 0, 0));
        world
    }

    fn controller_at(position: Point3<f32>) -> FirstPersonController {
        let mut controller = FirstPersonController::new(PhysicsConfig::default());
        controller.state_mut().position = position;
        controller
    }

    #[test]
    fn reset_faces_forward_from_spawn() {
        let mut controller = controller_at(Point3::new(9.0, 9.0, 9.0));
        controller.state_mut().vertical_velocity = -0.3;
        controller.reset();
        let state = controller.state();
        assert_eq!(state.position, Point3::new(0.0, 4.0, 3.0));
        assert_eq!(state.vertical_velocity, 0.0);
        let (forward, _) = controller.walk_axes();
        assert!(forward.x.abs() < 1e-6 && (forward.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn ground_scan_ignores_blocks_above_feet() {
        let world = single_block_world();
        let controller = controller_at(Point3::new(0.0, 0.5, 0.0));
        assert_eq!(controller.scan_ground(world.solids()), None);
        let controller = controller_at(Point3::new(0.0, 0.95, 0.0));
        assert_eq!(controller.scan_ground(world.solids()), Some(1.0));
    }

    #[test]
    fn ground_scan_uses_grown_footprint() {
        let world = single_block_world();
        let controller = controller_at(Point3::new(0.79, 1.0, 0.0));
        assert_eq!(controller.scan_ground(world.solids()), Some(1.0));
        let controller = controller_at(Point3::new(0.81, 1.0, 0.0));
        assert_eq!(controller.scan_ground(world.solids()), None);
    }

    #[test]
    fn landing_never_tunnels_through_thin_ground() {
        let world = single_block_world();
        let mut controller = controller_at(Point3::new(0.0, 1.3, 0.0));
        controller.state_mut().vertical_velocity = -0.5;
        controller.tick(&world, &PlayerCommands::default());
        assert_eq!(controller.state().position.y, 1.0);
        assert_eq!(controller.state().vertical_velocity, 0.0);
        assert!(controller.state().on_ground);
    }

    #[test]
    fn grounded_jump_sets_impulse_and_leaves_ground() {
        let world = single_block_world();
        let mut controller = controller_at(Point3::new(0.0, 1.0, 0.0));
        controller.tick(&world, &PlayerCommands::default());
        assert!(controller.state().on_ground);

        let jump = PlayerCommands {
            jump: true,
            ..Default::default()
        };
        controller.tick(&world, &jump);
        assert_eq!(controller.state().vertical_velocity, 0.2);
        assert!(controller.state().jumping);

        controller.tick(&world, &PlayerCommands::default());
        assert!(controller.state().position.y > 1.0);
    }

    #[test]
    fn airborne_jump_is_refused() {
        let mut controller = controller_at(Point3::new(0.0, 10.0, 0.0));
        controller.state_mut().vertical_velocity = -0.3;
        assert!(!controller.jump());
        assert_eq!(controller.state().vertical_velocity, -0.3);
    }

    #[test]
    fn fall_speed_is_capped_and_floor_holds() {
        let world = World::with_all_kinds(CreatureConfig::default());
        let mut controller = controller_at(Point3::new(0.0, 0.0, 0.0));
        for _ in 0..200 {
            controller.tick(&world, &PlayerCommands::default());
            assert!(controller.state().vertical_velocity >= -0.5);
        }
        assert_eq!(controller.state().position.y, -20.0);
    }

    #[test]
    fn walking_follows_yaw() {
        let world = World::with_all_kinds(CreatureConfig::default());
        let mut controller = controller_at(Point3::new(0.0, 0.0, 0.0));
        let forward = PlayerCommands {
            forward: true,
            ..Default::default()
        };
        controller.tick(&world, &forward);
        let position = controller.state().position;
        assert!(position.x.abs() < 1e-6);
        assert!((position.z + 0.1).abs() < 1e-6);

        let diagonal = PlayerCommands {
            forward: true,
            right: true,
            ..Default::default()
        };
        let before = controller.state().position;
        controller.tick(&world, &diagonal);
        let moved = controller.state().position - before;
        let horizontal = Vector3::new(moved.x, 0.0, moved.z).magnitude();
        assert!((horizontal - 0.1).abs() < 1e-5);
    }

    #[test]
    fn horizontal_collision_blocks_walls_when_enabled() {
        let mut world = World::with_all_kinds(CreatureConfig::default());
        world.place_block(BlockKind::Netherrack, Point3::new(0, 0, 0));
        world.place_block(BlockKind::Blackstone, Point3::new(0, 1, -1));
        let walk = PlayerCommands {
            forward: true,
            ..Default::default()
        };

        let mut free = controller_at(Point3::new(0.0, 1.0, -0.15));
        free.tick(&world, &walk);
        assert!(free.state().position.z < -0.15);

        let config = PhysicsConfig {
            horizontal_collision: true,
            ..Default::default()
        };
        let mut blocked = FirstPersonController::new(config);
        blocked.state_mut().position = Point3::new(0.0, 1.0, -0.15);
        blocked.tick(&world, &walk);
        assert_eq!(blocked.state().position.z, -0.15);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut controller = controller_at(Point3::new(0.0, 0.0, 0.0));
        controller.look(0.0, -100_000.0);
        assert!(controller.state().pitch.0 <= FRAC_PI_2);
        controller.look(0.0, 100_000.0);
        assert!(controller.state().pitch.0 >= -FRAC_PI_2);
    }
}
