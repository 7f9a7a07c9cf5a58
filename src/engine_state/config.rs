//! # Engine Configuration
//!
//! Every tunable constant of the build and the simulation lives here, grouped by the
//! subsystem that reads it. The whole tree deserializes from a JSON file with
//! [`EngineConfig::load`]; any section or field left out of the file keeps its default.
//!
//! ## Example
//!
//! ```json
//! {
//!     "seed": 7,
//!     "physics": { "gravity": 0.02, "horizontalCollision": true },
//!     "assets": { "deadlineSecs": 5.0 }
//! }
//! ```

use std::{collections::BTreeMap, fs, path::Path, path::PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::generation::terrain::{MarshRing, TerrainLayer};
use crate::error::ConfigError;

/// Root of the configuration tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Seed for every random draw of the build and the simulation. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Island terrain.
    pub terrain: TerrainConfig,
    /// First-person physics.
    pub physics: PhysicsConfig,
    /// Lava animation, particles and cascades.
    pub hazards: HazardConfig,
    /// Creature wandering.
    pub creatures: CreatureConfig,
    /// Cameras and projections.
    pub camera: CameraConfig,
    /// Model manifest and loading deadline.
    pub assets: AssetConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_rate: 60,
            terrain: TerrainConfig::default(),
            physics: PhysicsConfig::default(),
            hazards: HazardConfig::default(),
            creatures: CreatureConfig::default(),
            camera: CameraConfig::default(),
            assets: AssetConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Arguments
    /// * `path` - Path of a JSON configuration file
    ///
    /// # Returns
    /// The parsed configuration, or the I/O, parse or validation error that stopped it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Creates a random number generator from the configured seed.
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    /// Checks the values that the simulation divides by or iterates over.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(message: impl Into<String>) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid(message.into()))
        }

        if self.tick_rate == 0 {
            return invalid("tickRate must be positive");
        }
        for (index, layer) in self.terrain.layers.iter().enumerate() {
            if layer.max_radius <= 0.0 || layer.solid_radius < 0.0 {
                return invalid(format!("terrain layer {index} has a non-positive radius"));
            }
            if layer.solid_radius > layer.max_radius {
                return invalid(format!(
                    "terrain layer {index} has solidRadius larger than maxRadius"
                ));
            }
        }
        let physics = &self.physics;
        if physics.gravity < 0.0 || physics.terminal_velocity <= 0.0 {
            return invalid("gravity must be non-negative and terminalVelocity positive");
        }
        if physics.player_radius <= 0.0 || physics.player_height <= 0.0 {
            return invalid("player dimensions must be positive");
        }
        let hazards = &self.hazards;
        if hazards.cascade_height <= 0.0 {
            return invalid("cascadeHeight must be positive");
        }
        if hazards.fall_speed[0] <= 0.0 || hazards.fall_speed[0] > hazards.fall_speed[1] {
            return invalid("fallSpeed must be an increasing pair of positive speeds");
        }
        if hazards.particle_life_step <= 0.0 {
            return invalid("particleLifeStep must be positive");
        }
        let camera = &self.camera;
        if camera.orbit_min_distance <= 0.0 || camera.orbit_min_distance > camera.orbit_max_distance
        {
            return invalid("orbit distance limits must be positive and ordered");
        }
        if !(0.0..=1.0).contains(&camera.orbit_damping) {
            return invalid("orbitDamping must lie in [0, 1]");
        }
        if self.assets.deadline_secs <= 0.0 {
            return invalid("deadlineSecs must be positive");
        }
        Ok(())
    }
}

/// Island terrain parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainConfig {
    /// Layers of the floating island, top to bottom.
    pub layers: Vec<TerrainLayer>,
    /// Ring of soul sand scattered over the top layer.
    pub marsh: MarshRing,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            layers: vec![
                TerrainLayer::new(0, 14.0, 10.0, 0.6),
                TerrainLayer::new(-1, 12.0, 8.0, 0.7),
                TerrainLayer::new(-2, 9.0, 6.0, 0.8),
                TerrainLayer::new(-3, 6.0, 4.0, 0.9),
            ],
            marsh: MarshRing::default(),
        }
    }
}

/// First-person physics parameters, in world units per tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsConfig {
    /// Downward acceleration per tick.
    pub gravity: f32,
    /// Largest downward speed.
    pub terminal_velocity: f32,
    /// Upward speed applied by a jump.
    pub jump_impulse: f32,
    /// How far below the feet a top face still counts as ground.
    pub ground_tolerance: f32,
    /// Vertical speeds below this magnitude also allow a jump.
    pub velocity_epsilon: f32,
    /// Horizontal distance per tick.
    pub move_speed: f32,
    /// Horizontal half-extent of the player volume.
    pub player_radius: f32,
    /// Height of the player volume.
    pub player_height: f32,
    /// Eye height above the feet.
    pub eye_height: f32,
    /// Absolute floor for the feet height.
    pub floor_height: f32,
    /// Feet position a first-person session starts at.
    pub spawn_point: [f32; 3],
    /// Initial yaw in degrees. -90 faces the portal.
    pub spawn_yaw_degrees: f32,
    /// Mouse look sensitivity in radians per pixel.
    pub look_sensitivity: f32,
    /// Reject horizontal steps into solids that rise above the step tolerance.
    pub horizontal_collision: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.01,
            terminal_velocity: 0.5,
            jump_impulse: 0.2,
            ground_tolerance: 0.1,
            velocity_epsilon: 1e-3,
            move_speed: 0.1,
            player_radius: 0.3,
            player_height: 1.8,
            eye_height: 1.6,
            floor_height: -20.0,
            spawn_point: [0.0, 4.0, 3.0],
            spawn_yaw_degrees: -90.0,
            look_sensitivity: 0.002,
            horizontal_collision: false,
        }
    }
}

/// Lava animation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HazardConfig {
    /// Texture offset added to every hazard surface per tick.
    pub scroll_delta: [f32; 2],
    /// Animation clock increment per tick.
    pub time_step: f32,
    /// Number of particles in the pool.
    pub particle_count: usize,
    /// Life added to a particle per tick. A particle respawns once its life exceeds 1.
    pub particle_life_step: f32,
    /// Height above which a particle respawns.
    pub particle_ceiling: f32,
    /// Horizontal half-extent of the respawn jitter around a hazard surface.
    pub spawn_jitter: f32,
    /// Height above the hazard surface particles respawn at.
    pub spawn_lift: f32,
    /// Horizontal velocity half-extent.
    pub particle_drift: f32,
    /// Vertical velocity range.
    pub particle_rise: [f32; 2],
    /// Distance a cascade drop falls before it resets.
    pub cascade_height: f32,
    /// Drops per cascade site.
    pub drops_per_cascade: usize,
    /// Fall speed range per tick.
    pub fall_speed: [f32; 2],
    /// Edge length of a drop volume.
    pub drop_scale: f32,
    /// Horizontal sway amplitude of a drop. Visual only.
    pub sway_amplitude: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            scroll_delta: [0.002, 0.001],
            time_step: 0.01,
            particle_count: 80,
            particle_life_step: 0.01,
            particle_ceiling: 5.0,
            spawn_jitter: 0.4,
            spawn_lift: 0.5,
            particle_drift: 0.005,
            particle_rise: [0.01, 0.03],
            cascade_height: 10.0,
            drops_per_cascade: 4,
            fall_speed: [0.04, 0.06],
            drop_scale: 0.8,
            sway_amplitude: 0.05,
        }
    }
}

/// Wander parameters of one creature family.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WanderProfile {
    /// Half-extent of the square new targets are picked from.
    pub radius: f32,
    /// Distance covered per tick.
    pub speed: f32,
    /// Half-extent of the vertical jitter around the spawn height.
    pub vertical_jitter: f32,
}

impl Default for WanderProfile {
    fn default() -> Self {
        Self {
            radius: 10.0,
            speed: 0.03,
            vertical_jitter: 2.0,
        }
    }
}

/// Creature behavior parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatureConfig {
    /// Flying creatures.
    pub aerial: WanderProfile,
    /// Ground creatures.
    pub ground: WanderProfile,
    /// Distance at which a creature counts as having reached its target.
    pub arrival_distance: f32,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            aerial: WanderProfile::default(),
            ground: WanderProfile {
                radius: 3.0,
                speed: 0.015,
                vertical_jitter: 0.0,
            },
            arrival_distance: 1.0,
        }
    }
}

/// Camera and projection parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip plane.
    pub znear: f32,
    /// Far clip plane.
    pub zfar: f32,
    /// Point the orbit camera circles.
    pub orbit_target: [f32; 3],
    /// Initial orbit camera position.
    pub orbit_start: [f32; 3],
    /// Closest orbit distance.
    pub orbit_min_distance: f32,
    /// Farthest orbit distance.
    pub orbit_max_distance: f32,
    /// Fraction of the orbit velocity removed per tick.
    pub orbit_damping: f32,
    /// Orbit rotation in radians per dragged pixel.
    pub orbit_rotate_speed: f32,
    /// Relative distance change per scroll line.
    pub orbit_zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            orbit_target: [0.0, 3.0, 0.0],
            orbit_start: [25.0, 20.0, 25.0],
            orbit_min_distance: 8.0,
            orbit_max_distance: 80.0,
            orbit_damping: 0.05,
            orbit_rotate_speed: 0.005,
            orbit_zoom_speed: 0.05,
        }
    }
}

/// Asset loading parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetConfig {
    /// Directory model paths are resolved against.
    pub root: PathBuf,
    /// Manifest name to model file.
    pub models: BTreeMap<String, PathBuf>,
    /// Seconds after which loading stops waiting for outstanding models.
    pub deadline_secs: f32,
    /// Loader worker threads.
    pub workers: usize,
}

impl Default for AssetConfig {
    fn default() -> Self {
        let models = [
            ("netherrack", "netherrack.glb"),
            ("blackstone", "blackstone.glb"),
            ("netherBricks", "nether_bricks.glb"),
            ("glowstone", "glowstone.glb"),
            ("soulSand", "soul_sand.glb"),
            ("lava", "lava.glb"),
            ("obsidian", "obsidian.glb"),
            ("portalSurface", "portal.glb"),
            ("ghast", "ghast.glb"),
            ("blaze", "blaze.glb"),
            ("piglin", "piglin.glb"),
            ("zombifiedPiglin", "zombified_piglin.glb"),
            ("hoglin", "hoglin.glb"),
            ("phantom", "phantom.glb"),
            ("netherFortress", "nether_fortress.glb"),
            ("skyblockFortress", "skyblock_fortress.glb"),
            ("netherTunnel", "nether_tunnel.glb"),
        ]
        .into_iter()
        .map(|(name, file)| (name.to_string(), Path::new("models").join(file)))
        .collect();

        Self {
            root: PathBuf::from("assets"),
            models,
            deadline_secs: 10.0,
            workers: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.terrain.layers.len(), 4);
        assert_eq!(config.assets.models.len(), 17);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config =
            EngineConfig::from_json(r#"{ "seed": 3, "physics": { "gravity": 0.02 } }"#).unwrap();
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.physics.gravity, 0.02);
        assert_eq!(config.physics.jump_impulse, 0.2);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let result = EngineConfig::from_json(r#"{ "hazards": { "cascadeHeight": 0.0 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = EngineConfig::from_json(r#"{ "tickRate": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = EngineConfig::from_json("{ seed: ");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }
}
