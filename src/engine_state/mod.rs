//! # Engine State Module
//!
//! The simulation core. `EngineState` is built once from the configuration and the
//! loaded models, then advanced in fixed ticks by the application shell.
//!
//! ## Key Components
//!
//! * `EngineState` - Owner of the world and every system that animates it
//! * `voxels` - Block kinds, placement, registries and island generation
//! * `hazards` - Lava scroll, cascades and particles
//! * `creatures` - Creature wandering and look-at
//! * `player` - First-person physics
//! * `mode` - Orbit/first-person state machine
//! * `camera_state` - Orbit and first-person cameras
//! * `assets` - Model manifest, loading and normalisation
//! * `task_management` - Worker threads used by asset loading
//! * `rendering` - Frame snapshots and the renderer seam
//!
//! ## Lifecycle
//!
//! Construction builds the island completely before the hazard system seeds its
//! cascades and particles. Each tick then runs, in order: mode commands, hazard
//! animation, creature behavior, and either the orbit camera or the player physics.
//! A hazard contact during the physics step ends first-person mode in the same tick.

use cgmath::Point3;
use log::info;
use web_time::Duration;
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::application_state::input_state::ProcessedInputState;
use assets::ModelLibrary;
use camera_state::CameraState;
use config::EngineConfig;
use creatures::CreatureController;
use hazards::HazardFlowSystem;
use mode::{ExitReason, Mode, ModeStateMachine, ModeTransition, PointerCapture};
use player::{FirstPersonController, PlayerCommands, TickOutcome};
use rendering::{CascadeSprite, Frame, FrameRenderer};
use voxels::{generation::island::build_island, world::World};

pub mod assets;
pub mod camera_state;
pub mod config;
pub mod creatures;
pub mod hazards;
pub mod mode;
pub mod player;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// Ticks run at most per call to [`EngineState::advance`]. Time beyond this is dropped.
const MAX_TICKS_PER_ADVANCE: u32 = 5;

/// What one tick did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Mode transitions taken, in order.
    pub transitions: Vec<ModeTransition>,
    /// Physics outcome, if the player was simulated.
    pub physics: Option<TickOutcome>,
}

/// The simulation: world, systems and cameras.
pub struct EngineState {
    /// Camera state for both modes
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    config: EngineConfig,
    rng: fastrand::Rng,
    world: World,
    models: ModelLibrary,
    hazards: HazardFlowSystem,
    creatures: CreatureController,
    player: FirstPersonController,
    mode: ModeStateMachine,
    tick: u64,
    tick_interval: Duration,
    accumulator: Duration,
}

impl EngineState {
    /// Builds the island with the available models and prepares the simulation.
    ///
    /// # Arguments
    /// * `config` - Engine configuration
    /// * `models` - Loaded models. Kinds without a model are skipped during the build
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    pub fn new(config: EngineConfig, models: ModelLibrary, width: u32, height: u32) -> Self {
        let mut rng = config.rng();
        let mut world = World::new(models.available_kinds(), config.creatures.clone());
        let layout = build_island(&mut world, &config.terrain, &mut rng);
        info!("Island committed with {} planned blocks", layout.blocks_placed);
        Self::assemble(config, rng, world, models, &layout.cascade_sites, width, height)
    }

    /// Prepares the simulation around a world that is already built.
    ///
    /// # Arguments
    /// * `config` - Engine configuration
    /// * `world` - A completely built world
    /// * `cascade_sites` - Cells lava cascades fall from
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    pub fn from_world(
        config: EngineConfig,
        world: World,
        cascade_sites: &[Point3<f32>],
        width: u32,
        height: u32,
    ) -> Self {
        let rng = config.rng();
        Self::assemble(
            config,
            rng,
            world,
            ModelLibrary::default(),
            cascade_sites,
            width,
            height,
        )
    }

    fn assemble(
        config: EngineConfig,
        mut rng: fastrand::Rng,
        mut world: World,
        models: ModelLibrary,
        cascade_sites: &[Point3<f32>],
        width: u32,
        height: u32,
    ) -> Self {
        let hazards =
            HazardFlowSystem::setup(&mut world, cascade_sites, config.hazards.clone(), &mut rng);
        let skipped: usize = world.skipped_placements().values().sum();
        info!(
            "World ready: {} instances, {} solids, {} lava surfaces, {} creatures, {} cascade drops, {} particles, {} placements skipped",
            world.instances().len(),
            world.solids().len(),
            world.hazards().statics().len(),
            world.creatures().len(),
            world.hazards().cascades().len(),
            hazards.particles().len(),
            skipped
        );

        let tick_rate = config.tick_rate.max(1);
        Self {
            camera_state: CameraState::new(&config.camera, width, height),
            player_actions: PlayerAction::default(),
            creatures: CreatureController::new(config.creatures.arrival_distance),
            player: FirstPersonController::new(config.physics.clone()),
            mode: ModeStateMachine::new(),
            tick: 0,
            tick_interval: Duration::from_secs_f64(1.0 / f64::from(tick_rate)),
            accumulator: Duration::ZERO,
            config,
            rng,
            world,
            models,
            hazards,
        }
    }

    /// Runs as many fixed ticks as `elapsed` covers.
    ///
    /// # Arguments
    /// * `elapsed` - Wall time since the previous call
    /// * `pointer` - Pointer to capture or release on mode changes
    ///
    /// # Returns
    /// The number of ticks run
    pub fn advance(&mut self, elapsed: Duration, pointer: &mut dyn PointerCapture) -> u32 {
        self.accumulator += elapsed;
        let mut ticks = 0;
        while self.accumulator >= self.tick_interval {
            self.accumulator -= self.tick_interval;
            self.tick(pointer);
            ticks += 1;
            if ticks == MAX_TICKS_PER_ADVANCE {
                self.accumulator = Duration::ZERO;
                break;
            }
        }
        ticks
    }

    /// Runs one tick.
    pub fn tick(&mut self, pointer: &mut dyn PointerCapture) -> TickReport {
        let mut report = TickReport::default();
        let actions = self.player_actions.clone();
        self.player_actions.clear_one_shots();

        if actions.toggle_mode {
            report.transitions.extend(self.mode.toggle(
                &mut self.player,
                &mut self.camera_state.orbit,
                pointer,
            ));
        }
        if actions.exit_mode {
            report.transitions.extend(self.mode.deactivate(
                ExitReason::Command,
                &self.player,
                &mut self.camera_state.orbit,
                pointer,
            ));
        }

        self.hazards.tick(&mut self.world, &mut self.rng);
        self.creatures.tick(
            &mut self.world,
            self.mode.mode(),
            self.player.state().position,
            &mut self.rng,
        );

        match self.mode.mode() {
            Mode::Orbit => self
                .camera_state
                .update_orbit(actions.orbit_drag, actions.zoom),
            Mode::FirstPerson => {
                if let Some((dx, dy)) = actions.look {
                    self.player.look(dx, dy);
                }
                let outcome = self.player.tick(&self.world, &actions.commands());
                if outcome.hazard_contact {
                    report.transitions.extend(self.mode.deactivate(
                        ExitReason::HazardContact,
                        &self.player,
                        &mut self.camera_state.orbit,
                        pointer,
                    ));
                }
                report.physics = Some(outcome);
                self.camera_state
                    .follow_player(self.player.state(), self.config.physics.eye_height);
            }
        }

        self.tick += 1;
        report
    }

    /// Snapshot of the current state for drawing.
    pub fn frame(&self) -> Frame<'_> {
        let cascades = self
            .world
            .hazards()
            .cascades()
            .iter()
            .map(|drop| CascadeSprite {
                position: drop.render_position(),
                size: drop.size,
                opacity: drop.opacity(),
            })
            .collect();
        Frame {
            tick: self.tick,
            mode: self.mode.mode(),
            camera: self.camera_state.view(self.mode.mode()),
            world: &self.world,
            models: &self.models,
            cascades,
            particles: self.hazards.particles().vertices(),
            scroll_offset: self.hazards.scroll_offset(),
        }
    }

    /// Draws the current state.
    pub fn render(&self, renderer: &mut dyn FrameRenderer) {
        renderer.render(&self.frame());
    }

    /// Recomputes both camera projections for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera_state.resize(width, height);
    }

    /// Sets the input commands for the engine state.
    ///
    /// Held keys replace the previous movement state. One-shot commands accumulate
    /// until a tick consumes them, so a press is never lost between ticks.
    ///
    /// # Arguments
    /// * `input` - The processed input state to use for setting commands
    pub fn set_input_commands(&mut self, input: &ProcessedInputState) {
        let next = self.translate_processed_input(input);
        self.player_actions.merge(next);
    }

    /// Translates the processed input state into player actions.
    fn translate_processed_input(&self, input: &ProcessedInputState) -> PlayerAction {
        let mut player_action = PlayerAction {
            move_forward: input.get_key_state(KeyCode::KeyW).is_active(),
            move_backward: input.get_key_state(KeyCode::KeyS).is_active(),
            move_left: input.get_key_state(KeyCode::KeyA).is_active(),
            move_right: input.get_key_state(KeyCode::KeyD).is_active(),
            jump: input.get_key_state(KeyCode::Space).is_active(),
            toggle_mode: input.get_key_state(KeyCode::KeyF).is_just_pressed(),
            exit_mode: input.get_key_state(KeyCode::Escape).is_just_pressed(),
            zoom: input.scroll_lines,
            ..Default::default()
        };

        match self.mode.mode() {
            Mode::FirstPerson => player_action.look = input.get_mouse_delta(),
            Mode::Orbit => {
                if input
                    .get_mouse_button_state(MouseButton::Left)
                    .is_active()
                {
                    player_action.orbit_drag = input.get_mouse_delta();
                }
            }
        }

        player_action
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    /// Number of mode transitions so far.
    pub fn transitions(&self) -> usize {
        self.mode.transitions()
    }

    /// Ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// The world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Loaded models.
    pub fn models(&self) -> &ModelLibrary {
        &self.models
    }

    /// Hazard animation state.
    pub fn hazards(&self) -> &HazardFlowSystem {
        &self.hazards
    }

    /// The player.
    pub fn player(&self) -> &FirstPersonController {
        &self.player
    }

    /// The player, mutably.
    pub fn player_mut(&mut self) -> &mut FirstPersonController {
        &mut self.player
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Represents player actions derived from input
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerAction {
    /// Movement actions - true while the key is held
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,

    /// Actions that trigger on key press, not hold
    pub toggle_mode: bool,
    pub exit_mode: bool,

    /// First-person look, pointer pixels
    pub look: Option<(f64, f64)>,
    /// Orbit rotation, pointer pixels while the left button is held
    pub orbit_drag: Option<(f64, f64)>,
    /// Orbit zoom, wheel lines
    pub zoom: f32,
}

impl PlayerAction {
    fn commands(&self) -> PlayerCommands {
        PlayerCommands {
            forward: self.move_forward,
            back: self.move_backward,
            left: self.move_left,
            right: self.move_right,
            jump: self.jump,
        }
    }

    fn merge(&mut self, next: PlayerAction) {
        self.move_forward = next.move_forward;
        self.move_backward = next.move_backward;
        self.move_left = next.move_left;
        self.move_right = next.move_right;
        self.jump = next.jump;
        self.toggle_mode |= next.toggle_mode;
        self.exit_mode |= next.exit_mode;
        self.look = add_delta(self.look, next.look);
        self.orbit_drag = add_delta(self.orbit_drag, next.orbit_drag);
        self.zoom += next.zoom;
    }

    fn clear_one_shots(&mut self) {
        self.toggle_mode = false;
        self.exit_mode = false;
        self.look = None;
        self.orbit_drag = None;
        self.zoom = 0.0;
    }
}

fn add_delta(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a.0 + b.0, a.1 + b.1)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{mode::NoPointer, voxels::block::block_kind::BlockKind};

    fn engine_with(world: World) -> EngineState {
        let config = EngineConfig {
            seed: Some(7),
            ..Default::default()
        };
        EngineState::from_world(config, world, &[], 800, 600)
    }

    #[test]
    fn toggle_command_is_consumed_by_one_tick() {
        let mut engine = engine_with(World::with_all_kinds(Default::default()));
        engine.player_actions.toggle_mode = true;
        let report = engine.tick(&mut NoPointer);
        assert_eq!(report.transitions, vec![ModeTransition::Activated]);
        let report = engine.tick(&mut NoPointer);
        assert!(report.transitions.is_empty());
        assert_eq!(engine.mode(), Mode::FirstPerson);
    }

    #[test]
    fn advance_runs_fixed_ticks_and_caps_catch_up() {
        let mut engine = engine_with(World::with_all_kinds(Default::default()));
        let ticks = engine.advance(Duration::from_millis(60), &mut NoPointer);
        assert_eq!(ticks, 3);
        let ticks = engine.advance(Duration::from_secs(2), &mut NoPointer);
        assert_eq!(ticks, MAX_TICKS_PER_ADVANCE);
        assert_eq!(engine.tick_count(), 3 + u64::from(MAX_TICKS_PER_ADVANCE));
    }

    #[test]
    fn frame_reflects_world() {
        let mut world = World::with_all_kinds(Default::default());
        world.place_block(BlockKind::Lava, Point3::new(2, 0, 0));
        let engine = engine_with(world);
        let frame = engine.frame();
        assert_eq!(frame.mode, Mode::Orbit);
        assert_eq!(frame.world.instances().len(), 1);
        assert_eq!(frame.particles.len(), 80);
        assert_eq!(frame.particle_bytes().len(), 80 * 16);
    }

    #[test]
    fn one_shots_accumulate_until_consumed() {
        let mut action = PlayerAction::default();
        action.merge(PlayerAction {
            toggle_mode: true,
            look: Some((1.0, 2.0)),
            ..Default::default()
        });
        action.merge(PlayerAction {
            look: Some((3.0, 1.0)),
            move_forward: true,
            ..Default::default()
        });
        assert!(action.toggle_mode && action.move_forward);
        assert_eq!(action.look, Some((4.0, 3.0)));
        action.clear_one_shots();
        assert!(!action.toggle_mode && action.move_forward);
        assert_eq!(action.look, None);
    }
}
