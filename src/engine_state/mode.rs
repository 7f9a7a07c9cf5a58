//! # Mode State Machine
//!
//! Two states, `Orbit` and `FirstPerson`. Activation moves the player to the spawn
//! point and captures the pointer. Deactivation, by command or by touching lava,
//! hands the player's eye position to the orbit camera and releases the pointer.

use std::fmt;

use log::info;

use super::{camera_state::camera::OrbitCamera, player::FirstPersonController};

/// Which camera and physics model drive the simulation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Free camera circling the island. The player does not exist.
    #[default]
    Orbit,
    /// Walking the island under gravity.
    FirstPerson,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Orbit => write!(f, "orbit"),
            Mode::FirstPerson => write!(f, "first-person"),
        }
    }
}

/// Grabs and releases the pointer for first-person look.
///
/// The window shell implements this on top of the platform cursor. Tests use
/// [`NoPointer`] or their own recorders.
pub trait PointerCapture {
    /// Locks and hides the pointer.
    fn capture(&mut self);
    /// Frees and shows the pointer.
    fn release(&mut self);
}

/// Pointer that ignores capture requests.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoPointer;

impl PointerCapture for NoPointer {
    fn capture(&mut self) {}
    fn release(&mut self) {}
}

/// Why first-person mode ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// The exit or toggle command.
    Command,
    /// The player touched lava or a falling drop.
    HazardContact,
}

/// A transition that actually happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModeTransition {
    /// Orbit to first-person.
    Activated,
    /// First-person to orbit.
    Deactivated(ExitReason),
}

/// Owner of the current [`Mode`].
#[derive(Debug, Default)]
pub struct ModeStateMachine {
    mode: Mode,
    transitions: usize,
}

impl ModeStateMachine {
    /// Starts in orbit mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of transitions taken so far.
    pub fn transitions(&self) -> usize {
        self.transitions
    }

    /// Enters first-person mode.
    ///
    /// # Returns
    /// `None` if already in first-person mode, in which case nothing is touched
    pub fn activate(
        &mut self,
        player: &mut FirstPersonController,
        pointer: &mut dyn PointerCapture,
    ) -> Option<ModeTransition> {
        if self.mode == Mode::FirstPerson {
            return None;
        }
        player.reset();
        pointer.capture();
        self.mode = Mode::FirstPerson;
        self.transitions += 1;
        info!("Entered first-person mode at {:?}", player.state().position);
        Some(ModeTransition::Activated)
    }

    /// Leaves first-person mode.
    ///
    /// # Arguments
    /// * `reason` - What ended the mode
    /// * `player` - Source of the viewpoint handed to the orbit camera
    /// * `orbit` - Orbit camera that takes over
    /// * `pointer` - Pointer to release
    ///
    /// # Returns
    /// `None` if already in orbit mode, in which case nothing is touched
    pub fn deactivate(
        &mut self,
        reason: ExitReason,
        player: &FirstPersonController,
        orbit: &mut OrbitCamera,
        pointer: &mut dyn PointerCapture,
    ) -> Option<ModeTransition> {
        if self.mode == Mode::Orbit {
            return None;
        }
        orbit.move_viewpoint_to(player.eye());
        pointer.release();
        self.mode = Mode::Orbit;
        self.transitions += 1;
        info!("Returned to orbit mode ({reason:?})");
        Some(ModeTransition::Deactivated(reason))
    }

    /// Flips the mode in response to the toggle command.
    pub fn toggle(
        &mut self,
        player: &mut FirstPersonController,
        orbit: &mut OrbitCamera,
        pointer: &mut dyn PointerCapture,
    ) -> Option<ModeTransition> {
        match self.mode {
            Mode::Orbit => self.activate(player, pointer),
            Mode::FirstPerson => self.deactivate(ExitReason::Command, player, orbit, pointer),
        }
    }
}
