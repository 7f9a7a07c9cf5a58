#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Nether Island
//!
//! Builds a floating Nether island out of block models and simulates it: flowing
//! lava, falling lava cascades, drifting particles, wandering creatures, and a
//! first-person walking mode that can be toggled against a free orbit camera.
//!
//! ## Key Modules
//!
//! * `application_state` - Window, input and the loading-to-running lifecycle
//! * `engine_state` - The island build and the per-tick simulation
//! * `error` - Error types for model and configuration loading
//!
//! ## Architecture
//!
//! Models load on worker threads under a deadline. Once they resolve, the island is
//! built in one pass into the world's registries, the lava system seeds its cascades
//! and particles, and the fixed-step tick loop starts. Drawing is delegated to a
//! [`FrameRenderer`](engine_state::rendering::FrameRenderer).
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     nether_island::run();
//! }
//! ```
//!
//! Set `NETHER_ISLAND_CONFIG` to a JSON file to override any part of the
//! configuration, and `RUST_LOG` to choose the log level.

use std::sync::Arc;

use application_state::ApplicationState;
use engine_state::{
    assets::source::GltfModelSource, config::EngineConfig, rendering::LogRenderer,
};
use log::{error, info};
use winit::event_loop::{ControlFlow, EventLoop};

pub mod application_state;
pub mod engine_state;
pub mod error;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV: &str = "NETHER_ISLAND_CONFIG";

/// Initialises logging, loads the configuration and runs the window event loop until
/// the window closes.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => match EngineConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("Could not use config {}: {err}", path.to_string_lossy());
                return;
            }
        },
        None => EngineConfig::default(),
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!("Could not create the event loop: {err}");
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let source = Arc::new(GltfModelSource::new(config.assets.root.clone()));
    let mut state = ApplicationState::new(config, source, Box::new(LogRenderer::default()));

    if let Err(err) = event_loop.run_app(&mut state) {
        error!("Event loop stopped with an error: {err}");
    }
}
