//! # Error Types
//!
//! Errors surfaced by the parts of the crate that touch the outside world:
//! model files and configuration files. The simulation itself has no fatal
//! errors; placement and loading degrade to "skip and continue".

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or normalizing a model.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The model file could not be read.
    #[error("failed to read model {}: {source}", path.display())]
    Io {
        /// Path of the model file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file was read but is not a valid glTF/GLB document.
    #[error("failed to import glTF {}: {source}", path.display())]
    Gltf {
        /// Path of the model file.
        path: PathBuf,
        /// Underlying glTF error.
        source: gltf::Error,
    },

    /// The document contains no mesh positions to build a bounding box from.
    #[error("model {name} contains no mesh geometry")]
    EmptyModel {
        /// Manifest name of the model.
        name: String,
    },

    /// The manifest references a name that is not a known block kind.
    #[error("unknown model name: {0}")]
    UnknownModel(String),
}

/// Errors raised while loading or validating an [`EngineConfig`](crate::engine_state::config::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for the config schema.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration parsed but holds values the engine cannot use.
    #[error("invalid config: {0}")]
    Invalid(String),
}
