//! # Model Load Task
//!
//! Loads and normalises one model on a worker thread.

use std::{path::PathBuf, sync::Arc};

use log::{debug, warn};

use super::{
    normalize::{normalize, NormalizedModel},
    source::ModelSource,
    ModelLibrary,
};
use crate::{
    engine_state::{
        task_management::task::{Task, TaskResult},
        voxels::block::block_kind::BlockKind,
    },
    error::AssetError,
};

/// A task that reads one model file and normalises it.
pub struct ModelLoadTask {
    kind: BlockKind,
    path: PathBuf,
    source: Arc<dyn ModelSource>,
}

impl ModelLoadTask {
    /// Creates a load task.
    ///
    /// # Arguments
    /// * `kind` - Kind the model is for
    /// * `path` - Model file, as listed in the manifest
    /// * `source` - Reader shared by every load task
    pub fn new(kind: BlockKind, path: PathBuf, source: Arc<dyn ModelSource>) -> Self {
        Self { kind, path, source }
    }
}

impl Task for ModelLoadTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let outcome = self
            .source
            .load(self.kind, &self.path)
            .map(|raw| normalize(&raw));
        Box::new(ModelLoadTaskResult {
            kind: self.kind,
            outcome,
        })
    }
}

/// The normalised model, or why it could not be produced.
pub struct ModelLoadTaskResult {
    kind: BlockKind,
    outcome: Result<NormalizedModel, AssetError>,
}

impl TaskResult for ModelLoadTaskResult {
    fn handle_result(self: Box<Self>, library: &mut ModelLibrary) {
        match self.outcome {
            Ok(model) => {
                if model.scale != 1.0 {
                    debug!(
                        "Normalized {} with scale {:.4}",
                        self.kind,
                        model.scale
                    );
                }
                library.insert(model);
            }
            Err(error) => {
                warn!("Failed to load model for {}: {error}", self.kind);
                library.record_failure(self.kind, error.to_string());
            }
        }
    }
}
