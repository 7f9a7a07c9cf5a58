//! # Asset Loading
//!
//! Resolves the block models named in the manifest before the island is built.
//!
//! Every manifest entry becomes a [`ModelLoadTask`] on the worker pool. The loader is
//! polled once per frame; failed loads count as resolved so progress still reaches
//! 100 %. A deadline races the whole batch: once it passes, loading completes with
//! whatever resolved and the rest are reported as timed out. Kinds without a model
//! are simply unavailable to the placement engine.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
    sync::Arc,
    thread,
};

use log::{info, warn};
use web_time::{Duration, Instant};

use super::{
    config::AssetConfig, task_management::TaskManager, voxels::block::block_kind::BlockKind,
};
use crate::error::AssetError;
use model_load_task::ModelLoadTask;
use normalize::NormalizedModel;
use source::ModelSource;

pub mod model_load_task;
pub mod normalize;
pub mod source;

/// Interval between polls while blocking in [`AssetLoader::wait`].
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Block kinds mapped to model files.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetManifest {
    entries: BTreeMap<BlockKind, PathBuf>,
}

impl AssetManifest {
    /// Builds a manifest from configuration. Names that are not block kinds are
    /// skipped with a warning.
    pub fn from_config(config: &AssetConfig) -> Self {
        let mut entries = BTreeMap::new();
        for (name, path) in &config.models {
            match BlockKind::from_name(name) {
                Some(kind) => {
                    entries.insert(kind, path.clone());
                }
                None => warn!("{}", AssetError::UnknownModel(name.clone())),
            }
        }
        Self { entries }
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, kind: BlockKind, path: impl Into<PathBuf>) {
        self.entries.insert(kind, path.into());
    }

    /// Entries in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockKind, &PathBuf)> {
        self.entries.iter().map(|(kind, path)| (*kind, path))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the manifest names no models.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Models that resolved, and the kinds that failed.
#[derive(Debug, Default)]
pub struct ModelLibrary {
    models: BTreeMap<BlockKind, NormalizedModel>,
    failures: BTreeMap<BlockKind, String>,
}

impl ModelLibrary {
    /// Stores a loaded model.
    pub fn insert(&mut self, model: NormalizedModel) {
        self.models.insert(model.kind, model);
    }

    /// Records a failed load.
    pub fn record_failure(&mut self, kind: BlockKind, reason: String) {
        self.failures.insert(kind, reason);
    }

    /// Model for `kind`, if it resolved.
    pub fn get(&self, kind: BlockKind) -> Option<&NormalizedModel> {
        self.models.get(&kind)
    }

    /// Kinds with a model.
    pub fn available_kinds(&self) -> impl Iterator<Item = BlockKind> + '_ {
        self.models.keys().copied()
    }

    /// Number of loads that finished, successfully or not.
    pub fn resolved(&self) -> usize {
        self.models.len() + self.failures.len()
    }

    fn is_resolved(&self, kind: BlockKind) -> bool {
        self.models.contains_key(&kind) || self.failures.contains_key(&kind)
    }
}

/// Fraction of the manifest that has resolved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LoadProgress {
    /// Loads finished, successfully or not.
    pub resolved: usize,
    /// Loads requested.
    pub total: usize,
    /// Whether loading completed, by resolution or by deadline.
    pub complete: bool,
}

impl LoadProgress {
    /// Progress in `[0, 1]`. A completed load reads 1 even if the deadline cut it short.
    pub fn fraction(&self) -> f32 {
        if self.complete || self.total == 0 {
            1.0
        } else {
            self.resolved as f32 / self.total as f32
        }
    }

    /// Whole percent, for display.
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }
}

/// How loading ended.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadReport {
    /// Kinds whose model resolved.
    pub loaded: Vec<BlockKind>,
    /// Kinds whose load failed, with the reason.
    pub failed: Vec<(BlockKind, String)>,
    /// Kinds still outstanding at the deadline.
    pub timed_out: Vec<BlockKind>,
}

impl LoadReport {
    /// Every kind without a model.
    pub fn missing(&self) -> BTreeSet<BlockKind> {
        self.failed
            .iter()
            .map(|(kind, _)| *kind)
            .chain(self.timed_out.iter().copied())
            .collect()
    }
}

/// Runs the manifest's loads against a deadline.
pub struct AssetLoader {
    task_manager: TaskManager,
    library: ModelLibrary,
    requested: Vec<BlockKind>,
    deadline: Instant,
    report: Option<LoadReport>,
}

impl AssetLoader {
    /// Publishes one load task per manifest entry.
    ///
    /// # Arguments
    /// * `manifest` - Models to load
    /// * `source` - Reader shared by the tasks
    /// * `workers` - Worker threads to spread the loads over
    /// * `deadline` - How long to wait for the whole batch
    pub fn start(
        manifest: &AssetManifest,
        source: Arc<dyn ModelSource>,
        workers: usize,
        deadline: Duration,
    ) -> Self {
        Self::start_at(manifest, source, workers, deadline, Instant::now())
    }

    /// [`AssetLoader::start`] with an explicit start time.
    pub fn start_at(
        manifest: &AssetManifest,
        source: Arc<dyn ModelSource>,
        workers: usize,
        deadline: Duration,
        now: Instant,
    ) -> Self {
        let mut task_manager = TaskManager::new(workers);
        let mut requested = Vec::with_capacity(manifest.len());
        for (kind, path) in manifest.iter() {
            requested.push(kind);
            task_manager.publish_task(Box::new(ModelLoadTask::new(
                kind,
                path.clone(),
                source.clone(),
            )));
        }
        info!(
            "Loading {} models with a {:.1}s deadline",
            requested.len(),
            deadline.as_secs_f32()
        );

        Self {
            task_manager,
            library: ModelLibrary::default(),
            requested,
            deadline: now + deadline,
            report: None,
        }
    }

    /// Current progress.
    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            resolved: self.library.resolved(),
            total: self.requested.len(),
            complete: self.report.is_some(),
        }
    }

    /// Applies finished loads and checks the deadline.
    ///
    /// # Returns
    /// The report once loading has completed
    pub fn poll(&mut self) -> Option<&LoadReport> {
        self.poll_at(Instant::now())
    }

    /// [`AssetLoader::poll`] with an explicit current time.
    pub fn poll_at(&mut self, now: Instant) -> Option<&LoadReport> {
        if self.report.is_none() {
            self.task_manager.process_completed_tasks(&mut self.library);
            self.task_manager.process_queued_tasks();

            if self.library.resolved() >= self.requested.len() {
                self.report = Some(self.build_report(Vec::new()));
            } else if now >= self.deadline {
                let timed_out: Vec<BlockKind> = self
                    .requested
                    .iter()
                    .copied()
                    .filter(|kind| !self.library.is_resolved(*kind))
                    .collect();
                let names: Vec<&str> = timed_out.iter().map(|kind| kind.name()).collect();
                warn!(
                    "Model loading deadline passed, continuing without: {}",
                    names.join(", ")
                );
                self.report = Some(self.build_report(timed_out));
            }

            if let Some(report) = &self.report {
                info!(
                    "Model loading complete: {} loaded, {} failed, {} timed out",
                    report.loaded.len(),
                    report.failed.len(),
                    report.timed_out.len()
                );
            }
        }
        self.report.as_ref()
    }

    fn build_report(&self, timed_out: Vec<BlockKind>) -> LoadReport {
        LoadReport {
            loaded: self.library.available_kinds().collect(),
            failed: self
                .library
                .failures
                .iter()
                .map(|(kind, reason)| (*kind, reason.clone()))
                .collect(),
            timed_out,
        }
    }

    /// Blocks until loading completes.
    pub fn wait(mut self) -> (ModelLibrary, LoadReport) {
        while self.poll().is_none() {
            thread::sleep(WAIT_POLL_INTERVAL);
        }
        self.finish()
    }

    /// Gives up the loader, returning the library and report.
    ///
    /// Outstanding loads are abandoned. If loading has not completed, the report
    /// lists them as timed out.
    pub fn finish(mut self) -> (ModelLibrary, LoadReport) {
        let report = match self.report.take() {
            Some(report) => report,
            None => {
                let outstanding = self
                    .requested
                    .iter()
                    .copied()
                    .filter(|kind| !self.library.is_resolved(*kind))
                    .collect();
                self.build_report(outstanding)
            }
        };
        (self.library, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        assets::normalize::{RawModel, TextureSampling},
        voxels::aabb::Aabb,
    };
    use cgmath::Point3;
    use std::path::Path;

    struct CubeSource;

    impl ModelSource for CubeSource {
        fn load(&self, kind: BlockKind, path: &Path) -> Result<RawModel, AssetError> {
            if path.ends_with("broken.glb") {
                return Err(AssetError::EmptyModel {
                    name: kind.name().to_string(),
                });
            }
            Ok(RawModel {
                kind,
                bounds: Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)),
                texture_count: 1,
                sampling: TextureSampling::default(),
            })
        }
    }

    #[test]
    fn manifest_skips_unknown_names() {
        let mut config = AssetConfig::default();
        config.models.insert("creeper".into(), "creeper.glb".into());
        let manifest = AssetManifest::from_config(&config);
        assert_eq!(manifest.len(), BlockKind::ALL.len());
    }

    #[test]
    fn failures_count_towards_progress() {
        let mut manifest = AssetManifest::default();
        manifest.insert(BlockKind::Netherrack, "netherrack.glb");
        manifest.insert(BlockKind::Lava, "broken.glb");
        let loader = AssetLoader::start(&manifest, Arc::new(CubeSource), 2, Duration::from_secs(30));
        let (library, report) = loader.wait();
        assert!(library.get(BlockKind::Netherrack).is_some());
        assert_eq!(report.loaded, vec![BlockKind::Netherrack]);
        assert_eq!(report.failed.len(), 1);
        assert!(report.missing().contains(&BlockKind::Lava));
    }

    #[test]
    fn empty_manifest_completes_immediately() {
        let mut loader = AssetLoader::start(
            &AssetManifest::default(),
            Arc::new(CubeSource),
            1,
            Duration::from_secs(1),
        );
        assert!(loader.poll().is_some());
        assert_eq!(loader.progress().fraction(), 1.0);
    }
}
