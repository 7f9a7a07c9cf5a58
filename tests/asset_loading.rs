//! Model loading against real files and against slow or failing sources.

use std::{fs, path::Path, sync::Arc, thread};

use cgmath::Point3;
use nether_island::{
    engine_state::{
        assets::{
            normalize::{FilterMode, RawModel, TextureSampling},
            source::{GltfModelSource, ModelSource},
            AssetLoader, AssetManifest,
        },
        voxels::{aabb::Aabb, block::block_kind::BlockKind},
    },
    error::AssetError,
};
use web_time::{Duration, Instant};

/// One triangle spanning (0, 0, 0) to (4, 2, 1), under a node moved 10 along x.
const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [{ "mesh": 0, "translation": [10.0, 0.0, 0.0] }],
  "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
  "accessors": [{
    "bufferView": 0,
    "componentType": 5126,
    "count": 3,
    "type": "VEC3",
    "min": [0.0, 0.0, 0.0],
    "max": [4.0, 2.0, 1.0]
  }],
  "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
  "buffers": [{
    "byteLength": 36,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAQAAAAAAAAAAAAAAAAAAAAEAAAIA/"
  }],
  "samplers": [{ "magFilter": 9728, "minFilter": 9728 }]
}"#;

/// Takes a fixed time per load and fails for paths named `broken`.
struct SlowSource {
    delay: Duration,
}

impl ModelSource for SlowSource {
    fn load(&self, kind: BlockKind, path: &Path) -> Result<RawModel, AssetError> {
        thread::sleep(self.delay);
        if path.file_stem().is_some_and(|stem| stem == "broken") {
            return Err(AssetError::EmptyModel {
                name: kind.name().to_string(),
            });
        }
        Ok(RawModel {
            kind,
            bounds: Aabb::new(Point3::new(-0.5, 0.0, -0.5), Point3::new(0.5, 1.0, 0.5)),
            texture_count: 1,
            sampling: TextureSampling::default(),
        })
    }
}

#[test]
fn gltf_file_loads_with_node_transform_and_sampler() {
    let directory = tempfile::tempdir().unwrap();
    fs::write(directory.path().join("fortress.gltf"), TRIANGLE_GLTF).unwrap();
    let source = GltfModelSource::new(directory.path());

    let raw = source
        .load(BlockKind::NetherFortress, Path::new("fortress.gltf"))
        .unwrap();
    assert_eq!(raw.bounds.min, Point3::new(10.0, 0.0, 0.0));
    assert_eq!(raw.bounds.max, Point3::new(14.0, 2.0, 1.0));
    assert_eq!(raw.sampling.mag_filter, FilterMode::Nearest);
    assert_eq!(raw.texture_count, 0);
}

#[test]
fn external_buffer_resolves_next_to_the_model() {
    let directory = tempfile::tempdir().unwrap();
    let models = directory.path().join("structures");
    fs::create_dir(&models).unwrap();
    let vertices: Vec<u8> = [0.0f32, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 2.0, 1.0]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    fs::write(models.join("triangle.bin"), vertices).unwrap();
    let external = TRIANGLE_GLTF.replace(
        "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAQAAAAAAAAAAAAAAAAAAAAEAAAIA/",
        "triangle.bin",
    );
    fs::write(models.join("fortress.gltf"), external).unwrap();

    let raw = GltfModelSource::new(directory.path())
        .load(BlockKind::NetherFortress, Path::new("structures/fortress.gltf"))
        .unwrap();
    assert_eq!(raw.bounds.min, Point3::new(10.0, 0.0, 0.0));
    assert_eq!(raw.bounds.max, Point3::new(14.0, 2.0, 1.0));
}

#[test]
fn missing_external_buffer_fails_the_load() {
    let directory = tempfile::tempdir().unwrap();
    let external = TRIANGLE_GLTF.replace(
        "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAQAAAAAAAAAAAAAAAAAAAAEAAAIA/",
        "absent.bin",
    );
    fs::write(directory.path().join("fortress.gltf"), external).unwrap();

    let result = GltfModelSource::new(directory.path())
        .load(BlockKind::NetherFortress, Path::new("fortress.gltf"));
    assert!(result.is_err());
}

#[test]
fn loader_normalises_oversized_models() {
    let directory = tempfile::tempdir().unwrap();
    fs::write(directory.path().join("fortress.gltf"), TRIANGLE_GLTF).unwrap();

    let mut manifest = AssetManifest::default();
    manifest.insert(BlockKind::NetherFortress, "fortress.gltf");
    manifest.insert(BlockKind::Netherrack, "netherrack.glb");
    let loader = AssetLoader::start(
        &manifest,
        Arc::new(GltfModelSource::new(directory.path())),
        2,
        Duration::from_secs(30),
    );
    let (library, report) = loader.wait();

    let fortress = library.get(BlockKind::NetherFortress).unwrap();
    assert!((fortress.scale - 0.25).abs() < 1e-6);
    assert!((fortress.bounds.width() - 1.0).abs() < 1e-5);
    assert!(fortress.bounds.center().x.abs() < 1e-5);
    assert_eq!(fortress.sampling, TextureSampling::PIXEL_ART);

    assert_eq!(report.loaded, vec![BlockKind::NetherFortress]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, BlockKind::Netherrack);
    assert!(report.timed_out.is_empty());
}

#[test]
fn deadline_completes_loading_with_partial_results() {
    let mut manifest = AssetManifest::default();
    manifest.insert(BlockKind::Lava, "lava.glb");
    manifest.insert(BlockKind::Ghast, "ghast.glb");

    let started = Instant::now();
    let mut loader = AssetLoader::start_at(
        &manifest,
        Arc::new(SlowSource {
            delay: Duration::from_secs(2),
        }),
        2,
        Duration::from_millis(100),
        started,
    );

    assert!(loader.poll_at(started).is_none());
    assert!(!loader.progress().complete);

    let report = loader
        .poll_at(started + Duration::from_millis(150))
        .cloned()
        .unwrap();
    assert_eq!(report.timed_out.len(), 2);
    assert!(report.missing().contains(&BlockKind::Lava));
    assert_eq!(loader.progress().fraction(), 1.0);

    let (library, _) = loader.finish();
    assert!(library.get(BlockKind::Lava).is_none());
}

#[test]
fn failed_loads_still_finish_the_batch() {
    let mut manifest = AssetManifest::default();
    manifest.insert(BlockKind::Lava, "lava.glb");
    manifest.insert(BlockKind::Blaze, "broken.glb");
    manifest.insert(BlockKind::Obsidian, "obsidian.glb");

    let loader = AssetLoader::start(
        &manifest,
        Arc::new(SlowSource {
            delay: Duration::from_millis(5),
        }),
        1,
        Duration::from_secs(30),
    );
    let (library, report) = loader.wait();

    assert_eq!(library.available_kinds().count(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.timed_out.is_empty());
    assert_eq!(
        report.missing().into_iter().collect::<Vec<_>>(),
        vec![BlockKind::Blaze]
    );
}
