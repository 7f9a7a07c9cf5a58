//! Where raw models come from.

use std::path::{Path, PathBuf};

use cgmath::{Matrix4, Point3, SquareMatrix, Transform};

use super::normalize::{FilterMode, RawModel, TextureSampling};
use crate::{
    engine_state::voxels::{aabb::Aabb, block::block_kind::BlockKind},
    error::AssetError,
};

/// Reads a model file into a [`RawModel`].
///
/// Implementations run on worker threads.
pub trait ModelSource: Send + Sync {
    /// Loads the model for `kind` from `path`.
    fn load(&self, kind: BlockKind, path: &Path) -> Result<RawModel, AssetError>;
}

/// Reads binary or embedded glTF files relative to a root directory.
#[derive(Clone, Debug)]
pub struct GltfModelSource {
    root: PathBuf,
}

impl GltfModelSource {
    /// Creates a source resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ModelSource for GltfModelSource {
    fn load(&self, kind: BlockKind, path: &Path) -> Result<RawModel, AssetError> {
        let path = self.root.join(path);
        // relative buffer and image URIs resolve against the model's directory
        let (document, _buffers, _images) = gltf::import(&path).map_err(|error| match error {
            gltf::Error::Io(source) => AssetError::Io {
                path: path.clone(),
                source,
            },
            source => AssetError::Gltf {
                path: path.clone(),
                source,
            },
        })?;

        let bounds = document_bounds(&document).ok_or_else(|| AssetError::EmptyModel {
            name: kind.name().to_string(),
        })?;

        Ok(RawModel {
            kind,
            bounds,
            texture_count: document.textures().count(),
            sampling: document_sampling(&document),
        })
    }
}

/// Bounding box of every mesh primitive in every scene, with node transforms applied.
fn document_bounds(document: &gltf::Document) -> Option<Aabb> {
    let mut stack: Vec<(gltf::Node, Matrix4<f32>)> = document
        .scenes()
        .flat_map(|scene| scene.nodes())
        .map(|node| (node, Matrix4::identity()))
        .collect();

    let mut bounds: Option<(Point3<f32>, Point3<f32>)> = None;
    while let Some((node, parent)) = stack.pop() {
        let world = parent * Matrix4::from(node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                let bb = primitive.bounding_box();
                for corner in box_corners(bb.min, bb.max) {
                    let point = world.transform_point(corner);
                    bounds = Some(match bounds {
                        None => (point, point),
                        Some((min, max)) => (
                            Point3::new(min.x.min(point.x), min.y.min(point.y), min.z.min(point.z)),
                            Point3::new(max.x.max(point.x), max.y.max(point.y), max.z.max(point.z)),
                        ),
                    });
                }
            }
        }
        stack.extend(node.children().map(|child| (child, world)));
    }

    bounds.map(|(min, max)| Aabb::new(min, max))
}

fn box_corners(min: [f32; 3], max: [f32; 3]) -> [Point3<f32>; 8] {
    let mut corners = [Point3::new(0.0, 0.0, 0.0); 8];
    for (index, corner) in corners.iter_mut().enumerate() {
        *corner = Point3::new(
            if index & 1 == 0 { min[0] } else { max[0] },
            if index & 2 == 0 { min[1] } else { max[1] },
            if index & 4 == 0 { min[2] } else { max[2] },
        );
    }
    corners
}

/// Sampling requested by the first sampler that sets a magnification filter.
fn document_sampling(document: &gltf::Document) -> TextureSampling {
    let mag = document
        .samplers()
        .find_map(|sampler| sampler.mag_filter())
        .map(|filter| match filter {
            gltf::texture::MagFilter::Nearest => FilterMode::Nearest,
            gltf::texture::MagFilter::Linear => FilterMode::Linear,
        });
    match mag {
        Some(mag_filter) => TextureSampling {
            mag_filter,
            ..TextureSampling::default()
        },
        None => TextureSampling::default(),
    }
}
