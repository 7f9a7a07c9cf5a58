//! Pure model normalisation: recentre on the origin, shrink oversized models to unit
//! size and switch texture sampling to blocky nearest-neighbour.

use cgmath::{EuclideanSpace, Point3, Vector3};

use crate::engine_state::voxels::{aabb::Aabb, block::block_kind::BlockKind};

/// Models whose largest dimension is at most this are left at their authored scale.
pub const MAX_UNSCALED_SIZE: f32 = 2.0;

/// Texture filter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterMode {
    /// Nearest texel.
    Nearest,
    /// Bilinear.
    Linear,
}

/// How a model's textures are sampled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextureSampling {
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Whether mipmaps are generated.
    pub mipmaps: bool,
}

impl TextureSampling {
    /// Crisp texels, no mipmaps.
    pub const PIXEL_ART: Self = Self {
        mag_filter: FilterMode::Nearest,
        min_filter: FilterMode::Nearest,
        mipmaps: false,
    };
}

impl Default for TextureSampling {
    fn default() -> Self {
        Self {
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmaps: true,
        }
    }
}

/// A model as read from its file.
#[derive(Clone, Debug, PartialEq)]
pub struct RawModel {
    /// Kind the model was loaded for.
    pub kind: BlockKind,
    /// Bounding box of every mesh in model space.
    pub bounds: Aabb,
    /// Number of textures the model references.
    pub texture_count: usize,
    /// Sampling the file asked for.
    pub sampling: TextureSampling,
}

/// A model ready to be instanced by the placement engine.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedModel {
    /// Kind the model was loaded for.
    pub kind: BlockKind,
    /// Uniform scale applied to the raw model.
    pub scale: f32,
    /// Translation applied after scaling, moving the box centre to the origin.
    pub offset: Vector3<f32>,
    /// Bounds after scaling and translation.
    pub bounds: Aabb,
    /// Number of textures the model references.
    pub texture_count: usize,
    /// Sampling to use for every texture.
    pub sampling: TextureSampling,
}

/// Normalises a raw model.
///
/// A model larger than [`MAX_UNSCALED_SIZE`] along any axis is scaled by
/// `1 / largest dimension`. The scaled box is then centred on the origin.
pub fn normalize(raw: &RawModel) -> NormalizedModel {
    let largest = raw
        .bounds
        .width()
        .max(raw.bounds.height())
        .max(raw.bounds.depth());
    let scale = if largest > MAX_UNSCALED_SIZE {
        1.0 / largest
    } else {
        1.0
    };

    let offset = -raw.bounds.center().to_vec() * scale;
    let place = |corner: Point3<f32>| Point3::from_vec(corner.to_vec() * scale + offset);

    NormalizedModel {
        kind: raw.kind,
        scale,
        offset,
        bounds: Aabb::new(place(raw.bounds.min), place(raw.bounds.max)),
        texture_count: raw.texture_count,
        sampling: TextureSampling::PIXEL_ART,
    }
}
