//! Typed model of the six REX data block variants.
//!
//! A block is one self-contained record within the container. Every block
//! shares the same 16-byte record header (type tag, version, payload size,
//! data id); the payload layout is owned by the variant.

use glam::{Vec2, Vec3, Vec4};

use crate::NO_TEXTURE;
use crate::error::RexError;

/// Block type tags as stored in the file.
///
/// The integer values are part of the wire format and must not be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum BlockType {
    LineSet = 0,
    Text = 1,
    PointList = 2,
    Mesh = 3,
    Image = 4,
    MaterialStandard = 5,
}

impl BlockType {
    /// Map a wire tag to a block type.
    pub fn from_tag(tag: u16) -> Result<Self, RexError> {
        match tag {
            0 => Ok(BlockType::LineSet),
            1 => Ok(BlockType::Text),
            2 => Ok(BlockType::PointList),
            3 => Ok(BlockType::Mesh),
            4 => Ok(BlockType::Image),
            5 => Ok(BlockType::MaterialStandard),
            other => Err(RexError::UnknownBlockType(other)),
        }
    }

    /// The wire tag for this block type.
    pub fn tag(self) -> u16 {
        self as u16
    }
}

/// Image payload encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCompression {
    /// RGB, 1 byte per channel, no container
    Raw24,
    /// Encoded JPEG data stream
    Jpeg,
    /// Encoded PNG data stream
    Png,
}

impl ImageCompression {
    /// Map a wire tag to a compression kind.
    pub fn from_raw(raw: u32) -> Result<Self, RexError> {
        match raw {
            0 => Ok(ImageCompression::Raw24),
            1 => Ok(ImageCompression::Jpeg),
            2 => Ok(ImageCompression::Png),
            other => Err(RexError::UnsupportedEncoding(other)),
        }
    }

    /// The wire tag for this compression kind.
    pub fn to_raw(self) -> u32 {
        match self {
            ImageCompression::Raw24 => 0,
            ImageCompression::Jpeg => 1,
            ImageCompression::Png => 2,
        }
    }

    /// Conventional file extension for the payload (for unpacking tools).
    pub fn extension(self) -> &'static str {
        match self {
            ImageCompression::Raw24 => "raw",
            ImageCompression::Jpeg => "jpg",
            ImageCompression::Png => "png",
        }
    }
}

/// One data block: record header fields plus the typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBlock {
    /// Unique id within a document. 0 means "not yet assigned";
    /// [`crate::RexDocument::add_block`] fills it in.
    pub data_id: u64,
    /// Per-block format version (1 in all current files).
    pub version: u16,
    /// The typed payload.
    pub data: BlockData,
}

impl DataBlock {
    /// Wrap a payload in a block with no id assigned yet.
    pub fn new(data: BlockData) -> Self {
        Self {
            data_id: 0,
            version: crate::REX_VERSION,
            data,
        }
    }

    /// Wrap a payload in a block with an explicit id.
    pub fn with_id(data_id: u64, data: BlockData) -> Self {
        Self {
            data_id,
            version: crate::REX_VERSION,
            data,
        }
    }

    /// The wire tag of this block's payload.
    pub fn block_type(&self) -> BlockType {
        self.data.block_type()
    }
}

/// Payload variants, one per [`BlockType`].
#[derive(Debug, Clone, PartialEq)]
pub enum BlockData {
    LineSet(LineSet),
    Text(Text),
    PointList(PointList),
    Mesh(Mesh),
    Image(Image),
    MaterialStandard(MaterialStandard),
}

impl BlockData {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockData::LineSet(_) => BlockType::LineSet,
            BlockData::Text(_) => BlockType::Text,
            BlockData::PointList(_) => BlockType::PointList,
            BlockData::Mesh(_) => BlockType::Mesh,
            BlockData::Image(_) => BlockType::Image,
            BlockData::MaterialStandard(_) => BlockType::MaterialStandard,
        }
    }
}

/// Connected polyline with a single RGBA color.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSet {
    /// Line color (RGBA, components in 0.0..=1.0)
    pub color: Vec4,
    /// Polyline vertices in order
    pub vertices: Vec<Vec3>,
}

/// Text annotation anchored at a 3D position.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// Text color (RGBA, components in 0.0..=1.0)
    pub color: Vec4,
    /// Anchor position. Unlike every other position in the format, text
    /// anchors are stored without the Z-axis sign flip; kept that way for
    /// compatibility with existing files.
    pub position: Vec3,
    /// Font size
    pub size: f32,
    /// The annotation text
    pub text: String,
}

/// Unstructured point cloud with optional per-point colors.
#[derive(Debug, Clone, PartialEq)]
pub struct PointList {
    /// Point positions
    pub vertices: Vec<Vec3>,
    /// Per-point RGB colors. The wire format does not tie this length to
    /// the vertex count; callers must reconcile the two.
    pub colors: Vec<Vec3>,
}

/// Triangle mesh with optional normals, UVs and vertex colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Level of detail of this mesh (informational)
    pub lod: u16,
    /// Highest level of detail available for the object (informational)
    pub max_lod: u16,
    /// Mesh name, at most 74 bytes on the wire
    pub name: String,
    /// Vertex positions
    pub vertices: Vec<Vec3>,
    /// Vertex normals; empty when none were supplied, in which case
    /// consumers recompute them from the triangles
    pub normals: Vec<Vec3>,
    /// Texture coordinates; empty or one per vertex
    pub uvs: Vec<Vec2>,
    /// RGB vertex colors; empty or one per vertex
    pub vertex_colors: Vec<Vec3>,
    /// Triangle vertex indices, three per triangle
    pub triangle_indices: Vec<u32>,
    /// Data id of a [`MaterialStandard`] block, or [`NO_TEXTURE`] for none
    pub material_id: u64,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len() / 3
    }

    /// Whether this mesh references a material block.
    pub fn has_material(&self) -> bool {
        self.material_id != NO_TEXTURE
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    pub fn has_vertex_colors(&self) -> bool {
        !self.vertex_colors.is_empty()
    }
}

/// Embedded image, also referenced by materials as a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub compression: ImageCompression,
    /// Encoded image bytes, carried opaquely
    pub data: Vec<u8>,
}

impl Image {
    pub fn is_raw(&self) -> bool {
        self.compression == ImageCompression::Raw24
    }
}

/// Phong-style material parameters.
///
/// Texture ids refer to [`Image`] blocks by data id; [`NO_TEXTURE`] means
/// the channel has no texture bound.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialStandard {
    /// Ambient color (RGB)
    pub ambient: Vec3,
    pub ambient_texture_id: u64,
    /// Diffuse color (RGB)
    pub diffuse: Vec3,
    pub diffuse_texture_id: u64,
    /// Specular color (RGB)
    pub specular: Vec3,
    pub specular_texture_id: u64,
    /// Specular exponent
    pub shininess: f32,
    /// Opacity, 1.0 = fully opaque
    pub alpha: f32,
}

impl Default for MaterialStandard {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            ambient_texture_id: NO_TEXTURE,
            diffuse: Vec3::ZERO,
            diffuse_texture_id: NO_TEXTURE,
            specular: Vec3::ZERO,
            specular_texture_id: NO_TEXTURE,
            shininess: 0.0,
            alpha: 1.0,
        }
    }
}

impl MaterialStandard {
    /// Solid-color material with the given diffuse color and opacity.
    pub fn diffuse_only(diffuse: Vec3, alpha: f32) -> Self {
        Self {
            diffuse,
            alpha,
            ..Default::default()
        }
    }

    pub fn has_any_texture(&self) -> bool {
        self.ambient_texture_id != NO_TEXTURE
            || self.diffuse_texture_id != NO_TEXTURE
            || self.specular_texture_id != NO_TEXTURE
    }
}
