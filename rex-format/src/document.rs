//! Document aggregate: file metadata, coordinate system, ordered blocks.

use glam::Vec3;

use crate::REX_VERSION;
use crate::blocks::{BlockData, DataBlock, Image, MaterialStandard, Mesh};
use crate::codec;
use crate::error::RexError;

/// File-level metadata carried in the fixed 64-byte header.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    /// Format version. Writers store 16 bits, but readers only trust the
    /// low byte; the high byte is unspecified in existing files.
    pub version: u16,
    /// CRC32 field, carried through as stored. No verification algorithm
    /// is defined for it, so the codec never computes or checks it.
    pub crc32: u32,
}

impl Default for FileMeta {
    fn default() -> Self {
        Self {
            version: REX_VERSION,
            crc32: 0,
        }
    }
}

/// Spatial reference of all positions in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    /// Spatial reference system identifier
    pub srid: u32,
    /// Name of the authority defining the srid (e.g. "EPSG")
    pub authority: String,
    /// Global data offset in meters
    pub global_offset: Vec3,
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self {
            srid: 123456,
            authority: "EPSG".to_string(),
            global_offset: Vec3::ZERO,
        }
    }
}

/// A fully decoded, or to-be-encoded, REX container.
///
/// A document is either parsed once from a byte buffer and then read, or
/// built up by appending blocks and serialized once with [`to_bytes`].
///
/// [`to_bytes`]: RexDocument::to_bytes
#[derive(Debug, Clone)]
pub struct RexDocument {
    pub meta: FileMeta,
    pub coordinate_system: CoordinateSystem,
    /// All blocks, in file order
    pub blocks: Vec<DataBlock>,
    /// Next id handed out by [`add_block`](RexDocument::add_block).
    /// Scoped to this document; two documents never share allocator state.
    next_data_id: u64,
}

impl Default for RexDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl RexDocument {
    pub fn new() -> Self {
        Self {
            meta: FileMeta::default(),
            coordinate_system: CoordinateSystem::default(),
            blocks: Vec::new(),
            next_data_id: 1,
        }
    }

    /// Parse a REX container from a byte buffer.
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, RexError> {
        codec::read::decode_document(buffer)
    }

    /// Serialize this document into a byte buffer.
    ///
    /// All blocks are validated and encoded before any output is
    /// assembled; on error nothing is returned, never a partial file.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RexError> {
        codec::write::encode_document(self)
    }

    /// Append a block, assigning the next free data id when the block
    /// carries none (id 0). Returns the id the block ended up with.
    ///
    /// Ids start at 1 and increase monotonically; explicitly assigned ids
    /// push the allocator forward so later auto-assigned ids stay unique.
    pub fn add_block(&mut self, mut block: DataBlock) -> u64 {
        if block.data_id == 0 {
            block.data_id = self.next_data_id;
        }
        self.next_data_id = self.next_data_id.max(block.data_id.saturating_add(1));
        let id = block.data_id;
        self.blocks.push(block);
        id
    }

    /// Wrap a payload in a fresh block and append it.
    pub fn push(&mut self, data: BlockData) -> u64 {
        self.add_block(DataBlock::new(data))
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    // ========================================================================
    // Read accessors for scene-construction layers
    // ========================================================================

    /// All mesh blocks, in file order.
    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.blocks.iter().filter_map(|b| match &b.data {
            BlockData::Mesh(mesh) => Some(mesh),
            _ => None,
        })
    }

    /// All material blocks with their data ids, in file order.
    pub fn materials(&self) -> impl Iterator<Item = (u64, &MaterialStandard)> {
        self.blocks.iter().filter_map(|b| match &b.data {
            BlockData::MaterialStandard(material) => Some((b.data_id, material)),
            _ => None,
        })
    }

    /// All image blocks with their data ids, in file order.
    pub fn images(&self) -> impl Iterator<Item = (u64, &Image)> {
        self.blocks.iter().filter_map(|b| match &b.data {
            BlockData::Image(image) => Some((b.data_id, image)),
            _ => None,
        })
    }

    /// Look up a material block by data id (as referenced from a mesh).
    pub fn find_material(&self, data_id: u64) -> Option<&MaterialStandard> {
        self.materials()
            .find(|(id, _)| *id == data_id)
            .map(|(_, material)| material)
    }

    /// Look up an image block by data id (as referenced from a material).
    pub fn find_image(&self, data_id: u64) -> Option<&Image> {
        self.images()
            .find(|(id, _)| *id == data_id)
            .map(|(_, image)| image)
    }

    /// Build a document from already-decoded parts, seeding the id
    /// allocator past the highest id in use.
    pub(crate) fn from_parts(
        meta: FileMeta,
        coordinate_system: CoordinateSystem,
        blocks: Vec<DataBlock>,
    ) -> Self {
        let next_data_id = blocks
            .iter()
            .map(|b| b.data_id.saturating_add(1))
            .max()
            .unwrap_or(1)
            .max(1);
        Self {
            meta,
            coordinate_system,
            blocks,
            next_data_id,
        }
    }
}
