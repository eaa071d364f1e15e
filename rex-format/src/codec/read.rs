//! Decoding REX containers from byte buffers

use glam::{Vec2, Vec3, Vec4};
use tracing::debug;

use crate::blocks::{
    BlockData, BlockType, DataBlock, Image, ImageCompression, LineSet, MaterialStandard, Mesh,
    PointList, Text,
};
use crate::document::{CoordinateSystem, FileMeta, RexDocument};
use crate::error::RexError;
use crate::{BLOCK_HEADER_SIZE, FILE_HEADER_SIZE, MESH_NAME_FIELD_SIZE, REX_MAGIC};

use super::{BlockHeader, flip_winding};

// =============================================================================
// Primitive reads
// =============================================================================

/// Little-endian cursor over a byte slice.
///
/// Every read is bounds-checked: running past the end yields
/// [`RexError::TruncatedData`], never a panic or an out-of-bounds access.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Consume `n` bytes, or fail without advancing.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], RexError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(RexError::TruncatedData {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16, RexError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, RexError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64, RexError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    pub fn read_f32(&mut self) -> Result<f32, RexError> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read `len` bytes of ASCII text.
    pub fn read_string(&mut self, len: usize) -> Result<String, RexError> {
        let bytes = self.take(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read an RGBA color as four packed floats.
    pub fn read_rgba(&mut self) -> Result<Vec4, RexError> {
        Ok(Vec4::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    /// Read an RGB color as three packed floats.
    pub fn read_rgb(&mut self) -> Result<Vec3, RexError> {
        Ok(Vec3::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    /// Read `count` tightly packed 3D positions, negating Z to convert
    /// from the file's handedness to the caller's.
    pub fn read_positions(&mut self, count: usize) -> Result<Vec<Vec3>, RexError> {
        let bytes = self.take(count * 12)?;
        let mut out = Vec::with_capacity(count);
        for v in bytes.chunks_exact(12) {
            let x = f32::from_le_bytes([v[0], v[1], v[2], v[3]]);
            let y = f32::from_le_bytes([v[4], v[5], v[6], v[7]]);
            let z = f32::from_le_bytes([v[8], v[9], v[10], v[11]]);
            out.push(Vec3::new(x, y, -z));
        }
        Ok(out)
    }

    /// Read `count` tightly packed 2D vectors.
    pub fn read_vec2s(&mut self, count: usize) -> Result<Vec<Vec2>, RexError> {
        let bytes = self.take(count * 8)?;
        let mut out = Vec::with_capacity(count);
        for v in bytes.chunks_exact(8) {
            let x = f32::from_le_bytes([v[0], v[1], v[2], v[3]]);
            let y = f32::from_le_bytes([v[4], v[5], v[6], v[7]]);
            out.push(Vec2::new(x, y));
        }
        Ok(out)
    }

    /// Read `count` tightly packed RGB colors.
    pub fn read_rgbs(&mut self, count: usize) -> Result<Vec<Vec3>, RexError> {
        let bytes = self.take(count * 12)?;
        let mut out = Vec::with_capacity(count);
        for c in bytes.chunks_exact(12) {
            let r = f32::from_le_bytes([c[0], c[1], c[2], c[3]]);
            let g = f32::from_le_bytes([c[4], c[5], c[6], c[7]]);
            let b = f32::from_le_bytes([c[8], c[9], c[10], c[11]]);
            out.push(Vec3::new(r, g, b));
        }
        Ok(out)
    }
}

// =============================================================================
// Document decoding
// =============================================================================

/// Parse a full REX container.
pub(crate) fn decode_document(buffer: &[u8]) -> Result<RexDocument, RexError> {
    if buffer.len() < FILE_HEADER_SIZE {
        return Err(RexError::TruncatedHeader(buffer.len()));
    }

    let mut r = Reader::new(buffer);

    if r.take(4)? != REX_MAGIC {
        return Err(RexError::BadMagic);
    }

    // The version occupies two bytes on the wire, but only the low byte is
    // meaningful in existing files; both bytes are consumed.
    let version = u16::from(r.take(2)?[0]);
    let crc32 = r.read_u32()?;
    let block_count = r.read_u16()?;
    let data_start = usize::from(r.read_u16()?);
    let _total_data_size = r.read_u64()?;

    r.seek(FILE_HEADER_SIZE);
    let coordinate_system = decode_coordinate_system(&mut r)?;

    let mut blocks = Vec::with_capacity(usize::from(block_count));
    let mut offset = data_start;
    for index in 0..block_count {
        let (block, payload_size) =
            decode_block(buffer, offset).map_err(|e| RexError::CorruptBlock {
                index,
                count: block_count,
                offset,
                source: Box::new(e),
            })?;
        blocks.push(block);
        // the header's payload size locates the next block, whatever the
        // block type turned out to be
        offset += BLOCK_HEADER_SIZE + payload_size;
    }

    debug!(
        blocks = blocks.len(),
        bytes = buffer.len(),
        "decoded REX document"
    );

    Ok(RexDocument::from_parts(
        FileMeta { version, crc32 },
        coordinate_system,
        blocks,
    ))
}

fn decode_coordinate_system(r: &mut Reader<'_>) -> Result<CoordinateSystem, RexError> {
    let srid = r.read_u32()?;
    let name_len = usize::from(r.read_u16()?);
    let authority = r.read_string(name_len)?;
    let global_offset = Vec3::new(r.read_f32()?, r.read_f32()?, r.read_f32()?);
    Ok(CoordinateSystem {
        srid,
        authority,
        global_offset,
    })
}

/// Decode one block at `offset`; returns the block and its payload size.
fn decode_block(buffer: &[u8], offset: usize) -> Result<(DataBlock, usize), RexError> {
    let mut r = Reader::new(buffer);
    r.seek(offset);

    let header = BlockHeader::read(&mut r)?;
    let payload_size = header.payload_size as usize;

    // Bound the payload so a lying block cannot read into its neighbors.
    let payload = r.take(payload_size)?;
    let mut p = Reader::new(payload);

    let data = match BlockType::from_tag(header.block_type)? {
        BlockType::LineSet => decode_line_set(&mut p)?,
        BlockType::Text => decode_text(&mut p)?,
        BlockType::PointList => decode_point_list(&mut p)?,
        BlockType::Mesh => decode_mesh(&mut p, header.data_id)?,
        BlockType::Image => decode_image(&mut p)?,
        BlockType::MaterialStandard => decode_material(&mut p)?,
    };

    Ok((
        DataBlock {
            data_id: header.data_id,
            version: header.version,
            data,
        },
        payload_size,
    ))
}

// =============================================================================
// Per-block payload decoders
// =============================================================================

fn decode_line_set(p: &mut Reader<'_>) -> Result<BlockData, RexError> {
    let color = p.read_rgba()?;
    let vertex_count = p.read_u32()? as usize;
    let vertices = p.read_positions(vertex_count)?;
    Ok(BlockData::LineSet(LineSet { color, vertices }))
}

fn decode_text(p: &mut Reader<'_>) -> Result<BlockData, RexError> {
    let color = p.read_rgba()?;
    // Text anchors are stored without the Z flip; see the field docs.
    let position = Vec3::new(p.read_f32()?, p.read_f32()?, p.read_f32()?);
    let size = p.read_f32()?;
    let text_len = usize::from(p.read_u16()?);
    let text = p.read_string(text_len)?;
    Ok(BlockData::Text(Text {
        color,
        position,
        size,
        text,
    }))
}

fn decode_point_list(p: &mut Reader<'_>) -> Result<BlockData, RexError> {
    let vertex_count = p.read_u32()? as usize;
    let color_count = p.read_u32()? as usize;
    let vertices = p.read_positions(vertex_count)?;
    let colors = p.read_rgbs(color_count)?;
    Ok(BlockData::PointList(PointList { vertices, colors }))
}

pub(crate) fn decode_mesh(p: &mut Reader<'_>, data_id: u64) -> Result<BlockData, RexError> {
    let lod = p.read_u16()?;
    let max_lod = p.read_u16()?;

    let vertex_count = p.read_u32()? as usize;
    let normal_count = p.read_u32()? as usize;
    let uv_count = p.read_u32()? as usize;
    let color_count = p.read_u32()? as usize;
    let triangle_count = p.read_u32()? as usize;

    // Five absolute sub-array offsets; informational only, the arrays are
    // read sequentially below.
    for _ in 0..5 {
        p.read_u32()?;
    }

    if uv_count > 0 && uv_count != vertex_count {
        return Err(RexError::InconsistentMeshData {
            data_id,
            reason: format!("{uv_count} UVs for {vertex_count} vertices"),
        });
    }
    if color_count > 0 && color_count != vertex_count {
        return Err(RexError::InconsistentMeshData {
            data_id,
            reason: format!("{color_count} vertex colors for {vertex_count} vertices"),
        });
    }

    let material_id = p.read_u64()?;

    let name_len = usize::from(p.read_u16()?).min(MESH_NAME_FIELD_SIZE);
    let name_field = p.take(MESH_NAME_FIELD_SIZE)?;
    let name = String::from_utf8_lossy(&name_field[..name_len]).into_owned();

    let vertices = p.read_positions(vertex_count)?;
    let normals = p.read_positions(normal_count)?;
    let uvs = p.read_vec2s(uv_count)?;
    let vertex_colors = p.read_rgbs(color_count)?;

    let index_bytes = p.take(triangle_count * 12)?;
    let mut triangle_indices = Vec::with_capacity(triangle_count * 3);
    for i in index_bytes.chunks_exact(4) {
        triangle_indices.push(u32::from_le_bytes([i[0], i[1], i[2], i[3]]));
    }
    // winding must be reversed alongside the Z flip to keep front faces
    flip_winding(&mut triangle_indices);

    Ok(BlockData::Mesh(Mesh {
        lod,
        max_lod,
        name,
        vertices,
        normals,
        uvs,
        vertex_colors,
        triangle_indices,
        material_id,
    }))
}

fn decode_image(p: &mut Reader<'_>) -> Result<BlockData, RexError> {
    let compression = ImageCompression::from_raw(p.read_u32()?)?;
    // everything after the tag is the encoded image stream
    let rest = p.remaining();
    let data = p.take(rest)?.to_vec();
    Ok(BlockData::Image(Image { compression, data }))
}

fn decode_material(p: &mut Reader<'_>) -> Result<BlockData, RexError> {
    let ambient = p.read_rgb()?;
    let ambient_texture_id = p.read_u64()?;
    let diffuse = p.read_rgb()?;
    let diffuse_texture_id = p.read_u64()?;
    let specular = p.read_rgb()?;
    let specular_texture_id = p.read_u64()?;
    let shininess = p.read_f32()?;
    let alpha = p.read_f32()?;
    Ok(BlockData::MaterialStandard(MaterialStandard {
        ambient,
        ambient_texture_id,
        diffuse,
        diffuse_texture_id,
        specular,
        specular_texture_id,
        shininess,
        alpha,
    }))
}
