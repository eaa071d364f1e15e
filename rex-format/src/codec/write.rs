//! Encoding REX documents into byte buffers

use glam::{Vec2, Vec3, Vec4};
use tracing::debug;

use crate::blocks::{BlockData, DataBlock, Image, LineSet, MaterialStandard, Mesh, PointList, Text};
use crate::document::{CoordinateSystem, RexDocument};
use crate::error::RexError;
use crate::{BLOCK_HEADER_SIZE, FILE_HEADER_SIZE, MESH_NAME_FIELD_SIZE, REX_MAGIC};

use super::BlockHeader;

// =============================================================================
// Primitive writes
// =============================================================================

pub(crate) fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_f32(out: &mut Vec<u8>, value: f32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_rgba(out: &mut Vec<u8>, color: Vec4) {
    put_f32(out, color.x);
    put_f32(out, color.y);
    put_f32(out, color.z);
    put_f32(out, color.w);
}

pub(crate) fn put_rgb(out: &mut Vec<u8>, color: Vec3) {
    put_f32(out, color.x);
    put_f32(out, color.y);
    put_f32(out, color.z);
}

/// Write tightly packed 3D positions, negating Z to convert to the file's
/// handedness.
pub(crate) fn put_positions(out: &mut Vec<u8>, positions: &[Vec3]) {
    for v in positions {
        put_f32(out, v.x);
        put_f32(out, v.y);
        put_f32(out, -v.z);
    }
}

pub(crate) fn put_vec2s(out: &mut Vec<u8>, vectors: &[Vec2]) {
    for v in vectors {
        put_f32(out, v.x);
        put_f32(out, v.y);
    }
}

pub(crate) fn put_rgbs(out: &mut Vec<u8>, colors: &[Vec3]) {
    for c in colors {
        put_rgb(out, *c);
    }
}

// =============================================================================
// Document encoding
// =============================================================================

/// Serialize a full document.
///
/// Every block payload is built (and its invariants checked) before the
/// output buffer is assembled, so a failed encode returns nothing rather
/// than a half-written file.
pub(crate) fn encode_document(doc: &RexDocument) -> Result<Vec<u8>, RexError> {
    let mut encoded_blocks = Vec::with_capacity(doc.blocks.len());
    let mut data_size: u64 = 0;
    for block in &doc.blocks {
        let bytes = encode_block(block)?;
        data_size += bytes.len() as u64;
        encoded_blocks.push(bytes);
    }

    let coordinate_system = encode_coordinate_system(&doc.coordinate_system);
    let data_start = (FILE_HEADER_SIZE + coordinate_system.len()) as u16;

    let mut out =
        Vec::with_capacity(FILE_HEADER_SIZE + coordinate_system.len() + data_size as usize);
    out.extend_from_slice(REX_MAGIC);
    put_u16(&mut out, doc.meta.version);
    put_u32(&mut out, doc.meta.crc32);
    put_u16(&mut out, doc.blocks.len() as u16);
    put_u16(&mut out, data_start);
    put_u64(&mut out, data_size);
    out.resize(FILE_HEADER_SIZE, 0);

    out.extend_from_slice(&coordinate_system);
    for bytes in &encoded_blocks {
        out.extend_from_slice(bytes);
    }

    debug!(
        blocks = doc.blocks.len(),
        bytes = out.len(),
        "encoded REX document"
    );

    Ok(out)
}

fn encode_coordinate_system(cs: &CoordinateSystem) -> Vec<u8> {
    let mut out = Vec::with_capacity(18 + cs.authority.len());
    put_u32(&mut out, cs.srid);
    put_u16(&mut out, cs.authority.len() as u16);
    out.extend_from_slice(cs.authority.as_bytes());
    put_f32(&mut out, cs.global_offset.x);
    put_f32(&mut out, cs.global_offset.y);
    put_f32(&mut out, cs.global_offset.z);
    out
}

/// Serialize one block: 16-byte record header plus payload.
fn encode_block(block: &DataBlock) -> Result<Vec<u8>, RexError> {
    let payload = encode_payload(block)?;
    let mut out = Vec::with_capacity(BLOCK_HEADER_SIZE + payload.len());
    BlockHeader {
        block_type: block.block_type().tag(),
        version: block.version,
        payload_size: payload.len() as u32,
        data_id: block.data_id,
    }
    .write(&mut out);
    out.extend_from_slice(&payload);
    Ok(out)
}

fn encode_payload(block: &DataBlock) -> Result<Vec<u8>, RexError> {
    match &block.data {
        BlockData::LineSet(line_set) => Ok(encode_line_set(line_set)),
        BlockData::Text(text) => Ok(encode_text(text)),
        BlockData::PointList(point_list) => Ok(encode_point_list(point_list)),
        BlockData::Mesh(mesh) => encode_mesh(mesh, block.data_id),
        BlockData::Image(image) => Ok(encode_image(image)),
        BlockData::MaterialStandard(material) => Ok(encode_material(material)),
    }
}

// =============================================================================
// Per-block payload encoders
// =============================================================================

fn encode_line_set(line_set: &LineSet) -> Vec<u8> {
    let mut out = Vec::with_capacity(20 + line_set.vertices.len() * 12);
    put_rgba(&mut out, line_set.color);
    put_u32(&mut out, line_set.vertices.len() as u32);
    put_positions(&mut out, &line_set.vertices);
    out
}

fn encode_text(text: &Text) -> Vec<u8> {
    let mut out = Vec::with_capacity(34 + text.text.len());
    put_rgba(&mut out, text.color);
    // anchor position goes out raw: text is the one position the format
    // stores without the Z flip
    put_f32(&mut out, text.position.x);
    put_f32(&mut out, text.position.y);
    put_f32(&mut out, text.position.z);
    put_f32(&mut out, text.size);
    put_u16(&mut out, text.text.len() as u16);
    out.extend_from_slice(text.text.as_bytes());
    out
}

fn encode_point_list(point_list: &PointList) -> Vec<u8> {
    let mut out =
        Vec::with_capacity(8 + (point_list.vertices.len() + point_list.colors.len()) * 12);
    put_u32(&mut out, point_list.vertices.len() as u32);
    put_u32(&mut out, point_list.colors.len() as u32);
    put_positions(&mut out, &point_list.vertices);
    put_rgbs(&mut out, &point_list.colors);
    out
}

pub(crate) fn encode_mesh(mesh: &Mesh, data_id: u64) -> Result<Vec<u8>, RexError> {
    let vertex_count = mesh.vertices.len();
    if mesh.has_uvs() && mesh.uvs.len() != vertex_count {
        return Err(RexError::InconsistentMeshData {
            data_id,
            reason: format!("{} UVs for {} vertices", mesh.uvs.len(), vertex_count),
        });
    }
    if mesh.has_vertex_colors() && mesh.vertex_colors.len() != vertex_count {
        return Err(RexError::InconsistentMeshData {
            data_id,
            reason: format!(
                "{} vertex colors for {} vertices",
                mesh.vertex_colors.len(),
                vertex_count
            ),
        });
    }
    if mesh.triangle_indices.len() % 3 != 0 {
        return Err(RexError::InconsistentMeshData {
            data_id,
            reason: format!(
                "index list length {} is not a multiple of 3",
                mesh.triangle_indices.len()
            ),
        });
    }
    if mesh.name.len() > MESH_NAME_FIELD_SIZE {
        return Err(RexError::InconsistentMeshData {
            data_id,
            reason: format!(
                "name is {} bytes, the name field holds {}",
                mesh.name.len(),
                MESH_NAME_FIELD_SIZE
            ),
        });
    }

    let mut out = Vec::with_capacity(
        128 + vertex_count * 12
            + mesh.normals.len() * 12
            + mesh.uvs.len() * 8
            + mesh.vertex_colors.len() * 12
            + mesh.triangle_indices.len() * 4,
    );

    put_u16(&mut out, mesh.lod);
    put_u16(&mut out, mesh.max_lod);

    put_u32(&mut out, vertex_count as u32);
    put_u32(&mut out, mesh.normals.len() as u32);
    put_u32(&mut out, mesh.uvs.len() as u32);
    put_u32(&mut out, mesh.vertex_colors.len() as u32);
    put_u32(&mut out, mesh.triangle_count() as u32);

    // Absolute sub-array offsets. Readers advance sequentially and ignore
    // these; the arithmetic reproduces what existing REX writers emit, byte
    // for byte, including their two bytes of slack before the first array.
    let mut offset = (BLOCK_HEADER_SIZE + 2 * 2 + 5 * 4 + 5 * 4 + 8 + 2 + 2 + MESH_NAME_FIELD_SIZE)
        as u32;
    put_u32(&mut out, offset);
    offset += (vertex_count * 12) as u32;
    put_u32(&mut out, offset);
    offset += (mesh.normals.len() * 12) as u32;
    put_u32(&mut out, offset);
    offset += (mesh.uvs.len() * 8) as u32;
    put_u32(&mut out, offset);
    offset += (mesh.vertex_colors.len() * 12) as u32;
    put_u32(&mut out, offset);

    put_u64(&mut out, mesh.material_id);

    put_u16(&mut out, mesh.name.len() as u16);
    out.extend_from_slice(mesh.name.as_bytes());
    out.resize(out.len() + MESH_NAME_FIELD_SIZE - mesh.name.len(), 0);

    put_positions(&mut out, &mesh.vertices);
    put_positions(&mut out, &mesh.normals);
    put_vec2s(&mut out, &mesh.uvs);
    put_rgbs(&mut out, &mesh.vertex_colors);

    // winding goes out flipped; decoding flips it back
    for triangle in mesh.triangle_indices.chunks_exact(3) {
        put_u32(&mut out, triangle[1]);
        put_u32(&mut out, triangle[0]);
        put_u32(&mut out, triangle[2]);
    }

    Ok(out)
}

fn encode_image(image: &Image) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + image.data.len());
    put_u32(&mut out, image.compression.to_raw());
    out.extend_from_slice(&image.data);
    out
}

fn encode_material(material: &MaterialStandard) -> Vec<u8> {
    let mut out = Vec::with_capacity(68);
    put_rgb(&mut out, material.ambient);
    put_u64(&mut out, material.ambient_texture_id);
    put_rgb(&mut out, material.diffuse);
    put_u64(&mut out, material.diffuse_texture_id);
    put_rgb(&mut out, material.specular);
    put_u64(&mut out, material.specular_texture_id);
    put_f32(&mut out, material.shininess);
    put_f32(&mut out, material.alpha);
    out
}
