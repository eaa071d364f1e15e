//! Wire codec for the REX container
//!
//! This module owns the byte-level format. It consists of:
//!
//! - `read` - bounds-checked little-endian decoding into a document
//! - `write` - encoding a document back into bytes
//! - `tests` - round-trip and corruption test suite

pub(crate) mod read;
pub(crate) mod write;


use crate::error::RexError;

/// The fixed 16-byte record header shared by all blocks.
///
/// `payload_size` is the contract for how many bytes after the header
/// belong to the block, whatever its type; unknown block types stay
/// skippable because of it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockHeader {
    pub block_type: u16,
    pub version: u16,
    pub payload_size: u32,
    pub data_id: u64,
}

impl BlockHeader {
    pub(crate) fn read(r: &mut read::Reader<'_>) -> Result<Self, RexError> {
        Ok(Self {
            block_type: r.read_u16()?,
            version: r.read_u16()?,
            payload_size: r.read_u32()?,
            data_id: r.read_u64()?,
        })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        write::put_u16(out, self.block_type);
        write::put_u16(out, self.version);
        write::put_u32(out, self.payload_size);
        write::put_u64(out, self.data_id);
    }
}

/// Swap the first two indices of every triangle.
///
/// Keeps front faces front-facing after the Z-axis sign flip. Applying it
/// twice is a no-op, so encode and decode undo each other.
pub(crate) fn flip_winding(indices: &mut [u32]) {
    for triangle in indices.chunks_exact_mut(3) {
        triangle.swap(0, 1);
    }
}
