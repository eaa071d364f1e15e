//! Codec error types

use thiserror::Error;

/// Errors raised while encoding or decoding a REX container.
///
/// The codec performs no retries and no partial recovery: the first failing
/// block aborts the whole decode, and encoding validates every block before
/// a single output byte is produced.
#[derive(Debug, Error)]
pub enum RexError {
    /// Buffer shorter than the fixed 64-byte file header.
    #[error("buffer too small for file header: {0} bytes, need at least 64")]
    TruncatedHeader(usize),

    /// First four bytes are not `"REX1"`.
    #[error("not a REX file (bad magic bytes)")]
    BadMagic,

    /// A read would run past the end of the buffer or block payload.
    #[error("unexpected end of data: need {needed} bytes at offset {offset}, {available} left")]
    TruncatedData {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Block type tag outside the known set.
    #[error("unknown block type {0}")]
    UnknownBlockType(u16),

    /// Image compression tag outside the known set.
    #[error("unsupported image encoding {0}")]
    UnsupportedEncoding(u32),

    /// Mesh arrays that must run parallel to the vertex list disagree in
    /// length, or the index list does not form whole triangles.
    #[error("inconsistent mesh data in block {data_id}: {reason}")]
    InconsistentMeshData { data_id: u64, reason: String },

    /// A block failed to decode; carries its position within the file.
    #[error("corrupt block {index}/{count} at byte {offset}: {source}")]
    CorruptBlock {
        index: u16,
        count: u16,
        offset: usize,
        #[source]
        source: Box<RexError>,
    },
}
