//! rex-format: codec for the REX binary 3D-scene container format
//!
//! This crate provides a pure Rust reader and writer for REX files: a
//! self-describing, block-structured container carrying meshes, materials,
//! images, line sets, point clouds and text annotations. It turns a byte
//! buffer into a typed [`RexDocument`] and a typed document back into bytes.
//! Everything above the container - scene graphs, rendering, texture
//! instantiation - is the caller's business.
//!
//! # Key Features
//!
//! - **Byte-exact layout**: output is compatible with files produced by
//!   existing REX writers, including their quirks (see field docs)
//! - **Bounds-safe decoding**: every read is checked; corrupt or truncated
//!   input yields a typed [`RexError`], never a panic
//! - **Handedness conversion**: the Z-axis sign flip and the matching
//!   triangle winding flip are applied by the codec in both directions, so
//!   encode followed by decode is the identity
//! - **No I/O**: encode and decode are pure functions over in-memory
//!   buffers; decoding independent buffers on separate threads needs no
//!   synchronization
//!
//! # File Layout
//!
//! All integers are little-endian:
//!
//! ```text
//! [0..4)    magic "REX1" (ASCII, no terminator)
//! [4..6)    format version (u16)
//! [6..10)   crc32 (u32, carried through unvalidated)
//! [10..12)  block count (u16)
//! [12..14)  data start offset (u16, absolute)
//! [14..22)  total data size (u64, informational)
//! [22..64)  zero padding
//! [64..)    coordinate system (srid u32, name len u16, name, offset 3xf32)
//! [start..) blocks, each: 16-byte header + payload
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use rex_format::RexDocument;
//!
//! let buffer = std::fs::read("scene.rex").unwrap();
//! let doc = RexDocument::from_bytes(&buffer).unwrap();
//!
//! for mesh in doc.meshes() {
//!     println!("{}: {} triangles", mesh.name, mesh.triangle_count());
//! }
//! ```

mod blocks;
mod codec;
mod document;
mod error;

pub use blocks::{
    BlockData, BlockType, DataBlock, Image, ImageCompression, LineSet, MaterialStandard, Mesh,
    PointList, Text,
};
pub use document::{CoordinateSystem, FileMeta, RexDocument};
pub use error::RexError;

// =============================================================================
// Wire Constants
// =============================================================================

/// File magic bytes
pub const REX_MAGIC: &[u8; 4] = b"REX1";

/// Format version this crate reads and writes
pub const REX_VERSION: u16 = 1;

/// Size of the fixed file header region in bytes
pub const FILE_HEADER_SIZE: usize = 64;

/// Size of the per-block record header in bytes
pub const BLOCK_HEADER_SIZE: usize = 16;

/// Size of the fixed, zero-padded mesh name field in bytes
pub const MESH_NAME_FIELD_SIZE: usize = 74;

/// Texture id sentinel meaning "no texture bound"
pub const NO_TEXTURE: u64 = u64::MAX;
