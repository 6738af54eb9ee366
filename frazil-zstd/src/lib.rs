//! # Frazil Zstandard
//!
//! Streaming decoder for the Zstandard frame format (RFC 8478).
//!
//! The decoder is byte-oriented and pull-driven: [`Reader`] wraps any
//! [`std::io::Read`] source and produces decompressed bytes on demand,
//! reading compressed input only as far as needed. Output flows through a
//! sliding window so arbitrarily large frames decode in bounded memory, and
//! decoding can suspend mid-sequence when the caller has not yet drained
//! enough output.
//!
//! ## Supported subset
//!
//! - Frames with the standard magic, skippable frames, single-segment and
//!   windowed frames, optional XXH64 checksum trailers
//! - Raw, RLE, and compressed blocks (up to 128 KiB payload each)
//! - Compressed blocks with raw literals and the predefined FSE tables
//!
//! Dictionaries, Huffman literals, non-predefined FSE modes, and
//! repeated-offset codes are rejected with distinguishable errors.
//!
//! ## Example
//!
//! ```rust,no_run
//! use frazil_zstd::Reader;
//! use std::io::Read;
//!
//! let file = std::fs::File::open("data.zst").unwrap();
//! let mut reader = Reader::new(file);
//! let mut output = Vec::new();
//! reader.read_to_end(&mut output).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod block;
mod frame;
mod fse;
mod literals;
mod reader;
mod sequences;
mod window;

pub use frame::FrameHeader;
pub use reader::{decompress, Reader};

use frazil_core::error::{FrazilError, Result};

/// Zstandard frame magic number (`0xFD2FB528` little-endian).
pub const ZSTD_MAGIC: u32 = 0xFD2FB528;

/// First magic number of the skippable frame range.
pub const SKIPPABLE_MAGIC_LOW: u32 = 0x184D2A50;

/// Last magic number of the skippable frame range.
pub const SKIPPABLE_MAGIC_HIGH: u32 = 0x184D2A5F;

/// Smallest window a frame may negotiate (1 KiB).
pub const MIN_WINDOW_SIZE: usize = 1 << 10;

/// Largest window this decoder accepts (8 MiB).
pub const MAX_WINDOW_SIZE: usize = 8 << 20;

/// Maximum block payload size (128 KiB).
pub const MAX_BLOCK_SIZE: usize = 128 * 1024;

/// Block types in Zstandard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// Raw uncompressed block.
    Raw,
    /// RLE block (single byte repeated).
    Rle,
    /// Compressed block with literals and sequences.
    Compressed,
    /// Reserved (invalid).
    Reserved,
}

impl BlockType {
    /// Create block type from the 2-bit header field.
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits & 0x03 {
            0 => Ok(BlockType::Raw),
            1 => Ok(BlockType::Rle),
            2 => Ok(BlockType::Compressed),
            3 => Err(FrazilError::ReservedBlockType),
            _ => unreachable!(),
        }
    }
}

/// Literals block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralsBlockType {
    /// Raw literals (uncompressed).
    Raw,
    /// RLE literals (single byte).
    Rle,
    /// Compressed with Huffman, tree included.
    Compressed,
    /// Compressed with Huffman, uses previous tree.
    Treeless,
}

impl LiteralsBlockType {
    /// Create from the 2-bit literals header field.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => LiteralsBlockType::Raw,
            1 => LiteralsBlockType::Rle,
            2 => LiteralsBlockType::Compressed,
            3 => LiteralsBlockType::Treeless,
            _ => unreachable!(),
        }
    }
}

/// Compression mode for sequence symbol tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// Predefined FSE table.
    Predefined,
    /// RLE (single symbol).
    Rle,
    /// FSE table transmitted in the block.
    Fse,
    /// Repeat the previous block's table.
    Repeat,
}

impl CompressionMode {
    /// Create from a 2-bit mode field.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => CompressionMode::Predefined,
            1 => CompressionMode::Rle,
            2 => CompressionMode::Fse,
            3 => CompressionMode::Repeat,
            _ => unreachable!(),
        }
    }
}
