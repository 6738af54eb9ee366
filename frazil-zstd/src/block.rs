//! Block header parsing.

use crate::BlockType;
use frazil_core::error::Result;
use frazil_core::source::ByteSource;
use std::io::Read;

/// Decoded 3-byte block header.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockHeader {
    /// Whether this is the frame's final block.
    pub last: bool,
    /// Block type from bits 2..1.
    pub block_type: BlockType,
    /// Payload size in bytes from bits 23..3. For RLE blocks this is the
    /// regenerated size; the payload is a single byte.
    pub size: usize,
}

impl BlockHeader {
    /// Read the next block header from `src`.
    pub fn read<R: Read>(src: &mut ByteSource<R>) -> Result<Self> {
        let raw = src.read_le(3)? as u32;
        let last = raw & 1 == 1;
        let block_type = BlockType::from_bits((raw >> 1 & 3) as u8)?;
        let size = (raw >> 3) as usize;
        Ok(Self {
            last,
            block_type,
            size,
        })
    }
}
