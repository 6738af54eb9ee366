//! Frame header parsing and per-frame decoding state.
//!
//! The frame header follows the magic number: a descriptor byte, then the
//! optional window descriptor, dictionary ID, and frame content size
//! fields, in that order on the wire.

use crate::{MAX_WINDOW_SIZE, MIN_WINDOW_SIZE};
use frazil_core::error::{FrazilError, Result};
use frazil_core::source::ByteSource;
use frazil_core::xxhash::Xxh64;
use std::io::Read;

/// FCS field width in bytes, indexed by the 2-bit content-size flag.
pub(crate) const FCS_FIELD_SIZES: [usize; 4] = [0, 2, 4, 8];

/// Dictionary ID field width in bytes, indexed by the 2-bit dictionary flag.
pub(crate) const DICT_ID_FIELD_SIZES: [usize; 4] = [0, 1, 2, 4];

/// Parsed Zstandard frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Negotiated window size in bytes, within `[1 KiB, 8 MiB]`.
    pub window_size: usize,
    /// Declared uncompressed size of the frame, when present.
    pub content_size: Option<u64>,
    /// Whether a 4-byte XXH64 checksum trailer follows the last block.
    pub has_checksum: bool,
}

impl FrameHeader {
    /// Read and decode a frame header from `src`.
    ///
    /// The caller has already consumed and validated the magic number.
    pub fn read<R: Read>(src: &mut ByteSource<R>) -> Result<Self> {
        let descriptor = src.read_u8()?;
        if descriptor >> 3 & 1 != 0 {
            return Err(FrazilError::ReservedBitSet);
        }

        let fcs_flag = (descriptor >> 6) as usize;
        let single_segment = descriptor >> 5 & 1 == 1;
        let has_checksum = descriptor >> 2 & 1 == 1;
        let dict_id_flag = (descriptor & 3) as usize;

        let mut fcs_field_size = FCS_FIELD_SIZES[fcs_flag];
        if fcs_flag == 0 && single_segment {
            fcs_field_size = 1;
        }

        let mut window_size = MIN_WINDOW_SIZE as u64;
        if !single_segment {
            let wd = src.read_u8()?;
            let window_log = 10 + (wd >> 3) as u32;
            let mantissa = (wd & 7) as u64;
            let window_base = 1u64 << window_log;
            window_size = window_base + (window_base >> 3) * mantissa;
        }

        if DICT_ID_FIELD_SIZES[dict_id_flag] > 0 {
            return Err(FrazilError::DictionariesUnsupported);
        }

        let content_size = if fcs_field_size > 0 {
            let mut fcs = src.read_le(fcs_field_size)?;
            if fcs_field_size == 2 {
                fcs += 256;
            }
            Some(fcs)
        } else {
            None
        };

        // A single-segment frame has no window descriptor; the whole frame
        // must fit, so the content size drives the window.
        if single_segment {
            if let Some(fcs) = content_size {
                if fcs > window_size {
                    window_size = fcs;
                }
            }
        }

        if window_size > MAX_WINDOW_SIZE as u64 {
            return Err(FrazilError::WindowTooBig { size: window_size });
        }

        Ok(Self {
            window_size: window_size as usize,
            content_size,
            has_checksum,
        })
    }
}

/// Live state for the frame currently being decoded.
#[derive(Debug)]
pub(crate) struct FrameState {
    /// This frame's negotiated window size (the shared output buffer may
    /// be larger, left over from an earlier frame).
    pub window_size: usize,
    /// Whether a checksum trailer follows the last block.
    pub hashing: bool,
    /// Running XXH64 over the frame's decoded output.
    pub hash: Xxh64,
    /// Declared content size, if the header carried one.
    pub content_size: Option<u64>,
    /// Bytes decoded by this frame so far.
    pub decoded: u64,
    /// Whether the block being decoded is the frame's last.
    pub last_block: bool,
}

impl FrameState {
    pub fn new() -> Self {
        Self {
            window_size: 0,
            hashing: false,
            hash: Xxh64::new(),
            content_size: None,
            decoded: 0,
            last_block: false,
        }
    }

    /// Re-arm for a frame described by `header`.
    pub fn reset(&mut self, header: &FrameHeader) {
        self.window_size = header.window_size;
        self.hashing = header.has_checksum;
        self.hash.reset();
        self.content_size = header.content_size;
        self.decoded = 0;
        self.last_block = false;
    }

    /// Account for freshly produced output bytes.
    pub fn absorb(&mut self, bytes: &[u8]) {
        self.decoded += bytes.len() as u64;
        if self.hashing {
            self.hash.update(bytes);
        }
    }
}
