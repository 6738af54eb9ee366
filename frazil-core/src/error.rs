//! Error types for frazil operations.
//!
//! Every failure in the library is a variant of [`FrazilError`]. Conditions
//! caused by malformed input are distinct from conditions the decoder simply
//! does not implement; the latter answer true to
//! [`is_unsupported`](FrazilError::is_unsupported).

use std::io;
use thiserror::Error;

/// The error type shared by all frazil crates.
#[derive(Debug, Error)]
pub enum FrazilError {
    /// I/O error from the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source ended in the middle of a frame structure.
    #[error("truncated input: expected {expected} more bytes")]
    Truncated {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// The stream does not start with a Zstandard frame magic number.
    #[error("not a zstd frame: magic {found:#010x}")]
    NotZstdFrame {
        /// The magic number actually found.
        found: u32,
    },

    /// The reserved bit of the frame header descriptor was set.
    #[error("reserved bit set in frame header descriptor")]
    ReservedBitSet,

    /// A block header used the reserved block type.
    #[error("reserved block type")]
    ReservedBlockType,

    /// The compression-modes byte had non-zero reserved bits.
    #[error("reserved bits set in symbol compression modes")]
    ReservedCompModes,

    /// A frame negotiated a window larger than this decoder supports.
    #[error("window size {size} exceeds the 8 MiB limit")]
    WindowTooBig {
        /// The negotiated window size in bytes.
        size: u64,
    },

    /// A block payload exceeded the window or the 128 KiB cap.
    #[error("block size {size} exceeds limit {limit}")]
    BlockTooLarge {
        /// Declared payload size in bytes.
        size: usize,
        /// Applicable limit: `min(window size, 128 KiB)`.
        limit: usize,
    },

    /// The frame checksum trailer disagrees with the decoded output.
    #[error("checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Low 32 bits of XXH64 stored in the frame trailer.
        expected: u32,
        /// Low 32 bits of XXH64 computed over the decoded output.
        computed: u32,
    },

    /// The sequence bitstream of a compressed block was inconsistent.
    #[error("sequence bitstream was corrupted")]
    SequenceBitstreamCorrupted,

    /// The frame declares a dictionary, which this decoder does not support.
    #[error("dictionaries are not supported")]
    DictionariesUnsupported,

    /// The literals section used a layout this decoder does not support.
    #[error("unsupported literals section: {detail}")]
    LiteralsModeUnsupported {
        /// Which literals layout was encountered.
        detail: &'static str,
    },

    /// A sequence used a repeated-offset code, which is not supported.
    #[error("unsupported repeated-offset code {offset}")]
    RepeatedOffsetUnsupported {
        /// The raw offset value (2 or 3).
        offset: u32,
    },

    /// A sequence table used an FSE mode other than predefined.
    #[error("unsupported FSE table mode {mode}")]
    FseModeUnsupported {
        /// The 2-bit compression mode.
        mode: u8,
    },

    /// A compressed block declared zero sequences, which is not supported.
    #[error("empty sequence sections are not supported")]
    EmptySequencesUnsupported,
}

/// Result type alias for frazil operations.
pub type Result<T> = std::result::Result<T, FrazilError>;

impl FrazilError {
    /// Create a truncated-input error.
    pub fn truncated(expected: usize) -> Self {
        FrazilError::Truncated { expected }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(expected: u32, computed: u32) -> Self {
        FrazilError::ChecksumMismatch { expected, computed }
    }

    /// Whether the error marks a stream feature outside this decoder's
    /// scope, as opposed to corruption or an I/O failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            FrazilError::DictionariesUnsupported
                | FrazilError::LiteralsModeUnsupported { .. }
                | FrazilError::RepeatedOffsetUnsupported { .. }
                | FrazilError::FseModeUnsupported { .. }
                | FrazilError::EmptySequencesUnsupported
        )
    }
}

impl From<FrazilError> for io::Error {
    fn from(err: FrazilError) -> Self {
        match err {
            FrazilError::Io(e) => e,
            FrazilError::Truncated { .. } => {
                io::Error::new(io::ErrorKind::UnexpectedEof, err.to_string())
            }
            _ => io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
        }
    }
}
