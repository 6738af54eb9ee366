//! Finite State Entropy decoding for the sequences section.
//!
//! Only the predefined tables of RFC 8478 are supported. They are plain
//! static data: one `(symbol, num_bits, baseline)` entry per state,
//! generated from the default distributions with the standard zstd table
//! construction (symbol spread, then forward next-state assignment). The
//! baseline/extra-bits arrays map literal-length and match-length codes to
//! decoded values.

use crate::CompressionMode;
use frazil_core::error::{FrazilError, Result};

/// A single entry in an FSE decoding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FseTableEntry {
    /// Symbol decoded in this state.
    pub symbol: u8,
    /// Number of bits to read for the next-state transition.
    pub num_bits: u8,
    /// Base added to the transition bits to form the next state.
    pub baseline: u16,
}

/// An FSE decoding table with one entry per state.
#[derive(Debug)]
pub struct FseTable {
    /// Accuracy log; the table has `1 << accuracy_log` states.
    pub accuracy_log: u8,
    /// Entries indexed by state.
    pub entries: &'static [FseTableEntry],
}

impl FseTable {
    /// Number of states.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Entry for `state`.
    ///
    /// States always come from `accuracy_log`-bit reads or in-table
    /// transitions, both of which stay within the table.
    #[inline]
    pub fn entry(&self, state: usize) -> &FseTableEntry {
        &self.entries[state]
    }
}

/// Resolve the 2-bit compression mode to a decoding table.
///
/// Only the predefined mode is implemented; the RLE, FSE_Compressed, and
/// Repeat modes are out of scope.
pub(crate) fn table_for_mode(bits: u8, predefined: &'static FseTable) -> Result<&'static FseTable> {
    match CompressionMode::from_bits(bits) {
        CompressionMode::Predefined => Ok(predefined),
        _ => Err(FrazilError::FseModeUnsupported { mode: bits & 0x03 }),
    }
}

/// Reads the bit-packed sequence tail back to front.
///
/// The sequence bitstream is written little-endian and terminated by a
/// single `1` marker bit followed by zero padding up to the final byte. The
/// first bit delivered is the highest bit below the marker in the last
/// byte; reading then continues MSB-first toward the first byte.
#[derive(Debug)]
pub struct BackwardBitReader {
    rem: Vec<u8>,
    cur: u8,
    cur_bits: u8,
}

impl BackwardBitReader {
    /// Take ownership of the bit-packed tail.
    pub fn new(tape: Vec<u8>) -> Self {
        Self {
            rem: tape,
            cur: 0,
            cur_bits: 0,
        }
    }

    /// Skip the zero padding and the marker bit at the end of the tape.
    ///
    /// An empty tape or a zero final byte has no marker and is corrupt.
    pub fn skip_padding(&mut self) -> Result<()> {
        let last = self
            .rem
            .pop()
            .ok_or(FrazilError::SequenceBitstreamCorrupted)?;
        if last == 0 {
            return Err(FrazilError::SequenceBitstreamCorrupted);
        }
        let skip = 1 + last.leading_zeros() as u8;
        self.cur = ((last as u16) << skip) as u8;
        self.cur_bits = 8 - skip;
        Ok(())
    }

    /// Read `n` bits MSB-first. `n == 0` reads nothing and returns 0.
    pub fn read(&mut self, n: u8) -> Result<u32> {
        let mut out = 0u32;
        for i in 0..n {
            if self.cur_bits == 0 {
                self.cur = self
                    .rem
                    .pop()
                    .ok_or(FrazilError::SequenceBitstreamCorrupted)?;
                self.cur_bits = 8;
            }
            let bit = self.cur >> 7;
            self.cur <<= 1;
            self.cur_bits -= 1;
            if bit != 0 {
                out |= 1 << (n - 1 - i);
            }
        }
        Ok(out)
    }

    /// True when the tape and the bit buffer are both exhausted.
    pub fn is_empty(&self) -> bool {
        self.rem.is_empty() && self.cur_bits == 0
    }
}

/// Literal-length baseline per code (RFC 8478 section 3.1.1.3.2.1.1).
pub static LITERAL_LENGTH_BASELINES: [u32; 36] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 18, 20, 22, 24, 28, 32, 40, 48, 64,
    128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768, 65536,
];

/// Extra bits read after a literal-length code.
pub static LITERAL_LENGTH_EXTRA_BITS: [u8; 36] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 3, 3, 4, 6, 7, 8, 9, 10, 11,
    12, 13, 14, 15, 16,
];

/// Match-length baseline per code (RFC 8478 section 3.1.1.3.2.1.1).
pub static MATCH_LENGTH_BASELINES: [u32; 53] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27,
    28, 29, 30, 31, 32, 33, 34, 35, 37, 39, 41, 43, 47, 51, 59, 67, 83, 99, 131, 259, 515, 1027,
    2051, 4099, 8195, 16387, 32771, 65539,
];

/// Extra bits read after a match-length code.
pub static MATCH_LENGTH_EXTRA_BITS: [u8; 53] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 1, 1, 1, 1, 2, 2, 3, 3, 4, 4, 5, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
];

const fn e(symbol: u8, num_bits: u8, baseline: u16) -> FseTableEntry {
    FseTableEntry {
        symbol,
        num_bits,
        baseline,
    }
}

/// Predefined literal-length decoding table (accuracy log 6).
pub static LITERAL_LENGTH_TABLE: FseTable = FseTable {
    accuracy_log: 6,
    entries: &[
        e(0, 4, 0),
        e(0, 4, 16),
        e(1, 5, 32),
        e(3, 5, 0),
        e(4, 5, 0),
        e(6, 5, 0),
        e(7, 5, 0),
        e(9, 5, 0),
        e(10, 5, 0),
        e(12, 5, 0),
        e(14, 6, 0),
        e(16, 5, 0),
        e(18, 5, 0),
        e(19, 5, 0),
        e(21, 5, 0),
        e(22, 5, 0),
        e(24, 5, 0),
        e(25, 5, 32),
        e(26, 5, 0),
        e(27, 6, 0),
        e(29, 6, 0),
        e(31, 6, 0),
        e(0, 4, 32),
        e(1, 4, 0),
        e(2, 5, 0),
        e(4, 5, 32),
        e(5, 5, 0),
        e(7, 5, 32),
        e(8, 5, 0),
        e(10, 5, 32),
        e(11, 5, 0),
        e(13, 6, 0),
        e(16, 5, 32),
        e(17, 5, 0),
        e(19, 5, 32),
        e(20, 5, 0),
        e(22, 5, 32),
        e(23, 5, 0),
        e(25, 4, 0),
        e(25, 4, 16),
        e(26, 5, 32),
        e(28, 6, 0),
        e(30, 6, 0),
        e(0, 4, 48),
        e(1, 4, 16),
        e(2, 5, 32),
        e(3, 5, 32),
        e(5, 5, 32),
        e(6, 5, 32),
        e(8, 5, 32),
        e(9, 5, 32),
        e(11, 5, 32),
        e(12, 5, 32),
        e(15, 6, 0),
        e(17, 5, 32),
        e(18, 5, 32),
        e(20, 5, 32),
        e(21, 5, 32),
        e(23, 5, 32),
        e(24, 5, 32),
        e(35, 6, 0),
        e(34, 6, 0),
        e(33, 6, 0),
        e(32, 6, 0),
    ],
};

/// Predefined match-length decoding table (accuracy log 6).
pub static MATCH_LENGTH_TABLE: FseTable = FseTable {
    accuracy_log: 6,
    entries: &[
        e(0, 6, 0),
        e(1, 4, 0),
        e(2, 5, 32),
        e(3, 5, 0),
        e(5, 5, 0),
        e(6, 5, 0),
        e(8, 5, 0),
        e(10, 6, 0),
        e(13, 6, 0),
        e(16, 6, 0),
        e(19, 6, 0),
        e(22, 6, 0),
        e(25, 6, 0),
        e(28, 6, 0),
        e(31, 6, 0),
        e(33, 6, 0),
        e(35, 6, 0),
        e(37, 6, 0),
        e(39, 6, 0),
        e(41, 6, 0),
        e(43, 6, 0),
        e(45, 6, 0),
        e(1, 4, 16),
        e(2, 4, 0),
        e(3, 5, 32),
        e(4, 5, 0),
        e(6, 5, 32),
        e(7, 5, 0),
        e(9, 6, 0),
        e(12, 6, 0),
        e(15, 6, 0),
        e(18, 6, 0),
        e(21, 6, 0),
        e(24, 6, 0),
        e(27, 6, 0),
        e(30, 6, 0),
        e(32, 6, 0),
        e(34, 6, 0),
        e(36, 6, 0),
        e(38, 6, 0),
        e(40, 6, 0),
        e(42, 6, 0),
        e(44, 6, 0),
        e(1, 4, 32),
        e(1, 4, 48),
        e(2, 4, 16),
        e(4, 5, 32),
        e(5, 5, 32),
        e(7, 5, 32),
        e(8, 5, 32),
        e(11, 6, 0),
        e(14, 6, 0),
        e(17, 6, 0),
        e(20, 6, 0),
        e(23, 6, 0),
        e(26, 6, 0),
        e(29, 6, 0),
        e(52, 6, 0),
        e(51, 6, 0),
        e(50, 6, 0),
        e(49, 6, 0),
        e(48, 6, 0),
        e(47, 6, 0),
        e(46, 6, 0),
    ],
};

/// Predefined offset-code decoding table (accuracy log 5).
pub static OFFSET_TABLE: FseTable = FseTable {
    accuracy_log: 5,
    entries: &[
        e(0, 5, 0),
        e(6, 4, 0),
        e(9, 5, 0),
        e(15, 5, 0),
        e(21, 5, 0),
        e(3, 5, 0),
        e(7, 4, 0),
        e(12, 5, 0),
        e(18, 5, 0),
        e(23, 5, 0),
        e(5, 5, 0),
        e(8, 4, 0),
        e(14, 5, 0),
        e(20, 5, 0),
        e(2, 5, 0),
        e(7, 4, 16),
        e(11, 5, 0),
        e(17, 5, 0),
        e(22, 5, 0),
        e(4, 5, 0),
        e(8, 4, 16),
        e(13, 5, 0),
        e(19, 5, 0),
        e(1, 5, 0),
        e(6, 4, 16),
        e(10, 5, 0),
        e(16, 5, 0),
        e(28, 5, 0),
        e(27, 5, 0),
        e(26, 5, 0),
        e(25, 5, 0),
        e(24, 5, 0),
    ],
};
