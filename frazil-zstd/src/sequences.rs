//! Sequence section decoding and execution.
//!
//! A compressed block ends with a bit-packed tail describing sequences:
//! triples of (literal length, offset, match length). Executing a sequence
//! copies a run of literals into the window, then a back-reference into
//! already-decoded output. The engine owns its literal stream and bit tape
//! so it can outlive a single `Read` call: when the window fills and cannot
//! slide, the in-flight match copy is saved and execution resumes later.

use crate::frame::FrameState;
use crate::fse::{
    BackwardBitReader, FseTable, LITERAL_LENGTH_BASELINES, LITERAL_LENGTH_EXTRA_BITS,
    MATCH_LENGTH_BASELINES, MATCH_LENGTH_EXTRA_BITS,
};
use crate::window::Window;
use frazil_core::error::{FrazilError, Result};

/// Decode the sequence count from the head of the section.
///
/// Returns the count and the number of leading bytes it occupied.
pub(crate) fn parse_sequence_count(tape: &[u8]) -> Result<(u64, usize)> {
    let b0 = *tape
        .first()
        .ok_or(FrazilError::SequenceBitstreamCorrupted)? as u64;
    if b0 < 128 {
        Ok((b0, 1))
    } else if b0 < 255 {
        let b1 = *tape
            .get(1)
            .ok_or(FrazilError::SequenceBitstreamCorrupted)? as u64;
        Ok((((b0 - 128) << 8) | b1, 2))
    } else {
        let b1 = *tape
            .get(1)
            .ok_or(FrazilError::SequenceBitstreamCorrupted)? as u64;
        let b2 = *tape
            .get(2)
            .ok_or(FrazilError::SequenceBitstreamCorrupted)? as u64;
        Ok((b1 + (b2 << 8) + 0x7F00, 3))
    }
}

/// Outcome of driving the sequence engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Progress {
    /// The block's sequences and trailing literals are fully executed.
    Complete,
    /// A match copy stalled on a full window; call `run` again after the
    /// consumer drains output.
    Suspended,
}

/// A byte-repeat match copy interrupted by a full window.
#[derive(Debug, Clone, Copy)]
struct ByteRun {
    length: usize,
    progress: usize,
}

/// Executes the sequences of one compressed block.
pub(crate) struct SequenceDecoder {
    remaining: u64,
    literals: Vec<u8>,
    lit_pos: usize,
    bits: BackwardBitReader,
    ll_table: &'static FseTable,
    of_table: &'static FseTable,
    ml_table: &'static FseTable,
    ll_state: usize,
    of_state: usize,
    ml_state: usize,
    pending: Option<ByteRun>,
}

impl SequenceDecoder {
    /// Prime the bit reader and read the three initial states.
    pub fn new(
        literals: Vec<u8>,
        tape: Vec<u8>,
        count: u64,
        ll_table: &'static FseTable,
        of_table: &'static FseTable,
        ml_table: &'static FseTable,
    ) -> Result<Self> {
        let mut bits = BackwardBitReader::new(tape);
        bits.skip_padding()?;
        let ll_state = bits.read(ll_table.accuracy_log)? as usize;
        let of_state = bits.read(of_table.accuracy_log)? as usize;
        let ml_state = bits.read(ml_table.accuracy_log)? as usize;
        Ok(Self {
            remaining: count,
            literals,
            lit_pos: 0,
            bits,
            ll_table,
            of_table,
            ml_table,
            ll_state,
            of_state,
            ml_state,
            pending: None,
        })
    }

    /// Drive the engine until the block completes or the window stalls.
    pub fn run(&mut self, window: &mut Window, frame: &mut FrameState) -> Result<Progress> {
        if let Some(resumed) = self.pending.take() {
            if self.emit_byte_run(window, frame, resumed)? == Progress::Suspended {
                return Ok(Progress::Suspended);
            }
            if self.end_of_sequence(window, frame)? {
                return Ok(Progress::Complete);
            }
        }

        loop {
            // Decode order is fixed: offset, match length, literal length.
            let offset_code = self.of_table.entry(self.of_state).symbol;
            let offset = (1u32 << offset_code) + self.bits.read(offset_code)?;

            let ml_code = self.ml_table.entry(self.ml_state).symbol as usize;
            let match_length = MATCH_LENGTH_BASELINES[ml_code] as usize
                + self.bits.read(MATCH_LENGTH_EXTRA_BITS[ml_code])? as usize;

            let ll_code = self.ll_table.entry(self.ll_state).symbol as usize;
            let lit_length = LITERAL_LENGTH_BASELINES[ll_code] as usize
                + self.bits.read(LITERAL_LENGTH_EXTRA_BITS[ll_code])? as usize;

            self.emit_literals(window, frame, lit_length)?;

            match offset {
                1 => {
                    let run = ByteRun {
                        length: match_length,
                        progress: 0,
                    };
                    if self.emit_byte_run(window, frame, run)? == Progress::Suspended {
                        return Ok(Progress::Suspended);
                    }
                }
                2 | 3 => return Err(FrazilError::RepeatedOffsetUnsupported { offset }),
                _ => self.copy_match(window, frame, offset, match_length)?,
            }

            if self.end_of_sequence(window, frame)? {
                return Ok(Progress::Complete);
            }
        }
    }

    /// Copy the next `length` literal bytes into the window.
    fn emit_literals(&mut self, window: &mut Window, frame: &mut FrameState, length: usize) -> Result<()> {
        if length == 0 {
            return Ok(());
        }
        let end = self
            .lit_pos
            .checked_add(length)
            .filter(|&end| end <= self.literals.len())
            .ok_or(FrazilError::SequenceBitstreamCorrupted)?;
        if window.wants_slide() && window.can_slide() {
            window.slide();
        }
        if window.headroom() < length {
            return Err(FrazilError::SequenceBitstreamCorrupted);
        }
        let mark = window.decode_pos();
        window.extend_from_slice(&self.literals[self.lit_pos..end]);
        self.lit_pos = end;
        frame.absorb(window.span(mark));
        Ok(())
    }

    /// Offset 1: repeat the byte before the write cursor `length` times.
    ///
    /// The repeat feeds on its own output, so the window may fill mid-copy;
    /// if it cannot slide, the run is saved and the engine suspends.
    fn emit_byte_run(
        &mut self,
        window: &mut Window,
        frame: &mut FrameState,
        mut run: ByteRun,
    ) -> Result<Progress> {
        while run.progress < run.length {
            if window.wants_slide() {
                if !window.can_slide() {
                    self.pending = Some(run);
                    return Ok(Progress::Suspended);
                }
                window.slide();
            }
            let value = window
                .last_byte()
                .ok_or(FrazilError::SequenceBitstreamCorrupted)?;
            // Write up to the compaction threshold in one burst.
            let burst = (run.length - run.progress)
                .min(2 * window.window_size() + 1 - window.decode_pos());
            let mark = window.decode_pos();
            window.put_run(value, burst);
            frame.absorb(window.span(mark));
            run.progress += burst;
        }
        Ok(Progress::Complete)
    }

    /// Offset 4 and above: copy `length` bytes from `offset - 3` back.
    ///
    /// Chunked so a match may overlap the not-yet-written tail.
    fn copy_match(
        &mut self,
        window: &mut Window,
        frame: &mut FrameState,
        offset: u32,
        length: usize,
    ) -> Result<()> {
        if window.wants_slide() && window.can_slide() {
            window.slide();
        }
        let distance = (offset - 3) as usize;
        let mut start = window
            .decode_pos()
            .checked_sub(distance)
            .ok_or(FrazilError::SequenceBitstreamCorrupted)?;
        if window.headroom() < length {
            return Err(FrazilError::SequenceBitstreamCorrupted);
        }
        let chunk = distance.min(length);
        let end = start + length;
        while start < end {
            let next = (start + chunk).min(end);
            let mark = window.decode_pos();
            window.copy_within_window(start, next - start);
            frame.absorb(window.span(mark));
            start = next;
        }
        Ok(())
    }

    /// Close out the current sequence: on the last one, flush trailing
    /// literals and verify the tape is exhausted; otherwise step the three
    /// FSE states.
    fn end_of_sequence(&mut self, window: &mut Window, frame: &mut FrameState) -> Result<bool> {
        self.remaining -= 1;
        if self.remaining == 0 {
            let trailing = self.literals.len() - self.lit_pos;
            self.emit_literals(window, frame, trailing)?;
            if !self.bits.is_empty() {
                return Err(FrazilError::SequenceBitstreamCorrupted);
            }
            return Ok(true);
        }

        // State update order is fixed: literal length, match length, offset.
        let entry = self.ll_table.entry(self.ll_state);
        self.ll_state = entry.baseline as usize + self.bits.read(entry.num_bits)? as usize;
        let entry = self.ml_table.entry(self.ml_state);
        self.ml_state = entry.baseline as usize + self.bits.read(entry.num_bits)? as usize;
        let entry = self.of_table.entry(self.of_state);
        self.of_state = entry.baseline as usize + self.bits.read(entry.num_bits)? as usize;
        Ok(false)
    }
}
