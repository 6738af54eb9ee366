//! Streaming pull decoder.
//!
//! [`Reader`] consumes compressed input on demand: each `read` decodes just
//! far enough to satisfy the caller, buffering output in the sliding
//! window. A compressed block whose match copy outgrows the window is
//! suspended and resumed transparently across `read` calls.

use crate::block::BlockHeader;
use crate::frame::{FrameHeader, FrameState};
use crate::fse::{self, LITERAL_LENGTH_TABLE, MATCH_LENGTH_TABLE, OFFSET_TABLE};
use crate::literals;
use crate::sequences::{self, Progress, SequenceDecoder};
use crate::window::Window;
use crate::{BlockType, MAX_BLOCK_SIZE, SKIPPABLE_MAGIC_HIGH, SKIPPABLE_MAGIC_LOW, ZSTD_MAGIC};
use frazil_core::error::{FrazilError, Result};
use frazil_core::source::ByteSource;
use std::io::{self, Read};

/// A streaming Zstandard decoder over any byte source.
///
/// Implements [`std::io::Read`]; decompressed bytes are produced in stream
/// order. The reader is not safe for concurrent use; sequential use from
/// one caller is fine. Errors are fatal: after one surfaces, the reader
/// stays halted.
pub struct Reader<R: Read> {
    src: ByteSource<R>,
    window: Window,
    frame: FrameState,
    mid_frame: bool,
    suspended: Option<SequenceDecoder>,
    pending_error: Option<FrazilError>,
    finished: bool,
    halted: bool,
}

impl<R: Read> Reader<R> {
    /// Wrap `inner` for streaming decompression.
    pub fn new(inner: R) -> Self {
        Self {
            src: ByteSource::new(inner),
            window: Window::unallocated(),
            frame: FrameState::new(),
            mid_frame: false,
            suspended: None,
            pending_error: None,
            finished: false,
            halted: false,
        }
    }

    /// Decode until at least `size` bytes (clamped to the window size) are
    /// buffered past the read cursor, or an interrupted match copy is
    /// waiting on the consumer. Returns true when the input is cleanly
    /// exhausted at a frame boundary.
    fn fill(&mut self, size: usize) -> Result<bool> {
        loop {
            let window_size = self.window.window_size();
            let want = if window_size > 0 {
                size.min(window_size)
            } else {
                size
            };
            if self.window.read_pos() + want < self.window.decode_pos() {
                return Ok(false);
            }
            if !self.mid_frame {
                if !self.begin_frame()? {
                    return Ok(true);
                }
                continue;
            }
            if self.suspended.is_some() {
                self.resume_block()?;
                continue;
            }
            self.decode_block()?;
        }
    }

    /// Parse the next frame header. Skippable frames are discarded; the
    /// caller's loop simply tries again. Returns false at clean end of
    /// input.
    fn begin_frame(&mut self) -> Result<bool> {
        let Some(first) = self.src.probe_u8()? else {
            return Ok(false);
        };
        let mut rest = [0u8; 3];
        self.src.fill(&mut rest)?;
        let magic = u32::from_le_bytes([first, rest[0], rest[1], rest[2]]);

        if (SKIPPABLE_MAGIC_LOW..=SKIPPABLE_MAGIC_HIGH).contains(&magic) {
            let skip_size = self.src.read_le(4)?;
            self.src.skip(skip_size)?;
            return Ok(true);
        }
        if magic != ZSTD_MAGIC {
            return Err(FrazilError::NotZstdFrame { found: magic });
        }

        let header = FrameHeader::read(&mut self.src)?;
        self.window.ensure(header.window_size);
        self.frame.reset(&header);
        self.mid_frame = true;
        Ok(true)
    }

    /// Decode one block, dispatching on its type.
    fn decode_block(&mut self) -> Result<()> {
        let header = BlockHeader::read(&mut self.src)?;

        let limit = self.frame.window_size.min(MAX_BLOCK_SIZE);
        if header.size > limit {
            return Err(FrazilError::BlockTooLarge {
                size: header.size,
                limit,
            });
        }

        if self.window.wants_slide() && self.window.can_slide() {
            self.window.slide();
        }
        self.frame.last_block = header.last;

        match header.block_type {
            BlockType::Raw => {
                let mark = self.window.decode_pos();
                self.src.fill(self.window.tail_mut(header.size))?;
                self.window.advance(header.size);
                self.frame.absorb(self.window.span(mark));
            }
            BlockType::Rle => {
                let byte = self.src.read_u8()?;
                let mark = self.window.decode_pos();
                self.window.put_run(byte, header.size);
                self.frame.absorb(self.window.span(mark));
            }
            BlockType::Compressed => return self.decode_compressed_block(header.size),
            BlockType::Reserved => return Err(FrazilError::ReservedBlockType),
        }
        self.finish_block()
    }

    /// Parse a compressed block's sections and execute its sequences.
    fn decode_compressed_block(&mut self, block_size: usize) -> Result<()> {
        let (stream, lit_section_size) = literals::read_raw_literals(&mut self.src)?;
        let seq_section_size = block_size
            .checked_sub(lit_section_size)
            .ok_or(FrazilError::SequenceBitstreamCorrupted)?;
        let mut tape = vec![0u8; seq_section_size];
        self.src.fill(&mut tape)?;

        let (count, consumed) = sequences::parse_sequence_count(&tape)?;
        if count == 0 {
            return Err(FrazilError::EmptySequencesUnsupported);
        }

        let modes = *tape
            .get(consumed)
            .ok_or(FrazilError::SequenceBitstreamCorrupted)?;
        if modes & 0b11 != 0 {
            return Err(FrazilError::ReservedCompModes);
        }
        let ll_table = fse::table_for_mode(modes >> 6, &LITERAL_LENGTH_TABLE)?;
        let of_table = fse::table_for_mode(modes >> 4 & 3, &OFFSET_TABLE)?;
        let ml_table = fse::table_for_mode(modes >> 2 & 3, &MATCH_LENGTH_TABLE)?;

        let tape = tape.split_off(consumed + 1);
        let mut decoder = SequenceDecoder::new(stream, tape, count, ll_table, of_table, ml_table)?;

        match decoder.run(&mut self.window, &mut self.frame)? {
            Progress::Complete => self.finish_block(),
            Progress::Suspended => {
                self.suspended = Some(decoder);
                Ok(())
            }
        }
    }

    /// Continue a block whose match copy stalled on a full window.
    fn resume_block(&mut self) -> Result<()> {
        let Some(mut decoder) = self.suspended.take() else {
            return Ok(());
        };
        match decoder.run(&mut self.window, &mut self.frame)? {
            Progress::Complete => self.finish_block(),
            Progress::Suspended => {
                self.suspended = Some(decoder);
                Ok(())
            }
        }
    }

    /// After the frame's last block, verify the checksum trailer and close
    /// the frame.
    fn finish_block(&mut self) -> Result<()> {
        if !self.frame.last_block {
            return Ok(());
        }
        if self.frame.hashing {
            let expected = self.src.read_le(4)? as u32;
            let computed = (self.frame.hash.digest() & 0xFFFF_FFFF) as u32;
            if expected != computed {
                return Err(FrazilError::checksum_mismatch(expected, computed));
            }
        }
        self.mid_frame = false;
        Ok(())
    }
}

impl<R: Read> Read for Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.halted {
            return Err(io::Error::other("zstd decoder halted after an earlier error"));
        }
        if self.pending_error.is_none() && !self.finished {
            match self.fill(buf.len()) {
                Ok(true) => self.finished = true,
                Ok(false) => {}
                Err(err) => self.pending_error = Some(err),
            }
        }
        // Serve buffered output before surfacing any pending error, so a
        // frame's payload is fully delivered even when its trailer is bad.
        let n = self.window.drain(buf);
        if n > 0 {
            return Ok(n);
        }
        if let Some(err) = self.pending_error.take() {
            self.halted = true;
            return Err(err.into());
        }
        Ok(0)
    }
}

/// Decompress a complete in-memory zstd stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Reader::new(data);
    let mut out = Vec::new();
    let mut chunk = [0u8; 16 * 1024];
    loop {
        let eof = reader.fill(chunk.len())?;
        loop {
            let n = reader.window.drain(&mut chunk);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        if eof {
            break;
        }
    }
    Ok(out)
}
