//! End-to-end decoding tests over synthesized zstd frames.
//!
//! The fixtures below were generated offline and cross-checked against an
//! independent RFC 8478 decoder (including the repeated-offset table), so
//! each good frame decodes identically under a conforming reference
//! decoder and under the subset this crate implements.

use frazil_core::error::FrazilError;
use frazil_zstd::{decompress, Reader};
use std::io::Read;

// ---------------------------------------------------------------------------
// Good frames
// ---------------------------------------------------------------------------

// Single raw block "hello", single-segment, no checksum.
const HELLO_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x20, 0x05, 0x29, 0x00, 0x00, 0x68, 0x65, 0x6c, 0x6c, 0x6f,
];

// One RLE block of sixteen 0x41 bytes, 1 KiB window, with checksum.
const RLE_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x04, 0x00, 0x83, 0x00, 0x00, 0x41, 0xad, 0x60, 0x32, 0xda,
];

// Compressed block: literals "abcdef", two sequences with offsets 6 and 7.
// Decodes to "abcabcabcabcdefcdefc".
const COMPRESSED_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x04, 0x00, 0x75, 0x00, 0x00, 0x30, 0x61, 0x62, 0x63, 0x64, 0x65,
    0x66, 0x02, 0x00, 0x3b, 0x31, 0x2c, 0xdc, 0x10, 0xb0, 0x13, 0xb1, 0xe0,
];

// One literal zero byte plus a 102399-byte repeat: 100 KiB of zeros.
const ZEROS_100K_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0xa4, 0x00, 0x90, 0x01, 0x00, 0x4d, 0x00, 0x00, 0x08, 0x00, 0x01,
    0x00, 0xfc, 0x8f, 0x39, 0x10, 0x02, 0x3f, 0x5f, 0xdb, 0x9b,
];

// 1 KiB window with a 5001-byte single-byte run: the match copy must
// suspend repeatedly while the consumer drains.
const SMALL_WINDOW_RUN_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x04, 0x00, 0x45, 0x00, 0x00, 0x08, 0x78, 0x01, 0x00, 0x85, 0xd3,
    0x03, 0x21, 0x80, 0xe7, 0xb8, 0xcd,
];

// 36 literals (2-byte literals header), an offset-1 run, an offset-13
// overlap copy, and trailing literals.
// Decodes to "ABCDEFGHIJJJJJJJKLMNOPQRSTUVWXYZQRSTUVWXYZQR0123456789".
const MULTI_SEQ_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x04, 0x00, 0x6d, 0x01, 0x00, 0x44, 0x02, 0x41, 0x42, 0x43, 0x44,
    0x45, 0x46, 0x47, 0x48, 0x49, 0x4a, 0x4b, 0x4c, 0x4d, 0x4e, 0x4f, 0x50, 0x51, 0x52, 0x53,
    0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37,
    0x38, 0x39, 0x02, 0x00, 0x5a, 0xf8, 0x1a, 0x00, 0x12, 0xa6, 0xd1, 0x3c, 0xc5,
];

// Skippable frame (magic 0x184D2A53) carrying 37 opaque bytes.
const SKIPPABLE_FRAME: &[u8] = &[
    0x53, 0x2a, 0x4d, 0x18, 0x25, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06,
    0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15,
    0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23, 0x24,
];

// ---------------------------------------------------------------------------
// Bad frames
// ---------------------------------------------------------------------------

// HELLO_FRAME with bit 3 of the frame header descriptor set.
const RESERVED_BIT_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x28, 0x05, 0x29, 0x00, 0x00, 0x68, 0x65, 0x6c, 0x6c, 0x6f,
];

// RLE_FRAME with a corrupted checksum trailer.
const BAD_CHECKSUM_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x04, 0x00, 0x83, 0x00, 0x00, 0x41, 0x42, 0xde, 0x9f, 0x04,
];

// HELLO_FRAME with the first magic byte corrupted.
const BAD_MAGIC_FRAME: &[u8] = &[
    0x29, 0xb5, 0x2f, 0xfd, 0x20, 0x05, 0x29, 0x00, 0x00, 0x68, 0x65, 0x6c, 0x6c, 0x6f,
];

// Block header with the reserved type bits (11).
const RESERVED_BLOCK_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x20, 0x05, 0x2f, 0x00, 0x00, 0x68, 0x65, 0x6c, 0x6c, 0x6f,
];

// Frame header declaring a 1-byte dictionary ID.
const DICT_ID_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x21, 0x07, 0x05, 0x29, 0x00, 0x00, 0x68, 0x65, 0x6c, 0x6c, 0x6f,
];

// Window descriptor with exponent 14: a 16 MiB window.
const WINDOW_TOO_BIG_FRAME: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd, 0x00, 0x70];

// 1 KiB window followed by a raw block header declaring 2000 bytes. The
// size check fires on the header, so no payload is needed.
const BLOCK_TOO_LARGE_FRAME: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd, 0x00, 0x00, 0x81, 0x3e, 0x00];

// Compressed block whose literals section uses the RLE type.
const RLE_LITERALS_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x00, 0x00, 0x4d, 0x00, 0x00, 0x19, 0x61, 0x62, 0x63, 0x01, 0x00,
    0x02, 0x6e, 0x08,
];

// Compressed block with non-zero reserved bits in the modes byte.
const RESERVED_MODES_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x00, 0x00, 0x4d, 0x00, 0x00, 0x18, 0x61, 0x62, 0x63, 0x01, 0x02,
    0x02, 0x6e, 0x08,
];

// Compressed block selecting the FSE_Compressed table mode for literal
// lengths.
const FSE_MODE_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x00, 0x00, 0x4d, 0x00, 0x00, 0x18, 0x61, 0x62, 0x63, 0x01, 0x80,
    0x02, 0x6e, 0x08,
];

// Sequence with raw offset value 2 (a repeated-offset code).
const REPEAT_OFFSET_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x00, 0x00, 0x45, 0x00, 0x00, 0x10, 0x61, 0x62, 0x01, 0x00, 0x82,
    0x8b, 0x05,
];

// A stray byte in the sequence bitstream leaves bits behind after the
// last sequence.
const TRAILING_BITS_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x00, 0x00, 0x55, 0x00, 0x00, 0x18, 0x61, 0x62, 0x63, 0x01, 0x00,
    0xa5, 0x02, 0x6e, 0x08,
];

// Compressed block declaring zero sequences.
const EMPTY_SEQUENCES_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x00, 0x00, 0x2d, 0x00, 0x00, 0x18, 0x61, 0x62, 0x63, 0x00,
];

// HELLO_FRAME cut short inside the raw block payload.
const TRUNCATED_FRAME: &[u8] = &[
    0x28, 0xb5, 0x2f, 0xfd, 0x20, 0x05, 0x29, 0x00, 0x00, 0x68,
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Decode `input` through the `Read` interface with a fixed chunk size.
fn read_in_chunks(input: &[u8], chunk_size: usize) -> std::io::Result<Vec<u8>> {
    let mut reader = Reader::new(input);
    let mut out = Vec::new();
    let mut chunk = vec![0u8; chunk_size];
    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&chunk[..n]);
    }
}

fn concat(frames: &[&[u8]]) -> Vec<u8> {
    frames.concat()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_raw_block_frame() {
    assert_eq!(decompress(HELLO_FRAME).unwrap(), b"hello");
}

#[test]
fn test_rle_block_frame() {
    assert_eq!(decompress(RLE_FRAME).unwrap(), vec![b'A'; 16]);
}

#[test]
fn test_compressed_block_frame() {
    assert_eq!(decompress(COMPRESSED_FRAME).unwrap(), b"abcabcabcabcdefcdefc");
}

#[test]
fn test_multi_sequence_frame() {
    assert_eq!(
        decompress(MULTI_SEQ_FRAME).unwrap(),
        b"ABCDEFGHIJJJJJJJKLMNOPQRSTUVWXYZQRSTUVWXYZQR0123456789"
    );
}

#[test]
fn test_zeros_100k() {
    let out = decompress(ZEROS_100K_FRAME).unwrap();
    assert_eq!(out.len(), 102400);
    assert!(out.iter().all(|&b| b == 0));
}

#[test]
fn test_long_run_in_small_window() {
    // 5001 output bytes from a 1 KiB window: decoding must suspend and
    // resume while the consumer drains.
    let out = read_in_chunks(SMALL_WINDOW_RUN_FRAME, 7).unwrap();
    assert_eq!(out.len(), 5001);
    assert!(out.iter().all(|&b| b == b'x'));
}

#[test]
fn test_streaming_equivalence() {
    for fixture in [
        HELLO_FRAME,
        RLE_FRAME,
        COMPRESSED_FRAME,
        MULTI_SEQ_FRAME,
        SMALL_WINDOW_RUN_FRAME,
    ] {
        let reference = decompress(fixture).unwrap();
        for chunk_size in [1, 2, 3, 7, 64, 4096] {
            let out = read_in_chunks(fixture, chunk_size).unwrap();
            assert_eq!(out, reference, "chunk size {}", chunk_size);
        }
    }
}

#[test]
fn test_frame_concatenation() {
    let input = concat(&[HELLO_FRAME, RLE_FRAME]);
    let mut expected = b"hello".to_vec();
    expected.extend_from_slice(&[b'A'; 16]);
    assert_eq!(decompress(&input).unwrap(), expected);

    // Different window sizes across the boundary.
    let input = concat(&[COMPRESSED_FRAME, ZEROS_100K_FRAME]);
    let out = decompress(&input).unwrap();
    assert_eq!(&out[..20], b"abcabcabcabcdefcdefc");
    assert_eq!(out.len(), 20 + 102400);
}

#[test]
fn test_skippable_transparency() {
    // A skippable frame before, between, and after real frames changes
    // nothing.
    let plain = decompress(&concat(&[HELLO_FRAME, RLE_FRAME])).unwrap();
    for input in [
        concat(&[SKIPPABLE_FRAME, HELLO_FRAME, RLE_FRAME]),
        concat(&[HELLO_FRAME, SKIPPABLE_FRAME, RLE_FRAME]),
        concat(&[HELLO_FRAME, RLE_FRAME, SKIPPABLE_FRAME]),
    ] {
        assert_eq!(decompress(&input).unwrap(), plain);
    }
}

#[test]
fn test_skippable_only_stream() {
    assert_eq!(decompress(SKIPPABLE_FRAME).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_truncated_skippable() {
    // Payload shorter than the declared skip size.
    let bad = &SKIPPABLE_FRAME[..20];
    assert!(matches!(
        decompress(bad).unwrap_err(),
        FrazilError::Truncated { .. }
    ));
}

// ---------------------------------------------------------------------------
// Bad corpus
// ---------------------------------------------------------------------------

#[test]
fn test_reserved_frame_bit() {
    assert!(matches!(
        decompress(RESERVED_BIT_FRAME).unwrap_err(),
        FrazilError::ReservedBitSet
    ));
    // No output may be produced.
    let mut reader = Reader::new(RESERVED_BIT_FRAME);
    let mut buf = [0u8; 64];
    assert!(reader.read(&mut buf).is_err());
}

#[test]
fn test_checksum_mismatch_after_payload() {
    assert!(matches!(
        decompress(BAD_CHECKSUM_FRAME).unwrap_err(),
        FrazilError::ChecksumMismatch { .. }
    ));

    // The payload is delivered in full before the error surfaces.
    let mut reader = Reader::new(BAD_CHECKSUM_FRAME);
    let mut out = Vec::new();
    let mut chunk = [0u8; 4];
    let err = loop {
        match reader.read(&mut chunk) {
            Ok(0) => panic!("expected checksum error"),
            Ok(n) => out.extend_from_slice(&chunk[..n]),
            Err(e) => break e,
        }
    };
    assert_eq!(out, vec![b'A'; 16]);
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    assert!(err.to_string().contains("checksum mismatch"));
}

#[test]
fn test_bad_magic() {
    assert!(matches!(
        decompress(BAD_MAGIC_FRAME).unwrap_err(),
        FrazilError::NotZstdFrame { found: 0xFD2FB529 }
    ));
}

#[test]
fn test_reserved_block_type() {
    assert!(matches!(
        decompress(RESERVED_BLOCK_FRAME).unwrap_err(),
        FrazilError::ReservedBlockType
    ));
}

#[test]
fn test_dictionary_unsupported() {
    let err = decompress(DICT_ID_FRAME).unwrap_err();
    assert!(matches!(err, FrazilError::DictionariesUnsupported));
    assert!(err.is_unsupported());
}

#[test]
fn test_window_too_big() {
    assert!(matches!(
        decompress(WINDOW_TOO_BIG_FRAME).unwrap_err(),
        FrazilError::WindowTooBig { size } if size == 16 << 20
    ));
}

#[test]
fn test_block_too_large() {
    assert!(matches!(
        decompress(BLOCK_TOO_LARGE_FRAME).unwrap_err(),
        FrazilError::BlockTooLarge { size: 2000, limit: 1024 }
    ));
}

#[test]
fn test_literals_mode_unsupported() {
    let err = decompress(RLE_LITERALS_FRAME).unwrap_err();
    assert!(matches!(err, FrazilError::LiteralsModeUnsupported { .. }));
    assert!(err.is_unsupported());
}

#[test]
fn test_reserved_compression_modes() {
    assert!(matches!(
        decompress(RESERVED_MODES_FRAME).unwrap_err(),
        FrazilError::ReservedCompModes
    ));
}

#[test]
fn test_fse_mode_unsupported() {
    assert!(matches!(
        decompress(FSE_MODE_FRAME).unwrap_err(),
        FrazilError::FseModeUnsupported { mode: 2 }
    ));
}

#[test]
fn test_repeated_offset_unsupported() {
    assert!(matches!(
        decompress(REPEAT_OFFSET_FRAME).unwrap_err(),
        FrazilError::RepeatedOffsetUnsupported { offset: 2 }
    ));
}

#[test]
fn test_trailing_sequence_bits() {
    assert!(matches!(
        decompress(TRAILING_BITS_FRAME).unwrap_err(),
        FrazilError::SequenceBitstreamCorrupted
    ));
}

#[test]
fn test_empty_sequence_section() {
    assert!(matches!(
        decompress(EMPTY_SEQUENCES_FRAME).unwrap_err(),
        FrazilError::EmptySequencesUnsupported
    ));
}

#[test]
fn test_truncated_input() {
    assert!(matches!(
        decompress(TRUNCATED_FRAME).unwrap_err(),
        FrazilError::Truncated { .. }
    ));
    // Truncation mid-header is also fatal.
    assert!(matches!(
        decompress(&HELLO_FRAME[..5]).unwrap_err(),
        FrazilError::Truncated { .. }
    ));
    assert!(matches!(
        decompress(&HELLO_FRAME[..2]).unwrap_err(),
        FrazilError::Truncated { .. }
    ));
}
