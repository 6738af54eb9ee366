//! Literals section parsing.
//!
//! Only raw (uncompressed) literals are supported. The raw layout has a
//! 1- or 2-byte header carrying the regenerated size, followed by the
//! literal bytes themselves.

use crate::LiteralsBlockType;
use frazil_core::error::{FrazilError, Result};
use frazil_core::source::ByteSource;
use std::io::Read;

/// Read the literals section of a compressed block.
///
/// Returns the literal bytes and the total section size in bytes
/// (header plus payload), which the caller needs to locate the sequences
/// section within the block.
pub(crate) fn read_raw_literals<R: Read>(src: &mut ByteSource<R>) -> Result<(Vec<u8>, usize)> {
    let b0 = src.read_u8()?;

    match LiteralsBlockType::from_bits(b0 & 0x03) {
        LiteralsBlockType::Raw => {}
        LiteralsBlockType::Rle => {
            return Err(FrazilError::LiteralsModeUnsupported {
                detail: "RLE literals",
            });
        }
        LiteralsBlockType::Compressed => {
            return Err(FrazilError::LiteralsModeUnsupported {
                detail: "Huffman-compressed literals",
            });
        }
        LiteralsBlockType::Treeless => {
            return Err(FrazilError::LiteralsModeUnsupported {
                detail: "treeless literals",
            });
        }
    }

    let size_format = b0 >> 2 & 0x03;
    let (regenerated_size, header_size) = match size_format {
        // 5-bit size in the header byte.
        0 | 2 => ((b0 >> 3) as usize, 1),
        // 12-bit size across two bytes.
        1 => {
            let b1 = src.read_u8()?;
            ((b0 >> 4) as usize | (b1 as usize) << 4, 2)
        }
        3 => {
            return Err(FrazilError::LiteralsModeUnsupported {
                detail: "20-bit size format",
            });
        }
        _ => unreachable!(),
    };

    let mut stream = vec![0u8; regenerated_size];
    src.fill(&mut stream)?;
    Ok((stream, header_size + regenerated_size))
}
