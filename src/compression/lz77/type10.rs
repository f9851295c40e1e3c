//! Nintendo LZ77 type 0x10.
//!
//! Header: LE u32 `(len << 8) | 0x10`. Each block is a flag byte (MSB
//! first, set = back-reference) followed by up to eight tokens. A
//! back-reference is a BE u16 `(len - 3) << 12 | (offset - 1)`.

use tracing::trace;

use super::lookup::{LookupTable, MIN_MATCH};
use super::{BLOCK_SIZE, finish_padded, read_header};
use crate::error::CompressionError;

/// Type byte in the low 8 bits of the header.
pub const TYPE: u8 = 0x10;

/// Longest back-reference: 4-bit length field plus [`MIN_MATCH`].
pub const MAX_MATCH: usize = MIN_MATCH + 0xF;

/// Compresses `src`, never emitting references closer than `min_offset`.
///
/// Some hardware decoders write two bytes at a time and cannot copy from
/// offset 1, hence the parameter.
#[must_use]
pub fn compress(src: &[u8], min_offset: usize) -> Vec<u8> {
    let header = (u32::try_from(src.len()).unwrap_or(u32::MAX) << 8) | u32::from(TYPE);
    let mut out = header.to_le_bytes().to_vec();
    let mut table = LookupTable::new(MAX_MATCH, min_offset);

    let mut pos = 0;
    while pos < src.len() {
        let flag_index = out.len();
        out.push(0);
        for bit in 0..BLOCK_SIZE {
            if pos >= src.len() {
                break;
            }
            match table.search(src, pos) {
                Some(m) if m.length >= MIN_MATCH => {
                    #[allow(clippy::cast_possible_truncation)]
                    let token = ((((m.length - MIN_MATCH) & 0xF) << 12) | ((m.offset - 1) & 0xFFF)) as u16;
                    out.extend_from_slice(&token.to_be_bytes());
                    out[flag_index] |= 0x80 >> bit;
                    pos += m.length;
                }
                _ => {
                    out.push(src[pos]);
                    pos += 1;
                }
            }
        }
    }

    trace!(input = src.len(), output = out.len(), "lz77 type 0x10 compressed");
    finish_padded(out)
}

/// Decompresses a type 0x10 stream, header included.
///
/// # Errors
///
/// Returns [`CompressionError::InvalidHeader`] if the type byte is wrong,
/// [`CompressionError::Truncated`] if the input ends early, or
/// [`CompressionError::InvalidReference`] for a reference before the start
/// of the output.
pub fn decompress(src: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let (expected, mut input) = read_header(src, TYPE)?;
    let mut out = Vec::with_capacity(expected.min(crate::compression::MAX_PREALLOC));

    while out.len() < expected {
        let flags = *src.get(input).ok_or(CompressionError::Truncated { offset: input })?;
        input += 1;
        for bit in 0..BLOCK_SIZE {
            if out.len() >= expected {
                break;
            }
            if flags & (0x80 >> bit) == 0 {
                let byte = *src.get(input).ok_or(CompressionError::Truncated { offset: input })?;
                out.push(byte);
                input += 1;
                continue;
            }
            let token = src
                .get(input..input + 2)
                .ok_or(CompressionError::Truncated { offset: input })?;
            input += 2;
            let value = u16::from_be_bytes([token[0], token[1]]);
            let length = usize::from(value >> 12) + MIN_MATCH;
            let distance = usize::from(value & 0xFFF) + 1;
            super::copy_back(&mut out, distance, length, expected)?;
        }
    }
    Ok(out)
}
