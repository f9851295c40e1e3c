//! Nintendo LZ77 type 0x11, which widens the length field.
//!
//! A back-reference token is picked by the top nibble `n` of its first byte:
//!
//! | `n`   | size | length                         |
//! |-------|------|--------------------------------|
//! | `>= 2`| 2    | `n + 1`                        |
//! | `0`   | 3    | `((x >> 12) & 0xFF) + 0x11`    |
//! | `1`   | 4    | `((x >> 12) & 0xFFFF) + 0x111` |
//!
//! The low 12 bits always hold `offset - 1`.

use tracing::trace;

use super::lookup::{LookupTable, MIN_MATCH};
use super::{BLOCK_SIZE, finish_padded, read_header};
use crate::error::CompressionError;

pub const TYPE: u8 = 0x11;

const MAX_TWO_BYTE: usize = 0xF + 1;
const THREE_BYTE_BIAS: usize = MAX_TWO_BYTE + 1;
const MAX_THREE_BYTE: usize = 0xFF + THREE_BYTE_BIAS;
const FOUR_BYTE_BIAS: usize = MAX_THREE_BYTE + 1;

/// Longest back-reference (0x10110).
pub const MAX_MATCH: usize = 0xFFFF + FOUR_BYTE_BIAS;

/// Largest size that still fits the 24-bit header field.
const SHORT_HEADER_LIMIT: usize = 0xFF_FFFF;

#[allow(clippy::cast_possible_truncation)]
fn push_token(out: &mut Vec<u8>, length: usize, offset: usize) {
    let offset = ((offset - 1) & 0xFFF) as u32;
    if length <= MAX_TWO_BYTE {
        let value = ((((length - 1) & 0xF) as u32) << 12) | offset;
        out.extend_from_slice(&(value as u16).to_be_bytes());
    } else if length <= MAX_THREE_BYTE {
        let value = ((((length - THREE_BYTE_BIAS) & 0xFF) as u32) << 12) | offset;
        out.extend_from_slice(&value.to_be_bytes()[1..]);
    } else {
        let value = (1 << 28) | ((((length - FOUR_BYTE_BIAS) & 0xFFFF) as u32) << 12) | offset;
        out.extend_from_slice(&value.to_be_bytes());
    }
}

/// Compresses `src` with the extended length encoding.
#[must_use]
pub fn compress(src: &[u8]) -> Vec<u8> {
    let len = u32::try_from(src.len()).unwrap_or(u32::MAX);
    let mut out = Vec::with_capacity(src.len() / 2 + 8);
    if src.len() > SHORT_HEADER_LIMIT {
        out.extend_from_slice(&u32::from(TYPE).to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
    } else {
        out.extend_from_slice(&((len << 8) | u32::from(TYPE)).to_le_bytes());
    }

    let mut table = LookupTable::new(MAX_MATCH, 1);
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
                    push_token(&mut out, m.length, m.offset);
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

    trace!(input = src.len(), output = out.len(), "lz77 type 0x11 compressed");
    finish_padded(out)
}

/// Decompresses a type 0x11 stream, header included.
///
/// # Errors
///
/// Same conditions as [`super::type10::decompress`].
pub fn decompress(src: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let (expected, mut input) = read_header(src, TYPE)?;
    let mut out = Vec::with_capacity(expected.min(crate::compression::MAX_PREALLOC));
    let truncated = |offset| CompressionError::Truncated { offset };

    while out.len() < expected {
        let flags = *src.get(input).ok_or_else(|| truncated(input))?;
        input += 1;
        for bit in 0..BLOCK_SIZE {
            if out.len() >= expected {
                break;
            }
            let first = *src.get(input).ok_or_else(|| truncated(input))?;
            if flags & (0x80 >> bit) == 0 {
                out.push(first);
                input += 1;
                continue;
            }
            let size = match first >> 4 {
                0 => 3,
                1 => 4,
                _ => 2,
            };
            let bytes = src.get(input..input + size).ok_or_else(|| truncated(input))?;
            input += size;
            let value = bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
            let length = match size {
                2 => (value >> 12) as usize + 1,
                3 => ((value >> 12) & 0xFF) as usize + THREE_BYTE_BIAS,
                _ => ((value >> 12) & 0xFFFF) as usize + FOUR_BYTE_BIAS,
            };
            let distance = (value & 0xFFF) as usize + 1;
            super::copy_back(&mut out, distance, length, expected)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_sizes_cover_length_ranges() {
        for (length, size) in [(3, 2), (16, 2), (17, 3), (272, 3), (273, 4), (MAX_MATCH, 4)] {
            let mut out = Vec::new();
            push_token(&mut out, length, 1);
            assert_eq!(out.len(), size, "length {length}");
        }
    }

    #[test]
    fn long_runs_round_trip() {
        let mut data = vec![0x42u8; 5000];
        data.extend(b"tail bytes".iter());
        data.extend(std::iter::repeat_n(0x42u8, 300));
        let packed = compress(&data);
        assert_eq!(packed[0], TYPE);
        assert!(packed.len() < 64);
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn extended_header_carries_length() {
        // hand-built: 0x11 header with a separate LE length of 2, one block of literals
        let stream = [0x11, 0, 0, 0, 2, 0, 0, 0, 0x00, b'h', b'i'];
        assert_eq!(decompress(&stream).unwrap(), b"hi");
    }

    #[test]
    fn copy_is_clamped_to_declared_size() {
        // "a" then a 2-byte token of length 16 at distance 1, but only 5 bytes declared
        let stream = [0x11, 5, 0, 0, 0x40, b'a', 0xF0, 0x00];
        assert_eq!(decompress(&stream).unwrap(), b"aaaaa");
    }
}
