//! Nintendo LZ77 variants (types 0x10 and 0x11).

pub mod lookup;
pub mod type10;
pub mod type11;

use crate::error::CompressionError;

/// Tokens per flag byte.
pub(crate) const BLOCK_SIZE: usize = 8;

/// Minimum back-reference distance used by [`compress_lz77`] for type 0x10.
pub const TYPE10_MIN_OFFSET: usize = 2;

/// Compresses with type 0x11 when `extended`, otherwise type 0x10.
#[must_use]
pub fn compress_lz77(src: &[u8], extended: bool) -> Vec<u8> {
    if extended {
        type11::compress(src)
    } else {
        type10::compress(src, TYPE10_MIN_OFFSET)
    }
}

/// Decompresses either variant, chosen by the first byte.
///
/// # Errors
///
/// Returns [`CompressionError::InvalidHeader`] if the first byte is neither
/// 0x10 nor 0x11, plus any decoder error.
pub fn decompress_lz77(src: &[u8]) -> Result<Vec<u8>, CompressionError> {
    match src.first() {
        Some(&type11::TYPE) => type11::decompress(src),
        Some(&type10::TYPE) => type10::decompress(src),
        Some(other) => Err(CompressionError::InvalidHeader(format!(
            "LZ77 type byte {other:#04X}"
        ))),
        None => Err(CompressionError::Truncated { offset: 0 }),
    }
}

/// Parses the 4-byte header (or the 8-byte extended form) and returns the
/// decompressed size with the offset of the first flag byte.
pub(crate) fn read_header(src: &[u8], kind: u8) -> Result<(usize, usize), CompressionError> {
    let word = src
        .get(..4)
        .ok_or(CompressionError::Truncated { offset: 0 })?;
    if word[0] != kind {
        return Err(CompressionError::InvalidHeader(format!(
            "expected LZ77 type {kind:#04X}, found {:#04X}",
            word[0]
        )));
    }
    let size = u32::from_le_bytes([word[0], word[1], word[2], word[3]]) >> 8;
    if size == 0 && kind == type11::TYPE && src.len() >= 8 {
        let size = u32::from_le_bytes([src[4], src[5], src[6], src[7]]);
        return Ok((size as usize, 8));
    }
    Ok((size as usize, 4))
}

/// Copies `length` bytes from `distance` back, stopping at `limit`.
pub(crate) fn copy_back(
    out: &mut Vec<u8>,
    distance: usize,
    length: usize,
    limit: usize,
) -> Result<(), CompressionError> {
    if distance > out.len() {
        return Err(CompressionError::InvalidReference {
            position: out.len(),
            distance,
        });
    }
    let count = length.min(limit.saturating_sub(out.len()));
    let start = out.len() - distance;
    for i in 0..count {
        let byte = out[start + i];
        out.push(byte);
    }
    Ok(())
}

/// Zero-pads to a multiple of 4.
pub(crate) fn finish_padded(mut out: Vec<u8>) -> Vec<u8> {
    out.resize(out.len().next_multiple_of(4), 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_size_larger_than_input_is_truncated() {
        let extended = [0x11, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(matches!(
            decompress_lz77(&extended),
            Err(CompressionError::Truncated { offset: 8 })
        ));
        assert!(matches!(
            decompress_lz77(&[0x10, 0xFF, 0xFF, 0xFF]),
            Err(CompressionError::Truncated { offset: 4 })
        ));
    }

    #[test]
    fn dispatch_by_type_byte() {
        let data = b"the quick brown fox jumps over the quick brown dog".to_vec();
        assert_eq!(decompress_lz77(&compress_lz77(&data, false)).unwrap(), data);
        assert_eq!(decompress_lz77(&compress_lz77(&data, true)).unwrap(), data);
    }

    #[test]
    fn unknown_type_byte_is_rejected() {
        assert!(matches!(
            decompress_lz77(&[0x30, 0, 0, 0]),
            Err(CompressionError::InvalidHeader(_))
        ));
        assert!(decompress_lz77(&[]).is_err());
    }

    #[test]
    fn empty_input_compresses_to_header() {
        let packed = compress_lz77(&[], false);
        assert_eq!(packed, vec![0x10, 0, 0, 0]);
        assert!(decompress_lz77(&packed).unwrap().is_empty());
    }

    #[test]
    fn overlapping_copy_repeats_pattern() {
        let mut out = b"ab".to_vec();
        copy_back(&mut out, 2, 5, 100).unwrap();
        assert_eq!(out, b"abababa");
    }
}
