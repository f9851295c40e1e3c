//! Yaz0 run-length/LZ compression.
//!
//! [`yaz0_decode`] and [`yaz0_encode`] work on the raw payload;
//! [`yaz0_decompress`] and [`yaz0_compress`] add or strip the 16-byte
//! `Yaz0` file header (magic, BE u32 size, 8 reserved bytes).

use tracing::trace;

use crate::error::CompressionError;

pub const MAGIC: [u8; 4] = *b"Yaz0";
pub const HEADER_SIZE: usize = 16;

const WINDOW: usize = 0x1000;
/// Longest run the 3-byte token can describe.
const MAX_MATCH: usize = 0xFF + 0x12;

// ============================================================================
// Decoding
// ============================================================================

/// Decodes a raw Yaz0 payload into exactly `uncompressed_size` bytes.
///
/// # Errors
///
/// Returns [`CompressionError::Truncated`] when `src` runs out and
/// [`CompressionError::InvalidReference`] when a back-reference points
/// before the start of the output.
pub fn yaz0_decode(src: &[u8], uncompressed_size: usize) -> Result<Vec<u8>, CompressionError> {
    let mut out = Vec::with_capacity(uncompressed_size.min(super::MAX_PREALLOC));
    let mut input = 0usize;
    let next = |input: &mut usize| -> Result<u8, CompressionError> {
        let byte = *src
            .get(*input)
            .ok_or(CompressionError::Truncated { offset: *input })?;
        *input += 1;
        Ok(byte)
    };

    let mut code = 0u8;
    let mut bits_left = 0;
    while out.len() < uncompressed_size {
        if bits_left == 0 {
            code = next(&mut input)?;
            bits_left = 8;
        }

        if code & 0x80 != 0 {
            out.push(next(&mut input)?);
        } else {
            let b1 = next(&mut input)?;
            let b2 = next(&mut input)?;
            let distance = ((usize::from(b1 & 0xF) << 8) | usize::from(b2)) + 1;
            let length = match b1 >> 4 {
                0 => usize::from(next(&mut input)?) + 0x12,
                n => usize::from(n) + 2,
            };
            if distance > out.len() {
                return Err(CompressionError::InvalidReference {
                    position: out.len(),
                    distance,
                });
            }
            let start = out.len() - distance;
            let count = length.min(uncompressed_size - out.len());
            for i in 0..count {
                let byte = out[start + i];
                out.push(byte);
            }
        }

        code <<= 1;
        bits_left -= 1;
    }
    Ok(out)
}

// ============================================================================
// Encoding
// ============================================================================

/// Encoder state for the one-step lookahead heuristic.
///
/// When the match found at `pos + 1` is at least two bytes longer than the
/// one at `pos`, a literal is emitted first and the lookahead match is
/// reused on the next step.
#[derive(Debug, Default)]
struct Encoder {
    pending: Option<(usize, usize)>,
}

impl Encoder {
    /// Longest match for `src[pos..]` in the preceding window as
    /// `(length, match_pos)`. Lengths of 2 are reported as 1 since a
    /// 2-byte token would not save anything.
    fn simple_match(src: &[u8], pos: usize) -> (usize, usize) {
        let start = pos.saturating_sub(WINDOW);
        let limit = MAX_MATCH.min(src.len() - pos);
        let mut best = (1, 0);
        for candidate in start..pos {
            let length = src[candidate..]
                .iter()
                .zip(&src[pos..pos + limit])
                .take_while(|(a, b)| a == b)
                .count();
            if length > best.0 {
                best = (length, candidate);
                if length == limit {
                    break;
                }
            }
        }
        if best.0 == 2 {
            best.0 = 1;
        }
        best
    }

    fn next_match(&mut self, src: &[u8], pos: usize) -> (usize, usize) {
        if let Some(found) = self.pending.take() {
            return found;
        }
        let (length, match_pos) = Self::simple_match(src, pos);
        if length >= 3 && pos + 1 < src.len() {
            let ahead = Self::simple_match(src, pos + 1);
            if ahead.0 >= length + 2 {
                self.pending = Some(ahead);
                return (1, match_pos);
            }
        }
        (length, match_pos)
    }
}

/// Encodes `src` as a raw Yaz0 payload (no file header).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn yaz0_encode(src: &[u8]) -> Vec<u8> {
    let mut encoder = Encoder::default();
    let mut out = Vec::with_capacity(src.len() + src.len() / 8 + 1);
    let mut group: Vec<u8> = Vec::with_capacity(24);
    let mut code = 0u8;
    let mut count = 0;
    let mut pos = 0;

    while pos < src.len() {
        let (length, match_pos) = encoder.next_match(src, pos);
        if length < 3 {
            group.push(src[pos]);
            code |= 0x80 >> count;
            pos += 1;
        } else {
            let distance = pos - match_pos - 1;
            if length >= 0x12 {
                group.push((distance >> 8) as u8);
                group.push((distance & 0xFF) as u8);
                group.push((length - 0x12) as u8);
            } else {
                group.push((((length - 2) << 4) | (distance >> 8)) as u8);
                group.push((distance & 0xFF) as u8);
            }
            pos += length;
        }

        count += 1;
        if count == 8 {
            out.push(code);
            out.append(&mut group);
            code = 0;
            count = 0;
        }
    }
    if count > 0 {
        out.push(code);
        out.append(&mut group);
    }

    trace!(input = src.len(), output = out.len(), "yaz0 encoded");
    out
}

// ============================================================================
// Framing
// ============================================================================

/// Encodes `src` and prepends the 16-byte `Yaz0` header.
#[must_use]
pub fn yaz0_compress(src: &[u8]) -> Vec<u8> {
    let size = u32::try_from(src.len()).unwrap_or(u32::MAX);
    let mut out = Vec::with_capacity(HEADER_SIZE + src.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(&[0; 8]);
    out.extend(yaz0_encode(src));
    out
}

/// Checks the `Yaz0` header and decodes the payload that follows.
///
/// # Errors
///
/// Returns [`CompressionError::InvalidHeader`] for a missing or wrong magic,
/// plus any [`yaz0_decode`] error.
pub fn yaz0_decompress(src: &[u8]) -> Result<Vec<u8>, CompressionError> {
    if src.len() < HEADER_SIZE {
        return Err(CompressionError::Truncated { offset: src.len() });
    }
    if src[..4] != MAGIC {
        return Err(CompressionError::InvalidHeader(format!(
            "expected Yaz0 magic, found {:02X?}",
            &src[..4]
        )));
    }
    let size = u32::from_be_bytes([src[4], src[5], src[6], src[7]]) as usize;
    yaz0_decode(&src[HEADER_SIZE..], size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_declared_size_over_short_input_is_truncated() {
        assert!(matches!(
            yaz0_decode(&[0xFF, b'a'], usize::MAX),
            Err(CompressionError::Truncated { offset: 2 })
        ));
    }

    #[test]
    fn decode_literals_and_run() {
        // code 0b1100_0000: two literals, then a 2-byte token (len 4, distance 2)
        let payload = [0xC0, b'a', b'b', 0x20, 0x01];
        assert_eq!(yaz0_decode(&payload, 6).unwrap(), b"ababab");
    }

    #[test]
    fn decode_three_byte_token() {
        // literal 'x', then 3-byte token: distance 1, length 0x12 + 2
        let payload = [0x80, b'x', 0x00, 0x00, 0x02];
        assert_eq!(yaz0_decode(&payload, 21).unwrap(), vec![b'x'; 21]);
    }

    #[test]
    fn decode_rejects_reference_before_start() {
        let payload = [0x00, 0x10, 0x05];
        assert!(matches!(
            yaz0_decode(&payload, 3),
            Err(CompressionError::InvalidReference { position: 0, distance: 6 })
        ));
    }

    #[test]
    fn decode_rejects_truncated_input() {
        assert!(matches!(
            yaz0_decode(&[0xFF, b'a'], 2),
            Err(CompressionError::Truncated { offset: 2 })
        ));
    }

    #[test]
    fn encode_prefers_longer_lookahead_match() {
        // at "abcd..." the match "abc" (len 3) loses to the longer one at +1
        let data = b"bcdefgh_abc_abcdefgh";
        let encoded = yaz0_encode(data);
        assert_eq!(yaz0_decode(&encoded, data.len()).unwrap(), data);
    }

    #[test]
    fn long_run_is_capped() {
        let data = vec![0u8; 1000];
        let encoded = yaz0_encode(&data);
        assert!(encoded.len() < 20);
        assert_eq!(yaz0_decode(&encoded, data.len()).unwrap(), data);
    }

    #[test]
    fn framed_round_trip() {
        let data = b"Yaz0 Yaz0 Yaz0 framing framing framing".to_vec();
        let framed = yaz0_compress(&data);
        assert_eq!(&framed[..4], b"Yaz0");
        assert_eq!(&framed[4..8], &(data.len() as u32).to_be_bytes());
        assert_eq!(&framed[8..16], &[0; 8]);
        assert_eq!(yaz0_decompress(&framed).unwrap(), data);
    }

    #[test]
    fn framed_bad_magic() {
        let mut framed = yaz0_compress(b"abc");
        framed[0] = b'X';
        assert!(matches!(
            yaz0_decompress(&framed),
            Err(CompressionError::InvalidHeader(_))
        ));
    }
}
