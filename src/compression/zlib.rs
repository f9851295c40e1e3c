//! zlib/gzip through `flate2`.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use tracing::trace;

use crate::error::CompressionError;

/// Inflates `src`, trying a gzip stream first and a zlib stream second.
///
/// With `expected_len`, the output must have exactly that many bytes.
///
/// # Errors
///
/// Returns [`CompressionError::Zlib`] if neither stream type decodes and
/// [`CompressionError::SizeMismatch`] if the size check fails.
pub fn decompress_zlib(src: &[u8], expected_len: Option<usize>) -> Result<Vec<u8>, CompressionError> {
    let reserve = expected_len.unwrap_or_else(|| src.len().saturating_mul(2));
    let mut out = Vec::with_capacity(reserve.min(super::MAX_PREALLOC));
    if GzDecoder::new(src).read_to_end(&mut out).is_err() {
        trace!("not a gzip stream, retrying as zlib");
        out.clear();
        ZlibDecoder::new(src)
            .read_to_end(&mut out)
            .map_err(|e| CompressionError::Zlib(e.to_string()))?;
    }

    if let Some(expected) = expected_len
        && out.len() != expected
    {
        return Err(CompressionError::SizeMismatch {
            expected,
            actual: out.len(),
        });
    }
    Ok(out)
}

/// Deflates `src` into a zlib stream at the best compression level.
///
/// # Errors
///
/// Returns [`CompressionError::Zlib`] if the encoder fails.
pub fn compress_zlib(src: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(src.len() / 2), Compression::best());
    encoder
        .write_all(src)
        .map_err(|e| CompressionError::Zlib(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CompressionError::Zlib(e.to_string()))
}
