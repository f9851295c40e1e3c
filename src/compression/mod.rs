//! Compression codecs: zlib, Yaz0 and Nintendo LZ77.

pub mod lz77;
pub mod yaz0;
pub mod zlib;

use serde::Serialize;

use crate::error::CompressionError;

/// Most output bytes reserved up front from a size the input declares.
/// Longer outputs grow as they decode.
pub(crate) const MAX_PREALLOC: usize = 1 << 20;

pub use lz77::{compress_lz77, decompress_lz77};
pub use yaz0::{yaz0_compress, yaz0_decode, yaz0_decompress, yaz0_encode};
pub use zlib::{compress_zlib, decompress_zlib};

/// A self-describing compressed container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// zlib (or gzip on input).
    Zlib,
    /// `Yaz0` header plus Yaz0 payload.
    Yaz0,
    /// LZ77 type 0x10.
    Lz10,
    /// LZ77 type 0x11.
    Lz11,
}

impl Codec {
    /// Guesses the codec from the leading bytes.
    #[must_use]
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data {
            [b'Y', b'a', b'z', b'0', ..] => Some(Self::Yaz0),
            [0x1F, 0x8B, ..] => Some(Self::Zlib),
            [cmf, flg, ..] if cmf & 0x0F == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0 => {
                Some(Self::Zlib)
            }
            [0x10, ..] => Some(Self::Lz10),
            [0x11, ..] => Some(Self::Lz11),
            _ => None,
        }
    }

    /// Compresses `data` with this codec.
    ///
    /// # Errors
    ///
    /// Only the zlib encoder can fail.
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        match self {
            Self::Zlib => compress_zlib(data),
            Self::Yaz0 => Ok(yaz0_compress(data)),
            Self::Lz10 => Ok(compress_lz77(data, false)),
            Self::Lz11 => Ok(compress_lz77(data, true)),
        }
    }

    /// Decompresses `data` with this codec.
    ///
    /// # Errors
    ///
    /// Propagates the decoder error.
    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        match self {
            Self::Zlib => decompress_zlib(data, None),
            Self::Yaz0 => yaz0_decompress(data),
            Self::Lz10 | Self::Lz11 => decompress_lz77(data),
        }
    }
}

/// Detects the codec from the leading bytes and decompresses.
///
/// # Errors
///
/// Returns [`CompressionError::InvalidHeader`] if no codec matches.
pub fn decompress_auto(data: &[u8]) -> Result<(Codec, Vec<u8>), CompressionError> {
    let codec = Codec::detect(data).ok_or_else(|| {
        CompressionError::InvalidHeader("could not detect compression format".to_string())
    })?;
    Ok((codec, codec.decompress(data)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_each_codec() {
        let data = b"detect me detect me detect me";
        for codec in [Codec::Zlib, Codec::Yaz0, Codec::Lz10, Codec::Lz11] {
            let packed = codec.compress(data).unwrap();
            assert_eq!(Codec::detect(&packed), Some(codec));
            let (found, plain) = decompress_auto(&packed).unwrap();
            assert_eq!(found, codec);
            assert_eq!(plain, data);
        }
    }

    #[test]
    fn unknown_data_is_rejected() {
        assert!(decompress_auto(b"\x00\x01\x02").is_err());
        assert_eq!(Codec::detect(&[]), None);
    }
}
