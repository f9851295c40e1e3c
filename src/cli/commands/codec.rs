//! `compress`, `decompress` and `checksum`.

use serde::Serialize;
use tracing::info;

use crate::checksums;
use crate::cli::args::{
    ChecksumAlgorithm, ChecksumArgs, CompressArgs, CompressFormat, DecompressArgs,
    DecompressFormat, OutputFormat,
};
use crate::cli::commands::{read_input, write_output};
use crate::compression::{self, Codec};
use crate::error::AthenaError;

const fn codec_for(format: CompressFormat) -> Codec {
    match format {
        CompressFormat::Zlib => Codec::Zlib,
        CompressFormat::Yaz0 => Codec::Yaz0,
        CompressFormat::Lz10 => Codec::Lz10,
        CompressFormat::Lz11 => Codec::Lz11,
    }
}

/// Compresses a file.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the encoder fails, or the
/// output cannot be written.
pub fn compress(args: &CompressArgs) -> Result<(), AthenaError> {
    let data = read_input(&args.input)?;
    let codec = codec_for(args.format);
    let packed = codec.compress(&data)?;
    info!(codec = ?codec, input = data.len(), output = packed.len(), "compressed");
    write_output(args.output.as_deref(), &packed)
}

/// Decompresses a file.
///
/// # Errors
///
/// Returns an error if the input cannot be read or decoded, or the output
/// cannot be written.
pub fn decompress(args: &DecompressArgs) -> Result<(), AthenaError> {
    let data = read_input(&args.input)?;
    let unpacked = match args.format {
        DecompressFormat::Auto => {
            let (codec, unpacked) = compression::decompress_auto(&data)?;
            info!(codec = ?codec, "detected codec");
            unpacked
        }
        DecompressFormat::Zlib => compression::decompress_zlib(&data, None)?,
        DecompressFormat::Yaz0 => compression::yaz0_decompress(&data)?,
        DecompressFormat::Lz77 => compression::decompress_lz77(&data)?,
    };
    info!(input = data.len(), output = unpacked.len(), "decompressed");
    write_output(args.output.as_deref(), &unpacked)
}

#[derive(Debug, Serialize)]
struct ChecksumReport<'a> {
    algorithm: &'static str,
    value: u64,
    hex: String,
    file: &'a str,
}

const fn algorithm_name(algorithm: ChecksumAlgorithm) -> &'static str {
    match algorithm {
        ChecksumAlgorithm::Crc32 => "crc32",
        ChecksumAlgorithm::Crc64 => "crc64",
        ChecksumAlgorithm::Crc16 => "crc16",
        ChecksumAlgorithm::Crc16Ccitt => "crc16-ccitt",
    }
}

/// Computes `algorithm` over `data`, returning the value and its hex width.
#[must_use]
pub fn compute(algorithm: ChecksumAlgorithm, data: &[u8]) -> (u64, usize) {
    match algorithm {
        ChecksumAlgorithm::Crc32 => (u64::from(checksums::crc32_default(data)), 8),
        ChecksumAlgorithm::Crc64 => (checksums::crc64_default(data), 16),
        ChecksumAlgorithm::Crc16 => (u64::from(checksums::crc16(data)), 4),
        ChecksumAlgorithm::Crc16Ccitt => (u64::from(checksums::crc16_ccitt_default(data)), 4),
    }
}

/// Prints a checksum of a file.
///
/// # Errors
///
/// Returns an error if the input cannot be read.
pub fn checksum(args: &ChecksumArgs) -> Result<(), AthenaError> {
    let data = read_input(&args.input)?;
    let (value, width) = compute(args.algorithm, &data);
    let hex = format!("{value:0width$x}");
    let file = args.input.display().to_string();

    match args.format {
        OutputFormat::Human => println!("{hex}  {file}"),
        OutputFormat::Json => {
            let report = ChecksumReport {
                algorithm: algorithm_name(args.algorithm),
                value,
                hex,
                file: &file,
            };
            println!("{}", serde_json::to_string(&report)?);
        }
    }
    Ok(())
}
