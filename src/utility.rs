//! Small helpers shared by the stream, format and CLI layers.

use std::path::Path;

use tracing::warn;

// ============================================================================
// Byte Order
// ============================================================================

macro_rules! swaps {
    ($( $name:ident: $ty:ty; )*) => {
        $(
            #[doc = concat!("Reverses the byte order of a `", stringify!($ty), "`.")]
            #[must_use]
            pub const fn $name(value: $ty) -> $ty {
                <$ty>::from_ne_bytes(reverse_bytes(value.to_ne_bytes()))
            }
        )*
    };
}

const fn reverse_bytes<const N: usize>(mut bytes: [u8; N]) -> [u8; N] {
    let mut i = 0;
    while i < N / 2 {
        let tmp = bytes[i];
        bytes[i] = bytes[N - 1 - i];
        bytes[N - 1 - i] = tmp;
        i += 1;
    }
    bytes
}

swaps! {
    swap_u16: u16;
    swap_i16: i16;
    swap_u32: u32;
    swap_i32: i32;
    swap_u64: u64;
    swap_i64: i64;
    swap_f32: f32;
    swap_f64: f64;
}

macro_rules! normalisers {
    ($( $ty:ty => $little:ident, $big:ident; )*) => {
        $(
            #[doc = concat!("Converts a `", stringify!($ty), "` between host and little-endian order.")]
            #[must_use]
            pub const fn $little(value: $ty) -> $ty {
                <$ty>::from_le(value)
            }

            #[doc = concat!("Converts a `", stringify!($ty), "` between host and big-endian order.")]
            #[must_use]
            pub const fn $big(value: $ty) -> $ty {
                <$ty>::from_be(value)
            }
        )*
    };
}

normalisers! {
    u16 => little_u16, big_u16;
    i16 => little_i16, big_i16;
    u32 => little_u32, big_u32;
    i32 => little_i32, big_i32;
    u64 => little_u64, big_u64;
    i64 => little_i64, big_i64;
}

// ============================================================================
// Alignment
// ============================================================================

/// Rounds `value` up to the next multiple of `align`. An `align` of 0 or 1
/// returns `value` unchanged.
#[must_use]
pub const fn round_up(value: u64, align: u64) -> u64 {
    if align <= 1 {
        return value;
    }
    value.div_ceil(align).saturating_mul(align)
}

#[must_use]
pub const fn round_up4(value: u64) -> u64 {
    round_up(value, 4)
}

#[must_use]
pub const fn round_up16(value: u64) -> u64 {
    round_up(value, 16)
}

#[must_use]
pub const fn round_up32(value: u64) -> u64 {
    round_up(value, 32)
}

#[must_use]
pub const fn round_up64(value: u64) -> u64 {
    round_up(value, 64)
}

// ============================================================================
// Buffers and Strings
// ============================================================================

/// True when every byte equals the first one (an empty slice counts).
#[must_use]
pub fn is_empty(buf: &[u8]) -> bool {
    buf.first().is_none_or(|&first| buf.iter().all(|&b| b == first))
}

/// Parses a boolean word, ignoring case and surrounding whitespace.
///
/// Accepts `true`, `1`, `yes`, `on` and their negatives; anything else is
/// `None`.
#[must_use]
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Splits on `delim`. A trailing empty piece is dropped, so `"a,b,"`
/// yields two items and `""` yields none.
#[must_use]
pub fn split(text: &str, delim: char) -> Vec<String> {
    let mut parts: Vec<String> = text.split(delim).map(str::to_owned).collect();
    if parts.last().is_some_and(String::is_empty) {
        parts.pop();
    }
    parts
}

#[must_use]
pub fn join(parts: &[String], delim: &str) -> String {
    parts.join(delim)
}

#[must_use]
pub fn to_lower(text: &str) -> String {
    text.to_ascii_lowercase()
}

#[must_use]
pub fn to_upper(text: &str) -> String {
    text.to_ascii_uppercase()
}

/// Trims ASCII spaces (only) from both ends.
#[must_use]
pub fn trim(text: &str) -> &str {
    text.trim_matches(' ')
}

/// Counts occurrences of `ch` and returns the byte index of the last one.
#[must_use]
pub fn count_char(text: &str, ch: char) -> (usize, Option<usize>) {
    text.match_indices(ch)
        .fold((0, None), |(count, _), (index, _)| (count + 1, Some(index)))
}

/// Size of the file at `path` in bytes.
///
/// # Errors
///
/// Returns the error from reading the file's metadata.
pub fn file_size(path: impl AsRef<Path>) -> std::io::Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

/// Decodes UTF-16 code units. Decoding stops at the first unpaired
/// surrogate, returning what was decoded so far.
#[must_use]
pub fn wide_to_utf8(units: &[u16]) -> String {
    let mut out = String::with_capacity(units.len());
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(ch) => out.push(ch),
            Err(e) => {
                warn!(unit = e.unpaired_surrogate(), "invalid UTF-16 while decoding");
                break;
            }
        }
    }
    out
}

/// Encodes `text` as UTF-16 code units, stopping at an embedded NUL.
#[must_use]
pub fn utf8_to_wide(text: &str) -> Vec<u16> {
    text.split('\0')
        .next()
        .unwrap_or_default()
        .encode_utf16()
        .collect()
}
