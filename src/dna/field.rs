//! Field kinds that can appear in a DNA record.

use crate::dna::yaml::{YamlDocReader, YamlDocWriter};
use crate::error::DnaError;
use crate::io::{Endian, Reader, SeekOrigin, Writer};

/// One field of a DNA record: how it is laid out in binary and how it is
/// named in YAML.
pub trait DnaField: Sized + Default {
    /// Scalars inside a fixed array print as a one-line flow sequence.
    const SCALAR: bool = false;

    /// # Errors
    ///
    /// Returns [`DnaError::Stream`] if the stream runs short.
    fn read_field<R: Reader>(reader: &mut R, endian: Endian) -> Result<Self, DnaError>;

    /// # Errors
    ///
    /// Returns [`DnaError::Stream`] if the stream rejects the write.
    fn write_field<W: Writer>(&self, writer: &mut W, endian: Endian) -> Result<(), DnaError>;

    /// Offset just past this field when it starts at `offset`.
    fn field_size(&self, offset: usize) -> usize;

    /// # Errors
    ///
    /// Returns a [`DnaError`] if the YAML value has the wrong shape.
    fn read_yaml_field(reader: &mut YamlDocReader, name: &str) -> Result<Self, DnaError>;

    /// # Errors
    ///
    /// Returns [`DnaError::ScopeUnderflow`] if scopes are unbalanced.
    fn write_yaml_field(&self, writer: &mut YamlDocWriter, name: &str) -> Result<(), DnaError>;
}

// ============================================================================
// Primitives
// ============================================================================

macro_rules! byte_field {
    ($($ty:ty => $read:ident, $write:ident);* $(;)?) => {
        $(
            impl DnaField for $ty {
                const SCALAR: bool = true;

                fn read_field<R: Reader>(reader: &mut R, _endian: Endian) -> Result<Self, DnaError> {
                    Ok(reader.$read()?)
                }

                fn write_field<W: Writer>(&self, writer: &mut W, _endian: Endian) -> Result<(), DnaError> {
                    Ok(writer.$write(*self)?)
                }

                fn field_size(&self, offset: usize) -> usize {
                    offset + 1
                }

                fn read_yaml_field(reader: &mut YamlDocReader, name: &str) -> Result<Self, DnaError> {
                    Ok(reader.$read(name))
                }

                fn write_yaml_field(&self, writer: &mut YamlDocWriter, name: &str) -> Result<(), DnaError> {
                    writer.$write(name, *self);
                    Ok(())
                }
            }
        )*
    };
}

byte_field! {
    u8 => read_u8, write_u8;
    i8 => read_i8, write_i8;
    bool => read_bool, write_bool;
}

macro_rules! endian_field {
    ($($ty:ty => $read_as:ident, $write_as:ident, $read:ident, $write:ident);* $(;)?) => {
        $(
            impl DnaField for $ty {
                const SCALAR: bool = true;

                fn read_field<R: Reader>(reader: &mut R, endian: Endian) -> Result<Self, DnaError> {
                    Ok(reader.$read_as(endian)?)
                }

                fn write_field<W: Writer>(&self, writer: &mut W, endian: Endian) -> Result<(), DnaError> {
                    Ok(writer.$write_as(*self, endian)?)
                }

                fn field_size(&self, offset: usize) -> usize {
                    offset + std::mem::size_of::<$ty>()
                }

                fn read_yaml_field(reader: &mut YamlDocReader, name: &str) -> Result<Self, DnaError> {
                    Ok(reader.$read(name))
                }

                fn write_yaml_field(&self, writer: &mut YamlDocWriter, name: &str) -> Result<(), DnaError> {
                    writer.$write(name, *self);
                    Ok(())
                }
            }
        )*
    };
}

endian_field! {
    u16 => read_u16_as, write_u16_as, read_u16, write_u16;
    u32 => read_u32_as, write_u32_as, read_u32, write_u32;
    u64 => read_u64_as, write_u64_as, read_u64, write_u64;
    i16 => read_i16_as, write_i16_as, read_i16, write_i16;
    i32 => read_i32_as, write_i32_as, read_i32, write_i32;
    i64 => read_i64_as, write_i64_as, read_i64, write_i64;
    f32 => read_f32_as, write_f32_as, read_f32, write_f32;
    f64 => read_f64_as, write_f64_as, read_f64, write_f64;
}

// ============================================================================
// Fixed arrays
// ============================================================================

/// Fixed arrays, including the `[f32; 2..4]` and `[f64; 2..4]` vectors.
/// YAML reads fill from the front; missing trailing items stay default.
impl<T: DnaField, const N: usize> DnaField for [T; N]
where
    [T; N]: Default,
{
    fn read_field<R: Reader>(reader: &mut R, endian: Endian) -> Result<Self, DnaError> {
        let mut out = Self::default();
        for slot in &mut out {
            *slot = T::read_field(reader, endian)?;
        }
        Ok(out)
    }

    fn write_field<W: Writer>(&self, writer: &mut W, endian: Endian) -> Result<(), DnaError> {
        self.iter().try_for_each(|item| item.write_field(writer, endian))
    }

    fn field_size(&self, offset: usize) -> usize {
        self.iter().fold(offset, |acc, item| item.field_size(acc))
    }

    fn read_yaml_field(reader: &mut YamlDocReader, name: &str) -> Result<Self, DnaError> {
        let mut out = Self::default();
        if reader.enter_sub_vector(name)?.is_some() {
            for slot in &mut out {
                *slot = T::read_yaml_field(reader, "")?;
            }
            reader.leave()?;
        }
        Ok(out)
    }

    fn write_yaml_field(&self, writer: &mut YamlDocWriter, name: &str) -> Result<(), DnaError> {
        write_yaml_vec(self, writer, name)
    }
}

// ============================================================================
// Counted vectors
// ============================================================================

/// Integer fields that can size a sibling `Vec`.
pub trait DnaCount {
    /// Element count; negative values count as zero.
    fn as_count(&self) -> usize;
}

macro_rules! dna_count {
    ($($ty:ty),*) => {
        $(
            impl DnaCount for $ty {
                fn as_count(&self) -> usize {
                    usize::try_from(*self).unwrap_or(0)
                }
            }
        )*
    };
}

dna_count!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

/// # Errors
///
/// Stops at the first element that fails to read.
pub fn read_vec<T: DnaField, R: Reader>(
    reader: &mut R,
    endian: Endian,
    count: usize,
) -> Result<Vec<T>, DnaError> {
    reader.enumerate(count, |r| T::read_field(r, endian))
}

/// # Errors
///
/// Stops at the first element that fails to write.
pub fn write_vec<T: DnaField, W: Writer>(
    items: &[T],
    writer: &mut W,
    endian: Endian,
) -> Result<(), DnaError> {
    items.iter().try_for_each(|item| item.write_field(writer, endian))
}

#[must_use]
pub fn vec_size<T: DnaField>(items: &[T], offset: usize) -> usize {
    items.iter().fold(offset, |acc, item| item.field_size(acc))
}

/// Reads `count` items from the sequence under `name`, the same number a
/// binary read takes. Items the sequence lacks are defaulted and surplus
/// items are ignored.
///
/// # Errors
///
/// Returns [`DnaError::MissingScope`] if the field is not a sequence and
/// [`DnaError::CountTooLarge`] if room for `count` items cannot be reserved.
pub fn read_yaml_vec<T: DnaField>(
    reader: &mut YamlDocReader,
    name: &str,
    count: usize,
) -> Result<Vec<T>, DnaError> {
    let present = reader.enter_sub_vector(name)?;
    let mut items = (0..present.unwrap_or(0).min(count))
        .map(|_| T::read_yaml_field(reader, ""))
        .collect::<Result<Vec<_>, _>>()?;
    if present.is_some() {
        reader.leave()?;
    }
    items
        .try_reserve_exact(count - items.len())
        .map_err(|_| DnaError::CountTooLarge {
            field: name.to_string(),
            count,
        })?;
    items.resize_with(count, T::default);
    Ok(items)
}

/// # Errors
///
/// Returns [`DnaError::ScopeUnderflow`] if an item leaves more scopes than
/// it opened.
pub fn write_yaml_vec<T: DnaField>(
    items: &[T],
    writer: &mut YamlDocWriter,
    name: &str,
) -> Result<(), DnaError> {
    writer.enter_sub_vector(name, T::SCALAR);
    for item in items {
        item.write_yaml_field(writer, "")?;
    }
    writer.leave()
}

// ============================================================================
// Strings
// ============================================================================

macro_rules! string_newtype {
    ($($(#[$meta:meta])* $name:ident $(<const $n:ident: usize>)?;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
            pub struct $name$(<const $n: usize>)?(pub String);

            impl$(<const $n: usize>)? $name$(<$n>)? {
                #[must_use]
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl$(<const $n: usize>)? From<&str> for $name$(<$n>)? {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }

            impl$(<const $n: usize>)? std::fmt::Display for $name$(<$n>)? {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

string_newtype! {
    /// 8-bit string occupying exactly `N` bytes, zero padded.
    FixedString<const N: usize>;
    /// NUL-terminated 8-bit string.
    CString;
    /// UTF-16 string occupying exactly `N` code units.
    FixedWString<const N: usize>;
    /// Zero-terminated UTF-16 string.
    WString;
}

fn read_yaml_text(reader: &mut YamlDocReader, name: &str) -> String {
    reader.read_string(name)
}

fn write_yaml_text(writer: &mut YamlDocWriter, name: &str, value: &str) -> Result<(), DnaError> {
    writer.write_string(name, value);
    Ok(())
}

impl<const N: usize> DnaField for FixedString<N> {
    fn read_field<R: Reader>(reader: &mut R, _endian: Endian) -> Result<Self, DnaError> {
        Ok(Self(reader.read_string(Some(N))?))
    }

    fn write_field<W: Writer>(&self, writer: &mut W, _endian: Endian) -> Result<(), DnaError> {
        Ok(writer.write_string(&self.0, Some(N))?)
    }

    fn field_size(&self, offset: usize) -> usize {
        offset + N
    }

    fn read_yaml_field(reader: &mut YamlDocReader, name: &str) -> Result<Self, DnaError> {
        Ok(Self(read_yaml_text(reader, name)))
    }

    fn write_yaml_field(&self, writer: &mut YamlDocWriter, name: &str) -> Result<(), DnaError> {
        write_yaml_text(writer, name, &self.0)
    }
}

impl DnaField for CString {
    fn read_field<R: Reader>(reader: &mut R, _endian: Endian) -> Result<Self, DnaError> {
        Ok(Self(reader.read_string(None)?))
    }

    fn write_field<W: Writer>(&self, writer: &mut W, _endian: Endian) -> Result<(), DnaError> {
        Ok(writer.write_string(&self.0, None)?)
    }

    fn field_size(&self, offset: usize) -> usize {
        offset + self.0.len() + 1
    }

    fn read_yaml_field(reader: &mut YamlDocReader, name: &str) -> Result<Self, DnaError> {
        Ok(Self(read_yaml_text(reader, name)))
    }

    fn write_yaml_field(&self, writer: &mut YamlDocWriter, name: &str) -> Result<(), DnaError> {
        write_yaml_text(writer, name, &self.0)
    }
}

impl<const N: usize> DnaField for FixedWString<N> {
    fn read_field<R: Reader>(reader: &mut R, endian: Endian) -> Result<Self, DnaError> {
        Ok(Self(reader.read_wstring_as(Some(N), endian)?))
    }

    fn write_field<W: Writer>(&self, writer: &mut W, endian: Endian) -> Result<(), DnaError> {
        Ok(writer.write_wstring_as(&self.0, Some(N), endian)?)
    }

    fn field_size(&self, offset: usize) -> usize {
        offset + N * 2
    }

    fn read_yaml_field(reader: &mut YamlDocReader, name: &str) -> Result<Self, DnaError> {
        Ok(Self(read_yaml_text(reader, name)))
    }

    fn write_yaml_field(&self, writer: &mut YamlDocWriter, name: &str) -> Result<(), DnaError> {
        write_yaml_text(writer, name, &self.0)
    }
}

impl DnaField for WString {
    fn read_field<R: Reader>(reader: &mut R, endian: Endian) -> Result<Self, DnaError> {
        Ok(Self(reader.read_wstring_as(None, endian)?))
    }

    fn write_field<W: Writer>(&self, writer: &mut W, endian: Endian) -> Result<(), DnaError> {
        Ok(writer.write_wstring_as(&self.0, None, endian)?)
    }

    fn field_size(&self, offset: usize) -> usize {
        offset + (self.0.encode_utf16().count() + 1) * 2
    }

    fn read_yaml_field(reader: &mut YamlDocReader, name: &str) -> Result<Self, DnaError> {
        Ok(Self(read_yaml_text(reader, name)))
    }

    fn write_yaml_field(&self, writer: &mut YamlDocWriter, name: &str) -> Result<(), DnaError> {
        write_yaml_text(writer, name, &self.0)
    }
}

// ============================================================================
// Buffers
// ============================================================================

/// Opaque `N`-byte blob, base64 in YAML. Shorter contents are zero padded
/// on write, longer contents truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Buffer<const N: usize>(pub Vec<u8>);

impl<const N: usize> DnaField for Buffer<N> {
    fn read_field<R: Reader>(reader: &mut R, _endian: Endian) -> Result<Self, DnaError> {
        Ok(Self(reader.read_ubytes(N)?))
    }

    fn write_field<W: Writer>(&self, writer: &mut W, _endian: Endian) -> Result<(), DnaError> {
        let take = self.0.len().min(N);
        writer.write_ubytes(&self.0[..take])?;
        Ok(writer.fill(0, N - take)?)
    }

    fn field_size(&self, offset: usize) -> usize {
        offset + N
    }

    fn read_yaml_field(reader: &mut YamlDocReader, name: &str) -> Result<Self, DnaError> {
        reader.read_buffer(name).map(Self)
    }

    fn write_yaml_field(&self, writer: &mut YamlDocWriter, name: &str) -> Result<(), DnaError> {
        writer.write_buffer(name, &self.0);
        Ok(())
    }
}

// ============================================================================
// Layout markers
// ============================================================================

/// Moves the cursor to the next multiple of `N`. Writing emits zero
/// padding. Not present in YAML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Align<const N: usize>;

const fn align_u64<const N: usize>() -> u64 {
    N as u64
}

impl<const N: usize> DnaField for Align<N> {
    fn read_field<R: Reader>(reader: &mut R, _endian: Endian) -> Result<Self, DnaError> {
        reader.seek_align(align_u64::<N>())?;
        Ok(Self)
    }

    fn write_field<W: Writer>(&self, writer: &mut W, _endian: Endian) -> Result<(), DnaError> {
        Ok(writer.pad_align(align_u64::<N>())?)
    }

    fn field_size(&self, offset: usize) -> usize {
        if N == 0 { offset } else { offset.div_ceil(N) * N }
    }

    fn read_yaml_field(_reader: &mut YamlDocReader, _name: &str) -> Result<Self, DnaError> {
        Ok(Self)
    }

    fn write_yaml_field(&self, _writer: &mut YamlDocWriter, _name: &str) -> Result<(), DnaError> {
        Ok(())
    }
}

/// Origins for [`Seek`].
pub mod origin {
    pub const BEGIN: u8 = 0;
    pub const CURRENT: u8 = 1;
    pub const END: u8 = 2;
}

const fn seek_origin(raw: u8) -> SeekOrigin {
    match raw {
        origin::BEGIN => SeekOrigin::Begin,
        origin::END => SeekOrigin::End,
        _ => SeekOrigin::Current,
    }
}

/// Seeks by `OFFSET` from `ORIGIN` (see [`origin`]) on both read and write.
/// Not present in YAML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Seek<const OFFSET: i64, const ORIGIN: u8>;

impl<const OFFSET: i64, const ORIGIN: u8> DnaField for Seek<OFFSET, ORIGIN> {
    fn read_field<R: Reader>(reader: &mut R, _endian: Endian) -> Result<Self, DnaError> {
        reader.seek(OFFSET, seek_origin(ORIGIN))?;
        Ok(Self)
    }

    fn write_field<W: Writer>(&self, writer: &mut W, _endian: Endian) -> Result<(), DnaError> {
        writer.seek(OFFSET, seek_origin(ORIGIN))?;
        Ok(())
    }

    /// End-relative seeks depend on the stream length, so they leave the
    /// offset unchanged.
    fn field_size(&self, offset: usize) -> usize {
        match seek_origin(ORIGIN) {
            SeekOrigin::Begin => usize::try_from(OFFSET).unwrap_or(0),
            SeekOrigin::Current => {
                let moved = i64::try_from(offset).unwrap_or(i64::MAX).saturating_add(OFFSET);
                usize::try_from(moved).unwrap_or(0)
            }
            SeekOrigin::End => offset,
        }
    }

    fn read_yaml_field(_reader: &mut YamlDocReader, _name: &str) -> Result<Self, DnaError> {
        Ok(Self)
    }

    fn write_yaml_field(&self, _writer: &mut YamlDocWriter, _name: &str) -> Result<(), DnaError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{MemoryReader, VectorWriter};

    fn to_bytes<T: DnaField>(value: &T, endian: Endian) -> Vec<u8> {
        let mut writer = VectorWriter::with_endian(endian);
        value.write_field(&mut writer, endian).unwrap();
        writer.into_inner()
    }

    #[test]
    fn primitives_follow_endian() {
        assert_eq!(to_bytes(&0x1234u16, Endian::Big), [0x12, 0x34]);
        assert_eq!(to_bytes(&0x1234u16, Endian::Little), [0x34, 0x12]);
        assert_eq!(to_bytes(&true, Endian::Big), [1]);
        let mut reader = MemoryReader::new(&[0xFFu8, 0xFE][..]);
        assert_eq!(i16::read_field(&mut reader, Endian::Big).unwrap(), -2);
    }

    #[test]
    fn fixed_string_pads() {
        let value = FixedString::<6>::from("Link");
        let bytes = to_bytes(&value, Endian::Little);
        assert_eq!(bytes, b"Link\0\0");
        assert_eq!(value.field_size(0), 6);
        let mut reader = MemoryReader::new(bytes.as_slice());
        assert_eq!(FixedString::<6>::read_field(&mut reader, Endian::Little).unwrap(), value);
    }

    #[test]
    fn wide_string_sizes() {
        let value = WString::from("Zelda");
        assert_eq!(value.field_size(0), 12);
        assert_eq!(to_bytes(&value, Endian::Big).len(), 12);
        assert_eq!(FixedWString::<4>::from("Ganon").field_size(2), 10);
        assert_eq!(to_bytes(&FixedWString::<4>::from("Ganon"), Endian::Big), b"\0G\0a\0n\0o");
    }

    #[test]
    fn buffer_pads_and_truncates() {
        assert_eq!(to_bytes(&Buffer::<4>(vec![1, 2]), Endian::Little), [1, 2, 0, 0]);
        assert_eq!(to_bytes(&Buffer::<2>(vec![1, 2, 3]), Endian::Little), [1, 2]);
    }

    #[test]
    fn align_and_seek_sizes() {
        assert_eq!(Align::<4>.field_size(5), 8);
        assert_eq!(Align::<4>.field_size(8), 8);
        assert_eq!(Seek::<0x10, { origin::BEGIN }>.field_size(3), 0x10);
        assert_eq!(Seek::<{ -2 }, { origin::CURRENT }>.field_size(3), 1);
        assert_eq!(Seek::<4, { origin::END }>.field_size(3), 3);
    }

    #[test]
    fn array_reads_in_order() {
        let mut reader = MemoryReader::new(&[0x00u8, 0x01, 0x00, 0x02][..]);
        let value = <[u16; 2]>::read_field(&mut reader, Endian::Big).unwrap();
        assert_eq!(value, [1, 2]);
        assert_eq!(value.field_size(0), 4);
    }

    #[test]
    fn counts_clamp_negative() {
        assert_eq!((-3i32).as_count(), 0);
        assert_eq!(7u8.as_count(), 7);
    }
}
