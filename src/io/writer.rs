//! The [`Writer`] trait, mirroring [`Reader`](crate::io::Reader).

use crate::error::StreamError;
use crate::io::stream::{Endian, SeekOrigin, Stream};

macro_rules! endian_writes {
    ($( $ty:ty => $write:ident, $little:ident, $big:ident, $with:ident; )*) => {
        $(
            #[doc = concat!("Writes a `", stringify!($ty), "` in the stream byte order.")]
            ///
            /// # Errors
            ///
            /// Propagates the error of [`Writer::write_ubytes`].
            fn $write(&mut self, value: $ty) -> Result<(), StreamError> {
                let endian = self.endian();
                self.$with(value, endian)
            }

            /// # Errors
            ///
            /// Propagates the error of [`Writer::write_ubytes`].
            fn $little(&mut self, value: $ty) -> Result<(), StreamError> {
                self.$with(value, Endian::Little)
            }

            /// # Errors
            ///
            /// Propagates the error of [`Writer::write_ubytes`].
            fn $big(&mut self, value: $ty) -> Result<(), StreamError> {
                self.$with(value, Endian::Big)
            }

            /// # Errors
            ///
            /// Propagates the error of [`Writer::write_ubytes`].
            fn $with(&mut self, value: $ty, endian: Endian) -> Result<(), StreamError> {
                match endian {
                    Endian::Little => self.write_ubytes(&value.to_le_bytes()),
                    Endian::Big => self.write_ubytes(&value.to_be_bytes()),
                }
            }
        )*
    };
}

macro_rules! vector_writes {
    ($( [$elem:ty; $n:literal] via $elem_with:ident => $write:ident, $little:ident, $big:ident, $with:ident; )*) => {
        $(
            #[doc = concat!("Writes `[", stringify!($elem), "; ", stringify!($n), "]` in the stream byte order.")]
            ///
            /// # Errors
            ///
            /// Propagates the error of [`Writer::write_ubytes`].
            fn $write(&mut self, value: [$elem; $n]) -> Result<(), StreamError> {
                let endian = self.endian();
                self.$with(value, endian)
            }

            /// # Errors
            ///
            /// Propagates the error of [`Writer::write_ubytes`].
            fn $little(&mut self, value: [$elem; $n]) -> Result<(), StreamError> {
                self.$with(value, Endian::Little)
            }

            /// # Errors
            ///
            /// Propagates the error of [`Writer::write_ubytes`].
            fn $big(&mut self, value: [$elem; $n]) -> Result<(), StreamError> {
                self.$with(value, Endian::Big)
            }

            /// # Errors
            ///
            /// Propagates the error of [`Writer::write_ubytes`].
            fn $with(&mut self, value: [$elem; $n], endian: Endian) -> Result<(), StreamError> {
                for component in value {
                    self.$elem_with(component, endian)?;
                }
                Ok(())
            }
        )*
    };
}

/// Byte-oriented output stream.
pub trait Writer: Stream {
    /// Writes all of `data` at the cursor.
    ///
    /// # Errors
    ///
    /// Fixed-size writers return [`StreamError::BufferFull`] when `data`
    /// does not fit; file-backed writers surface I/O failures.
    fn write_ubytes(&mut self, data: &[u8]) -> Result<(), StreamError>;

    /// # Errors
    ///
    /// Propagates the error of [`Writer::write_ubytes`].
    fn write_u8(&mut self, value: u8) -> Result<(), StreamError> {
        self.write_ubytes(&[value])
    }

    /// # Errors
    ///
    /// Propagates the error of [`Writer::write_ubytes`].
    fn write_i8(&mut self, value: i8) -> Result<(), StreamError> {
        self.write_ubytes(&value.to_ne_bytes())
    }

    /// # Errors
    ///
    /// Propagates the error of [`Writer::write_ubytes`].
    fn write_bool(&mut self, value: bool) -> Result<(), StreamError> {
        self.write_u8(u8::from(value))
    }

    endian_writes! {
        i16 => write_i16, write_i16_little, write_i16_big, write_i16_as;
        u16 => write_u16, write_u16_little, write_u16_big, write_u16_as;
        i32 => write_i32, write_i32_little, write_i32_big, write_i32_as;
        u32 => write_u32, write_u32_little, write_u32_big, write_u32_as;
        i64 => write_i64, write_i64_little, write_i64_big, write_i64_as;
        u64 => write_u64, write_u64_little, write_u64_big, write_u64_as;
        f32 => write_f32, write_f32_little, write_f32_big, write_f32_as;
        f64 => write_f64, write_f64_little, write_f64_big, write_f64_as;
    }

    vector_writes! {
        [f32; 2] via write_f32_as => write_vec2f, write_vec2f_little, write_vec2f_big, write_vec2f_as;
        [f32; 3] via write_f32_as => write_vec3f, write_vec3f_little, write_vec3f_big, write_vec3f_as;
        [f32; 4] via write_f32_as => write_vec4f, write_vec4f_little, write_vec4f_big, write_vec4f_as;
        [f64; 2] via write_f64_as => write_vec2d, write_vec2d_little, write_vec2d_big, write_vec2d_as;
        [f64; 3] via write_f64_as => write_vec3d, write_vec3d_little, write_vec3d_big, write_vec3d_as;
        [f64; 4] via write_f64_as => write_vec4d, write_vec4d_little, write_vec4d_big, write_vec4d_as;
    }

    /// Writes an 8-bit string.
    ///
    /// Without `fixed_len` the bytes are followed by a NUL. With it, exactly
    /// `fixed_len` bytes are written: the string is truncated or zero-padded
    /// and no extra terminator is added.
    ///
    /// # Errors
    ///
    /// Propagates the error of [`Writer::write_ubytes`].
    fn write_string(&mut self, value: &str, fixed_len: Option<usize>) -> Result<(), StreamError> {
        let bytes = value.as_bytes();
        match fixed_len {
            None => {
                self.write_ubytes(bytes)?;
                self.write_u8(0)
            }
            Some(len) => {
                let take = bytes.len().min(len);
                self.write_ubytes(&bytes[..take])?;
                self.fill(0, len - take)
            }
        }
    }

    /// Writes `value` as UTF-16 in the stream byte order. `fixed_len` counts
    /// code units and follows the rules of [`Writer::write_string`].
    ///
    /// # Errors
    ///
    /// Propagates the error of [`Writer::write_ubytes`].
    fn write_wstring(&mut self, value: &str, fixed_len: Option<usize>) -> Result<(), StreamError> {
        let endian = self.endian();
        self.write_wstring_as(value, fixed_len, endian)
    }

    /// # Errors
    ///
    /// Propagates the error of [`Writer::write_ubytes`].
    fn write_wstring_little(
        &mut self,
        value: &str,
        fixed_len: Option<usize>,
    ) -> Result<(), StreamError> {
        self.write_wstring_as(value, fixed_len, Endian::Little)
    }

    /// # Errors
    ///
    /// Propagates the error of [`Writer::write_ubytes`].
    fn write_wstring_big(
        &mut self,
        value: &str,
        fixed_len: Option<usize>,
    ) -> Result<(), StreamError> {
        self.write_wstring_as(value, fixed_len, Endian::Big)
    }

    /// # Errors
    ///
    /// Propagates the error of [`Writer::write_ubytes`].
    fn write_wstring_as(
        &mut self,
        value: &str,
        fixed_len: Option<usize>,
        endian: Endian,
    ) -> Result<(), StreamError> {
        let units: Vec<u16> = value.encode_utf16().collect();
        match fixed_len {
            None => {
                for unit in units {
                    self.write_u16_as(unit, endian)?;
                }
                self.write_u16_as(0, endian)
            }
            Some(len) => {
                let take = units.len().min(len);
                for &unit in &units[..take] {
                    self.write_u16_as(unit, endian)?;
                }
                self.fill(0, (len - take) * 2)
            }
        }
    }

    /// Writes `count` copies of `byte`.
    ///
    /// # Errors
    ///
    /// Propagates the error of [`Writer::write_ubytes`].
    fn fill(&mut self, byte: u8, count: usize) -> Result<(), StreamError> {
        if count == 0 {
            return Ok(());
        }
        self.write_ubytes(&vec![byte; count])
    }

    /// Zero-fills from the cursor up to absolute position `pos`. Does
    /// nothing if the cursor is already there or beyond.
    ///
    /// # Errors
    ///
    /// Propagates the error of [`Writer::write_ubytes`].
    fn write_zero_to(&mut self, pos: u64) -> Result<(), StreamError> {
        let current = self.position();
        if pos <= current {
            return Ok(());
        }
        let gap = usize::try_from(pos - current).map_err(|_| StreamError::OutOfBounds {
            position: i64::try_from(pos).unwrap_or(i64::MAX),
            length: self.length(),
        })?;
        self.fill(0, gap)
    }

    /// Zero-fills to the next multiple of `align`.
    ///
    /// Unlike [`Stream::seek_align`], this writes the padding bytes, so the
    /// stream grows even when the gap lies past the current end.
    ///
    /// # Errors
    ///
    /// Propagates the error of [`Writer::write_ubytes`].
    fn pad_align(&mut self, align: u64) -> Result<(), StreamError> {
        let target = crate::utility::round_up(self.position(), align);
        self.write_zero_to(target)
    }

    /// Moves the cursor to `pos`, zero-filling any gap past the current end.
    ///
    /// # Errors
    ///
    /// Propagates seek and write errors.
    fn seek_fill(&mut self, pos: u64) -> Result<(), StreamError> {
        let length = self.length();
        if pos > length {
            self.seek(i64::try_from(length).unwrap_or(i64::MAX), SeekOrigin::Begin)?;
            return self.write_zero_to(pos);
        }
        self.seek(i64::try_from(pos).unwrap_or(i64::MAX), SeekOrigin::Begin)
    }
}
