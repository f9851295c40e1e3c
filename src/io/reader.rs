//! The [`Reader`] trait.
//!
//! Implementors supply [`Reader::read_ubytes_to_buf`]; every typed read is
//! layered on top of it. Numeric reads come in four flavours: stream byte
//! order (`read_u32`), forced little (`read_u32_little`), forced big
//! (`read_u32_big`) and caller-chosen (`read_u32_as`).

use crate::error::StreamError;
use crate::io::stream::{Endian, SeekOrigin, Stream};

/// Most items [`Reader::enumerate`] reserves room for before reading.
const MAX_ENUMERATE_PREALLOC: usize = 4096;

macro_rules! endian_reads {
    ($( $ty:ty => $read:ident, $little:ident, $big:ident, $with:ident; )*) => {
        $(
            #[doc = concat!("Reads a `", stringify!($ty), "` in the stream byte order.")]
            ///
            /// # Errors
            ///
            /// Returns [`StreamError::UnexpectedEof`] on a short read.
            fn $read(&mut self) -> Result<$ty, StreamError> {
                let endian = self.endian();
                self.$with(endian)
            }

            #[doc = concat!("Reads a little-endian `", stringify!($ty), "`.")]
            ///
            /// # Errors
            ///
            /// Returns [`StreamError::UnexpectedEof`] on a short read.
            fn $little(&mut self) -> Result<$ty, StreamError> {
                self.$with(Endian::Little)
            }

            #[doc = concat!("Reads a big-endian `", stringify!($ty), "`.")]
            ///
            /// # Errors
            ///
            /// Returns [`StreamError::UnexpectedEof`] on a short read.
            fn $big(&mut self) -> Result<$ty, StreamError> {
                self.$with(Endian::Big)
            }

            #[doc = concat!("Reads a `", stringify!($ty), "` in the given byte order.")]
            ///
            /// # Errors
            ///
            /// Returns [`StreamError::UnexpectedEof`] on a short read.
            fn $with(&mut self, endian: Endian) -> Result<$ty, StreamError> {
                let mut buf = [0u8; size_of::<$ty>()];
                self.read_exact_into(&mut buf)?;
                Ok(match endian {
                    Endian::Little => <$ty>::from_le_bytes(buf),
                    Endian::Big => <$ty>::from_be_bytes(buf),
                })
            }
        )*
    };
}

macro_rules! vector_reads {
    ($( [$elem:ty; $n:literal] via $elem_with:ident => $read:ident, $little:ident, $big:ident, $with:ident; )*) => {
        $(
            #[doc = concat!("Reads `[", stringify!($elem), "; ", stringify!($n), "]` in the stream byte order.")]
            ///
            /// # Errors
            ///
            /// Returns [`StreamError::UnexpectedEof`] on a short read.
            fn $read(&mut self) -> Result<[$elem; $n], StreamError> {
                let endian = self.endian();
                self.$with(endian)
            }

            /// # Errors
            ///
            /// Returns [`StreamError::UnexpectedEof`] on a short read.
            fn $little(&mut self) -> Result<[$elem; $n], StreamError> {
                self.$with(Endian::Little)
            }

            /// # Errors
            ///
            /// Returns [`StreamError::UnexpectedEof`] on a short read.
            fn $big(&mut self) -> Result<[$elem; $n], StreamError> {
                self.$with(Endian::Big)
            }

            /// # Errors
            ///
            /// Returns [`StreamError::UnexpectedEof`] on a short read.
            fn $with(&mut self, endian: Endian) -> Result<[$elem; $n], StreamError> {
                let mut out = [0.0; $n];
                for component in &mut out {
                    *component = self.$elem_with(endian)?;
                }
                Ok(out)
            }
        )*
    };
}

/// Byte-oriented input stream.
pub trait Reader: Stream {
    /// Copies up to `buf.len()` bytes into `buf`, returning how many were
    /// copied. A count smaller than requested means the end was reached.
    ///
    /// # Errors
    ///
    /// Implementations fail when the cursor is already at the end or the
    /// backing storage reports an I/O error.
    fn read_ubytes_to_buf(&mut self, buf: &mut [u8]) -> Result<usize, StreamError>;

    /// Fills `buf` completely.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::UnexpectedEof`] if fewer bytes were available.
    fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<(), StreamError> {
        if buf.is_empty() {
            return Ok(());
        }
        let got = self.read_ubytes_to_buf(buf)?;
        if got < buf.len() {
            return Err(StreamError::UnexpectedEof {
                wanted: buf.len(),
                got,
            });
        }
        Ok(())
    }

    /// Reads exactly `len` bytes into a new vector.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::UnexpectedEof`] on a short read.
    fn read_ubytes(&mut self, len: usize) -> Result<Vec<u8>, StreamError> {
        let mut buf = vec![0u8; len];
        self.read_exact_into(&mut buf)?;
        Ok(buf)
    }

    /// # Errors
    ///
    /// Returns [`StreamError::UnexpectedEof`] at end of stream.
    fn read_u8(&mut self) -> Result<u8, StreamError> {
        let mut buf = [0u8; 1];
        self.read_exact_into(&mut buf)?;
        Ok(buf[0])
    }

    /// # Errors
    ///
    /// Returns [`StreamError::UnexpectedEof`] at end of stream.
    fn read_i8(&mut self) -> Result<i8, StreamError> {
        self.read_u8().map(|b| i8::from_ne_bytes([b]))
    }

    /// Reads one byte; any non-zero value is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::UnexpectedEof`] at end of stream.
    fn read_bool(&mut self) -> Result<bool, StreamError> {
        self.read_u8().map(|b| b != 0)
    }

    endian_reads! {
        i16 => read_i16, read_i16_little, read_i16_big, read_i16_as;
        u16 => read_u16, read_u16_little, read_u16_big, read_u16_as;
        i32 => read_i32, read_i32_little, read_i32_big, read_i32_as;
        u32 => read_u32, read_u32_little, read_u32_big, read_u32_as;
        i64 => read_i64, read_i64_little, read_i64_big, read_i64_as;
        u64 => read_u64, read_u64_little, read_u64_big, read_u64_as;
        f32 => read_f32, read_f32_little, read_f32_big, read_f32_as;
        f64 => read_f64, read_f64_little, read_f64_big, read_f64_as;
    }

    vector_reads! {
        [f32; 2] via read_f32_as => read_vec2f, read_vec2f_little, read_vec2f_big, read_vec2f_as;
        [f32; 3] via read_f32_as => read_vec3f, read_vec3f_little, read_vec3f_big, read_vec3f_as;
        [f32; 4] via read_f32_as => read_vec4f, read_vec4f_little, read_vec4f_big, read_vec4f_as;
        [f64; 2] via read_f64_as => read_vec2d, read_vec2d_little, read_vec2d_big, read_vec2d_as;
        [f64; 3] via read_f64_as => read_vec3d, read_vec3d_little, read_vec3d_big, read_vec3d_as;
        [f64; 4] via read_f64_as => read_vec4d, read_vec4d_little, read_vec4d_big, read_vec4d_as;
    }

    /// Reads a NUL-terminated 8-bit string.
    ///
    /// With `fixed_len`, at most that many bytes are consumed and the cursor
    /// always ends up at the end of the fixed field. Without it, reading
    /// stops at the terminator or the end of the stream. Invalid UTF-8 is
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::OutOfBounds`] if the fixed field extends past
    /// the end.
    fn read_string(&mut self, fixed_len: Option<usize>) -> Result<String, StreamError> {
        let mut bytes = Vec::new();
        let mut consumed = 0usize;
        while fixed_len.is_none_or(|max| consumed < max) && !self.at_end() {
            let byte = self.read_u8()?;
            consumed += 1;
            if byte == 0 {
                break;
            }
            bytes.push(byte);
        }
        if let Some(max) = fixed_len {
            skip_remaining(self, max, consumed, 1)?;
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads a zero-terminated UTF-16 string in the stream byte order.
    /// `fixed_len` counts code units.
    ///
    /// # Errors
    ///
    /// See [`Reader::read_wstring_as`].
    fn read_wstring(&mut self, fixed_len: Option<usize>) -> Result<String, StreamError> {
        let endian = self.endian();
        self.read_wstring_as(fixed_len, endian)
    }

    /// # Errors
    ///
    /// See [`Reader::read_wstring_as`].
    fn read_wstring_little(&mut self, fixed_len: Option<usize>) -> Result<String, StreamError> {
        self.read_wstring_as(fixed_len, Endian::Little)
    }

    /// # Errors
    ///
    /// See [`Reader::read_wstring_as`].
    fn read_wstring_big(&mut self, fixed_len: Option<usize>) -> Result<String, StreamError> {
        self.read_wstring_as(fixed_len, Endian::Big)
    }

    /// Reads a zero-terminated UTF-16 string in the given byte order.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::UnexpectedEof`] if a code unit is cut short,
    /// or [`StreamError::OutOfBounds`] if the fixed field extends past the
    /// end.
    fn read_wstring_as(
        &mut self,
        fixed_len: Option<usize>,
        endian: Endian,
    ) -> Result<String, StreamError> {
        let mut units = Vec::new();
        let mut consumed = 0usize;
        while fixed_len.is_none_or(|max| consumed < max) && !self.at_end() {
            let unit = self.read_u16_as(endian)?;
            consumed += 1;
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        if let Some(max) = fixed_len {
            skip_remaining(self, max, consumed, 2)?;
        }
        Ok(String::from_utf16_lossy(&units))
    }

    /// Calls `read` `count` times and collects the results. `count` may come
    /// straight from the stream, so only a bounded amount is reserved up
    /// front.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error produced by `read`.
    fn enumerate<T, E, F>(&mut self, count: usize, mut read: F) -> Result<Vec<T>, E>
    where
        Self: Sized,
        F: FnMut(&mut Self) -> Result<T, E>,
    {
        let mut items = Vec::with_capacity(count.min(MAX_ENUMERATE_PREALLOC));
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }
}

fn skip_remaining<R: Reader + ?Sized>(
    reader: &mut R,
    max: usize,
    consumed: usize,
    unit: usize,
) -> Result<(), StreamError> {
    if consumed < max {
        let skip = i64::try_from((max - consumed) * unit).unwrap_or(i64::MAX);
        reader.seek(skip, SeekOrigin::Current)?;
    }
    Ok(())
}
