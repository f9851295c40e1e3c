//! Shared stream vocabulary: byte order, seek origins and the [`Stream`] trait
//! implemented by every reader and writer.

use serde::Serialize;

use crate::error::StreamError;
use crate::utility::round_up;

/// Byte order used when encoding multi-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl Endian {
    /// Byte order of the host.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;
    /// Byte order of the host.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;

    /// Returns the opposite byte order.
    #[must_use]
    pub const fn swapped(self) -> Self {
        match self {
            Self::Little => Self::Big,
            Self::Big => Self::Little,
        }
    }
}

impl Default for Endian {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// Reference point for [`Stream::seek`].
///
/// `End` offsets count backwards: seeking `4` from `End` lands four bytes
/// before the end of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekOrigin {
    /// Absolute position from the start.
    #[default]
    Begin,
    /// Relative to the current position.
    Current,
    /// Backwards from the end.
    End,
}

impl SeekOrigin {
    /// Resolves `offset` against this origin into an absolute (possibly
    /// negative) target position.
    #[must_use]
    pub fn resolve(self, offset: i64, position: u64, length: u64) -> i64 {
        let as_i64 = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
        match self {
            Self::Begin => offset,
            Self::Current => as_i64(position).saturating_add(offset),
            Self::End => as_i64(length).saturating_sub(offset),
        }
    }
}

/// Operations common to readers and writers.
pub trait Stream {
    /// Moves the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::OutOfBounds`] if the implementation cannot
    /// reach the requested position.
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<(), StreamError>;

    /// Current cursor position.
    fn position(&self) -> u64;

    /// Total stream length in bytes.
    fn length(&self) -> u64;

    /// Byte order applied by the unsuffixed read/write helpers.
    fn endian(&self) -> Endian;

    /// Changes the byte order applied by the unsuffixed helpers.
    fn set_endian(&mut self, endian: Endian);

    /// Whether the cursor sits at or past the end.
    fn at_end(&self) -> bool {
        self.position() >= self.length()
    }

    fn is_big_endian(&self) -> bool {
        self.endian() == Endian::Big
    }

    fn is_little_endian(&self) -> bool {
        self.endian() == Endian::Little
    }

    /// Advances the cursor to the next multiple of `align`.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying [`Stream::seek`].
    fn seek_align(&mut self, align: u64) -> Result<(), StreamError> {
        let target = round_up(self.position(), align);
        let target = i64::try_from(target).map_err(|_| StreamError::OutOfBounds {
            position: i64::MAX,
            length: self.length(),
        })?;
        self.seek(target, SeekOrigin::Begin)
    }

    /// # Errors
    ///
    /// See [`Stream::seek_align`].
    fn seek_align4(&mut self) -> Result<(), StreamError> {
        self.seek_align(4)
    }

    /// # Errors
    ///
    /// See [`Stream::seek_align`].
    fn seek_align16(&mut self) -> Result<(), StreamError> {
        self.seek_align(16)
    }

    /// # Errors
    ///
    /// See [`Stream::seek_align`].
    fn seek_align32(&mut self) -> Result<(), StreamError> {
        self.seek_align(32)
    }

    /// # Errors
    ///
    /// See [`Stream::seek_align`].
    fn seek_align64(&mut self) -> Result<(), StreamError> {
        self.seek_align(64)
    }
}
