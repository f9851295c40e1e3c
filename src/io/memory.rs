//! In-memory readers and writers.

use std::path::Path;

use tracing::trace;

use crate::error::StreamError;
use crate::io::reader::Reader;
use crate::io::stream::{Endian, SeekOrigin, Stream};
use crate::io::writer::Writer;

fn bounds_error(position: i64, length: u64) -> StreamError {
    StreamError::OutOfBounds { position, length }
}

fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

fn to_index(pos: u64) -> usize {
    usize::try_from(pos).unwrap_or(usize::MAX)
}

// ============================================================================
// MemoryReader
// ============================================================================

/// Reads from a byte buffer, borrowed (`&[u8]`) or owned (`Vec<u8>`).
#[derive(Debug, Clone)]
pub struct MemoryReader<B> {
    data: B,
    position: u64,
    endian: Endian,
}

impl<B: AsRef<[u8]>> MemoryReader<B> {
    /// Wraps `data` with the cursor at 0 and native byte order.
    pub fn new(data: B) -> Self {
        Self {
            data,
            position: 0,
            endian: Endian::NATIVE,
        }
    }

    /// Wraps `data` using the given byte order.
    pub fn with_endian(data: B, endian: Endian) -> Self {
        Self {
            data,
            position: 0,
            endian,
        }
    }

    /// Entire backing buffer.
    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Bytes from the cursor to the end.
    pub fn remaining(&self) -> &[u8] {
        &self.data.as_ref()[to_index(self.position)..]
    }

    pub fn into_inner(self) -> B {
        self.data
    }
}

impl MemoryReader<Vec<u8>> {
    /// Loads the whole file at `path` into an owned buffer.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Io`] if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let data = std::fs::read(path.as_ref())?;
        trace!(path = %path.as_ref().display(), len = data.len(), "loaded file into memory");
        Ok(Self::new(data))
    }
}

impl<B: AsRef<[u8]>> Stream for MemoryReader<B> {
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<(), StreamError> {
        let length = self.length();
        let target = origin.resolve(offset, self.position, length);
        if target < 0 || target.unsigned_abs() > length {
            self.position = if target < 0 && origin == SeekOrigin::Current {
                0
            } else {
                length
            };
            return Err(bounds_error(target, length));
        }
        self.position = target.unsigned_abs();
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn length(&self) -> u64 {
        len_u64(self.data.as_ref().len())
    }

    fn endian(&self) -> Endian {
        self.endian
    }

    fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }
}

impl<B: AsRef<[u8]>> Reader for MemoryReader<B> {
    fn read_ubytes_to_buf(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let data = self.data.as_ref();
        let start = to_index(self.position);
        if start >= data.len() {
            if buf.is_empty() {
                return Ok(0);
            }
            return Err(StreamError::UnexpectedEof {
                wanted: buf.len(),
                got: 0,
            });
        }
        let count = buf.len().min(data.len() - start);
        buf[..count].copy_from_slice(&data[start..start + count]);
        self.position += len_u64(count);
        Ok(count)
    }
}

// ============================================================================
// MemoryWriter
// ============================================================================

/// Writes into a caller-provided fixed-size buffer.
#[derive(Debug)]
pub struct MemoryWriter<'a> {
    data: &'a mut [u8],
    position: u64,
    endian: Endian,
}

impl<'a> MemoryWriter<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            position: 0,
            endian: Endian::NATIVE,
        }
    }

    pub fn with_endian(data: &'a mut [u8], endian: Endian) -> Self {
        Self {
            data,
            position: 0,
            endian,
        }
    }

    pub fn data(&self) -> &[u8] {
        self.data
    }
}

impl Stream for MemoryWriter<'_> {
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<(), StreamError> {
        let length = self.length();
        let target = origin.resolve(offset, self.position, length);
        if target < 0 || target.unsigned_abs() > length {
            return Err(bounds_error(target, length));
        }
        self.position = target.unsigned_abs();
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn length(&self) -> u64 {
        len_u64(self.data.len())
    }

    fn endian(&self) -> Endian {
        self.endian
    }

    fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }
}

impl Writer for MemoryWriter<'_> {
    fn write_ubytes(&mut self, data: &[u8]) -> Result<(), StreamError> {
        let start = to_index(self.position);
        let end = start.checked_add(data.len());
        match end {
            Some(end) if end <= self.data.len() => {
                self.data[start..end].copy_from_slice(data);
                self.position += len_u64(data.len());
                Ok(())
            }
            _ => Err(StreamError::BufferFull {
                position: self.position,
                len: data.len(),
                capacity: self.data.len(),
            }),
        }
    }
}

// ============================================================================
// VectorWriter
// ============================================================================

/// Growable in-memory writer.
///
/// Seeking past the end (from `Begin` or `Current`) grows the buffer with
/// zeros; writes overwrite existing bytes and then append.
#[derive(Debug, Clone, Default)]
pub struct VectorWriter {
    data: Vec<u8>,
    position: u64,
    endian: Endian,
}

impl VectorWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_endian(endian: Endian) -> Self {
        Self {
            endian,
            ..Self::default()
        }
    }

    /// Starts from existing contents with the cursor at 0.
    #[must_use]
    pub fn from_vec(data: Vec<u8>, endian: Endian) -> Self {
        Self {
            data,
            position: 0,
            endian,
        }
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Writes the buffer to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Io`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StreamError> {
        std::fs::write(path.as_ref(), &self.data)?;
        trace!(path = %path.as_ref().display(), len = self.data.len(), "saved buffer");
        Ok(())
    }
}

impl Stream for VectorWriter {
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<(), StreamError> {
        let length = self.length();
        let target = origin.resolve(offset, self.position, length);
        if target < 0 {
            return Err(bounds_error(target, length));
        }
        let target = target.unsigned_abs();
        if target > length {
            if origin == SeekOrigin::End {
                return Err(bounds_error(i64::try_from(target).unwrap_or(i64::MAX), length));
            }
            self.data.resize(to_index(target), 0);
        }
        self.position = target;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn length(&self) -> u64 {
        len_u64(self.data.len())
    }

    fn endian(&self) -> Endian {
        self.endian
    }

    fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }
}

impl Writer for VectorWriter {
    fn write_ubytes(&mut self, data: &[u8]) -> Result<(), StreamError> {
        let start = to_index(self.position);
        let overlap = self.data.len().saturating_sub(start).min(data.len());
        self.data[start..start + overlap].copy_from_slice(&data[..overlap]);
        self.data.extend_from_slice(&data[overlap..]);
        self.position += len_u64(data.len());
        Ok(())
    }
}
