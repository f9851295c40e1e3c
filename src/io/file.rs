//! File-backed readers and writers.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StreamError;
use crate::io::memory::VectorWriter;
use crate::io::reader::Reader;
use crate::io::stream::{Endian, SeekOrigin, Stream};
use crate::io::writer::Writer;

/// Default block size of the [`FileReader`] read cache.
pub const DEFAULT_CACHE_SIZE: usize = 32 * 1024;

fn checked_target(origin: SeekOrigin, offset: i64, position: u64, length: u64) -> Result<u64, StreamError> {
    let target = origin.resolve(offset, position, length);
    if target < 0 || target.unsigned_abs() > length {
        return Err(StreamError::OutOfBounds {
            position: target,
            length,
        });
    }
    Ok(target.unsigned_abs())
}

// ============================================================================
// FileReader
// ============================================================================

/// Reads a file through an optional block cache.
#[derive(Debug)]
pub struct FileReader {
    path: PathBuf,
    file: File,
    length: u64,
    position: u64,
    endian: Endian,
    cache_size: usize,
    cache: Vec<u8>,
    cache_start: Option<u64>,
}

impl FileReader {
    /// Opens `path` with the default cache size.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let length = file.metadata()?.len();
        debug!(path = %path.display(), length, "opened file for reading");
        Ok(Self {
            path,
            file,
            length,
            position: 0,
            endian: Endian::NATIVE,
            cache_size: DEFAULT_CACHE_SIZE,
            cache: Vec::new(),
            cache_start: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets the cache block size; `0` disables caching.
    pub fn set_cache_size(&mut self, size: usize) {
        self.cache_size = size;
        self.cache.clear();
        self.cache_start = None;
    }

    #[must_use]
    pub const fn cache_size(&self) -> usize {
        self.cache_size
    }

    fn fill_cache(&mut self, block_start: u64) -> Result<(), StreamError> {
        self.file.seek(SeekFrom::Start(block_start))?;
        let available = usize::try_from(self.length - block_start).unwrap_or(usize::MAX);
        self.cache.resize(self.cache_size.min(available), 0);
        self.file.read_exact(&mut self.cache)?;
        self.cache_start = Some(block_start);
        Ok(())
    }

    fn read_uncached(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        self.file.seek(SeekFrom::Start(self.position))?;
        let mut total = 0;
        while total < buf.len() {
            let n = self.file.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }
}

impl Stream for FileReader {
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<(), StreamError> {
        self.position = checked_target(origin, offset, self.position, self.length)?;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn length(&self) -> u64 {
        self.length
    }

    fn endian(&self) -> Endian {
        self.endian
    }

    fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }
}

impl Reader for FileReader {
    fn read_ubytes_to_buf(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.position >= self.length {
            return Err(StreamError::UnexpectedEof {
                wanted: buf.len(),
                got: 0,
            });
        }

        if self.cache_size == 0 {
            let count = self.read_uncached(buf)?;
            self.position += count as u64;
            return Ok(count);
        }

        let block = self.cache_size as u64;
        let mut copied = 0;
        while copied < buf.len() && self.position < self.length {
            let block_start = self.position / block * block;
            if self.cache_start != Some(block_start) {
                self.fill_cache(block_start)?;
            }
            let within = usize::try_from(self.position - block_start).unwrap_or(usize::MAX);
            let n = (buf.len() - copied).min(self.cache.len() - within);
            buf[copied..copied + n].copy_from_slice(&self.cache[within..within + n]);
            copied += n;
            self.position += n as u64;
        }
        Ok(copied)
    }
}

// ============================================================================
// FileWriter
// ============================================================================

/// Writes directly to a file.
#[derive(Debug)]
pub struct FileWriter {
    file: File,
    position: u64,
    length: u64,
    endian: Endian,
}

impl FileWriter {
    /// Opens `path` for writing.
    ///
    /// With `overwrite` the file is truncated; otherwise an existing file is
    /// opened for in-place update (and created if missing).
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Io`] if the file cannot be opened.
    pub fn create(path: impl AsRef<Path>, overwrite: bool) -> Result<Self, StreamError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(overwrite)
            .open(path.as_ref())?;
        let length = file.metadata()?.len();
        debug!(path = %path.as_ref().display(), overwrite, length, "opened file for writing");
        Ok(Self {
            file,
            position: 0,
            length,
            endian: Endian::NATIVE,
        })
    }

    /// Flushes buffered OS writes.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Io`] if the flush fails.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        self.file.flush()?;
        Ok(())
    }
}

impl Stream for FileWriter {
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<(), StreamError> {
        let target = origin.resolve(offset, self.position, self.length);
        if target < 0 {
            return Err(StreamError::OutOfBounds {
                position: target,
                length: self.length,
            });
        }
        self.position = target.unsigned_abs();
        self.file.seek(SeekFrom::Start(self.position))?;
        if self.position > self.length {
            self.file.set_len(self.position)?;
            self.length = self.position;
        }
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn length(&self) -> u64 {
        self.length
    }

    fn endian(&self) -> Endian {
        self.endian
    }

    fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }
}

impl Writer for FileWriter {
    fn write_ubytes(&mut self, data: &[u8]) -> Result<(), StreamError> {
        self.file.write_all(data)?;
        self.position += data.len() as u64;
        self.length = self.length.max(self.position);
        Ok(())
    }
}

// ============================================================================
// TransactionalFileWriter
// ============================================================================

/// Buffers all writes in memory and writes the file in one go on
/// [`commit`](Self::commit).
///
/// Dropping an uncommitted writer attempts the write and logs a warning on
/// failure.
#[derive(Debug)]
pub struct TransactionalFileWriter {
    path: PathBuf,
    buffer: VectorWriter,
    committed: bool,
}

impl TransactionalFileWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            buffer: VectorWriter::new(),
            committed: false,
        }
    }

    /// Writes the buffered bytes to disk.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Io`] if the file cannot be written.
    pub fn commit(mut self) -> Result<(), StreamError> {
        self.committed = true;
        self.buffer.save(&self.path)
    }
}

impl Stream for TransactionalFileWriter {
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<(), StreamError> {
        self.buffer.seek(offset, origin)
    }

    fn position(&self) -> u64 {
        self.buffer.position()
    }

    fn length(&self) -> u64 {
        self.buffer.length()
    }

    fn endian(&self) -> Endian {
        self.buffer.endian()
    }

    fn set_endian(&mut self, endian: Endian) {
        self.buffer.set_endian(endian);
    }
}

impl Writer for TransactionalFileWriter {
    fn write_ubytes(&mut self, data: &[u8]) -> Result<(), StreamError> {
        self.buffer.write_ubytes(data)
    }
}

impl Drop for TransactionalFileWriter {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = self.buffer.save(&self.path) {
                warn!(path = %self.path.display(), error = %e, "failed to flush transactional writer");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_and_uncached_reads_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        std::fs::write(&path, &data).unwrap();

        let mut cached = FileReader::open(&path).unwrap();
        cached.set_cache_size(64);
        let mut plain = FileReader::open(&path).unwrap();
        plain.set_cache_size(0);

        cached.seek(100, SeekOrigin::Begin).unwrap();
        plain.seek(100, SeekOrigin::Begin).unwrap();
        assert_eq!(cached.read_ubytes(300).unwrap(), plain.read_ubytes(300).unwrap());
        assert_eq!(cached.position(), 400);

        cached.seek(4, SeekOrigin::End).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(cached.read_ubytes_to_buf(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &data[996..]);
    }

    #[test]
    fn reader_rejects_seek_past_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.bin");
        std::fs::write(&path, [1, 2, 3]).unwrap();
        let mut r = FileReader::open(&path).unwrap();
        assert!(r.seek(4, SeekOrigin::Begin).is_err());
    }

    #[test]
    fn writer_update_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patch.bin");
        std::fs::write(&path, [0u8; 6]).unwrap();

        let mut w = FileWriter::create(&path, false).unwrap();
        w.set_endian(Endian::Big);
        w.seek(2, SeekOrigin::Begin).unwrap();
        w.write_u16(0xBEEF).unwrap();
        w.flush().unwrap();
        drop(w);

        assert_eq!(std::fs::read(&path).unwrap(), vec![0, 0, 0xBE, 0xEF, 0, 0]);
    }

    #[test]
    fn transactional_writer_commits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.bin");
        let mut w = TransactionalFileWriter::new(&path);
        w.write_u32_little(1).unwrap();
        assert!(!path.exists());
        w.commit().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 0, 0, 0]);
    }

    #[test]
    fn transactional_writer_flushes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drop.bin");
        {
            let mut w = TransactionalFileWriter::new(&path);
            w.write_u8(7).unwrap();
        }
        assert_eq!(std::fs::read(&path).unwrap(), vec![7]);
    }
}
