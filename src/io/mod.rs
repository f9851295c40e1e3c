//! Binary stream I/O.
//!
//! Every reader and writer implements [`Stream`] for seeking and byte-order
//! control. Readers add the [`Reader`] helpers on top of a single
//! `read_ubytes_to_buf` primitive, and writers add the [`Writer`] helpers
//! on top of `write_ubytes`.

pub mod file;
pub mod memory;
pub mod reader;
pub mod stream;
pub mod writer;

pub use file::{DEFAULT_CACHE_SIZE, FileReader, FileWriter, TransactionalFileWriter};
pub use memory::{MemoryReader, MemoryWriter, VectorWriter};
pub use reader::Reader;
pub use stream::{Endian, SeekOrigin, Stream};
pub use writer::Writer;
