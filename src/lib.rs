//! `Athena` - binary stream I/O and game save-file toolkit
//!
//! Endian-aware readers and writers, zlib/Yaz0/LZ77 codecs, checksums,
//! Zelda save and container formats, declarative DNA records with YAML
//! round-tripping, and documentation hierarchy listings.

pub mod checksums;
pub mod cli;
pub mod compression;
pub mod dna;
pub mod doctree;
pub mod error;
pub mod formats;
pub mod io;
pub mod observability;
pub mod utility;
