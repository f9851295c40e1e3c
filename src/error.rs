//! Error types for `Athena`
//!
//! One error enum per layer (streams, compression, file formats, DNA
//! records, hierarchy listings), aggregated into [`AthenaError`] which also
//! maps failures onto process exit codes for the CLI.

use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `athena` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Malformed or unsupported file format
    pub const FORMAT_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied, short read)
    pub const IO_ERROR: i32 = 3;

    /// Compression or decompression failure
    pub const COMPRESSION_ERROR: i32 = 4;

    /// DNA record or YAML document error
    pub const DNA_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `Athena` operations.
#[derive(Debug, Error)]
pub enum AthenaError {
    /// Stream read/write/seek error
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Compression codec error
    #[error(transparent)]
    Compression(#[from] CompressionError),

    /// Save-file or container format error
    #[error(transparent)]
    Format(#[from] FormatError),

    /// DNA record or YAML document error
    #[error(transparent)]
    Dna(#[from] DnaError),

    /// Documentation hierarchy listing error
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// Invalid command-line usage detected after parsing
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AthenaError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Stream(StreamError::Io(_)) | Self::Io(_) => ExitCode::IO_ERROR,
            Self::Stream(_) | Self::Format(_) | Self::Hierarchy(_) => ExitCode::FORMAT_ERROR,
            Self::Compression(_) => ExitCode::COMPRESSION_ERROR,
            Self::Dna(_) => ExitCode::DNA_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Stream Errors
// ============================================================================

/// Errors raised by readers and writers.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Seek target lies outside the stream
    #[error("position {position:#X} outside stream bounds (length {length:#X})")]
    OutOfBounds {
        /// Requested absolute position (may be negative)
        position: i64,
        /// Length of the stream at the time of the seek
        length: u64,
    },

    /// Fewer bytes were available than a fixed-size read required
    #[error("unexpected end of stream: wanted {wanted} bytes, got {got}")]
    UnexpectedEof {
        /// Number of bytes requested
        wanted: usize,
        /// Number of bytes actually available
        got: usize,
    },

    /// A fixed-size writer ran out of room
    #[error("write of {len} bytes at {position:#X} exceeds buffer of {capacity} bytes")]
    BufferFull {
        /// Write position
        position: u64,
        /// Number of bytes attempted
        len: usize,
        /// Total buffer capacity
        capacity: usize,
    },

    /// Underlying file I/O failed
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Compression Errors
// ============================================================================

/// Errors raised by the compression codecs.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// zlib/gzip stream could not be inflated or deflated
    #[error("zlib error: {0}")]
    Zlib(String),

    /// Decoded size differs from the size recorded in the header
    #[error("decompressed size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Expected decompressed size
        expected: usize,
        /// Actual decompressed size
        actual: usize,
    },

    /// Compressed input ended before the output was complete
    #[error("compressed data truncated at input offset {offset:#X}")]
    Truncated {
        /// Input offset where data ran out
        offset: usize,
    },

    /// Back-reference points before the start of the output
    #[error("back-reference distance {distance} exceeds output position {position}")]
    InvalidReference {
        /// Output position when the reference was decoded
        position: usize,
        /// Back-reference distance
        distance: usize,
    },

    /// Header magic or type byte is not recognised
    #[error("unrecognised compression header: {0}")]
    InvalidHeader(String),
}

// ============================================================================
// Format Errors
// ============================================================================

/// Errors raised while reading or writing save files and containers.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Magic number does not match
    #[error("not a valid {format} file (magic {found:#010X})")]
    BadMagic {
        /// Human-readable format name
        format: &'static str,
        /// Magic value found in the file
        found: u32,
    },

    /// Version is newer than supported or otherwise unknown
    #[error("unsupported {format} version {version:#010X}")]
    UnsupportedVersion {
        /// Human-readable format name
        format: &'static str,
        /// Version found in the file
        version: u32,
    },

    /// File or block has an unexpected size
    #[error("{what}: expected {expected:#X} bytes, got {actual:#X}")]
    BadSize {
        /// Description of the sized element
        what: &'static str,
        /// Required size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Stored checksum does not match the computed one
    #[error("{what} checksum mismatch: stored {stored:#X}, computed {computed:#X}")]
    ChecksumMismatch {
        /// Description of the checksummed element
        what: &'static str,
        /// Checksum stored in the file
        stored: u64,
        /// Checksum computed from the data
        computed: u64,
    },

    /// Structurally valid but semantically wrong data
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Underlying stream error
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Payload compression error
    #[error(transparent)]
    Compression(#[from] CompressionError),
}

// ============================================================================
// DNA Errors
// ============================================================================

/// Errors raised by DNA records and their YAML documents.
#[derive(Debug, Error)]
pub enum DnaError {
    /// YAML text could not be parsed or emitted
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Document root is not a mapping
    #[error("YAML document root must be a mapping")]
    NotAMapping,

    /// `DNAType` key does not name the expected record type
    #[error("DNA type mismatch: expected '{expected}', found '{found}'")]
    ClassTypeMismatch {
        /// Record type the caller expected
        expected: String,
        /// Record type found in the document (empty if absent)
        found: String,
    },

    /// Named sub-record or sub-vector is absent or has the wrong shape
    #[error("no {kind} named '{name}' in current YAML scope")]
    MissingScope {
        /// "record" or "vector"
        kind: &'static str,
        /// Requested key
        name: String,
    },

    /// `leave` called with no open scope
    #[error("YAML scope stack underflow")]
    ScopeUnderflow,

    /// Count field asks for more items than can be allocated
    #[error("count {count} for field '{field}' is too large")]
    CountTooLarge {
        /// Vector field name
        field: String,
        /// Requested item count
        count: usize,
    },

    /// Base64 payload of a buffer field is malformed
    #[error("invalid base64 in field '{field}': {message}")]
    Base64 {
        /// Field name
        field: String,
        /// Decoder message
        message: String,
    },

    /// Underlying stream error during binary read/write
    #[error(transparent)]
    Stream(#[from] StreamError),
}

// ============================================================================
// Hierarchy Errors
// ============================================================================

/// Errors raised while parsing documentation hierarchy listings.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// Listing is not valid JSON once the `var x =` wrapper is stripped
    #[error("hierarchy listing is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A record does not have the `[label, href, children]` shape
    #[error("malformed hierarchy record at {path}: {message}")]
    Malformed {
        /// Index path of the record, e.g. `[3][0]`
        path: String,
        /// What was wrong
        message: String,
    },
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `Athena` operations.
pub type Result<T> = std::result::Result<T, AthenaError>;

// ============================================================================
// Tests
// ============================================================================
