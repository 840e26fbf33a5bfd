//! Error types for the synthdef container codec.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while encoding synthdefs to bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A name exceeds the one-byte length prefix.
    #[error("name '{name}' is {len} bytes long (limit 255)")]
    NameTooLong {
        /// The offending name.
        name: String,
        /// Its UTF-8 byte length.
        len: usize,
    },

    /// A table exceeds the width of its length prefix.
    #[error("{table} table has {len} entries (exceeds the container's length prefix)")]
    TableTooLarge {
        /// Which table overflowed.
        table: &'static str,
        /// Its entry count.
        len: usize,
    },
}

/// Errors raised while decoding a synthdef container.
///
/// Decoding never silently drops data: any structural defect in the buffer
/// fails at the point of detection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended before the structure did.
    #[error("buffer too short")]
    Truncated,

    /// The buffer does not start with the container magic.
    #[error("invalid magic bytes")]
    BadMagic,

    /// The container version is not the one this codec speaks.
    #[error("unsupported container version: {0}")]
    UnsupportedVersion(i32),

    /// A length prefix was negative.
    #[error("negative length for {table} table")]
    NegativeCount {
        /// Which table carried the bad prefix.
        table: &'static str,
    },

    /// A name was not valid UTF-8.
    #[error("invalid utf-8 in a name")]
    InvalidUtf8,

    /// A rate tag outside the engine's rate table.
    #[error("invalid rate tag: {0}")]
    InvalidRate(i8),

    /// A node names a unit generator the catalog does not know. Without the
    /// catalog the node's semantics cannot be trusted, so this is an error
    /// rather than a skip.
    #[error("unknown unit generator: {0}")]
    UnknownUgen(String),

    /// An input reference field held a value outside the encoding.
    #[error("invalid input reference: {0}")]
    InvalidInputReference(i32),

    /// The decoded synthdef violates a structural invariant (forward or
    /// out-of-range references).
    #[error("synthdef '{synthdef}': {detail}")]
    Structure {
        /// Name of the offending synthdef.
        synthdef: String,
        /// Description of the violated invariant.
        detail: String,
    },

    /// Variant records are not modeled; a nonzero count is rejected rather
    /// than skipped.
    #[error("variant records are not supported ({0} present)")]
    UnsupportedVariants(i16),

    /// Bytes remained after the last synthdef.
    #[error("{0} trailing bytes after the last synthdef")]
    TrailingBytes(usize),

    /// A single-synthdef decode found a different count.
    #[error("expected a single synthdef, found {0}")]
    MultipleSynthDefs(usize),
}

/// Errors raised by the `.scsyndef` file helpers.
#[derive(Debug, Error)]
pub enum FileError {
    /// Failed to read a file.
    #[error("failed to read file '{path}': {source}")]
    Read {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write file '{path}': {source}")]
    Write {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The synthdefs could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The file contents could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl FileError {
    /// Creates a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FileError::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FileError::Write {
            path: path.into(),
            source,
        }
    }
}
