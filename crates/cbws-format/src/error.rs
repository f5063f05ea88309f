//! Error types for CBWS parsing and patching.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for CBWS operations.
#[derive(Error, Debug)]
pub enum CbwsError {
    /// The script file does not exist.
    #[error("file \"{}\" not found", path.display())]
    FileNotFound { path: PathBuf },

    /// File is too short to contain required data.
    #[error("file too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// A hex string could not be decoded to bytes.
    #[error("invalid hex string: {reason}")]
    InvalidHex { reason: String },

    /// An index was out of range for the structure it addresses.
    #[error("invalid {kind} index: {index} (count: {count})")]
    InvalidIndex {
        kind: &'static str,
        index: usize,
        count: usize,
    },

    /// A byte pattern expected by a patch operation was not found.
    #[error("byte pattern not found (occurrence {occurrence})")]
    PatternNotFound { occurrence: usize },

    /// A mutation precondition did not hold; the document is unchanged.
    #[error("unexpected byte sequence while modifying {context}")]
    UnexpectedByteSequence { context: &'static str },

    /// A reaction name has no known code.
    #[error("unknown hit reaction: {name}")]
    UnknownReaction { name: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CbwsError {
    /// Creates a new TooShort error.
    pub fn too_short(expected: usize, actual: usize) -> Self {
        Self::TooShort { expected, actual }
    }

    /// Creates a new InvalidIndex error.
    pub fn invalid_index(kind: &'static str, index: usize, count: usize) -> Self {
        Self::InvalidIndex { kind, index, count }
    }
}
