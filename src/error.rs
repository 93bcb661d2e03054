//! Error type shared by the buffer engine and the file record.

use thiserror::Error;

/// A failed buffer or file operation.
///
/// Every fallible operation in the core reports its failure as a value;
/// nothing here aborts the process. The binary decides user-facing messaging
/// and exit status.
#[derive(Debug, Error)]
pub enum EditError {
    /// Position outside the valid range for the operation.
    #[error("position {position} is out of range for a buffer of {len} lines")]
    OutOfRange { position: usize, len: usize },

    /// No line matched the pattern.
    #[error("no line matches pattern {pattern:?}")]
    NotFound { pattern: String },

    /// Line operations requested on a binary file.
    #[error("file is binary; line operations apply to text files only")]
    NotText,

    /// Filesystem failure, passed through unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
