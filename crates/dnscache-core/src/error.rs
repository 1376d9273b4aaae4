//! Error types for dnscache operations
//!
//! Lookup misses and record-type mismatches are ordinary outcomes and never
//! show up here. `StoreError` covers the failures a caller may need to act on.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// dnscache error types with enough context to report the failing resource
#[derive(Debug, Clone)]
pub enum StoreError {
    /// I/O operation failed
    Io {
        /// The file path involved, when known
        path: Option<PathBuf>,
        /// The underlying I/O error kind
        kind: std::io::ErrorKind,
        /// Human-readable description
        message: String,
    },

    /// Configuration rejected by `Config::validate`
    InvalidConfig {
        /// Why validation failed
        reason: String,
    },

    /// A flattened key/value file contained a line without a separator
    MalformedLine {
        /// File being read
        path: PathBuf,
        /// 1-based line number
        line_number: usize,
        /// The offending line, without its terminator
        line: String,
    },

    /// The record source could not produce diagnostic text
    SourceFailed {
        /// Command line or other description of the source
        source_name: String,
        /// What went wrong
        reason: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, kind, message } => {
                if let Some(path) = path {
                    write!(f, "I/O error in {}: {} ({})", path.display(), message, kind)
                } else {
                    write!(f, "I/O error: {} ({})", message, kind)
                }
            }

            StoreError::InvalidConfig { reason } => {
                write!(f, "Invalid configuration: {}", reason)
            }

            StoreError::MalformedLine { path, line_number, line } => {
                write!(f, "Malformed line {} in {}: {:?} has no key/value separator",
                       line_number, path.display(), line)
            }

            StoreError::SourceFailed { source_name, reason } => {
                write!(f, "Record source '{}' failed: {}", source_name, reason)
            }
        }
    }
}

impl Error for StoreError {}

/// Convert std::io::Error to StoreError::Io
impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io {
            path: None,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for dnscache operations
pub type StoreResult<T> = Result<T, StoreError>;
