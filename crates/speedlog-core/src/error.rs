//! Error types for the measurement log.
//!
//! Two kinds of failure exist:
//! [`LogError`] is an environment problem (permissions, disk) and is always
//! returned to the caller, while [`DecodeError`] describes a single bad line
//! and never leaves a reader; malformed lines are skipped.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure while touching the backing file.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LogError {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        LogError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// The path of the log file involved in the failure.
    pub fn path(&self) -> &Path {
        match self {
            LogError::Io { path, .. } => path,
        }
    }
}

/// Why one line could not be decoded into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected at least 4 fields, found {0}")]
    TooFewFields(usize),

    #[error("unparseable timestamp {0:?}")]
    Timestamp(String),

    #[error("unparseable {field} value {value:?}")]
    Number { field: &'static str, value: String },
}
