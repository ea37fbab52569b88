//! Explicit configuration for a log store.
//!
//! Nothing in the engine reads a global path; every [`LogStore`](crate::LogStore)
//! is built from a [`LogConfig`], so independent stores can coexist in one
//! process.

use std::path::PathBuf;

/// Default log file name, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "speed_log.txt";

/// Default backward read stride used for tail access.
pub const DEFAULT_TAIL_STRIDE: usize = 4096;

/// Default trailing window for the windowed series, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Configuration for a [`LogStore`](crate::LogStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Path of the backing file. Created on first append.
    pub path: PathBuf,
    /// Bytes read per backward step when looking for the last line.
    pub tail_stride: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_FILE),
            tail_stride: DEFAULT_TAIL_STRIDE,
        }
    }
}

impl LogConfig {
    /// Config for `path` with default tuning.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}
