//! # speedlog-core
//!
//! **A durable history of your connection speed.**
//!
//! `speedlog-core` is the measurement log and analytics engine behind
//! speedlog. Completed speed measurements are appended to a plain text file,
//! one comma-delimited line each, and every query is answered by re-reading
//! that file: there is no cache and no state between calls.
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::Local;
//! use speedlog_core::{LogStore, Measurement};
//!
//! let store = LogStore::new("speed_log.txt");
//! store.log_measurement(Measurement {
//!     download_mbps: 412.7,
//!     upload_mbps: 38.1,
//!     ping_ms: 9.4,
//!     server_id: "21541".to_string(),
//!     server_name: "Telia (Oslo)".to_string(),
//! })?;
//!
//! if let Some(stats) = store.stats()? {
//!     println!("{} runs, {:.1} Mbps down on average", stats.count, stats.avg_download);
//! }
//! let last_month = store.series(30, Local::now().naive_local())?;
//! let latest = store.latest()?;
//! # let _ = (last_month, latest);
//! # Ok::<(), speedlog_core::LogError>(())
//! ```
//!
//! ## Architecture
//!
//! Record codec → Log store (append / scan / tail) → History fold → Stats, Series
//!
//! - **Malformed lines** are skipped by every reader and never surface as errors.
//! - **A missing log** is not an error: every query answers `None`.
//! - **I/O failures** are returned as [`LogError`].
//! - [`LogStore::latest`] reads backward from the end of the file, so it costs
//!   the same on a log of ten lines or ten million.

pub mod config;
pub mod error;
pub mod history;
pub mod latest;
pub mod record;
pub mod series;
pub mod stats;
pub mod store;

pub use config::{DEFAULT_LOG_FILE, DEFAULT_TAIL_STRIDE, DEFAULT_WINDOW_DAYS, LogConfig};
pub use error::{DecodeError, LogError};
pub use history::{Collector, RunningTotals, fold_history};
pub use latest::latest;
pub use record::{DELIMITER, Measurement, Record, UNKNOWN_SERVER_ID, parse_timestamp};
pub use series::{SeriesPoint, WindowedSeries, window_days};
pub use stats::StatsSnapshot;
pub use store::{LogStore, Scan};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
