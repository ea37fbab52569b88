//! Whole-history statistics.

use serde::{Deserialize, Serialize};

use crate::error::LogError;
use crate::history::{Collector, RunningTotals, fold_history};
use crate::record::Record;

/// Count, averages and min/max envelopes over every valid record.
///
/// Recomputed on every query; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub count: u64,
    #[serde(rename = "avg_dl")]
    pub avg_download: f64,
    #[serde(rename = "avg_ul")]
    pub avg_upload: f64,
    pub avg_ping: f64,
    #[serde(rename = "min_dl")]
    pub min_download: f64,
    #[serde(rename = "max_dl")]
    pub max_download: f64,
    #[serde(rename = "min_ul")]
    pub min_upload: f64,
    #[serde(rename = "max_ul")]
    pub max_upload: f64,
}

/// Running min/max. Minimums start at +inf and maximums at 0.
struct Envelope {
    min_download: f64,
    max_download: f64,
    min_upload: f64,
    max_upload: f64,
}

impl Envelope {
    fn new() -> Self {
        Self {
            min_download: f64::INFINITY,
            max_download: 0.0,
            min_upload: f64::INFINITY,
            max_upload: 0.0,
        }
    }
}

impl Collector for Envelope {
    type Output = StatsSnapshot;

    fn observe(&mut self, record: &Record, _totals: &RunningTotals) {
        self.min_download = self.min_download.min(record.download_mbps);
        self.max_download = self.max_download.max(record.download_mbps);
        self.min_upload = self.min_upload.min(record.upload_mbps);
        self.max_upload = self.max_upload.max(record.upload_mbps);
    }

    fn finish(self, totals: &RunningTotals) -> Option<StatsSnapshot> {
        if totals.count == 0 {
            return None;
        }
        Some(StatsSnapshot {
            count: totals.count,
            avg_download: totals.avg_download(),
            avg_upload: totals.avg_upload(),
            avg_ping: totals.avg_ping(),
            min_download: self.min_download,
            max_download: self.max_download,
            min_upload: self.min_upload,
            max_upload: self.max_upload,
        })
    }
}

/// Compute stats over a full scan. `None` means there were no valid records.
pub fn compute<I>(records: I) -> Result<Option<StatsSnapshot>, LogError>
where
    I: IntoIterator<Item = Result<Record, LogError>>,
{
    fold_history(records, |_| true, Envelope::new())
}
