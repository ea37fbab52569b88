//! Windowed series with a cumulative-average overlay.
//!
//! Only records inside the trailing window are emitted, but the cumulative
//! averages attached to them are taken over the whole history up to and
//! including each record. A record just outside the window therefore still
//! moves the average shown for the first point inside it.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::LogError;
use crate::history::{Collector, RunningTotals, fold_history};
use crate::record::Record;

/// Parallel columns, one row per record inside the window, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowedSeries {
    pub timestamps: Vec<NaiveDateTime>,
    pub downloads: Vec<f64>,
    pub uploads: Vec<f64>,
    #[serde(rename = "avg_downloads")]
    pub cumulative_avg_downloads: Vec<f64>,
    #[serde(rename = "avg_uploads")]
    pub cumulative_avg_uploads: Vec<f64>,
}

/// One row of a [`WindowedSeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub download: f64,
    pub upload: f64,
    pub cumulative_avg_download: f64,
    pub cumulative_avg_upload: f64,
}

impl WindowedSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Iterate row-wise.
    pub fn points(&self) -> impl Iterator<Item = SeriesPoint> + '_ {
        (0..self.len()).map(move |i| SeriesPoint {
            timestamp: self.timestamps[i],
            download: self.downloads[i],
            upload: self.uploads[i],
            cumulative_avg_download: self.cumulative_avg_downloads[i],
            cumulative_avg_upload: self.cumulative_avg_uploads[i],
        })
    }

    fn push(&mut self, point: SeriesPoint) {
        self.timestamps.push(point.timestamp);
        self.downloads.push(point.download);
        self.uploads.push(point.upload);
        self.cumulative_avg_downloads
            .push(point.cumulative_avg_download);
        self.cumulative_avg_uploads.push(point.cumulative_avg_upload);
    }
}

impl Collector for WindowedSeries {
    type Output = WindowedSeries;

    fn observe(&mut self, record: &Record, totals: &RunningTotals) {
        self.push(SeriesPoint {
            timestamp: record.timestamp,
            download: record.download_mbps,
            upload: record.upload_mbps,
            cumulative_avg_download: totals.avg_download(),
            cumulative_avg_upload: totals.avg_upload(),
        });
    }

    fn finish(self, _totals: &RunningTotals) -> Option<WindowedSeries> {
        if self.is_empty() { None } else { Some(self) }
    }
}

/// A window of `days` whole days.
pub fn window_days(days: u32) -> TimeDelta {
    TimeDelta::try_days(i64::from(days)).unwrap_or_else(TimeDelta::max_value)
}

/// Build the series for records at or after `now - window`.
///
/// If the cutoff would fall before the earliest representable time, every
/// record is inside the window. Records dated after `now` are kept. Returns
/// `None` when no record falls inside the window.
pub fn build<I>(
    records: I,
    window: TimeDelta,
    now: NaiveDateTime,
) -> Result<Option<WindowedSeries>, LogError>
where
    I: IntoIterator<Item = Result<Record, LogError>>,
{
    let cutoff = now.checked_sub_signed(window);
    fold_history(
        records,
        |r| cutoff.is_none_or(|c| r.timestamp >= c),
        WindowedSeries::default(),
    )
}
