//! One forward pass over the history, shared by every analytic.
//!
//! [`fold_history`] keeps running totals over *all* records it sees and hands
//! the records accepted by an inclusion predicate to a [`Collector`], along
//! with the totals as they stand after that record. Whole-history stats use a
//! predicate that accepts everything; the windowed series accepts only the
//! trailing window while still reading the totals accumulated from the very
//! first record.

use crate::error::LogError;
use crate::record::Record;

/// Sums and count over every record folded so far.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningTotals {
    pub count: u64,
    pub sum_download: f64,
    pub sum_upload: f64,
    pub sum_ping: f64,
}

impl RunningTotals {
    pub fn push(&mut self, record: &Record) {
        self.count += 1;
        self.sum_download += record.download_mbps;
        self.sum_upload += record.upload_mbps;
        self.sum_ping += record.ping_ms;
    }

    /// Mean download so far. NaN before the first record.
    pub fn avg_download(&self) -> f64 {
        self.sum_download / self.count as f64
    }

    /// Mean upload so far. NaN before the first record.
    pub fn avg_upload(&self) -> f64 {
        self.sum_upload / self.count as f64
    }

    /// Mean ping so far. NaN before the first record.
    pub fn avg_ping(&self) -> f64 {
        self.sum_ping / self.count as f64
    }
}

/// Output-collection policy for [`fold_history`].
pub trait Collector {
    type Output;

    /// Called for each included record; `totals` already counts it.
    fn observe(&mut self, record: &Record, totals: &RunningTotals);

    /// Produce the result, or `None` if there is nothing to report.
    fn finish(self, totals: &RunningTotals) -> Option<Self::Output>;
}

/// Fold `records` in order, feeding included records to `collector`.
///
/// The first error in `records` aborts the fold and is returned.
pub fn fold_history<I, P, C>(
    records: I,
    mut include: P,
    mut collector: C,
) -> Result<Option<C::Output>, LogError>
where
    I: IntoIterator<Item = Result<Record, LogError>>,
    P: FnMut(&Record) -> bool,
    C: Collector,
{
    let mut totals = RunningTotals::default();
    for record in records {
        let record = record?;
        totals.push(&record);
        if include(&record) {
            collector.observe(&record, &totals);
        }
    }
    Ok(collector.finish(&totals))
}
