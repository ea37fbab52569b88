//! Append-only log store.
//!
//! The store owns the on-disk format: UTF-8 text, one encoded [`Record`] per
//! `\n`-terminated line. Records are only ever appended. Readers open the file
//! fresh on every call and never hold state between calls.
//!
//! A final segment without a terminating newline is treated as an append in
//! progress and is invisible to both [`LogStore::scan`] and
//! [`LogStore::tail_line`].

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::config::LogConfig;
use crate::error::LogError;
use crate::record::{Measurement, Record};
use crate::series::{self, WindowedSeries};
use crate::stats::{self, StatsSnapshot};

/// Handle on a measurement log file.
#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
    tail_stride: usize,
}

impl LogStore {
    /// Store backed by `path`, with default tuning.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_config(&LogConfig::at(path))
    }

    /// Store described by `config`; a zero stride is raised to 1.
    pub fn from_config(config: &LogConfig) -> Self {
        Self {
            path: config.path.clone(),
            tail_stride: config.tail_stride.max(1),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and flush it to disk before returning.
    ///
    /// The file is created if absent. If a previous append was torn and left
    /// the file without a trailing newline, a newline is written first so the
    /// fragment stays on its own (invalid) line.
    pub fn append(&self, record: &Record) -> Result<(), LogError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&self.path)
            .map_err(|e| LogError::io("open", &self.path, e))?;

        let mut line = String::new();
        if !ends_with_newline(&mut file).map_err(|e| LogError::io("read", &self.path, e))? {
            log::warn!(
                "{} ends with an incomplete line; isolating it before appending",
                self.path.display()
            );
            line.push('\n');
        }
        line.push_str(&record.encode());
        line.push('\n');

        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .and_then(|()| file.sync_data())
            .map_err(|e| LogError::io("append to", &self.path, e))?;

        log::debug!("appended record at {} to {}", record.timestamp, self.path.display());
        Ok(())
    }

    /// Stamp a measurement with the current local time and append it.
    pub fn log_measurement(&self, measurement: Measurement) -> Result<Record, LogError> {
        let record = measurement.into_record(Local::now().naive_local());
        self.append(&record)?;
        Ok(record)
    }

    /// Scan every valid record in file order.
    ///
    /// A missing file yields an empty scan. Each call starts from the
    /// beginning of the file.
    pub fn scan(&self) -> Result<Scan, LogError> {
        match File::open(&self.path) {
            Ok(file) => Ok(Scan {
                path: self.path.clone(),
                reader: Some(BufReader::new(file)),
                buf: Vec::new(),
                line_no: 0,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Scan::empty(&self.path)),
            Err(e) => Err(LogError::io("open", &self.path, e)),
        }
    }

    /// The last complete, non-blank line, read backward from the end.
    ///
    /// Returns `None` if the file is missing, empty, or holds no complete
    /// non-blank line. A last line that is not UTF-8 is malformed, as in
    /// [`LogStore::scan`], and also yields `None`.
    pub fn tail_line(&self) -> Result<Option<String>, LogError> {
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LogError::io("open", &self.path, e)),
        };
        let tail = read_last_line(&mut file, self.tail_stride)
            .map_err(|e| LogError::io("read", &self.path, e))?;
        Ok(tail.line.and_then(|bytes| match String::from_utf8(bytes) {
            Ok(line) => Some(line),
            Err(_) => {
                log::debug!("{}: last line is not UTF-8", self.path.display());
                None
            }
        }))
    }

    /// Whole-history statistics. See [`stats::compute`].
    pub fn stats(&self) -> Result<Option<StatsSnapshot>, LogError> {
        stats::compute(self.scan()?)
    }

    /// Records from the trailing `window_days` before `now`, with cumulative
    /// averages over the full history. See [`series::build`].
    pub fn series(
        &self,
        window_days: u32,
        now: NaiveDateTime,
    ) -> Result<Option<WindowedSeries>, LogError> {
        series::build(self.scan()?, series::window_days(window_days), now)
    }

    /// The most recent record. See [`crate::latest::latest`].
    pub fn latest(&self) -> Result<Option<Record>, LogError> {
        crate::latest::latest(self)
    }
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// Lazy, single-pass iterator over the valid records of a log file.
///
/// Malformed lines are skipped. An I/O error is yielded once, after which
/// the iterator is exhausted.
pub struct Scan {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    buf: Vec<u8>,
    line_no: u64,
}

impl Scan {
    fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            reader: None,
            buf: Vec::new(),
            line_no: 0,
        }
    }
}

impl Iterator for Scan {
    type Item = Result<Record, LogError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let reader = self.reader.as_mut()?;
            self.buf.clear();
            let n = match reader.read_until(b'\n', &mut self.buf) {
                Ok(n) => n,
                Err(e) => {
                    self.reader = None;
                    return Some(Err(LogError::io("read", &self.path, e)));
                }
            };
            if n == 0 {
                self.reader = None;
                return None;
            }
            self.line_no += 1;

            if self.buf.last() != Some(&b'\n') {
                log::debug!(
                    "{}:{}: ignoring unterminated trailing line",
                    self.path.display(),
                    self.line_no
                );
                self.reader = None;
                return None;
            }

            let Ok(line) = std::str::from_utf8(&self.buf) else {
                log::debug!("{}:{}: skipping non-UTF-8 line", self.path.display(), self.line_no);
                continue;
            };
            match Record::decode(line) {
                Ok(record) => return Some(Ok(record)),
                Err(e) => {
                    log::debug!("{}:{}: skipping line: {e}", self.path.display(), self.line_no);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tail access
// ---------------------------------------------------------------------------

/// Result of a backward read: the line found and how many bytes it cost.
#[derive(Debug, Default)]
pub(crate) struct TailRead {
    pub line: Option<Vec<u8>>,
    pub bytes_read: u64,
}

/// Reads a file backward one stride at a time.
struct Backward<'a> {
    file: &'a mut File,
    stride: u64,
    /// Offset of `buf[0]` in the file.
    start: u64,
    buf: Vec<u8>,
    bytes_read: u64,
}

impl<'a> Backward<'a> {
    fn new(file: &'a mut File, len: u64, stride: usize) -> Self {
        Self {
            file,
            stride: stride.max(1) as u64,
            start: len,
            buf: Vec::new(),
            bytes_read: 0,
        }
    }

    /// Pull the stride preceding `self.start` in front of the buffer.
    /// Returns `false` at the beginning of the file.
    fn extend(&mut self) -> io::Result<bool> {
        if self.start == 0 {
            return Ok(false);
        }
        let step = self.stride.min(self.start);
        let from = self.start - step;
        let mut chunk = vec![0u8; step as usize];
        self.file.seek(SeekFrom::Start(from))?;
        self.file.read_exact(&mut chunk)?;
        self.bytes_read += step;
        chunk.extend_from_slice(&self.buf);
        self.buf = chunk;
        self.start = from;
        Ok(true)
    }

    /// File offset of the last `\n` strictly before `before`, reading further
    /// back as needed.
    fn rfind_newline(&mut self, before: u64) -> io::Result<Option<u64>> {
        let mut searched_from = before;
        loop {
            let hi = (searched_from - self.start) as usize;
            if let Some(i) = self.buf[..hi].iter().rposition(|&b| b == b'\n') {
                return Ok(Some(self.start + i as u64));
            }
            searched_from = self.start;
            if !self.extend()? {
                return Ok(None);
            }
        }
    }

    fn slice(&self, from: u64, to: u64) -> &[u8] {
        &self.buf[(from - self.start) as usize..(to - self.start) as usize]
    }
}

/// Find the last complete, non-blank line without reading the file from the
/// start.
pub(crate) fn read_last_line(file: &mut File, stride: usize) -> io::Result<TailRead> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(TailRead::default());
    }
    let mut back = Backward::new(file, len, stride);

    // Anything after the last newline is an append in progress.
    let Some(mut end) = back.rfind_newline(len)? else {
        return Ok(TailRead {
            line: None,
            bytes_read: back.bytes_read,
        });
    };

    loop {
        let start = match back.rfind_newline(end)? {
            Some(nl) => nl + 1,
            None => 0,
        };
        let line = back.slice(start, end);
        if !line.iter().all(u8::is_ascii_whitespace) {
            return Ok(TailRead {
                line: Some(line.to_vec()),
                bytes_read: back.bytes_read,
            });
        }
        if start == 0 {
            return Ok(TailRead {
                line: None,
                bytes_read: back.bytes_read,
            });
        }
        end = start - 1;
    }
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
