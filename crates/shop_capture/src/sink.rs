use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::info;

use crate::error::ShopLogError;
use crate::record::ShopRecord;

/// Counts persisted records and reports when the batch threshold is hit.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TrackingCounter {
    count: u32,
    threshold: u32,
}

/// Counter state right after one increment.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Tracked {
    pub count: u32,
    pub threshold: u32,
    pub threshold_reached: bool,
}

impl TrackingCounter {
    pub fn new(threshold: u32) -> Self {
        Self {
            count: 0,
            threshold: threshold.max(1),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Increments; resets to zero when the threshold is reached.
    pub fn increment(&mut self) -> Tracked {
        self.count += 1;
        let tracked = Tracked {
            count: self.count,
            threshold: self.threshold,
            threshold_reached: self.count >= self.threshold,
        };
        if tracked.threshold_reached {
            self.count = 0;
        }
        tracked
    }
}

/// Append-only shop log on disk.
#[derive(Debug)]
pub struct ShopLog {
    path: PathBuf,
    counter: TrackingCounter,
}

impl ShopLog {
    pub fn new(path: impl Into<PathBuf>, threshold: u32) -> Self {
        Self {
            path: path.into(),
            counter: TrackingCounter::new(threshold),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records persisted since the last batch trigger.
    pub fn tracked(&self) -> u32 {
        self.counter.count()
    }

    /// Appends one serialized record. The counter only moves on success.
    pub fn append(&mut self, record: &ShopRecord) -> Result<Tracked, ShopLogError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| ShopLogError::Open {
                path: self.path.clone(),
                source,
            })?;
        write_record(&mut file, record).map_err(|source| ShopLogError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "appended shop data");
        Ok(self.counter.increment())
    }
}

/// Writes the record and its terminator in a single `write_all`.
fn write_record(out: &mut impl Write, record: &ShopRecord) -> io::Result<()> {
    let mut line = record.to_log_line();
    line.push('\n');
    out.write_all(line.as_bytes())
}
