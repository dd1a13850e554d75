//! Append-only CSV result files
//!
//! Metrics, parameter and emissions files all share one shape: a header row
//! written lazily on the first append, followed by one data row per call.
//!
//! ```rust,no_run
//! use recbench::results::{write_record, Record};
//!
//! let mut record = Record::new();
//! record.insert("recall@10".into(), 0.21.into());
//! record.insert("project_name".into(), "ML-100K_BPR_DEFAULT_PARAM".into());
//! write_record("results/ml-100k/BPR/metrics.csv", &record)?;
//! # Ok::<(), recbench::Error>(())
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::Result;

/// Ordered field-name to value mapping persisted as one CSV row.
///
/// Iteration order is insertion order, which fixes both the header and the
/// column order of each row.
pub type Record = IndexMap<String, Value>;

/// Render a value the way it appears in a CSV cell.
///
/// Strings are written raw (no JSON quoting), `null` becomes an empty cell
/// and everything else uses its JSON text.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One rendered row with its file already open for appending.
///
/// Preparing renders the row (and the header, for an empty file) and opens
/// the target, so every failure other than the final write happens before
/// anything is persisted. Rows that must land together are all prepared
/// first and committed afterwards.
#[derive(Debug)]
pub struct PendingRow {
    file: File,
    bytes: Vec<u8>,
}

impl PendingRow {
    /// Open `path` for appending and render `record` for it.
    ///
    /// A missing or empty file gets the record's keys as a header row. The
    /// header of a non-empty file is never rewritten or compared against
    /// `record`, so callers must keep the key set stable per file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the row rendered.
    pub fn prepare(path: impl AsRef<Path>, record: &Record) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_new = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(Vec::new());
        if is_new {
            writer.write_record(record.keys())?;
        }
        writer.write_record(record.values().map(render_value))?;
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;

        Ok(Self { file, bytes })
    }

    /// Append the rendered bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn commit(mut self) -> Result<()> {
        self.file.write_all(&self.bytes)?;
        self.file.flush()?;
        Ok(())
    }
}

/// Append `record` as one row to the CSV file at `path`.
///
/// If the file is missing or empty, the record's keys are written as a
/// header row first. See [`PendingRow::prepare`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or written.
pub fn write_record(path: impl AsRef<Path>, record: &Record) -> Result<()> {
    PendingRow::prepare(path, record)?.commit()
}
