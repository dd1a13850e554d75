//! Append-only experiment log
//!
//! One line per event: a session marker when an experiment begins, then
//! `EXECUTED: <project>` or `ERROR: <project>. <message>`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::Result;

/// Marker written when an experiment session opens the log.
pub const SESSION_MARKER: &str = "New experiment session started.";

/// Handle on the experiment log, open in append mode.
#[derive(Debug)]
pub struct ExperimentLog {
    file: File,
}

impl ExperimentLog {
    /// Open (creating if needed) the log at `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self { file })
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.file, "{text}")?;
        self.file.flush()?;
        Ok(())
    }

    /// Record the start of an experiment session.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn session_started(&mut self) -> Result<()> {
        self.line(SESSION_MARKER)
    }

    /// Record that training for `project` finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn executed(&mut self, project: &str) -> Result<()> {
        self.line(&format!("EXECUTED: {project}"))
    }

    /// Record that `project` was abandoned.
    ///
    /// Multi-line messages are folded onto one line.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn failed(&mut self, project: &str, message: &str) -> Result<()> {
        let message = message.lines().collect::<Vec<_>>().join(" | ");
        self.line(&format!("ERROR: {project}. {message}"))
    }

    /// Flush and close the log.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered data cannot be synced.
    pub fn close(mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}
