//! Error types for recbench
//!
//! Clear error messages with actionable guidance: every variant names the
//! file, command or experiment it concerns.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// recbench error types
#[derive(Error, Debug)]
pub enum Error {
    /// Settings file could not be parsed
    #[error("Settings parse error in {path}: {source}")]
    SettingsParse {
        /// Settings file path
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// Settings parsed but are unusable
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// No checkpoint was produced for a run
    #[error("No checkpoint found in {}: the training backend saved no model", .0.display())]
    MissingCheckpoint(PathBuf),

    /// The external training backend failed
    #[error("Backend command `{command}` failed ({status}): {stderr}")]
    Backend {
        /// Subcommand that failed (train, inspect, evaluate)
        command: String,
        /// Exit status description
        status: String,
        /// Tail of the backend's stderr
        stderr: String,
    },

    /// The backend answered with something other than a JSON object
    #[error("Backend `{command}` returned malformed output: {reason}")]
    BackendOutput {
        /// Subcommand that produced the output
        command: String,
        /// What was wrong with it
        reason: String,
    },

    /// Emissions tracker used out of order
    #[error("Emissions tracker error: {0}")]
    Tracker(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
