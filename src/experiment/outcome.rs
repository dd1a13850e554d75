//! Experiment outcomes and batch bookkeeping

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ExperimentIdentity;
use crate::results::Record;

/// Final status of one experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Trained, evaluated and persisted.
    Completed,
    /// Abandoned; nothing was persisted for it.
    Failed,
}

/// Everything a completed experiment persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    identity: ExperimentIdentity,
    run_id: String,
    metrics: Record,
    params: Record,
    metrics_file: PathBuf,
    params_file: PathBuf,
}

impl ExperimentReport {
    /// Create a report.
    #[must_use]
    pub fn new(
        identity: ExperimentIdentity,
        run_id: impl Into<String>,
        metrics: Record,
        params: Record,
        metrics_file: impl Into<PathBuf>,
        params_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            identity,
            run_id: run_id.into(),
            metrics,
            params,
            metrics_file: metrics_file.into(),
            params_file: params_file.into(),
        }
    }

    /// Experiment the report belongs to.
    #[must_use]
    pub const fn identity(&self) -> &ExperimentIdentity {
        &self.identity
    }

    /// Emissions run identifier shared by all rows of this experiment.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Metrics row as written.
    #[must_use]
    pub const fn metrics(&self) -> &Record {
        &self.metrics
    }

    /// Parameters row as written.
    #[must_use]
    pub const fn params(&self) -> &Record {
        &self.params
    }

    /// Metrics CSV the row went to.
    #[must_use]
    pub fn metrics_file(&self) -> &Path {
        &self.metrics_file
    }

    /// Parameters CSV the row went to.
    #[must_use]
    pub fn params_file(&self) -> &Path {
        &self.params_file
    }
}

/// Result of one experiment, returned instead of raised.
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentOutcome {
    /// The experiment ran to the end.
    Completed(ExperimentReport),
    /// The experiment was abandoned.
    Failed {
        /// Experiment that failed.
        identity: ExperimentIdentity,
        /// Error message, as logged.
        reason: String,
    },
}

impl ExperimentOutcome {
    /// Experiment the outcome belongs to.
    #[must_use]
    pub const fn identity(&self) -> &ExperimentIdentity {
        match self {
            Self::Completed(report) => report.identity(),
            Self::Failed { identity, .. } => identity,
        }
    }

    /// Final status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        match self {
            Self::Completed(_) => RunStatus::Completed,
            Self::Failed { .. } => RunStatus::Failed,
        }
    }

    /// Whether the experiment completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Tally of a batch of experiments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    completed: usize,
    failed: Vec<String>,
}

impl BatchSummary {
    /// Create an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one outcome.
    pub fn record(&mut self, outcome: &ExperimentOutcome) {
        match outcome {
            ExperimentOutcome::Completed(_) => self.completed += 1,
            ExperimentOutcome::Failed { identity, .. } => {
                self.failed.push(identity.project_name());
            }
        }
    }

    /// Experiments attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed + self.failed.len()
    }

    /// Experiments that completed.
    #[must_use]
    pub const fn completed(&self) -> usize {
        self.completed
    }

    /// Experiments that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.len()
    }

    /// Project names of failed experiments, in run order.
    #[must_use]
    pub fn failed_projects(&self) -> &[String] {
        &self.failed
    }
}
