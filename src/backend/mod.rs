//! Training and evaluation backend
//!
//! recbench does no modeling itself. Training, checkpoint reloading and
//! evaluation are delegated to a recommendation framework behind the
//! [`Recommender`] trait; [`CommandBackend`] reaches one through a bridge
//! process.

mod command;

pub use command::CommandBackend;

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::experiment::RunConfig;
use crate::results::Record;
use crate::Result;

/// Resolved-configuration key naming the model family.
pub const MODEL_TYPE_KEY: &str = "MODEL_TYPE";

/// Resolved-configuration key naming the model.
pub const MODEL_KEY: &str = "model";

/// A trained model reloaded from disk, with the configuration it was
/// trained under.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCheckpoint {
    path: PathBuf,
    config: Record,
}

impl LoadedCheckpoint {
    /// Pair a checkpoint path with its resolved configuration.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, config: Record) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Checkpoint file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fully resolved configuration stored in the checkpoint.
    #[must_use]
    pub const fn config(&self) -> &Record {
        &self.config
    }

    /// Model family (e.g. `GENERAL`, `SEQUENTIAL`), used to pick an evaluator.
    #[must_use]
    pub fn model_type(&self) -> Option<&str> {
        self.config.get(MODEL_TYPE_KEY).and_then(Value::as_str)
    }

    /// Model name recorded in the checkpoint.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.config.get(MODEL_KEY).and_then(Value::as_str)
    }
}

/// External recommendation framework.
///
/// Every call is synchronous and may be slow; none is retried.
pub trait Recommender {
    /// Train `model` on `dataset`, saving checkpoints under
    /// `config.checkpoint_dir()`.
    ///
    /// # Errors
    ///
    /// Returns an error if training fails.
    fn train(&self, model: &str, dataset: &str, config: &RunConfig) -> Result<()>;

    /// Reload a trained model and its configuration from `checkpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be read.
    fn load_checkpoint(&self, checkpoint: &Path) -> Result<LoadedCheckpoint>;

    /// Evaluate a reloaded model on its held-out test split.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn evaluate(&self, checkpoint: &LoadedCheckpoint) -> Result<Record>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded_checkpoint_accessors() {
        let mut config = Record::new();
        config.insert(MODEL_TYPE_KEY.into(), "GENERAL".into());
        config.insert(MODEL_KEY.into(), "BPR".into());
        let loaded = LoadedCheckpoint::new("saved/d/m/BPR.pth", config);

        assert_eq!(loaded.model_type(), Some("GENERAL"));
        assert_eq!(loaded.model(), Some("BPR"));
        assert_eq!(loaded.path(), Path::new("saved/d/m/BPR.pth"));
    }

    #[test]
    fn test_loaded_checkpoint_missing_fields() {
        let loaded = LoadedCheckpoint::new("x", Record::new());
        assert!(loaded.model_type().is_none());
        assert!(loaded.model().is_none());
    }
}
