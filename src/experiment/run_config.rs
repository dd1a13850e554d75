//! Per-run training configuration
//!
//! Each run gets its own immutable copy of the default parameters with the
//! checkpoint directory pointed at `<checkpoint_root>/<dataset>/<model>`.
//! The defaults themselves are never modified, so no run can observe
//! another run's checkpoint directory.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::ExperimentIdentity;
use crate::config::CHECKPOINT_DIR_KEY;
use crate::results::Record;
use crate::Result;

/// Immutable training configuration handed to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    params: Record,
    checkpoint_dir: PathBuf,
}

impl RunConfig {
    /// Derive the configuration for `identity` from `defaults`.
    #[must_use]
    pub fn for_run(defaults: &Record, identity: &ExperimentIdentity, checkpoint_root: &Path) -> Self {
        Self::builder(defaults)
            .checkpoint_dir(checkpoint_root.join(identity.relative_dir()))
            .build()
    }

    /// Start from `defaults` and override individual options.
    #[must_use]
    pub fn builder(defaults: &Record) -> RunConfigBuilder {
        RunConfigBuilder::new(defaults)
    }

    /// Options in key order.
    #[must_use]
    pub const fn params(&self) -> &Record {
        &self.params
    }

    /// Look up a single option.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Directory the backend saves checkpoints into.
    #[must_use]
    pub fn checkpoint_dir(&self) -> &Path {
        &self.checkpoint_dir
    }

    /// JSON object of all options, in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.params)?)
    }
}

/// Builder for `RunConfig`.
#[derive(Debug)]
pub struct RunConfigBuilder {
    params: Record,
}

impl RunConfigBuilder {
    /// Create a builder seeded with a copy of `defaults`.
    #[must_use]
    pub fn new(defaults: &Record) -> Self {
        Self {
            params: defaults.clone(),
        }
    }

    /// Set the checkpoint directory.
    #[must_use]
    pub fn checkpoint_dir(self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_string_lossy().into_owned();
        self.set(CHECKPOINT_DIR_KEY, dir)
    }

    /// Set any option, keeping its position if it already exists.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Build the `RunConfig`.
    #[must_use]
    pub fn build(self) -> RunConfig {
        let checkpoint_dir = PathBuf::from(
            self.params
                .get(CHECKPOINT_DIR_KEY)
                .and_then(Value::as_str)
                .unwrap_or_default(),
        );
        RunConfig {
            params: self.params,
            checkpoint_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Record {
        let mut params = Record::new();
        params.insert("epochs".into(), 5.into());
        params.insert(CHECKPOINT_DIR_KEY.into(), "saved".into());
        params.insert("device".into(), "cpu".into());
        params
    }

    #[test]
    fn test_for_run_rewrites_checkpoint_dir() {
        let defaults = defaults();
        let config = RunConfig::for_run(
            &defaults,
            &ExperimentIdentity::new("ml-100k", "BPR"),
            Path::new("saved"),
        );

        assert_eq!(config.checkpoint_dir(), Path::new("saved/ml-100k/BPR"));
        assert_eq!(
            config.get(CHECKPOINT_DIR_KEY).and_then(Value::as_str),
            Some("saved/ml-100k/BPR")
        );
        assert_eq!(defaults[CHECKPOINT_DIR_KEY], "saved");
    }

    #[test]
    fn test_runs_do_not_interfere() {
        let defaults = defaults();
        let root = Path::new("saved");
        let first = RunConfig::for_run(&defaults, &ExperimentIdentity::new("a", "M"), root);
        let second = RunConfig::for_run(&defaults, &ExperimentIdentity::new("b", "M"), root);

        assert_eq!(first.checkpoint_dir(), Path::new("saved/a/M"));
        assert_eq!(second.checkpoint_dir(), Path::new("saved/b/M"));
    }

    #[test]
    fn test_key_order_survives_override() {
        let config = RunConfig::builder(&defaults())
            .checkpoint_dir("elsewhere")
            .set("learning_rate", 0.01)
            .build();

        let keys: Vec<&str> = config.params().keys().map(String::as_str).collect();
        assert_eq!(keys, ["epochs", "checkpoint_dir", "device", "learning_rate"]);
        assert!(config.to_json().unwrap().starts_with("{\"epochs\":5,"));
    }
}
