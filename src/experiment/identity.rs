//! Experiment identity - the (dataset, model) pair a run is about

use std::fmt;
use std::path::PathBuf;

/// Immutable (dataset, model) pair identifying one experiment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExperimentIdentity {
    dataset: String,
    model: String,
}

impl ExperimentIdentity {
    /// Create an identity.
    #[must_use]
    pub fn new(dataset: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            model: model.into(),
        }
    }

    /// Dataset name as configured.
    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Model name as configured.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Tag used on emissions, metrics and log lines:
    /// `<DATASET>_<MODEL>_DEFAULT_PARAM`, upper-cased.
    #[must_use]
    pub fn project_name(&self) -> String {
        format!(
            "{}_{}_DEFAULT_PARAM",
            self.dataset.to_uppercase(),
            self.model.to_uppercase()
        )
    }

    /// `dataset/model`, relative to a result or checkpoint root.
    #[must_use]
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(&self.dataset).join(&self.model)
    }
}

impl fmt::Display for ExperimentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dataset, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_name_is_upper_case() {
        let id = ExperimentIdentity::new("ml-100k", "LightGCN");
        assert_eq!(id.project_name(), "ML-100K_LIGHTGCN_DEFAULT_PARAM");
    }

    #[test]
    fn test_relative_dir() {
        let id = ExperimentIdentity::new("amazon-books", "BPR");
        assert_eq!(id.relative_dir(), PathBuf::from("amazon-books").join("BPR"));
        assert_eq!(id.to_string(), "amazon-books/BPR");
    }
}
