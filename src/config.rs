//! Harness settings
//!
//! Loaded once from a TOML file at start-up and passed by reference to every
//! component. Nothing here is mutated after [`Settings::load`] returns.
//!
//! ```toml
//! [experiments]
//! datasets = ["ml-100k", "amazon-books"]
//! models = ["BPR", "LightGCN"]
//!
//! [output]
//! log_file = "log.txt"
//! result_path = "results"
//!
//! [params]
//! checkpoint_dir = "saved"
//! epochs = 50
//!
//! [trainer]
//! program = "python3"
//! args = ["bridge.py"]
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::device::Device;
use crate::results::Record;
use crate::{Error, Result};

/// Parameter naming the checkpoint root in `[params]`.
pub const CHECKPOINT_DIR_KEY: &str = "checkpoint_dir";

/// Parameter naming the compute device in `[params]`.
pub const DEVICE_KEY: &str = "device";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    experiments: ExperimentSettings,
    #[serde(default)]
    output: OutputSettings,
    #[serde(default)]
    params: Record,
    #[serde(default)]
    trainer: TrainerSettings,
    #[serde(default)]
    emissions: EmissionsSettings,
}

/// Allow-listed datasets and models.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentSettings {
    /// Dataset names, in batch order.
    pub datasets: Vec<String>,
    /// Model names, in batch order.
    pub models: Vec<String>,
}

/// Output locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Append-only experiment log.
    pub log_file: PathBuf,
    /// Root of the `dataset/model` result tree.
    pub result_path: PathBuf,
    /// Emissions CSV file name inside each result folder.
    pub emissions_file: String,
    /// Metrics CSV file name inside each result folder.
    pub metrics_file: String,
    /// Parameters CSV file name inside each result folder.
    pub params_file: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("log.txt"),
            result_path: PathBuf::from("results"),
            emissions_file: "emissions.csv".to_string(),
            metrics_file: "metrics.csv".to_string(),
            params_file: "params.csv".to_string(),
        }
    }
}

/// External training bridge command.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainerSettings {
    /// Executable to spawn.
    pub program: String,
    /// Arguments placed before the subcommand.
    pub args: Vec<String>,
    /// Extra environment for the bridge process.
    pub env: IndexMap<String, String>,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["-m".to_string(), "recbench_bridge".to_string()],
            env: IndexMap::new(),
        }
    }
}

/// Power model used by the built-in energy estimator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmissionsSettings {
    /// Average CPU package draw while training.
    pub cpu_power_watts: f64,
    /// Average GPU draw while training (0 on CPU-only hosts).
    pub gpu_power_watts: f64,
    /// Average memory draw while training.
    pub ram_power_watts: f64,
    /// Grid carbon intensity.
    pub carbon_intensity_g_per_kwh: f64,
    /// Region the intensity refers to.
    pub country_iso_code: String,
}

impl Default for EmissionsSettings {
    fn default() -> Self {
        Self {
            cpu_power_watts: 42.5,
            gpu_power_watts: 0.0,
            ram_power_watts: 3.0,
            carbon_intensity_g_per_kwh: 475.0,
            country_iso_code: "WLD".to_string(),
        }
    }
}

/// Fully loaded, validated harness settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Allow-listed datasets and models.
    pub experiments: ExperimentSettings,
    /// Output locations.
    pub output: OutputSettings,
    /// Default training parameters; always contains `checkpoint_dir`.
    pub params: Record,
    /// External training bridge.
    pub trainer: TrainerSettings,
    /// Energy estimator power model.
    pub emissions: EmissionsSettings,
}

impl Settings {
    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML for
    /// this schema, or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Parse settings from TOML text; `origin` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not match the schema or fails
    /// validation.
    pub fn parse(content: &str, origin: impl AsRef<Path>) -> Result<Self> {
        let raw: RawSettings = toml::from_str(content).map_err(|source| Error::SettingsParse {
            path: origin.as_ref().to_path_buf(),
            source,
        })?;

        let mut params = raw.params;
        params
            .entry(CHECKPOINT_DIR_KEY.to_string())
            .or_insert_with(|| Value::from("saved"));

        let settings = Self {
            experiments: raw.experiments,
            output: raw.output,
            params,
            trainer: raw.trainer,
            emissions: raw.emissions,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.experiments.datasets.is_empty() {
            return Err(Error::InvalidSettings("experiments.datasets is empty".into()));
        }
        if self.experiments.models.is_empty() {
            return Err(Error::InvalidSettings("experiments.models is empty".into()));
        }
        if let Some(blank) = self
            .experiments
            .datasets
            .iter()
            .chain(&self.experiments.models)
            .find(|name| name.trim().is_empty())
        {
            return Err(Error::InvalidSettings(format!(
                "blank dataset or model name {blank:?}"
            )));
        }
        if !self.params[CHECKPOINT_DIR_KEY].is_string() {
            return Err(Error::InvalidSettings(
                "params.checkpoint_dir must be a string".into(),
            ));
        }
        if self.trainer.program.is_empty() {
            return Err(Error::InvalidSettings("trainer.program is empty".into()));
        }
        Ok(())
    }

    /// Fill in `params.device` when the file did not set one.
    #[must_use]
    pub fn with_device(mut self, device: Device) -> Self {
        self.params
            .entry(DEVICE_KEY.to_string())
            .or_insert_with(|| Value::from(device.as_str()));
        self
    }

    /// Root of the per-run checkpoint tree.
    #[must_use]
    pub fn checkpoint_root(&self) -> PathBuf {
        PathBuf::from(
            self.params
                .get(CHECKPOINT_DIR_KEY)
                .and_then(Value::as_str)
                .unwrap_or("saved"),
        )
    }

    /// Configured datasets, in batch order.
    #[must_use]
    pub fn datasets(&self) -> &[String] {
        &self.experiments.datasets
    }

    /// Configured models, in batch order.
    #[must_use]
    pub fn models(&self) -> &[String] {
        &self.experiments.models
    }
}
