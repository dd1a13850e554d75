//! Experiment orchestration
//!
//! ```text
//! ExperimentIdentity ──> RunConfig ──> Recommender::train   (inside EmissionsTracker scope)
//!                                           │
//!                                           ├──> latest_checkpoint ──> load_checkpoint ──> evaluate
//!                                           │
//!                                           └──> metrics.csv / params.csv rows (+ run_id, project_name)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use recbench::backend::CommandBackend;
//! use recbench::config::Settings;
//! use recbench::emissions::EnergyTracker;
//! use recbench::experiment::{ExperimentDriver, ExperimentIdentity};
//!
//! let settings = Settings::load("recbench.toml")?;
//! let backend = CommandBackend::new(settings.trainer.clone());
//! let tracker = EnergyTracker::new(settings.emissions.clone());
//! let mut driver = ExperimentDriver::new(&settings, backend, tracker);
//!
//! let outcome = driver.process(&ExperimentIdentity::new("ml-100k", "BPR"));
//! println!("{:?}", outcome.status());
//! # Ok::<(), recbench::Error>(())
//! ```

mod checkpoint;
mod driver;
mod identity;
mod log;
mod outcome;
mod run_config;

pub use checkpoint::latest_checkpoint;
pub use driver::{ExperimentDriver, PROJECT_NAME_FIELD};
pub use identity::ExperimentIdentity;
pub use log::{ExperimentLog, SESSION_MARKER};
pub use outcome::{BatchSummary, ExperimentOutcome, ExperimentReport, RunStatus};
pub use run_config::{RunConfig, RunConfigBuilder};
