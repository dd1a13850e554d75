//! # recbench: Recommender Benchmark Harness
//!
//! recbench runs every configured (dataset, model) pair through an external
//! recommendation framework, measures the energy spent on training, and
//! appends metrics, resolved parameters and emissions to CSV files under
//! `results/<dataset>/<model>/`.
//!
//! ## Design Principles
//!
//! - **No modeling here**: training and evaluation sit behind
//!   [`backend::Recommender`]
//! - **No globals**: [`config::Settings`] is loaded once and passed down;
//!   each run derives its own immutable [`experiment::RunConfig`]
//! - **A failed experiment never stops a batch**: outcomes are values
//!   ([`experiment::ExperimentOutcome`]), not panics
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use recbench::backend::CommandBackend;
//! use recbench::cli::dispatch;
//! use recbench::config::Settings;
//! use recbench::emissions::EnergyTracker;
//! use recbench::experiment::ExperimentDriver;
//!
//! let settings = Settings::load("recbench.toml")?.with_device(recbench::device::get_device());
//! let mut driver = ExperimentDriver::new(
//!     &settings,
//!     CommandBackend::new(settings.trainer.clone()),
//!     EnergyTracker::new(settings.emissions.clone()),
//! );
//!
//! let no_args: [&str; 0] = [];
//! let summary = dispatch(&settings, &no_args, &mut std::io::stdout(), |id| driver.process(id))?;
//! println!("{} of {} experiments completed", summary.completed(), summary.total());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod device;
pub mod emissions;
pub mod error;
pub mod experiment;
pub mod layout;
pub mod results;

pub use error::{Error, Result};
