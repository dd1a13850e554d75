//! recbench CLI
//!
//! `recbench [--config recbench.toml] [--dataset=<name> --model=<name>]`
//!
//! `--config` must precede the selection; every token after the first
//! selection token is itself a selection token.
//!
//! Always exits with status 0; per-experiment failures are reported in the
//! experiment log and on the console.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recbench::backend::CommandBackend;
use recbench::cli::dispatch;
use recbench::config::Settings;
use recbench::device::get_device;
use recbench::emissions::EnergyTracker;
use recbench::experiment::ExperimentDriver;

#[derive(Parser)]
#[command(name = "recbench", about = "Recommender benchmark harness", version)]
struct Cli {
    /// Path to the settings file
    #[arg(long, env = "RECBENCH_CONFIG", default_value = "recbench.toml")]
    config: PathBuf,

    /// Experiment selection: --dataset=<name> --model=<name> (none = all pairs)
    #[arg(
        value_name = "SELECTION",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    selection: Vec<String>,
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let device = get_device();
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?
        .with_device(device);
    info!(
        config = %cli.config.display(),
        %device,
        datasets = settings.datasets().len(),
        models = settings.models().len(),
        "settings loaded"
    );

    let mut driver = ExperimentDriver::new(
        &settings,
        CommandBackend::new(settings.trainer.clone()),
        EnergyTracker::new(settings.emissions.clone()),
    );

    let summary = dispatch(&settings, cli.selection.as_slice(), &mut io::stdout(), |identity| {
        driver.process(identity)
    })?;

    if summary.total() > 0 {
        println!(
            "Finished {} experiment(s): {} completed, {} failed",
            summary.total(),
            summary.completed(),
            summary.failed()
        );
        for project in summary.failed_projects() {
            warn!(project = %project, "experiment failed");
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return;
        }
    };

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:?}");
    }
}
