//! Experiment driver - one (dataset, model) run from folders to CSV rows

use std::path::PathBuf;

use serde_json::Value;
use tracing::{error, info, info_span, warn};

use super::checkpoint::latest_checkpoint;
use super::log::ExperimentLog;
use super::{ExperimentIdentity, ExperimentOutcome, ExperimentReport, RunConfig};
use crate::backend::Recommender;
use crate::config::Settings;
use crate::emissions::{track, EmissionsTracker, TrackingScope, RUN_ID_FIELD};
use crate::layout::create_folders;
use crate::results::{PendingRow, Record};
use crate::Result;

/// Field tagging metrics and parameter rows with their project.
pub const PROJECT_NAME_FIELD: &str = "project_name";

/// Runs experiments one at a time against a backend and a tracker.
///
/// Failures never escape [`ExperimentDriver::process`]: they are printed,
/// appended to the experiment log and returned as
/// [`ExperimentOutcome::Failed`], so a batch can move on.
pub struct ExperimentDriver<'a, R, T> {
    settings: &'a Settings,
    backend: R,
    tracker: T,
}

impl<'a, R, T> ExperimentDriver<'a, R, T>
where
    R: Recommender,
    T: EmissionsTracker,
{
    /// Create a driver.
    #[must_use]
    pub const fn new(settings: &'a Settings, backend: R, tracker: T) -> Self {
        Self {
            settings,
            backend,
            tracker,
        }
    }

    /// Backend in use.
    #[must_use]
    pub const fn backend(&self) -> &R {
        &self.backend
    }

    /// Run one experiment to completion or failure.
    pub fn process(&mut self, identity: &ExperimentIdentity) -> ExperimentOutcome {
        let project = identity.project_name();
        let span = info_span!("experiment", project = %project);
        let _entered = span.enter();

        let mut log = match self.open_session(identity) {
            Ok(log) => log,
            Err(err) => {
                error!(error = %err, "could not prepare experiment");
                eprintln!("{err:?}");
                return ExperimentOutcome::Failed {
                    identity: identity.clone(),
                    reason: err.to_string(),
                };
            }
        };
        println!("executing {project}");

        let outcome = match self.run(identity, &project, &mut log) {
            Ok(report) => {
                info!(run_id = report.run_id(), "experiment completed");
                ExperimentOutcome::Completed(report)
            }
            Err(err) => {
                eprintln!("{err:?}");
                let reason = err.to_string();
                if let Err(log_err) = log.failed(&project, &reason) {
                    warn!(error = %log_err, "could not write error line to experiment log");
                }
                println!("ERROR: {project}. {reason}");
                error!(%reason, "experiment failed");
                ExperimentOutcome::Failed {
                    identity: identity.clone(),
                    reason,
                }
            }
        };

        if let Err(err) = log.close() {
            warn!(error = %err, "could not close experiment log");
        }
        outcome
    }

    fn open_session(&self, identity: &ExperimentIdentity) -> Result<ExperimentLog> {
        let output = &self.settings.output;
        create_folders(
            &[identity.dataset()],
            &[identity.model()],
            &[output.result_path.clone(), self.settings.checkpoint_root()],
        )?;

        let mut log = ExperimentLog::open(&output.log_file)?;
        log.session_started()?;
        Ok(log)
    }

    fn run(
        &mut self,
        identity: &ExperimentIdentity,
        project: &str,
        log: &mut ExperimentLog,
    ) -> Result<ExperimentReport> {
        let output = &self.settings.output;
        let run_config = RunConfig::for_run(
            &self.settings.params,
            identity,
            &self.settings.checkpoint_root(),
        );
        let results_dir = output.result_path.join(identity.relative_dir());
        let scope = TrackingScope::new(project, results_dir.join(&output.emissions_file));

        let backend = &self.backend;
        let ((), emissions) = track(&mut self.tracker, &scope, || {
            backend.train(identity.model(), identity.dataset(), &run_config)
        })?;

        log.executed(project)?;
        println!("EXECUTED: {project}");

        let checkpoint = latest_checkpoint(run_config.checkpoint_dir())?;
        info!(checkpoint = %checkpoint.display(), "evaluating checkpoint");
        let loaded = self.backend.load_checkpoint(&checkpoint)?;
        let mut metrics = self.backend.evaluate(&loaded)?;

        let mut params = run_config.params().clone();
        params.extend(loaded.config().iter().map(|(k, v)| (k.clone(), v.clone())));

        tag(&mut metrics, emissions.run_id(), project);
        tag(&mut params, emissions.run_id(), project);

        let metrics_file: PathBuf = results_dir.join(&output.metrics_file);
        let params_file: PathBuf = results_dir.join(&output.params_file);
        let metrics_row = PendingRow::prepare(&metrics_file, &metrics)?;
        let params_row = PendingRow::prepare(&params_file, &params)?;
        metrics_row.commit()?;
        params_row.commit()?;

        Ok(ExperimentReport::new(
            identity.clone(),
            emissions.run_id(),
            metrics,
            params,
            metrics_file,
            params_file,
        ))
    }
}

fn tag(record: &mut Record, run_id: &str, project: &str) {
    record.insert(RUN_ID_FIELD.to_string(), Value::from(run_id));
    record.insert(PROJECT_NAME_FIELD.to_string(), Value::from(project));
}
