//! Command-line selection of experiments
//!
//! With no selection tokens every configured (dataset, model) pair runs,
//! datasets in the outer loop. Otherwise both `--dataset=<name>` and
//! `--model=<name>` are required; the key is everything before the first
//! `=` minus its two leading characters, matched case-insensitively.
//! Invalid or missing values produce a warning and run nothing.

use std::io::{self, Write};

use crate::config::Settings;
use crate::experiment::{BatchSummary, ExperimentIdentity, ExperimentOutcome};

const DATASET_KEY: &str = "DATASET";
const MODEL_KEY: &str = "MODEL";

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Run every configured pair.
    Batch,
    /// Run one validated pair.
    Single(ExperimentIdentity),
    /// The dataset is not allow-listed.
    InvalidDataset(String),
    /// The model is not allow-listed.
    InvalidModel(String),
    /// One or both required keys were not given.
    Missing {
        /// `DATASET` absent.
        dataset: bool,
        /// `MODEL` absent.
        model: bool,
    },
}

fn split_token(token: &str) -> (String, &str) {
    let (key, value) = token.split_once('=').unwrap_or((token, ""));
    let key = key.chars().skip(2).collect::<String>().to_uppercase();
    (key, value)
}

/// Interpret selection tokens against the allow-lists in `settings`.
#[must_use]
pub fn parse_selection<S: AsRef<str>>(args: &[S], settings: &Settings) -> Selection {
    if args.is_empty() {
        return Selection::Batch;
    }

    let pairs: Vec<(String, &str)> = args.iter().map(|a| split_token(a.as_ref())).collect();
    let lookup = |wanted: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == wanted)
            .map(|(_, value)| *value)
    };

    let (dataset, model) = match (lookup(DATASET_KEY), lookup(MODEL_KEY)) {
        (Some(dataset), Some(model)) => (dataset, model),
        (dataset, model) => {
            return Selection::Missing {
                dataset: dataset.is_none(),
                model: model.is_none(),
            }
        }
    };

    if !settings.datasets().iter().any(|d| d == dataset) {
        Selection::InvalidDataset(dataset.to_string())
    } else if !settings.models().iter().any(|m| m == model) {
        Selection::InvalidModel(model.to_string())
    } else {
        Selection::Single(ExperimentIdentity::new(dataset, model))
    }
}

/// Print the warning for a selection that runs nothing.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn report_rejection(selection: &Selection, settings: &Settings, out: &mut impl Write) -> io::Result<()> {
    match selection {
        Selection::InvalidDataset(_) => {
            writeln!(out, "WARNING: invalid DATASET value!")?;
            writeln!(out, "Valid:  {:?}", settings.datasets())?;
        }
        Selection::InvalidModel(_) => {
            writeln!(out, "WARNING: invalid MODEL value!")?;
            writeln!(out, "Valid:  {:?}", settings.models())?;
        }
        Selection::Missing { dataset, model } => {
            writeln!(out, "WARNING: required arguments are missing!")?;
            if *dataset {
                writeln!(out, "MISSING: DATASET=\"\"")?;
            }
            if *model {
                writeln!(out, "MISSING: MODEL=\"\"")?;
            }
        }
        Selection::Batch | Selection::Single(_) => {}
    }
    Ok(())
}

/// Run whatever `args` select, strictly one experiment at a time.
///
/// `run` is called once per selected pair; warnings for rejected
/// selections go to `out`.
///
/// # Errors
///
/// Returns an error only if writing a warning to `out` fails.
pub fn dispatch<S, W, F>(settings: &Settings, args: &[S], out: &mut W, mut run: F) -> io::Result<BatchSummary>
where
    S: AsRef<str>,
    W: Write,
    F: FnMut(&ExperimentIdentity) -> ExperimentOutcome,
{
    let mut summary = BatchSummary::new();
    match parse_selection(args, settings) {
        Selection::Batch => {
            for dataset in settings.datasets() {
                for model in settings.models() {
                    summary.record(&run(&ExperimentIdentity::new(dataset, model)));
                }
            }
        }
        Selection::Single(identity) => summary.record(&run(&identity)),
        rejected => report_rejection(&rejected, settings, out)?,
    }
    Ok(summary)
}
