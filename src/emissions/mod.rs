//! Energy and emissions tracking around training calls
//!
//! A tracker measures one region of work at a time. [`track`] guarantees the
//! region is closed again even when the wrapped work fails, so a tracker is
//! never left running across experiments.
//!
//! ```rust,no_run
//! use recbench::config::EmissionsSettings;
//! use recbench::emissions::{track, EnergyTracker, TrackingScope};
//!
//! let mut tracker = EnergyTracker::new(EmissionsSettings::default());
//! let scope = TrackingScope::new("ML-100K_BPR_DEFAULT_PARAM", "results/ml-100k/BPR/emissions.csv");
//! let ((), record) = track(&mut tracker, &scope, || Ok(()))?;
//! println!("run {}", record.run_id());
//! # Ok::<(), recbench::Error>(())
//! ```

mod energy;

pub use energy::{estimate, EnergyEstimate, EnergyTracker};

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::results::Record;
use crate::Result;

/// Field holding the run identifier in every emissions record.
pub const RUN_ID_FIELD: &str = "run_id";

/// What a tracked region is attributed to, and where its record goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingScope {
    project_name: String,
    output_file: PathBuf,
}

impl TrackingScope {
    /// Create a scope for `project_name`, persisting to `output_file`.
    #[must_use]
    pub fn new(project_name: impl Into<String>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            project_name: project_name.into(),
            output_file: output_file.into(),
        }
    }

    /// Project the measurement is attributed to.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Emissions CSV the tracker appends to.
    #[must_use]
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }
}

/// Snapshot produced when a tracked region stops.
///
/// Opaque apart from its run identifier, which correlates the metrics,
/// parameters and emissions rows of one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionsRecord {
    run_id: String,
    fields: Record,
}

impl EmissionsRecord {
    /// Create a record; `run_id` is stored as its first field.
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        let run_id = run_id.into();
        let mut fields = Record::new();
        fields.insert(RUN_ID_FIELD.to_string(), Value::from(run_id.clone()));
        Self { run_id, fields }
    }

    /// Add a field; `run_id` cannot be overwritten.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != RUN_ID_FIELD {
            self.fields.insert(key, value.into());
        }
        self
    }

    /// Run identifier.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// All fields in recording order.
    #[must_use]
    pub const fn fields(&self) -> &Record {
        &self.fields
    }
}

/// Measures the energy use of one region of work at a time.
pub trait EmissionsTracker {
    /// Open a measured region.
    ///
    /// # Errors
    ///
    /// Returns an error if a region is already open.
    fn start(&mut self, scope: &TrackingScope) -> Result<()>;

    /// Close the open region and return its snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if no region is open or the record cannot be
    /// persisted.
    fn stop(&mut self) -> Result<EmissionsRecord>;
}

impl<T: EmissionsTracker + ?Sized> EmissionsTracker for &mut T {
    fn start(&mut self, scope: &TrackingScope) -> Result<()> {
        (**self).start(scope)
    }

    fn stop(&mut self) -> Result<EmissionsRecord> {
        (**self).stop()
    }
}

/// Run `work` inside a measured region.
///
/// The region is stopped whether or not `work` succeeds. An error from
/// `work` takes precedence over an error from stopping.
///
/// # Errors
///
/// Returns the first error from starting the tracker, from `work`, or from
/// stopping the tracker.
pub fn track<Tr, T, F>(tracker: &mut Tr, scope: &TrackingScope, work: F) -> Result<(T, EmissionsRecord)>
where
    Tr: EmissionsTracker + ?Sized,
    F: FnOnce() -> Result<T>,
{
    tracker.start(scope)?;
    let outcome = work();
    let stopped = tracker.stop();
    let value = outcome?;
    Ok((value, stopped?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[derive(Default)]
    struct CountingTracker {
        starts: usize,
        stops: usize,
        open: bool,
    }

    impl EmissionsTracker for CountingTracker {
        fn start(&mut self, _scope: &TrackingScope) -> Result<()> {
            self.starts += 1;
            self.open = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<EmissionsRecord> {
            self.stops += 1;
            self.open = false;
            Ok(EmissionsRecord::new(format!("run-{}", self.stops)))
        }
    }

    fn scope() -> TrackingScope {
        TrackingScope::new("D_M_DEFAULT_PARAM", "emissions.csv")
    }

    #[test]
    fn test_track_returns_value_and_record() {
        let mut tracker = CountingTracker::default();

        let (value, record) = track(&mut tracker, &scope(), || Ok(7)).unwrap();

        assert_eq!(value, 7);
        assert_eq!(record.run_id(), "run-1");
        assert_eq!((tracker.starts, tracker.stops), (1, 1));
    }

    #[test]
    fn test_track_stops_on_failure() {
        let mut tracker = CountingTracker::default();

        let result: Result<((), EmissionsRecord)> =
            track(&mut tracker, &scope(), || Err(Error::Other("boom".into())));

        assert_eq!(result.unwrap_err().to_string(), "boom");
        assert_eq!(tracker.stops, 1);
        assert!(!tracker.open);
    }

    #[test]
    fn test_record_run_id_is_protected() {
        let record = EmissionsRecord::new("abc")
            .with_field("duration", 1.5)
            .with_field(RUN_ID_FIELD, "other");

        assert_eq!(record.run_id(), "abc");
        assert_eq!(record.fields()[RUN_ID_FIELD], "abc");
        assert_eq!(record.fields().len(), 2);
    }
}
