//! Built-in energy estimator
//!
//! Estimates consumption from wall-clock duration and a fixed power model
//! (CPU, GPU and RAM draw), then converts energy to CO2-equivalent with a
//! grid carbon intensity. Each stopped region is appended to the scope's
//! emissions CSV.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::{EmissionsRecord, EmissionsTracker, TrackingScope};
use crate::config::EmissionsSettings;
use crate::results::write_record;
use crate::{Error, Result};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Energy and emissions for one measured duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyEstimate {
    /// CPU energy in kWh.
    pub cpu_energy_kwh: f64,
    /// GPU energy in kWh.
    pub gpu_energy_kwh: f64,
    /// RAM energy in kWh.
    pub ram_energy_kwh: f64,
    /// Emissions in kg CO2eq.
    pub emissions_kg: f64,
}

impl EnergyEstimate {
    /// Total energy in kWh.
    #[must_use]
    pub fn energy_consumed_kwh(&self) -> f64 {
        self.cpu_energy_kwh + self.gpu_energy_kwh + self.ram_energy_kwh
    }
}

/// Estimate energy and emissions for `duration_secs` under `settings`.
#[must_use]
pub fn estimate(settings: &EmissionsSettings, duration_secs: f64) -> EnergyEstimate {
    let hours = duration_secs.max(0.0) / SECONDS_PER_HOUR;
    let kwh = |watts: f64| watts.max(0.0) * hours / 1000.0;

    let cpu_energy_kwh = kwh(settings.cpu_power_watts);
    let gpu_energy_kwh = kwh(settings.gpu_power_watts);
    let ram_energy_kwh = kwh(settings.ram_power_watts);
    let total = cpu_energy_kwh + gpu_energy_kwh + ram_energy_kwh;

    EnergyEstimate {
        cpu_energy_kwh,
        gpu_energy_kwh,
        ram_energy_kwh,
        emissions_kg: total * settings.carbon_intensity_g_per_kwh / 1000.0,
    }
}

#[derive(Debug)]
struct OpenRegion {
    scope: TrackingScope,
    run_id: Uuid,
    started: Instant,
    started_at: DateTime<Utc>,
}

/// Tracker estimating consumption from a configured power model.
#[derive(Debug)]
pub struct EnergyTracker {
    settings: EmissionsSettings,
    open: Option<OpenRegion>,
}

impl EnergyTracker {
    /// Create an idle tracker.
    #[must_use]
    pub const fn new(settings: EmissionsSettings) -> Self {
        Self {
            settings,
            open: None,
        }
    }

    /// Whether a region is currently open.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.open.is_some()
    }
}

impl EmissionsTracker for EnergyTracker {
    fn start(&mut self, scope: &TrackingScope) -> Result<()> {
        if let Some(open) = &self.open {
            return Err(Error::Tracker(format!(
                "region for {} is still open",
                open.scope.project_name()
            )));
        }
        let run_id = Uuid::new_v4();
        debug!(project = scope.project_name(), %run_id, "emissions tracking started");
        self.open = Some(OpenRegion {
            scope: scope.clone(),
            run_id,
            started: Instant::now(),
            started_at: Utc::now(),
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<EmissionsRecord> {
        let open = self
            .open
            .take()
            .ok_or_else(|| Error::Tracker("stop called without start".into()))?;

        let duration = open.started.elapsed().as_secs_f64();
        let energy = estimate(&self.settings, duration);
        let rate = if duration > 0.0 {
            energy.emissions_kg / duration
        } else {
            0.0
        };
        let cpu_count = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);

        let record = EmissionsRecord::new(open.run_id.to_string())
            .with_field("timestamp", open.started_at.to_rfc3339())
            .with_field("project_name", open.scope.project_name())
            .with_field("duration", duration)
            .with_field("emissions", energy.emissions_kg)
            .with_field("emissions_rate", rate)
            .with_field("cpu_power", self.settings.cpu_power_watts)
            .with_field("gpu_power", self.settings.gpu_power_watts)
            .with_field("ram_power", self.settings.ram_power_watts)
            .with_field("cpu_energy", energy.cpu_energy_kwh)
            .with_field("gpu_energy", energy.gpu_energy_kwh)
            .with_field("ram_energy", energy.ram_energy_kwh)
            .with_field("energy_consumed", energy.energy_consumed_kwh())
            .with_field("country_iso_code", self.settings.country_iso_code.as_str())
            .with_field("os", std::env::consts::OS)
            .with_field("cpu_count", cpu_count)
            .with_field("tracking_mode", "process");

        write_record(open.scope.output_file(), record.fields())?;
        info!(
            project = open.scope.project_name(),
            run_id = record.run_id(),
            duration_secs = duration,
            emissions_kg = energy.emissions_kg,
            "emissions recorded"
        );
        Ok(record)
    }
}
