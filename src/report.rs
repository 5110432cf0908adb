/// Report snapshot: a consistent point-in-time copy for document
/// generation.
///
/// The document renderer is an external collaborator; the core's job is to
/// hand it a copy that cannot change under it mid-render. `capture` reads
/// the state store's current `Arc` (one consistent record) plus the mode
/// controller, clones both into an owned value, and appends the
/// report-generation entry.

use crate::eventlog::EventLog;
use crate::mode::ModeController;
use crate::model::TelemetrySnapshot;
use crate::state::StateStore;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ReportSnapshot {
    pub generated_at: DateTime<Utc>,
    pub telemetry: TelemetrySnapshot,
    pub simulation_mode: bool,
    pub sim_rain_mm: f64,
}

/// Captures the current situation for the report renderer.
pub fn capture(state: &StateStore, mode: &ModeController, log: &EventLog) -> ReportSnapshot {
    let telemetry = state.snapshot().as_ref().clone();
    let simulation_mode = mode.current_mode();
    let sim_rain_mm = mode.current_params().rain_mm;

    log.append("Generated situation report.");

    ReportSnapshot {
        generated_at: Utc::now(),
        telemetry,
        simulation_mode,
        sim_rain_mm,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
