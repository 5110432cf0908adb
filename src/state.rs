/// State store: the single reconciled telemetry snapshot.
///
/// Each successful poll cycle builds a wholly new `TelemetrySnapshot` and
/// replaces the previous one under the lock; readers holding an `Arc` keep
/// a consistent record and never observe fields from two different cycles.
/// The overlap guard in the scheduler ensures there is only ever one writer.

use crate::ingest::predict::PredictionPayload;
use crate::model::{RiskLevel, TelemetrySnapshot};
use chrono::Utc;
use std::sync::{Arc, Mutex};

pub struct StateStore {
    current: Mutex<Arc<TelemetrySnapshot>>,
}

impl StateStore {
    /// Starts from the pre-first-poll snapshot.
    pub fn new() -> Self {
        StateStore {
            current: Mutex::new(Arc::new(TelemetrySnapshot::initial())),
        }
    }

    /// The snapshot current at the instant of the call. Cheap: clones the
    /// `Arc`, not the record.
    pub fn snapshot(&self) -> Arc<TelemetrySnapshot> {
        Arc::clone(&self.current.lock().unwrap())
    }

    /// Replaces the snapshot with one merged from `payload`.
    ///
    /// Fallback rules: slowly-changing fields absent from the payload keep
    /// the previous snapshot's value. Discharge, risk level, source, and the
    /// point set are authoritative per cycle: discharge absence was already
    /// rejected upstream as a fetch failure, and an absent point list means
    /// no active flood cells this cycle, not "reuse last cycle's cells".
    ///
    /// `risk_level` must be `risk::classify(payload.total_discharge_cusecs)`;
    /// the scheduler is the only caller and upholds that invariant.
    pub fn commit(
        &self,
        payload: &PredictionPayload,
        risk_level: RiskLevel,
        source: &str,
    ) -> Arc<TelemetrySnapshot> {
        let mut current = self.current.lock().unwrap();
        let prev = current.as_ref();

        let next = Arc::new(TelemetrySnapshot {
            rainfall_mm: payload.rainfall_mm.unwrap_or(prev.rainfall_mm),
            temperature_c: payload.temperature_c.unwrap_or(prev.temperature_c),
            humidity_pct: payload.humidity_pct.unwrap_or(prev.humidity_pct),
            wind_speed_kmh: payload.wind_speed_kmh.unwrap_or(prev.wind_speed_kmh),
            soil_moisture: payload.soil_moisture.unwrap_or(prev.soil_moisture),
            snow_depth_m: payload.snow_depth_m.unwrap_or(prev.snow_depth_m),
            dam_release_cusecs: payload.dam_release_cusecs.unwrap_or(prev.dam_release_cusecs),
            total_discharge_cusecs: payload.total_discharge_cusecs,
            risk_level,
            source: source.to_string(),
            advisory: payload
                .advisory
                .clone()
                .unwrap_or_else(|| prev.advisory.clone()),
            return_period: payload
                .return_period
                .clone()
                .unwrap_or_else(|| prev.return_period.clone()),
            population_at_risk: payload.population_at_risk.unwrap_or(prev.population_at_risk),
            lag_time_hours: payload.lag_time_hours.unwrap_or(prev.lag_time_hours),
            points: payload.points.clone(),
            updated_at: Utc::now(),
        });

        *current = Arc::clone(&next);
        next
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
