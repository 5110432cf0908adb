/// Distributed prediction endpoint client: URL construction and JSON
/// response parsing for `GET /predict-distributed`.
///
/// The backend's payload has a dynamic shape: most weather fields are
/// optional, `total_discharge_cusecs` is mandatory, and an `error` field may
/// replace the whole record. The raw serde struct models every field as
/// explicitly optional; `parse_prediction` converts it into a validated
/// `PredictionPayload` whose discharge is guaranteed present, so downstream
/// code never re-checks.

use crate::model::{DistributedPoint, FetchError, SimParams};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Serde structure for payload deserialization
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawPrediction {
    error: Option<String>,
    rainfall_input: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    soil_moisture: Option<f64>,
    snow_depth: Option<f64>,
    dam_release: Option<f64>,
    total_discharge_cusecs: Option<f64>,
    impact_people: Option<u64>,
    lag_time_hours: Option<f64>,
    advisory: Option<String>,
    return_period: Option<String>,
    #[serde(default)]
    distributed_points: Vec<DistributedPoint>,
}

// ---------------------------------------------------------------------------
// Validated payload
// ---------------------------------------------------------------------------

/// One decoded prediction cycle. Discharge is authoritative and always
/// present; every other field is optional and subject to the state store's
/// per-field fallback rules.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionPayload {
    pub rainfall_mm: Option<f64>,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub snow_depth_m: Option<f64>,
    pub dam_release_cusecs: Option<f64>,
    pub total_discharge_cusecs: f64,
    pub population_at_risk: Option<u64>,
    pub lag_time_hours: Option<f64>,
    pub advisory: Option<String>,
    pub return_period: Option<String>,
    pub points: Vec<DistributedPoint>,
}

#[cfg(test)]
impl PredictionPayload {
    /// Minimal payload for tests: just a discharge, everything else absent.
    pub fn bare(total_discharge_cusecs: f64) -> Self {
        PredictionPayload {
            rainfall_mm: None,
            temperature_c: None,
            humidity_pct: None,
            wind_speed_kmh: None,
            soil_moisture: None,
            snow_depth_m: None,
            dam_release_cusecs: None,
            total_discharge_cusecs,
            population_at_risk: None,
            lag_time_hours: None,
            advisory: None,
            return_period: None,
            points: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds the prediction URL. Simulation overrides ride along as query
/// parameters only when simulation mode is active; a LIVE fetch sends none.
pub fn build_prediction_url(base_url: &str, sim: Option<&SimParams>) -> String {
    match sim {
        Some(p) => format!(
            "{}/predict-distributed?sim_rain={}&sim_soil={}&sim_dam={}",
            base_url, p.rain_mm, p.soil_moisture, p.dam_release_cusecs
        ),
        None => format!("{}/predict-distributed", base_url),
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses a prediction response body into a validated payload.
///
/// # Errors
/// - `FetchError::Parse` — malformed or unexpected JSON.
/// - `FetchError::Backend` — the payload carried an `error` field.
/// - `FetchError::MissingDischarge` — `total_discharge_cusecs` was absent;
///   the whole cycle is treated as a failure, never defaulted.
pub fn parse_prediction(json: &str) -> Result<PredictionPayload, FetchError> {
    let raw: RawPrediction = serde_json::from_str(json)
        .map_err(|e| FetchError::Parse(format!("JSON deserialization failed: {}", e)))?;

    if let Some(message) = raw.error {
        return Err(FetchError::Backend(message));
    }

    let total_discharge_cusecs = raw
        .total_discharge_cusecs
        .ok_or(FetchError::MissingDischarge)?;

    Ok(PredictionPayload {
        rainfall_mm: raw.rainfall_input,
        temperature_c: raw.temperature,
        humidity_pct: raw.humidity,
        wind_speed_kmh: raw.wind_speed,
        soil_moisture: raw.soil_moisture,
        snow_depth_m: raw.snow_depth,
        dam_release_cusecs: raw.dam_release,
        total_discharge_cusecs,
        population_at_risk: raw.impact_people,
        lag_time_hours: raw.lag_time_hours,
        advisory: raw.advisory,
        return_period: raw.return_period,
        points: raw.distributed_points,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
