/// Core data types for the river sentinel monitoring client.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond value clamping and no I/O — only types.

use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Risk level
// ---------------------------------------------------------------------------

/// Discrete classification of current discharge, in ascending severity.
///
/// The numeric values (0/1/2) match the backend's wire encoding and are
/// what the status endpoint serializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum RiskLevel {
    Safe = 0,
    Warning = 1,
    Critical = 2,
}

impl RiskLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Safe => write!(f, "SAFE"),
            RiskLevel::Warning => write!(f, "WARNING"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

// ---------------------------------------------------------------------------
// Telemetry snapshot
// ---------------------------------------------------------------------------

/// One catchment point with its computed runoff, as delivered by the
/// distributed prediction payload and republished to the map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributedPoint {
    pub lat: f64,
    pub lon: f64,
    pub runoff_mm: f64,
}

/// The single reconciled view of weather and hydrology, produced once per
/// successful poll cycle and replaced wholesale by the next.
///
/// Snapshots are immutable once built; the state store hands them out as
/// `Arc<TelemetrySnapshot>` so no consumer ever observes a half-updated
/// record. Invariant: `risk_level` is always `risk::classify` applied to
/// `total_discharge_cusecs`, never set independently.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetrySnapshot {
    pub rainfall_mm: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_kmh: f64,
    pub soil_moisture: f64,
    pub snow_depth_m: f64,
    pub dam_release_cusecs: f64,
    pub total_discharge_cusecs: f64,
    pub risk_level: RiskLevel,
    /// Which model/path produced this snapshot, e.g. "SCS-CN/LIVE".
    pub source: String,
    pub advisory: String,
    pub return_period: String,
    pub population_at_risk: u64,
    pub lag_time_hours: f64,
    pub points: Vec<DistributedPoint>,
    pub updated_at: DateTime<Utc>,
}

impl TelemetrySnapshot {
    /// Pre-first-poll snapshot. Values mirror the backend's default
    /// environment container so the dashboard is plausible before the first
    /// cycle lands.
    pub fn initial() -> Self {
        TelemetrySnapshot {
            rainfall_mm: 0.0,
            temperature_c: 25.0,
            humidity_pct: 60.0,
            wind_speed_kmh: 5.0,
            soil_moisture: 0.2,
            snow_depth_m: 0.0,
            dam_release_cusecs: 0.0,
            total_discharge_cusecs: 5_000.0,
            risk_level: RiskLevel::Safe,
            source: "INIT".to_string(),
            advisory: "Normal Flow.".to_string(),
            return_period: "Normal".to_string(),
            population_at_risk: 0,
            lag_time_hours: 0.0,
            points: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation parameters
// ---------------------------------------------------------------------------

/// Upper bound for manual rain injection, in mm.
pub const SIM_RAIN_MAX_MM: f64 = 300.0;

/// Upper bound for the dam release override, in cusecs.
pub const SIM_DAM_MAX_CUSECS: f64 = 50_000.0;

/// Operator-supplied overrides applied while simulation mode is active.
///
/// Owned exclusively by the mode controller; the scheduler reads a copy at
/// invocation time. The soil slider in the UI runs 0–100 and is divided by
/// 100 before reaching the setter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    pub rain_mm: f64,
    pub soil_moisture: f64,
    pub dam_release_cusecs: f64,
}

impl SimParams {
    /// Builds a parameter set with every value clamped to its documented
    /// range: rain 0–300 mm, soil 0–1, dam release 0–50 000 cusecs.
    pub fn clamped(rain_mm: f64, soil_moisture: f64, dam_release_cusecs: f64) -> Self {
        SimParams {
            rain_mm: rain_mm.clamp(0.0, SIM_RAIN_MAX_MM),
            soil_moisture: soil_moisture.clamp(0.0, 1.0),
            dam_release_cusecs: dam_release_cusecs.clamp(0.0, SIM_DAM_MAX_CUSECS),
        }
    }
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            rain_mm: 0.0,
            soil_moisture: 0.0,
            dam_release_cusecs: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding backend payloads.
///
/// Every variant is recoverable: the acquisition loop abandons the cycle and
/// retries on the next tick, and a probe failure just leaves the inspector
/// empty.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Non-2xx HTTP response from the prediction backend.
    Http(u16),
    /// Transport-level failure (connect, timeout, body read).
    Network(String),
    /// The response body could not be deserialized.
    Parse(String),
    /// The backend reported an error inside an otherwise-valid payload.
    Backend(String),
    /// A prediction payload arrived without `total_discharge_cusecs`.
    MissingDischarge,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Http(code) => write!(f, "HTTP error: {}", code),
            FetchError::Network(msg) => write!(f, "Network error: {}", msg),
            FetchError::Parse(msg) => write!(f, "Parse error: {}", msg),
            FetchError::Backend(msg) => write!(f, "Backend error: {}", msg),
            FetchError::MissingDischarge => {
                write!(f, "Payload missing required total_discharge_cusecs")
            }
        }
    }
}

impl std::error::Error for FetchError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
