/// Forecast endpoint client (`GET /get-forecast`).
///
/// The chart collaborator consumes an ordered sequence of (time, discharge)
/// pairs. The backend decorates each entry with extra fields (hourly rain,
/// per-hour risk); those are ignored here and only the pair the chart needs
/// is decoded.

use crate::model::FetchError;
use serde::{Deserialize, Serialize};

/// One forecast step, in payload order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub time: String,
    pub discharge: f64,
}

/// Builds the forecast URL, carrying the rain override only in simulation.
pub fn build_forecast_url(base_url: &str, sim_rain_mm: Option<f64>) -> String {
    match sim_rain_mm {
        Some(rain) => format!("{}/get-forecast?sim_rain={}", base_url, rain),
        None => format!("{}/get-forecast", base_url),
    }
}

pub fn parse_forecast(json: &str) -> Result<Vec<ForecastPoint>, FetchError> {
    serde_json::from_str(json)
        .map_err(|e| FetchError::Parse(format!("JSON deserialization failed: {}", e)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
