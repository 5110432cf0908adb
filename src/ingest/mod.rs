/// Prediction backend client layer.
///
/// Each endpoint gets its own file: URL construction, serde structures with
/// explicitly optional fields, and parse functions, each testable without a
/// network. `PredictionBackend` is the seam the scheduler and probe are
/// built against; `HttpBackend` is the production implementation over a
/// blocking reqwest client, injected explicitly rather than reached through
/// module-level globals.

pub mod fixtures;
pub mod forecast;
pub mod predict;
pub mod terrain;

use crate::model::{FetchError, SimParams};
use forecast::ForecastPoint;
use predict::PredictionPayload;
use std::time::Duration;
use terrain::{LocationQuery, TerrainProbe, TileBounds};

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

/// Everything the core needs from the prediction backend. Implementations
/// must be shareable across the scheduler's worker threads.
pub trait PredictionBackend: Send + Sync {
    /// One prediction cycle. `sim` carries the simulation overrides when
    /// simulation mode is active, `None` on a LIVE fetch.
    fn fetch_prediction(&self, sim: Option<&SimParams>) -> Result<PredictionPayload, FetchError>;

    /// Terrain/flood descriptor for a point, computed against the supplied
    /// discharge.
    fn check_location(&self, lat: f64, lon: f64, discharge: f64)
    -> Result<TerrainProbe, FetchError>;

    /// Ordered (time, discharge) forecast steps.
    fn fetch_forecast(&self, sim_rain_mm: Option<f64>) -> Result<Vec<ForecastPoint>, FetchError>;

    /// Terrain tile footprints, consumed once at startup.
    fn fetch_tile_coverage(&self) -> Result<Vec<TileBounds>, FetchError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the prediction backend.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpBackend {
    /// Builds a client with the given request timeout. The base URL keeps
    /// no trailing slash so the URL builders can join paths uniformly.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(HttpBackend {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        response.text().map_err(|e| FetchError::Network(e.to_string()))
    }
}

impl PredictionBackend for HttpBackend {
    fn fetch_prediction(&self, sim: Option<&SimParams>) -> Result<PredictionPayload, FetchError> {
        let url = predict::build_prediction_url(&self.base_url, sim);
        let body = self.get_body(&url)?;
        predict::parse_prediction(&body)
    }

    fn check_location(
        &self,
        lat: f64,
        lon: f64,
        discharge: f64,
    ) -> Result<TerrainProbe, FetchError> {
        let url = terrain::build_location_url(&self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LocationQuery { lat, lon, discharge })
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let body = response.text().map_err(|e| FetchError::Network(e.to_string()))?;
        terrain::parse_location_response(&body)
    }

    fn fetch_forecast(&self, sim_rain_mm: Option<f64>) -> Result<Vec<ForecastPoint>, FetchError> {
        let url = forecast::build_forecast_url(&self.base_url, sim_rain_mm);
        let body = self.get_body(&url)?;
        forecast::parse_forecast(&body)
    }

    fn fetch_tile_coverage(&self) -> Result<Vec<TileBounds>, FetchError> {
        let url = terrain::build_tiles_url(&self.base_url);
        let body = self.get_body(&url)?;
        terrain::parse_tiles_coverage(&body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let backend = HttpBackend::new("http://127.0.0.1:5000/", Duration::from_secs(5))
            .expect("client construction should succeed");
        assert_eq!(backend.base_url(), "http://127.0.0.1:5000");
    }
}
