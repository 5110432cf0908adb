/// Terrain endpoints: the point query (`POST /check-location`) and the
/// one-shot tile coverage listing (`GET /tiles-coverage`).

use crate::model::FetchError;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Point query
// ---------------------------------------------------------------------------

/// Request body for the point query. `discharge` is the currently committed
/// total discharge, supplied by the caller so flood depth reflects the live
/// hydrological state.
#[derive(Debug, Serialize)]
pub struct LocationQuery {
    pub lat: f64,
    pub lon: f64,
    pub discharge: f64,
}

/// Terrain/flood descriptor for a queried point. Everything except `found`
/// defaults, since a not-found response carries only `found` and `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainProbe {
    pub found: bool,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub is_river: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub flood_depth: f64,
    #[serde(default)]
    pub local_discharge: f64,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub water_level: f64,
}

pub fn build_location_url(base_url: &str) -> String {
    format!("{}/check-location", base_url)
}

pub fn parse_location_response(json: &str) -> Result<TerrainProbe, FetchError> {
    serde_json::from_str(json)
        .map_err(|e| FetchError::Parse(format!("JSON deserialization failed: {}", e)))
}

// ---------------------------------------------------------------------------
// Tile coverage
// ---------------------------------------------------------------------------

/// Footprint polygon of one terrain tile, as (lon, lat) rings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TileBounds {
    pub coords: Vec<[f64; 2]>,
    pub name: String,
}

pub fn build_tiles_url(base_url: &str) -> String {
    format!("{}/tiles-coverage", base_url)
}

pub fn parse_tiles_coverage(json: &str) -> Result<Vec<TileBounds>, FetchError> {
    serde_json::from_str(json)
        .map_err(|e| FetchError::Parse(format!("JSON deserialization failed: {}", e)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
