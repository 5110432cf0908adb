/// Test fixtures: representative JSON payloads from the prediction backend.
///
/// These are structurally complete but truncated to the minimum needed to
/// exercise the parsers. Shapes mirror what the backend actually returns:
/// a flat JSON object for `/predict-distributed` (optional weather fields,
/// mandatory `total_discharge_cusecs`, or an `error` field instead), a flat
/// object for `/check-location`, and arrays for `/get-forecast` and
/// `/tiles-coverage`.

/// Fully populated prediction payload, discharge above the critical
/// threshold.
#[cfg(test)]
pub(crate) fn fixture_full_prediction_json() -> &'static str {
    r#"{
      "rainfall_input": 180.0,
      "temperature": 24.5,
      "humidity": 88.0,
      "wind_speed": 14.2,
      "soil_moisture": 0.41,
      "snow_depth": 0.05,
      "dam_release": 12000.0,
      "total_discharge_cusecs": 162400.0,
      "impact_people": 45000,
      "lag_time_hours": 6.5,
      "advisory": "CRITICAL: High Saturation detected.",
      "return_period": "1-in-50 Year Event",
      "risk_level": 2,
      "confidence": 97.2,
      "distributed_points": [
        { "lat": 29.956, "lon": 78.18, "runoff_mm": 42.3, "status": 2, "elevation": 294.1 },
        { "lat": 29.961, "lon": 78.19, "runoff_mm": 17.8, "status": 1, "elevation": 297.6 }
      ]
    }"#
}

/// Prediction payload with only the mandatory discharge plus rainfall;
/// exercises the per-field fallback path.
#[cfg(test)]
pub(crate) fn fixture_sparse_prediction_json() -> &'static str {
    r#"{
      "rainfall_input": 12.0,
      "total_discharge_cusecs": 52000.0
    }"#
}

/// Structurally valid payload whose required discharge field is absent.
/// Must be treated as a cycle failure, never defaulted.
#[cfg(test)]
pub(crate) fn fixture_missing_discharge_json() -> &'static str {
    r#"{
      "rainfall_input": 30.0,
      "temperature": 22.0,
      "humidity": 70.0
    }"#
}

/// Backend-reported failure: the payload is just an error message.
#[cfg(test)]
pub(crate) fn fixture_backend_error_json() -> &'static str {
    r#"{ "error": "model not loaded" }"#
}

/// Point query hit inside the inundated floodplain.
#[cfg(test)]
pub(crate) fn fixture_location_found_json() -> &'static str {
    r#"{
      "found": true,
      "elevation": 293.125,
      "is_river": true,
      "status": "Inundated Floodplain",
      "flood_depth": 1.21,
      "local_discharge": 91500.0,
      "source": "tile_ne_441.tif",
      "water_level": 294.33
    }"#
}

/// Point query outside tile coverage: only `found` and `source` come back.
#[cfg(test)]
pub(crate) fn fixture_location_not_found_json() -> &'static str {
    r#"{ "found": false, "source": "Outside" }"#
}

/// Three forecast steps climbing through the WARNING band.
#[cfg(test)]
pub(crate) fn fixture_forecast_json() -> &'static str {
    r#"[
      { "time": "14:00", "rain": 10.0, "discharge": 52000.0, "risk": 0 },
      { "time": "15:00", "rain": 42.0, "discharge": 96000.0, "risk": 1 },
      { "time": "16:00", "rain": 80.0, "discharge": 151000.0, "risk": 2 }
    ]"#
}

/// Two tile footprints as closed (lon, lat) rings.
#[cfg(test)]
pub(crate) fn fixture_tiles_coverage_json() -> &'static str {
    r#"[
      {
        "coords": [[78.12, 30.01], [78.24, 30.01], [78.24, 29.90], [78.12, 29.90], [78.12, 30.01]],
        "name": "tile_ne_441.tif"
      },
      {
        "coords": [[78.24, 30.01], [78.36, 30.01], [78.36, 29.90], [78.24, 29.90], [78.24, 30.01]],
        "name": "tile_ne_442.tif"
      }
    ]"#
}
