/// HTTP surface for the monitoring core.
///
/// The dashboard and analysis tools are external collaborators; everything
/// they need (the reconciled state, the event log, the map update, the
/// forecast, the terrain probe, and the two operator controls) is served
/// here so the core stays headless.
///
/// Endpoints:
/// - GET  /health            - Service health check
/// - GET  /state             - Current telemetry snapshot
/// - GET  /events            - Event log, newest first
/// - GET  /map               - Map layer update (GeoJSON features + paint scheme)
/// - GET  /forecast          - Forecast steps (simulation rain applied when active)
/// - GET  /report            - Point-in-time report snapshot
/// - GET  /probe?lat=N&lon=N - Terrain/flood descriptor at a point
/// - POST /mode              - {"simulation": bool}
/// - POST /sim-params        - {"rain_mm": N, "soil_moisture": F, "dam_release_cusecs": N}

use crate::eventlog::EventLog;
use crate::ingest::PredictionBackend;
use crate::mapsync;
use crate::mode::ModeController;
use crate::probe::LocationProbe;
use crate::report;
use crate::state::StateStore;
use serde::Deserialize;
use std::io::Read;
use std::sync::Arc;
use tiny_http::Method;

/// Everything the routes need, injected once at server start.
pub struct EndpointContext {
    pub state: Arc<StateStore>,
    pub log: Arc<EventLog>,
    pub mode: Arc<ModeController>,
    pub probe: Arc<LocationProbe>,
    pub backend: Arc<dyn PredictionBackend>,
}

// ---------------------------------------------------------------------------
// Read-only bodies
// ---------------------------------------------------------------------------

fn health_json() -> serde_json::Value {
    serde_json::json!({
        "status": "ok",
        "service": "sentinel_service",
        "version": env!("CARGO_PKG_VERSION"),
    })
}

fn state_json(state: &StateStore) -> serde_json::Value {
    serde_json::to_value(state.snapshot().as_ref())
        .expect("telemetry snapshot serialization cannot fail")
}

fn events_json(log: &EventLog) -> serde_json::Value {
    serde_json::to_value(log.snapshot()).expect("event log serialization cannot fail")
}

fn map_json(state: &StateStore) -> serde_json::Value {
    serde_json::to_value(mapsync::build_update(&state.snapshot()))
        .expect("map update serialization cannot fail")
}

fn report_json(ctx: &EndpointContext) -> serde_json::Value {
    serde_json::to_value(report::capture(&ctx.state, &ctx.mode, &ctx.log))
        .expect("report serialization cannot fail")
}

fn not_found_json() -> serde_json::Value {
    serde_json::json!({
        "error": "Not found",
        "available_endpoints": [
            "/health", "/state", "/events", "/map", "/forecast", "/report",
            "/probe?lat=N&lon=N", "POST /mode", "POST /sim-params",
        ],
    })
}

// ---------------------------------------------------------------------------
// Forecast route
// ---------------------------------------------------------------------------

fn handle_forecast(ctx: &EndpointContext) -> (u16, serde_json::Value) {
    // The forecast honors the rain override while simulation is active,
    // read at request time like every other mode-dependent path.
    let sim_rain = if ctx.mode.current_mode() {
        Some(ctx.mode.current_params().rain_mm)
    } else {
        None
    };

    match ctx.backend.fetch_forecast(sim_rain) {
        Ok(points) => (
            200,
            serde_json::to_value(points).expect("forecast serialization cannot fail"),
        ),
        Err(e) => (502, serde_json::json!({ "error": e.to_string() })),
    }
}

// ---------------------------------------------------------------------------
// Probe route
// ---------------------------------------------------------------------------

/// Extracts (lat, lon) from a `/probe?lat=N&lon=N` URL. Order of the query
/// parameters does not matter; anything else yields `None`.
fn parse_probe_params(url: &str) -> Option<(f64, f64)> {
    let query = url.split_once('?')?.1;
    let mut lat = None;
    let mut lon = None;

    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("lat", value)) => lat = value.parse().ok(),
            Some(("lon", value)) => lon = value.parse().ok(),
            _ => {}
        }
    }

    Some((lat?, lon?))
}

fn handle_probe(probe: &LocationProbe, url: &str) -> (u16, serde_json::Value) {
    let Some((lat, lon)) = parse_probe_params(url) else {
        return (
            400,
            serde_json::json!({ "error": "expected /probe?lat=N&lon=N" }),
        );
    };

    match probe.query(lat, lon) {
        Some(descriptor) => (
            200,
            serde_json::to_value(&descriptor).expect("probe serialization cannot fail"),
        ),
        // Empty inspector: outside coverage or the query failed.
        None => (404, serde_json::json!({ "found": false })),
    }
}

// ---------------------------------------------------------------------------
// Operator controls
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ModeRequest {
    simulation: bool,
}

fn handle_mode(ctx: &EndpointContext, body: &str) -> (u16, serde_json::Value) {
    match serde_json::from_str::<ModeRequest>(body) {
        Ok(req) => {
            ctx.mode.set_mode(req.simulation);
            (200, serde_json::json!({ "simulation": req.simulation }))
        }
        Err(_) => (
            400,
            serde_json::json!({ "error": "expected {\"simulation\": bool}" }),
        ),
    }
}

/// Absent fields keep their current values, so a UI can drive one slider at
/// a time.
#[derive(Deserialize)]
struct SimParamsRequest {
    rain_mm: Option<f64>,
    soil_moisture: Option<f64>,
    dam_release_cusecs: Option<f64>,
}

fn handle_sim_params(ctx: &EndpointContext, body: &str) -> (u16, serde_json::Value) {
    let req = match serde_json::from_str::<SimParamsRequest>(body) {
        Ok(req) => req,
        Err(_) => {
            return (
                400,
                serde_json::json!({ "error": "expected sim parameter object" }),
            );
        }
    };

    let current = ctx.mode.current_params();
    ctx.mode.set_sim_params(
        req.rain_mm.unwrap_or(current.rain_mm),
        req.soil_moisture.unwrap_or(current.soil_moisture),
        req.dam_release_cusecs.unwrap_or(current.dam_release_cusecs),
    );

    let updated = ctx.mode.current_params();
    (
        200,
        serde_json::json!({
            "rain_mm": updated.rain_mm,
            "soil_moisture": updated.soil_moisture,
            "dam_release_cusecs": updated.dam_release_cusecs,
        }),
    )
}

// ---------------------------------------------------------------------------
// HTTP server
// ---------------------------------------------------------------------------

/// Starts the status server and serves requests until the process exits.
pub fn start_endpoint_server(port: u16, ctx: EndpointContext) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    println!("📡 Endpoint listening on http://0.0.0.0:{}", port);
    println!("   GET  /health /state /events /map /forecast /report");
    println!("   GET  /probe?lat=N&lon=N");
    println!("   POST /mode /sim-params\n");

    for mut request in server.incoming_requests() {
        let url = request.url().to_string();
        let method = request.method().clone();

        let (status, body) = match (&method, url.as_str()) {
            (Method::Get, "/health") => (200, health_json()),
            (Method::Get, "/state") => (200, state_json(&ctx.state)),
            (Method::Get, "/events") => (200, events_json(&ctx.log)),
            (Method::Get, "/map") => (200, map_json(&ctx.state)),
            (Method::Get, "/forecast") => handle_forecast(&ctx),
            (Method::Get, "/report") => (200, report_json(&ctx)),
            (Method::Get, path) if path.starts_with("/probe") => handle_probe(&ctx.probe, path),
            (Method::Post, "/mode") => handle_mode(&ctx, &read_body(&mut request)),
            (Method::Post, "/sim-params") => handle_sim_params(&ctx, &read_body(&mut request)),
            _ => (404, not_found_json()),
        };

        if let Err(e) = request.respond(create_response(status, body)) {
            eprintln!("Failed to send response: {}", e);
        }
    }

    Ok(())
}

fn read_body(request: &mut tiny_http::Request) -> String {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    body
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: serde_json::Value) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(&json).unwrap();
    let bytes = body.into_bytes();

    tiny_http::Response::from_data(bytes)
        .with_status_code(tiny_http::StatusCode::from(status_code))
        .with_header(
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
        )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::forecast::ForecastPoint;
    use crate::ingest::predict::PredictionPayload;
    use crate::ingest::terrain::{TerrainProbe, TileBounds};
    use crate::model::{FetchError, RiskLevel, SimParams};

    struct CannedBackend {
        forecast: Result<Vec<ForecastPoint>, FetchError>,
    }

    impl PredictionBackend for CannedBackend {
        fn fetch_prediction(
            &self,
            _sim: Option<&SimParams>,
        ) -> Result<PredictionPayload, FetchError> {
            Err(FetchError::Network("not under test".to_string()))
        }

        fn check_location(
            &self,
            _lat: f64,
            _lon: f64,
            _discharge: f64,
        ) -> Result<TerrainProbe, FetchError> {
            Err(FetchError::Network("not under test".to_string()))
        }

        fn fetch_forecast(
            &self,
            _sim_rain_mm: Option<f64>,
        ) -> Result<Vec<ForecastPoint>, FetchError> {
            self.forecast.clone()
        }

        fn fetch_tile_coverage(&self) -> Result<Vec<TileBounds>, FetchError> {
            Err(FetchError::Network("not under test".to_string()))
        }
    }

    fn context(forecast: Result<Vec<ForecastPoint>, FetchError>) -> EndpointContext {
        let backend: Arc<dyn PredictionBackend> = Arc::new(CannedBackend { forecast });
        let log = Arc::new(EventLog::new());
        let mode = Arc::new(ModeController::new(Arc::clone(&log)));
        let state = Arc::new(StateStore::new());
        let probe = Arc::new(LocationProbe::new(
            Arc::clone(&backend),
            Arc::clone(&state),
            Arc::clone(&log),
        ));
        EndpointContext {
            state,
            log,
            mode,
            probe,
            backend,
        }
    }

    #[test]
    fn test_health_body_names_the_service() {
        let body = health_json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "sentinel_service");
    }

    #[test]
    fn test_state_body_reflects_latest_commit() {
        let state = StateStore::new();
        state.commit(&PredictionPayload::bare(152_000.0), RiskLevel::Critical, "SCS-CN/LIVE");

        let body = state_json(&state);
        assert_eq!(body["total_discharge_cusecs"], 152_000.0);
        assert_eq!(body["risk_level"], 2, "risk serializes as its wire number");
        assert_eq!(body["source"], "SCS-CN/LIVE");
    }

    #[test]
    fn test_events_body_is_newest_first() {
        let log = EventLog::new();
        log.append("older");
        log.append("newer");

        let body = events_json(&log);
        assert_eq!(body[0]["message"], "newer");
        assert_eq!(body[1]["message"], "older");
    }

    #[test]
    fn test_map_body_carries_paint_scheme() {
        let state = StateStore::new();
        let body = map_json(&state);
        assert_eq!(body["point_color"], "#22c55e");
        assert_eq!(body["point_opacity"], 0.0);
        assert_eq!(body["features"]["type"], "FeatureCollection");
    }

    #[test]
    fn test_unknown_route_lists_available_endpoints() {
        let body = not_found_json();
        assert_eq!(body["error"], "Not found");
        assert!(body["available_endpoints"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e == "/state"));
    }

    #[test]
    fn test_probe_params_parse_in_either_order() {
        assert_eq!(
            parse_probe_params("/probe?lat=29.9561&lon=78.1803"),
            Some((29.9561, 78.1803))
        );
        assert_eq!(
            parse_probe_params("/probe?lon=78.1803&lat=29.9561"),
            Some((29.9561, 78.1803))
        );
    }

    #[test]
    fn test_probe_params_reject_incomplete_queries() {
        assert_eq!(parse_probe_params("/probe"), None);
        assert_eq!(parse_probe_params("/probe?lat=29.9"), None);
        assert_eq!(parse_probe_params("/probe?lat=abc&lon=78.1"), None);
    }

    #[test]
    fn test_mode_route_switches_and_rejects_garbage() {
        let ctx = context(Ok(Vec::new()));

        let (status, body) = handle_mode(&ctx, r#"{"simulation": true}"#);
        assert_eq!(status, 200);
        assert_eq!(body["simulation"], true);
        assert!(ctx.mode.current_mode());

        let (status, _) = handle_mode(&ctx, "not json");
        assert_eq!(status, 400);
        assert!(ctx.mode.current_mode(), "a rejected request changes nothing");
    }

    #[test]
    fn test_sim_params_route_merges_partial_updates() {
        let ctx = context(Ok(Vec::new()));
        ctx.mode.set_sim_params(100.0, 0.5, 1_000.0);

        let (status, body) = handle_sim_params(&ctx, r#"{"rain_mm": 220.0}"#);
        assert_eq!(status, 200);
        assert_eq!(body["rain_mm"], 220.0);
        assert_eq!(body["soil_moisture"], 0.5, "untouched sliders keep their values");
        assert_eq!(body["dam_release_cusecs"], 1_000.0);
    }

    #[test]
    fn test_forecast_route_passes_sim_rain_only_in_simulation() {
        let points = vec![ForecastPoint {
            time: "14:00".to_string(),
            discharge: 52_000.0,
        }];
        let ctx = context(Ok(points));

        let (status, body) = handle_forecast(&ctx);
        assert_eq!(status, 200);
        assert_eq!(body[0]["discharge"], 52_000.0);
    }

    #[test]
    fn test_forecast_route_maps_backend_failure_to_502() {
        let ctx = context(Err(FetchError::Http(500)));
        let (status, body) = handle_forecast(&ctx);
        assert_eq!(status, 502);
        assert!(body["error"].as_str().unwrap().contains("500"));
    }

    #[test]
    fn test_report_route_logs_generation() {
        let ctx = context(Ok(Vec::new()));
        let body = report_json(&ctx);

        assert_eq!(body["simulation_mode"], false);
        assert!(
            ctx.log
                .snapshot()
                .iter()
                .any(|e| e.message.contains("report")),
            "report generation must be recorded in the event log"
        );
    }
}
