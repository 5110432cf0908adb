//! River Sentinel Monitoring Client - Main Daemon
//!
//! A client-side daemon that continuously:
//! 1. Polls the hydrological prediction backend (1 s period)
//! 2. Classifies total discharge into a SAFE/WARNING/CRITICAL risk level
//! 3. Reconciles each payload into a single telemetry snapshot
//! 4. Records transitions and operator actions in a bounded event log
//! 5. Republishes the reconciled state over an HTTP status endpoint
//!
//! Map rendering, charting, and report rasterization are handled by
//! external collaborators reading the status endpoint.
//!
//! Usage:
//!   cargo run --release                    # Start without the status endpoint
//!   cargo run --release -- --endpoint 8080 # Serve status on port 8080
//!
//! Environment:
//!   SENTINEL_BACKEND_URL - prediction backend base URL (overrides sentinel.toml)

use sentinel_service::config::{ServiceConfig, DEFAULT_CONFIG_PATH};
use sentinel_service::endpoint;
use sentinel_service::eventlog::EventLog;
use sentinel_service::ingest::{HttpBackend, PredictionBackend};
use sentinel_service::mode::ModeController;
use sentinel_service::probe::LocationProbe;
use sentinel_service::scheduler::AcquisitionScheduler;
use sentinel_service::state::StateStore;
use std::env;
use std::sync::Arc;

fn main() {
    println!("🌊 River Sentinel Monitoring Client");
    println!("====================================\n");

    dotenv::dotenv().ok();

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut endpoint_port: Option<u16> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--endpoint" => {
                if i + 1 < args.len() {
                    endpoint_port = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    eprintln!("Error: --endpoint requires a port number");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--endpoint PORT]", args[0]);
                std::process::exit(1);
            }
        }
    }

    // Load configuration (defaults apply when sentinel.toml is absent)
    let config = match ServiceConfig::load_or_default(DEFAULT_CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Configuration error: {}\n", e);
            std::process::exit(1);
        }
    };
    let endpoint_port = endpoint_port.or(config.endpoint_port);

    println!("📊 Backend: {}", config.backend_url);
    println!("   Poll interval: {} ms", config.poll_interval.as_millis());
    println!(
        "   Risk thresholds: WARNING > {} / CRITICAL > {} cusecs\n",
        config.thresholds.high_cusecs, config.thresholds.critical_cusecs
    );

    // Construct the core
    let backend: Arc<dyn PredictionBackend> =
        match HttpBackend::new(&config.backend_url, config.request_timeout) {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                eprintln!("\n❌ Failed to build HTTP client: {}\n", e);
                std::process::exit(1);
            }
        };

    let log = Arc::new(EventLog::with_capacity(config.log_capacity));
    let mode = Arc::new(ModeController::new(Arc::clone(&log)));
    let state = Arc::new(StateStore::new());
    let probe = Arc::new(LocationProbe::new(
        Arc::clone(&backend),
        Arc::clone(&state),
        Arc::clone(&log),
    ));

    log.append("System initialized. Connected to sentinel node.");

    // Tile coverage is consumed once at startup; a failure here is not fatal,
    // the map collaborator just gets no footprints.
    match backend.fetch_tile_coverage() {
        Ok(tiles) => {
            log.append(format!("Loaded {} terrain tiles from backend.", tiles.len()));
            println!("✓ Terrain coverage: {} tiles", tiles.len());
        }
        Err(e) => {
            eprintln!("⚠ Terrain coverage unavailable: {}", e);
        }
    }

    let scheduler = AcquisitionScheduler::new(
        Arc::clone(&backend),
        Arc::clone(&mode),
        Arc::clone(&state),
        Arc::clone(&log),
        config.thresholds,
        config.poll_interval,
    );

    println!("🔄 Starting acquisition loop...");
    println!("   Press Ctrl+C to stop\n");
    scheduler.start();

    // Serve the status endpoint in the foreground when requested, otherwise
    // park the main thread while the scheduler runs.
    if let Some(port) = endpoint_port {
        let ctx = endpoint::EndpointContext {
            state: Arc::clone(&state),
            log: Arc::clone(&log),
            mode: Arc::clone(&mode),
            probe: Arc::clone(&probe),
            backend: Arc::clone(&backend),
        };
        if let Err(e) = endpoint::start_endpoint_server(port, ctx) {
            eprintln!("\n❌ Endpoint server error: {}", e);
            scheduler.stop();
            std::process::exit(1);
        }
    } else {
        loop {
            std::thread::park();
        }
    }
}
