/// Location probe: on-demand terrain/flood lookup for a map click.
///
/// The point query carries the total discharge committed most recently
/// before the query, read from the state store at query time rather than
/// captured when the inspector was opened, so flood depth reflects the live
/// hydrological state. No caching, no retries.

use crate::eventlog::EventLog;
use crate::ingest::terrain::TerrainProbe;
use crate::ingest::PredictionBackend;
use crate::state::StateStore;
use std::sync::Arc;

pub struct LocationProbe {
    backend: Arc<dyn PredictionBackend>,
    state: Arc<StateStore>,
    log: Arc<EventLog>,
}

impl LocationProbe {
    pub fn new(
        backend: Arc<dyn PredictionBackend>,
        state: Arc<StateStore>,
        log: Arc<EventLog>,
    ) -> Self {
        LocationProbe { backend, state, log }
    }

    /// Queries the backend for the terrain descriptor at (lat, lon).
    ///
    /// Appends the probe-initiated entry, then one more on a successful hit.
    /// A not-found result or a query error returns `None` with no further
    /// entries; the inspector is simply left empty.
    pub fn query(&self, lat: f64, lon: f64) -> Option<TerrainProbe> {
        self.log
            .append(format!("Querying terrain at Lat: {:.4}...", lat));

        let discharge = self.state.snapshot().total_discharge_cusecs;

        match self.backend.check_location(lat, lon, discharge) {
            Ok(probe) if probe.found => {
                self.log.append(format!(
                    "Elevation found: {:.3} m ({})",
                    probe.elevation, probe.source
                ));
                Some(probe)
            }
            Ok(_) | Err(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::forecast::ForecastPoint;
    use crate::ingest::predict::PredictionPayload;
    use crate::ingest::terrain::TileBounds;
    use crate::model::{FetchError, RiskLevel, SimParams};
    use std::sync::Mutex;

    /// Records the discharge each query carried; answers from a canned
    /// result.
    struct RecordingBackend {
        result: Result<TerrainProbe, FetchError>,
        seen_discharge: Mutex<Vec<f64>>,
    }

    impl PredictionBackend for RecordingBackend {
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
            discharge: f64,
        ) -> Result<TerrainProbe, FetchError> {
            self.seen_discharge.lock().unwrap().push(discharge);
            self.result.clone()
        }

        fn fetch_forecast(
            &self,
            _sim_rain_mm: Option<f64>,
        ) -> Result<Vec<ForecastPoint>, FetchError> {
            Err(FetchError::Network("not under test".to_string()))
        }

        fn fetch_tile_coverage(&self) -> Result<Vec<TileBounds>, FetchError> {
            Err(FetchError::Network("not under test".to_string()))
        }
    }

    fn found_probe() -> TerrainProbe {
        TerrainProbe {
            found: true,
            elevation: 294.5,
            is_river: true,
            status: "Active Channel".to_string(),
            flood_depth: 0.8,
            local_discharge: 91_000.0,
            source: "tile_ne_441.tif".to_string(),
            water_level: 295.3,
        }
    }

    fn harness(
        result: Result<TerrainProbe, FetchError>,
    ) -> (Arc<RecordingBackend>, Arc<StateStore>, Arc<EventLog>, LocationProbe) {
        let backend = Arc::new(RecordingBackend {
            result,
            seen_discharge: Mutex::new(Vec::new()),
        });
        let state = Arc::new(StateStore::new());
        let log = Arc::new(EventLog::new());
        let probe = LocationProbe::new(
            Arc::clone(&backend) as Arc<dyn PredictionBackend>,
            Arc::clone(&state),
            Arc::clone(&log),
        );
        (backend, state, log, probe)
    }

    #[test]
    fn test_query_carries_freshly_committed_discharge() {
        let (backend, state, _log, probe) = harness(Ok(found_probe()));

        state.commit(&PredictionPayload::bare(91_000.0), RiskLevel::Warning, "SCS-CN/LIVE");
        probe.query(29.9561, 78.1803);

        // A later commit must be reflected by the next query.
        state.commit(&PredictionPayload::bare(12_000.0), RiskLevel::Safe, "SCS-CN/LIVE");
        probe.query(29.9561, 78.1803);

        let seen = backend.seen_discharge.lock().unwrap();
        assert_eq!(*seen, vec![91_000.0, 12_000.0], "discharge is read at query time");
    }

    #[test]
    fn test_successful_query_logs_initiation_and_result() {
        let (_backend, _state, log, probe) = harness(Ok(found_probe()));

        let result = probe.query(29.9561, 78.1803);
        assert!(result.is_some());

        let entries = log.snapshot();
        assert_eq!(entries.len(), 2);
        assert!(entries[1].message.contains("Querying terrain"));
        assert!(entries[0].message.contains("Elevation found"));
        assert!(entries[0].message.contains("tile_ne_441.tif"));
    }

    #[test]
    fn test_not_found_leaves_inspector_empty_with_single_entry() {
        let mut not_found = found_probe();
        not_found.found = false;
        let (_backend, _state, log, probe) = harness(Ok(not_found));

        assert!(probe.query(10.0, 10.0).is_none());
        assert_eq!(log.len(), 1, "only the probe-initiated entry is logged");
    }

    #[test]
    fn test_query_error_is_not_retried_and_logs_nothing_further() {
        let (backend, _state, log, probe) =
            harness(Err(FetchError::Http(500)));

        assert!(probe.query(10.0, 10.0).is_none());
        assert_eq!(log.len(), 1);
        assert_eq!(backend.seen_discharge.lock().unwrap().len(), 1, "exactly one attempt");
    }
}
