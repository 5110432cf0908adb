/// Acquisition scheduler: the periodic fetch-classify-commit loop.
///
/// A ticker thread wakes on a fixed period and hands each poll cycle to a
/// single pool worker, so a slow backend never blocks the tick source. Two
/// flags govern the cycle:
///
/// - `in_flight` — overlap prevention. Set with `swap` at dispatch time; a
///   tick that finds it set is skipped silently (drop, don't queue). Cleared
///   by a drop guard that runs whether the cycle succeeds or fails.
/// - `active` — stale-write suppression. `stop()` clears it before shutting
///   the ticker down; a fetch that completes afterwards is discarded before
///   it can touch the state store or the log.
///
/// Mode and simulation parameters are read from the mode controller at
/// invocation time, never captured at construction.

use crate::eventlog::EventLog;
use crate::ingest::PredictionBackend;
use crate::mode::ModeController;
use crate::risk::{self, RiskThresholds};
use crate::state::StateStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use threadpool::ThreadPool;

/// Source labels stamped onto committed snapshots.
pub const SOURCE_LIVE: &str = "SCS-CN/LIVE";
pub const SOURCE_SIM: &str = "SCS-CN/SIM";

/// Default poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

struct SchedulerCore {
    backend: Arc<dyn PredictionBackend>,
    mode: Arc<ModeController>,
    state: Arc<StateStore>,
    log: Arc<EventLog>,
    thresholds: RiskThresholds,
    active: AtomicBool,
    in_flight: AtomicBool,
}

struct Ticker {
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct AcquisitionScheduler {
    core: Arc<SchedulerCore>,
    interval: Duration,
    ticker: Mutex<Option<Ticker>>,
}

impl AcquisitionScheduler {
    pub fn new(
        backend: Arc<dyn PredictionBackend>,
        mode: Arc<ModeController>,
        state: Arc<StateStore>,
        log: Arc<EventLog>,
        thresholds: RiskThresholds,
        interval: Duration,
    ) -> Self {
        AcquisitionScheduler {
            core: Arc::new(SchedulerCore {
                backend,
                mode,
                state,
                log,
                thresholds,
                active: AtomicBool::new(false),
                in_flight: AtomicBool::new(false),
            }),
            interval,
            ticker: Mutex::new(None),
        }
    }

    /// Begins periodic acquisition, with one immediate invocation before the
    /// first period elapses so the store is not blank for a full interval.
    /// Calling `start` on a running scheduler is a no-op.
    pub fn start(&self) {
        let mut ticker = self.ticker.lock().unwrap();
        if ticker.is_some() {
            return;
        }

        self.core.active.store(true, Ordering::SeqCst);

        let (shutdown, signal) = mpsc::channel::<()>();
        let core = Arc::clone(&self.core);
        let interval = self.interval;

        let handle = std::thread::spawn(move || {
            let pool = ThreadPool::new(1);
            dispatch(&core, &pool);
            loop {
                match signal.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => dispatch(&core, &pool),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            // The pool is dropped here; a still-running fetch finishes on its
            // detached worker and is discarded by the active check.
        });

        *ticker = Some(Ticker { shutdown, handle });
    }

    /// Cancels the periodic source. The active flag is cleared first, so an
    /// in-flight request completing after this call cannot commit.
    pub fn stop(&self) {
        self.core.active.store(false, Ordering::SeqCst);

        if let Some(ticker) = self.ticker.lock().unwrap().take() {
            let _ = ticker.shutdown.send(());
            let _ = ticker.handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.lock().unwrap().is_some()
    }
}

impl Drop for AcquisitionScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Clears the is-fetching flag when the cycle ends, on success and failure
/// alike.
struct FlightGuard<'a> {
    core: &'a SchedulerCore,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.core.in_flight.store(false, Ordering::SeqCst);
    }
}

fn dispatch(core: &Arc<SchedulerCore>, pool: &ThreadPool) {
    if !core.active.load(Ordering::SeqCst) {
        return;
    }

    // Overlap prevention: at most one request in flight, extra ticks are
    // dropped silently rather than queued.
    if core.in_flight.swap(true, Ordering::SeqCst) {
        return;
    }

    let core = Arc::clone(core);
    pool.execute(move || {
        let _guard = FlightGuard { core: &core };
        run_cycle(&core);
    });
}

fn run_cycle(core: &SchedulerCore) {
    // Mode and overrides current at the instant this cycle starts.
    let sim = if core.mode.current_mode() {
        Some(core.mode.current_params())
    } else {
        None
    };

    // Transient failures (network, malformed payload, backend error field,
    // missing discharge) abandon the cycle without touching the store or
    // the log; the next tick retries.
    let payload = match core.backend.fetch_prediction(sim.as_ref()) {
        Ok(payload) => payload,
        Err(_) => return,
    };

    // A fetch that raced stop() completes but has no effect.
    if !core.active.load(Ordering::SeqCst) {
        return;
    }

    // Classification strictly before commit: the transition is detected
    // against the level the store still holds from the previous cycle.
    let new_level = risk::classify(payload.total_discharge_cusecs, &core.thresholds);
    let previous = core.state.snapshot();
    if new_level != previous.risk_level {
        core.log.append(risk::transition_message(new_level));
    }

    let source = if sim.is_some() { SOURCE_SIM } else { SOURCE_LIVE };
    core.state.commit(&payload, new_level, source);
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
    use crate::model::{FetchError, SimParams};

    struct StaticBackend;

    impl PredictionBackend for StaticBackend {
        fn fetch_prediction(
            &self,
            _sim: Option<&SimParams>,
        ) -> Result<PredictionPayload, FetchError> {
            Ok(PredictionPayload::bare(42_000.0))
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
            Err(FetchError::Network("not under test".to_string()))
        }

        fn fetch_tile_coverage(&self) -> Result<Vec<TileBounds>, FetchError> {
            Err(FetchError::Network("not under test".to_string()))
        }
    }

    fn scheduler() -> AcquisitionScheduler {
        let log = Arc::new(EventLog::new());
        AcquisitionScheduler::new(
            Arc::new(StaticBackend),
            Arc::new(ModeController::new(Arc::clone(&log))),
            Arc::new(StateStore::new()),
            log,
            RiskThresholds::default(),
            Duration::from_millis(20),
        )
    }

    #[test]
    fn test_flight_guard_clears_on_drop() {
        let sched = scheduler();
        sched.core.in_flight.store(true, Ordering::SeqCst);
        {
            let _guard = FlightGuard { core: &sched.core };
        }
        assert!(!sched.core.in_flight.load(Ordering::SeqCst));
    }

    #[test]
    fn test_stop_without_start_is_a_noop() {
        let sched = scheduler();
        sched.stop();
        assert!(!sched.is_running());
    }

    #[test]
    fn test_start_is_idempotent_and_stop_tears_down() {
        let sched = scheduler();
        sched.start();
        sched.start();
        assert!(sched.is_running());

        sched.stop();
        assert!(!sched.is_running());

        // Restart after stop is allowed.
        sched.start();
        assert!(sched.is_running());
        sched.stop();
    }
}
