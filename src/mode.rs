/// Live/simulation mode controller.
///
/// Holds the mode flag and the simulation parameter set behind a single
/// mutex. Every read locks and copies, so an in-flight poll that asks for
/// the current mode or parameters observes the value at the instant of the
/// read, never a value captured when the scheduler was built. Switching
/// the mode appends exactly one event log entry naming the direction.

use crate::eventlog::EventLog;
use crate::model::SimParams;
use std::sync::{Arc, Mutex};

struct ModeState {
    simulation: bool,
    params: SimParams,
}

pub struct ModeController {
    inner: Mutex<ModeState>,
    log: Arc<EventLog>,
}

impl ModeController {
    /// Starts in LIVE mode with zeroed simulation parameters.
    pub fn new(log: Arc<EventLog>) -> Self {
        ModeController {
            inner: Mutex::new(ModeState {
                simulation: false,
                params: SimParams::default(),
            }),
            log,
        }
    }

    /// Switches between LIVE (`false`) and SIMULATION (`true`).
    ///
    /// Logs one entry per actual transition; re-asserting the current mode
    /// is a no-op so the bounded log is not flooded by repeated UI events.
    pub fn set_mode(&self, simulation: bool) {
        let mut state = self.inner.lock().unwrap();
        if state.simulation == simulation {
            return;
        }
        state.simulation = simulation;
        drop(state);

        if simulation {
            self.log.append("Switched to SIMULATION mode.");
        } else {
            self.log.append("Switched to LIVE data mode.");
        }
    }

    /// Replaces the simulation parameters, clamping each value to its
    /// documented range. Callers with a 0–100 soil slider divide by 100
    /// before calling.
    pub fn set_sim_params(&self, rain_mm: f64, soil_moisture: f64, dam_release_cusecs: f64) {
        let params = SimParams::clamped(rain_mm, soil_moisture, dam_release_cusecs);
        self.inner.lock().unwrap().params = params;
    }

    /// True when SIMULATION mode is active, read at the instant of the call.
    pub fn current_mode(&self) -> bool {
        self.inner.lock().unwrap().simulation
    }

    /// Copy of the simulation parameters current at the instant of the call.
    pub fn current_params(&self) -> SimParams {
        self.inner.lock().unwrap().params
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
