/// Discharge risk classification.
///
/// `classify` is the only place a risk level is ever derived: a pure
/// two-threshold step function over total discharge. The scheduler compares
/// its output against the level held in the state store to detect
/// transitions; the messages for each direction live here too so the event
/// log wording stays in one place.

use crate::model::RiskLevel;

/// Default discharge threshold above which conditions are WARNING, in cusecs.
pub const DEFAULT_HIGH_CUSECS: f64 = 80_000.0;

/// Default discharge threshold above which conditions are CRITICAL, in cusecs.
pub const DEFAULT_CRITICAL_CUSECS: f64 = 140_000.0;

/// The named threshold pair for risk classification.
///
/// `high < critical` always holds; `new` rejects a violating pair so a bad
/// config file cannot produce a non-monotonic classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    pub high_cusecs: f64,
    pub critical_cusecs: f64,
}

impl RiskThresholds {
    pub fn new(high_cusecs: f64, critical_cusecs: f64) -> Result<Self, String> {
        if !(high_cusecs < critical_cusecs) {
            return Err(format!(
                "risk thresholds must satisfy high < critical, got high={} critical={}",
                high_cusecs, critical_cusecs
            ));
        }
        Ok(RiskThresholds {
            high_cusecs,
            critical_cusecs,
        })
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds {
            high_cusecs: DEFAULT_HIGH_CUSECS,
            critical_cusecs: DEFAULT_CRITICAL_CUSECS,
        }
    }
}

/// Maps total discharge to a risk level. Strictly-greater comparisons: a
/// discharge exactly at a threshold stays at the lower level.
pub fn classify(total_discharge_cusecs: f64, thresholds: &RiskThresholds) -> RiskLevel {
    if total_discharge_cusecs > thresholds.critical_cusecs {
        RiskLevel::Critical
    } else if total_discharge_cusecs > thresholds.high_cusecs {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    }
}

/// Event log wording for a level transition, keyed to the *new* level.
/// The SAFE message is only ever reached coming down from a non-SAFE level,
/// since no entry is produced when the level is unchanged.
pub fn transition_message(new_level: RiskLevel) -> &'static str {
    match new_level {
        RiskLevel::Critical => "CRITICAL ALERT: flood threshold breached.",
        RiskLevel::Warning => "WARNING: water levels rising.",
        RiskLevel::Safe => "Status normalized. Levels receding.",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
