//! Alert classification against per-device fill thresholds.
//!
//! Pure logic, with no database access. The caller loads the device's
//! thresholds and passes them in.

use serde::{Deserialize, Serialize};

use crate::alert::AlertLevel;

/// Default watch cutoff (% of bridge height).
pub const DEFAULT_WATCH_PCT: f64 = 50.0;

/// Default warning cutoff (% of bridge height).
pub const DEFAULT_WARNING_PCT: f64 = 70.0;

/// Default critical cutoff (% of bridge height).
pub const DEFAULT_CRITICAL_PCT: f64 = 85.0;

/// Fill-percentage cutoffs configured on a device.
///
/// Intended to be ascending (`watch <= warning <= critical`), but
/// [`classify`] does not rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub watch: f64,
    pub warning: f64,
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            watch: DEFAULT_WATCH_PCT,
            warning: DEFAULT_WARNING_PCT,
            critical: DEFAULT_CRITICAL_PCT,
        }
    }
}

/// Classify a fill percentage.
///
/// Cutoffs are inclusive and checked from most to least severe, so the
/// result is a single deterministic level even for misordered thresholds.
pub fn classify(fill_pct: f64, thresholds: &Thresholds) -> AlertLevel {
    if fill_pct >= thresholds.critical {
        AlertLevel::Critical
    } else if fill_pct >= thresholds.warning {
        AlertLevel::Warning
    } else if fill_pct >= thresholds.watch {
        AlertLevel::Watch
    } else {
        AlertLevel::Normal
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
