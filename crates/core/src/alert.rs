//! Severity levels for river-level readings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a single reading, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    /// Fill percentage below every configured cutoff.
    Normal,
    /// Reached the watch cutoff.
    Watch,
    /// Reached the warning cutoff.
    Warning,
    /// Reached the critical cutoff.
    Critical,
}

impl AlertLevel {
    /// Canonical uppercase name, as stored in `sensor_readings.alert_level`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Watch => "WATCH",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }

    /// Parse a stored level name. Case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "NORMAL" => Some(Self::Normal),
            "WATCH" => Some(Self::Watch),
            "WARNING" => Some(Self::Warning),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Whether a reading at this level should trigger a notification.
    pub fn is_alerting(self) -> bool {
        self != Self::Normal
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
