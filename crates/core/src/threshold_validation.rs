//! Validation helpers for device configuration.
//!
//! Used at the registration boundary. The ingestion pipeline never
//! rejects or reorders stored thresholds; it classifies with whatever
//! the device carries.

use crate::device::DEVICE_EUI_LEN;
use crate::error::CoreError;
use crate::thresholds::Thresholds;

/// Validate that every cutoff lies in `[0, 100]` and that they ascend.
///
/// Misordered thresholds are reported, not corrected.
pub fn validate_thresholds(thresholds: &Thresholds) -> Result<(), CoreError> {
    for (name, value) in [
        ("threshold_watch_pct", thresholds.watch),
        ("threshold_warning_pct", thresholds.warning),
        ("threshold_critical_pct", thresholds.critical),
    ] {
        validate_pct_range(value, name)?;
    }

    if thresholds.watch > thresholds.warning || thresholds.warning > thresholds.critical {
        return Err(CoreError::Validation(format!(
            "thresholds must ascend (watch <= warning <= critical), got {} / {} / {}",
            thresholds.watch, thresholds.warning, thresholds.critical
        )));
    }
    Ok(())
}

/// Validate that a value falls within `[0.0, 100.0]`.
pub fn validate_pct_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

pub fn validate_bridge_height(bridge_height_cm: f64) -> Result<(), CoreError> {
    if !(bridge_height_cm.is_finite() && bridge_height_cm > 0.0) {
        return Err(CoreError::Validation(format!(
            "bridge_height_cm must be greater than 0, got {bridge_height_cm}"
        )));
    }
    Ok(())
}

/// Validate a device EUI: exactly 16 hexadecimal characters.
pub fn validate_device_eui(eui: &str) -> Result<(), CoreError> {
    if eui.len() != DEVICE_EUI_LEN || !eui.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Validation(format!(
            "device_eui must be {DEVICE_EUI_LEN} hex characters, got '{eui}'"
        )));
    }
    Ok(())
}
