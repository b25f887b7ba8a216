//! Water level derived from a distance reading and the bridge calibration.

use serde::Serialize;

use crate::error::CoreError;

/// Derived water measurements for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaterLevel {
    /// Height of the water above the riverbed, never negative.
    pub water_level_cm: f64,
    /// Water level as a share of bridge height, within `0..=100`.
    pub fill_pct: f64,
}

/// Compute water level and fill percentage.
///
/// `bridge_height_cm` is the sensor's distance to the riverbed. A distance
/// greater than the bridge height clamps to an empty river. Fails when the
/// calibration is not a positive finite number.
pub fn compute_water_level(
    bridge_height_cm: f64,
    distance_cm: f64,
) -> Result<WaterLevel, CoreError> {
    if !(bridge_height_cm.is_finite() && bridge_height_cm > 0.0) {
        return Err(CoreError::Calibration(format!(
            "bridge_height_cm must be a positive number, got {bridge_height_cm}"
        )));
    }

    let water_level_cm = (bridge_height_cm - distance_cm).max(0.0);
    let fill_pct = (water_level_cm / bridge_height_cm * 100.0).min(100.0);

    Ok(WaterLevel {
        water_level_cm,
        fill_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_water_near_sensor() {
        let level = compute_water_level(300.0, 40.0).unwrap();
        assert_eq!(level.water_level_cm, 260.0);
        assert!((level.fill_pct - 86.666).abs() < 0.01);
    }

    #[test]
    fn distance_beyond_bridge_is_empty() {
        let level = compute_water_level(300.0, 350.0).unwrap();
        assert_eq!(level.water_level_cm, 0.0);
        assert_eq!(level.fill_pct, 0.0);
    }

    #[test]
    fn zero_distance_is_full() {
        let level = compute_water_level(300.0, 0.0).unwrap();
        assert_eq!(level.water_level_cm, 300.0);
        assert_eq!(level.fill_pct, 100.0);
    }

    #[test]
    fn rejects_non_positive_bridge_height() {
        assert!(compute_water_level(0.0, 10.0).is_err());
        assert!(compute_water_level(-5.0, 10.0).is_err());
        assert!(compute_water_level(f64::NAN, 10.0).is_err());
    }
}
