//! Decoder for the ultrasonic river-level node payload.
//!
//! The node sends a fixed 4-byte big-endian frame:
//!
//! | Bytes | Type | Meaning              |
//! |-------|------|----------------------|
//! | 0–1   | u16  | distance to water, mm |
//! | 2–3   | u16  | battery voltage, mV  |
//!
//! Bytes past the first four are ignored so newer firmware can append
//! fields without breaking older ingestors.

use serde::Serialize;

/// Number of meaningful bytes in a frame.
pub const PAYLOAD_LEN: usize = 4;

/// Battery voltage reported as 100%.
pub const BATTERY_MAX_MV: u16 = 4200;

/// Battery voltage reported as 0%.
pub const BATTERY_MIN_MV: u16 = 3000;

/// Physical readings carried by one uplink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecodedPayload {
    /// Distance from the sensor to the water surface, one decimal place.
    pub distance_cm: f64,
    pub battery_mv: u16,
    /// Always within `0..=100`.
    pub battery_pct: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Payload too short: expected at least 4 bytes, got {length}")]
    TooShort { length: usize },

    #[error("Malformed payload: cannot read u16 at offset {offset}")]
    Malformed { offset: usize },
}

/// Decode a raw sensor frame.
///
/// Never panics. Short or malformed input yields a [`DecodeError`] which
/// the caller treats as a dropped message.
pub fn decode_payload(raw: &[u8]) -> Result<DecodedPayload, DecodeError> {
    let Some(frame) = raw.get(..PAYLOAD_LEN) else {
        tracing::warn!(length = raw.len(), "Payload too short");
        return Err(DecodeError::TooShort { length: raw.len() });
    };

    let distance_mm = read_u16_be(frame, 0)?;
    let battery_mv = read_u16_be(frame, 2)?;

    let decoded = DecodedPayload {
        distance_cm: f64::from(distance_mm) / 10.0,
        battery_mv,
        battery_pct: battery_pct(battery_mv),
    };

    tracing::debug!(
        distance_cm = decoded.distance_cm,
        battery_pct = decoded.battery_pct,
        "Payload decoded",
    );

    Ok(decoded)
}

/// Map a LiPo cell voltage onto a 0–100 charge percentage.
///
/// Linear between [`BATTERY_MIN_MV`] and [`BATTERY_MAX_MV`], truncated to
/// a whole percent and saturating outside that range.
pub fn battery_pct(battery_mv: u16) -> u8 {
    let span = i32::from(BATTERY_MAX_MV - BATTERY_MIN_MV);
    let pct = (i32::from(battery_mv) - i32::from(BATTERY_MIN_MV)) * 100 / span;
    // Clamped to 0..=100, so the cast cannot truncate.
    pct.clamp(0, 100) as u8
}

fn read_u16_be(frame: &[u8], offset: usize) -> Result<u16, DecodeError> {
    frame
        .get(offset..offset + 2)
        .and_then(|bytes| <[u8; 2]>::try_from(bytes).ok())
        .map(u16::from_be_bytes)
        .ok_or_else(|| {
            tracing::error!(offset, "Failed to unpack payload field");
            DecodeError::Malformed { offset }
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
