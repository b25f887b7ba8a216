//! Markdown body of an alert notification.

use aquaalert_core::alert::AlertLevel;
use aquaalert_db::models::device::Device;
use aquaalert_db::models::reading::Reading;

const RULE: &str = "━━━━━━━━━━━━━━━━━━";

/// Shown when a device has no location name.
pub const NO_LOCATION: &str = "No location";

fn emoji(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Normal => "🟢",
        AlertLevel::Watch => "🟡",
        AlertLevel::Warning => "🟠",
        AlertLevel::Critical => "🔴",
    }
}

fn banner(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Normal => "NORMAL LEVEL",
        AlertLevel::Watch => "WATCH LEVEL",
        AlertLevel::Warning => "WARNING LEVEL",
        AlertLevel::Critical => "CRITICAL LEVEL",
    }
}

/// Compose the Telegram message for `reading` on `device`.
///
/// Measurements are printed with one decimal. Missing values print as `--`.
pub fn format_alert_message(device: &Device, reading: &Reading) -> String {
    let level = reading.level();
    let mark = emoji(level);

    let water = reading
        .water_level_cm
        .map_or_else(|| "--".to_string(), |v| format!("{v:.1}"));
    let fill = reading
        .fill_pct
        .map_or_else(|| "--".to_string(), |v| format!("{v:.1}"));
    let battery = reading
        .battery_pct
        .map_or_else(|| "--".to_string(), |v| v.to_string());
    let location = device
        .location_name
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(NO_LOCATION);

    format!(
        "{mark} *{banner}* {mark}\n\n\
         📍 *Sensor:* {name}\n\
         📌 *Location:* {location}\n\
         {RULE}\n\
         💧 *Water level:* {water} cm\n\
         📊 *Fill:* {fill}%\n\
         🔋 *Battery:* {battery}%\n\
         {RULE}\n\
         🆔 `{eui}`",
        banner = banner(level),
        name = device.name,
        eui = device.device_eui,
    )
}
