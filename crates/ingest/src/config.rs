//! Process configuration loaded from the environment.

use std::net::{IpAddr, SocketAddr};

use aquaalert_core::device::DeviceDefaults;
use aquaalert_core::thresholds::Thresholds;
use aquaalert_mqtt::MqttConfig;
use aquaalert_notify::TelegramConfig;

/// Errors that prevent the process from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Everything the ingest binary needs to run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub database_url: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Applied to device registrations that omit calibration.
    pub device_defaults: DeviceDefaults,
    pub mqtt: MqttConfig,
    pub telegram: TelegramConfig,
}

impl IngestConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                          | Default   |
    /// |----------------------------------|-----------|
    /// | `DATABASE_URL`                   | required  |
    /// | `HEALTH_HOST`                    | `0.0.0.0` |
    /// | `HEALTH_PORT`                    | `8080`    |
    /// | `DEFAULT_BRIDGE_HEIGHT_CM`       | `300`     |
    /// | `DEFAULT_THRESHOLD_WATCH_PCT`    | `50`      |
    /// | `DEFAULT_THRESHOLD_WARNING_PCT`  | `70`      |
    /// | `DEFAULT_THRESHOLD_CRITICAL_PCT` | `85`      |
    ///
    /// Broker and bot settings come from [`MqttConfig::from_env`] and
    /// [`TelegramConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let host = std::env::var("HEALTH_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = env_number("HEALTH_PORT", 8080u16);

        let builtin = DeviceDefaults::default();
        let device_defaults = DeviceDefaults {
            bridge_height_cm: env_number("DEFAULT_BRIDGE_HEIGHT_CM", builtin.bridge_height_cm),
            thresholds: Thresholds {
                watch: env_number("DEFAULT_THRESHOLD_WATCH_PCT", builtin.thresholds.watch),
                warning: env_number("DEFAULT_THRESHOLD_WARNING_PCT", builtin.thresholds.warning),
                critical: env_number("DEFAULT_THRESHOLD_CRITICAL_PCT", builtin.thresholds.critical),
            },
        };

        Ok(Self {
            database_url,
            host,
            port,
            device_defaults,
            mqtt: MqttConfig::from_env(),
            telegram: TelegramConfig::from_env(),
        })
    }

    /// Socket address for the HTTP server.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| ConfigError::Invalid {
            name: "HEALTH_HOST",
            value: self.host.clone(),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

fn env_number<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, %default, "Invalid number, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str) -> IngestConfig {
        IngestConfig {
            database_url: "postgres://localhost/aquaalert".into(),
            host: host.into(),
            port: 8080,
            device_defaults: DeviceDefaults::default(),
            mqtt: MqttConfig::new("localhost", 1883),
            telegram: TelegramConfig::default(),
        }
    }

    #[test]
    fn bind_addr_parses_ip() {
        let addr = config("127.0.0.1").bind_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn bind_addr_rejects_hostname() {
        assert!(matches!(
            config("not an ip").bind_addr(),
            Err(ConfigError::Invalid { name: "HEALTH_HOST", .. })
        ));
    }

    #[test]
    fn missing_variable_message() {
        assert_eq!(
            ConfigError::Missing("DATABASE_URL").to_string(),
            "DATABASE_URL must be set"
        );
    }
}
