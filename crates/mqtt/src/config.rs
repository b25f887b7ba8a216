//! Broker connection settings.

use std::time::Duration;

/// Default MQTT port (plain TCP).
const DEFAULT_PORT: u16 = 1883;

/// Default keep-alive interval.
const DEFAULT_KEEP_ALIVE_SECS: u64 = 30;

/// Default pause between reconnection attempts.
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Connection settings for the MQTT broker.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    /// `None` connects anonymously.
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: String,
    pub keep_alive: Duration,
    /// Fixed delay before reconnecting after a transport failure.
    pub retry_delay: Duration,
}

impl MqttConfig {
    /// Settings for `host:port` with anonymous access and default timings.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            client_id: default_client_id(),
            keep_alive: Duration::from_secs(DEFAULT_KEEP_ALIVE_SECS),
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Empty credentials mean anonymous access. Unparseable numbers fall
    /// back to their defaults with a warning.
    ///
    /// | Variable                | Default                    |
    /// |-------------------------|----------------------------|
    /// | `MQTT_BROKER`           | `localhost`                |
    /// | `MQTT_PORT`             | `1883`                     |
    /// | `MQTT_USER`             | --                         |
    /// | `MQTT_PASSWORD`         | --                         |
    /// | `MQTT_CLIENT_ID`        | `aquaalert-ingest-<uuid>`  |
    /// | `MQTT_KEEP_ALIVE_SECS`  | `30`                       |
    /// | `MQTT_RETRY_DELAY_SECS` | `5`                        |
    pub fn from_env() -> Self {
        let host = std::env::var("MQTT_BROKER").unwrap_or_else(|_| "localhost".into());
        let port = env_number("MQTT_PORT", DEFAULT_PORT);

        let mut config = Self::new(host, port);
        config.username = non_empty_env("MQTT_USER");
        config.password = non_empty_env("MQTT_PASSWORD");
        if let Some(client_id) = non_empty_env("MQTT_CLIENT_ID") {
            config.client_id = client_id;
        }
        config.keep_alive =
            Duration::from_secs(env_number("MQTT_KEEP_ALIVE_SECS", DEFAULT_KEEP_ALIVE_SECS));
        config.retry_delay =
            Duration::from_secs(env_number("MQTT_RETRY_DELAY_SECS", DEFAULT_RETRY_DELAY_SECS));
        config
    }
}

fn default_client_id() -> String {
    format!("aquaalert-ingest-{}", uuid::Uuid::new_v4().simple())
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
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
