use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Hotel REST backend, without the `/api` suffix; uploads live under `/uploads`.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Built site pages served for every path without a handler.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
    #[serde(default)]
    pub telemetry_enabled: bool,
    #[serde(default = "default_telemetry_service_name")]
    pub telemetry_service_name: String,
    #[serde(default = "default_telemetry_service_version")]
    pub telemetry_service_version: String,
    #[serde(default = "default_telemetry_environment")]
    pub telemetry_environment: String,
    #[serde(default = "default_telemetry_otlp_endpoint")]
    pub telemetry_otlp_endpoint: String,
}

fn default_backend_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    10
}

fn default_telemetry_service_name() -> String {
    "hotel-web".to_string()
}

fn default_telemetry_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_telemetry_environment() -> String {
    "production".to_string()
}

fn default_telemetry_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::default())
            .build()?
            .try_deserialize()
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_environment() {
        let config: AppConfig = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.backend_url, "http://localhost:3001");
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.upstream_timeout(), Duration::from_secs(10));
        assert!(!config.telemetry_enabled);
        assert_eq!(config.telemetry_service_name, "hotel-web");
    }
}
