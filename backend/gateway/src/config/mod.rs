use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct GatewayConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Origin the `admin-token` cookie is scoped to.
    #[serde(default = "default_site_origin")]
    pub site_origin: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Used when the backend does not say how long an access token lives.
    #[serde(default = "default_token_lifetime_secs")]
    pub token_lifetime_secs: u64,
    #[serde(default = "default_refresh_threshold_secs")]
    pub refresh_threshold_secs: u64,
    #[serde(default = "default_session_check_secs")]
    pub session_check_secs: u64,
    /// Tokens are kept in memory when unset.
    #[serde(default)]
    pub storage_path: Option<String>,
}

fn default_api_base_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_site_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_token_lifetime_secs() -> u64 {
    2 * 60 * 60
}

fn default_refresh_threshold_secs() -> u64 {
    5 * 60
}

fn default_session_check_secs() -> u64 {
    60
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            site_origin: default_site_origin(),
            request_timeout_secs: default_request_timeout_secs(),
            token_lifetime_secs: default_token_lifetime_secs(),
            refresh_threshold_secs: default_refresh_threshold_secs(),
            session_check_secs: default_session_check_secs(),
            storage_path: None,
        }
    }
}

impl GatewayConfig {
    /// Reads `HOTEL_*` environment variables, e.g. `HOTEL_API_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("HOTEL"))
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_lifetime_secs)
    }

    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.refresh_threshold_secs)
    }

    /// Never shorter than one second; `0` would stall the monitor's timer.
    pub fn session_check_interval(&self) -> Duration {
        Duration::from_secs(self.session_check_secs.max(1))
    }
}
