//! Client-side gateway to the hotel REST backend: admin session handling,
//! authenticated requests with token refresh, and typed room/category APIs.

pub mod config;
pub mod domain;
pub mod repository;
pub mod usecase;

use std::sync::Arc;

use reqwest::Url;
use reqwest::cookie::Jar;
use thiserror::Error;
use tokio::sync::broadcast;

pub use crate::config::GatewayConfig;
pub use crate::domain::envelope::Envelope;
pub use crate::usecase::error::{ApiError, RefreshError};
pub use crate::usecase::events::AuthEvent;

use crate::repository::cookies::JarCookieMirror;
use crate::repository::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::usecase::auth::AuthApi;
use crate::usecase::auth_store::AuthStore;
use crate::usecase::categories::CategoriesApi;
use crate::usecase::client::ApiClient;
use crate::usecase::clock::SystemClock;
use crate::usecase::monitor::SessionMonitor;
use crate::usecase::rooms::RoomsApi;
use crate::usecase::stats::StatsApi;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid site origin: {0}")]
    InvalidOrigin(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] ApiError),
}

/// Wires the token store, the API client and the façades over one shared
/// session.
pub struct HotelGateway {
    config: GatewayConfig,
    store: Arc<AuthStore>,
    client: Arc<ApiClient>,
    cookies: Option<Arc<JarCookieMirror>>,
    auth: AuthApi,
    rooms: RoomsApi,
    categories: CategoriesApi,
    stats: StatsApi,
}

impl HotelGateway {
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_config(GatewayConfig::from_env()?)
    }

    /// Persists tokens to `storage_path` when set, in memory otherwise, and
    /// mirrors the access token into a cookie jar scoped to `site_origin`.
    pub fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        let storage: Arc<dyn KeyValueStore> = match &config.storage_path {
            Some(path) => Arc::new(FileStore::open(path)),
            None => Arc::new(MemoryStore::default()),
        };
        let origin = Url::parse(&config.site_origin)
            .map_err(|e| GatewayError::InvalidOrigin(format!("{}: {e}", config.site_origin)))?;
        let cookies = Arc::new(JarCookieMirror::new(origin));
        let store = Arc::new(AuthStore::new(
            storage,
            cookies.clone(),
            Arc::new(SystemClock),
        ));

        let mut gateway = Self::with_store(config, store)?;
        gateway.cookies = Some(cookies);
        Ok(gateway)
    }

    /// Builds the gateway around an existing token store.
    pub fn with_store(config: GatewayConfig, store: Arc<AuthStore>) -> Result<Self, GatewayError> {
        let client = Arc::new(ApiClient::new(&config, store.clone())?);
        let rooms = RoomsApi::new(client.clone());

        tracing::info!(
            api_base_url = %client.base_url(),
            persistent = config.storage_path.is_some(),
            "hotel gateway initialized"
        );

        Ok(Self {
            auth: AuthApi::new(client.clone()),
            categories: CategoriesApi::new(client.clone()),
            stats: StatsApi::new(rooms.clone()),
            rooms,
            cookies: None,
            config,
            store,
            client,
        })
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn rooms(&self) -> &RoomsApi {
        &self.rooms
    }

    pub fn categories(&self) -> &CategoriesApi {
        &self.categories
    }

    pub fn stats(&self) -> &StatsApi {
        &self.stats
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn store(&self) -> &Arc<AuthStore> {
        &self.store
    }

    /// Session events; `LoginRequired` is the signal to show the login page.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.client.subscribe()
    }

    /// Starts the periodic session check at `session_check_secs`.
    pub fn monitor(&self) -> SessionMonitor {
        SessionMonitor::spawn(self.client.clone(), self.config.session_check_interval())
    }

    /// Jar holding the `admin-token` cookie, for an HTTP client browsing the
    /// admin pages. `None` when the gateway was built around a custom store.
    pub fn cookie_jar(&self) -> Option<Arc<Jar>> {
        self.cookies.as_ref().map(|mirror| mirror.jar())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::domain::session::LoginCredentials;
    use crate::repository::cookies::SESSION_COOKIE;

    #[test]
    fn test_invalid_origin_is_rejected() {
        let config = GatewayConfig {
            site_origin: "not a url".to_string(),
            ..GatewayConfig::default()
        };

        assert!(matches!(
            HotelGateway::from_config(config),
            Err(GatewayError::InvalidOrigin(_))
        ));
    }

    #[tokio::test]
    async fn test_login_persists_to_file_and_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "access-token",
                "refreshToken": "refresh-token",
                "admin": {"id": 1, "name": "admin"}
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let storage_path = dir.path().join("session.json");
        let config = GatewayConfig {
            api_base_url: format!("{}/api", server.uri()),
            storage_path: Some(storage_path.to_string_lossy().into_owned()),
            ..GatewayConfig::default()
        };

        let gateway = HotelGateway::from_config(config.clone()).unwrap();
        let envelope = gateway
            .auth()
            .login(&LoginCredentials::new("admin", "secret"))
            .await;
        assert!(envelope.is_success());

        let jar = gateway.cookie_jar().unwrap();
        let origin = Url::parse(&config.site_origin).unwrap();
        let header = reqwest::cookie::CookieStore::cookies(jar.as_ref(), &origin).unwrap();
        assert!(
            header
                .to_str()
                .unwrap()
                .contains(&format!("{SESSION_COOKIE}=access-token"))
        );

        let reopened = HotelGateway::from_config(config).unwrap();
        assert!(reopened.auth().is_authenticated());
        assert_eq!(reopened.auth().user().unwrap().name, "admin");
    }

    #[tokio::test]
    async fn test_custom_store_has_no_cookie_jar() {
        let gateway = HotelGateway::with_store(
            GatewayConfig::default(),
            Arc::new(AuthStore::in_memory()),
        )
        .unwrap();
        gateway
            .store()
            .set_tokens("a", "r", Duration::from_secs(60), None);

        assert!(gateway.cookie_jar().is_none());
        assert!(gateway.auth().is_authenticated());
        let monitor = gateway.monitor();
        assert!(monitor.is_running());
    }
}
