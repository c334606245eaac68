use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use crate::config::GatewayConfig;
use crate::domain::upload::MultipartForm;
use crate::usecase::auth_store::AuthStore;
use crate::usecase::error::{ApiError, http_error};
use crate::usecase::events::AuthEvent;
use crate::usecase::refresh::{RefreshCoordinator, RefreshOutcome};

const JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, ApiError> {
        Ok(Self::Json(serde_json::to_value(body)?))
    }
}

/// Authenticated REST client for the hotel backend.
///
/// A request that comes back `401` triggers one token refresh (shared with
/// any concurrent callers) and is retried once with the new token. If the
/// refresh fails the session is cleared and [`AuthEvent::LoginRequired`] is
/// published.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<AuthStore>,
    refresher: RefreshCoordinator,
    refresh_threshold: Duration,
    token_lifetime: Duration,
    events: broadcast::Sender<AuthEvent>,
}

impl ApiClient {
    pub fn new(config: &GatewayConfig, store: Arc<AuthStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hotel-gateway/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()?;
        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        let (events, _) = broadcast::channel(16);
        let refresher = RefreshCoordinator::new(
            http.clone(),
            format!("{base_url}/admin/refresh"),
            store.clone(),
            config.token_lifetime(),
            events.clone(),
        );

        tracing::info!(%base_url, "ApiClient created");

        Ok(Self {
            http,
            base_url,
            store,
            refresher,
            refresh_threshold: config.refresh_threshold(),
            token_lifetime: config.token_lifetime(),
            events,
        })
    }

    pub fn store(&self) -> &Arc<AuthStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn refresh_threshold(&self) -> Duration {
        self.refresh_threshold
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: AuthEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::GET, endpoint, RequestBody::Empty).await
    }

    pub async fn post_json<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, endpoint, RequestBody::json(body)?)
            .await
    }

    pub async fn patch_json<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, endpoint, RequestBody::json(body)?)
            .await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: MultipartForm,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, endpoint, RequestBody::Multipart(form))
            .await
    }

    pub async fn patch_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: MultipartForm,
    ) -> Result<T, ApiError> {
        self.request(Method::PATCH, endpoint, RequestBody::Multipart(form))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, endpoint, RequestBody::Empty).await
    }

    /// Refreshes the tokens now, joining a refresh already in flight.
    pub async fn force_refresh(&self) -> RefreshOutcome {
        self.refresher.refresh().await
    }

    #[tracing::instrument(skip(self, method, endpoint, body), fields(%method, %endpoint))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: RequestBody,
    ) -> Result<T, ApiError> {
        let mut token = self.store.access_token();
        if token.is_some() && self.store.is_expiring_soon(self.refresh_threshold) {
            tracing::debug!("access token expiring soon, refreshing before request");
            if let Err(e) = self.refresher.refresh().await {
                tracing::warn!(error = %e, "proactive token refresh failed");
            }
            token = self.store.access_token();
        }

        let response = self
            .send(method.clone(), endpoint, &body, token.as_deref())
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        tracing::info!("received 401, attempting token refresh");
        let current = self.store.access_token();
        let retry_token = if current.is_some() && current != token {
            tracing::debug!("token already rotated by another request");
            current
        } else {
            match self.refresher.refresh().await {
                Ok(pair) => Some(pair.access_token),
                Err(e) => {
                    tracing::warn!(error = %e, "token refresh failed, login required");
                    self.store.clear_tokens();
                    self.emit(AuthEvent::LoginRequired);
                    return Err(ApiError::AuthenticationFailed);
                }
            }
        };

        tracing::debug!("retrying request with new token");
        let retry = self
            .send(method, endpoint, &body, retry_token.as_deref())
            .await?;
        decode(retry).await
    }

    /// Sends without the refresh/retry cycle. Login and logout use this.
    pub(crate) async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: &RequestBody,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut builder = self.http.request(method, &url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            RequestBody::Empty => builder.header(CONTENT_TYPE, JSON),
            RequestBody::Json(value) => builder
                .header(CONTENT_TYPE, JSON)
                .body(serde_json::to_vec(value)?),
            // reqwest sets the multipart boundary itself
            RequestBody::Multipart(form) => builder.multipart(build_form(form)?),
        };

        builder.send().await.map_err(|e| {
            tracing::error!(error = %e, %url, "request failed");
            ApiError::Transport(e)
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let error = http_error(status, &bytes);
        tracing::warn!(%status, error = %error, "request rejected");
        return Err(error);
    }

    if bytes.is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::error!(error = %e, "failed to parse response body");
        ApiError::Decode(e)
    })
}

fn build_form(form: &MultipartForm) -> Result<Form, ApiError> {
    let mut multipart = Form::new();
    for (name, value) in form.fields() {
        multipart = multipart.text(name.clone(), value.clone());
    }
    for (name, file) in form.files() {
        let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        let part = match &file.content_type {
            Some(content_type) => part
                .mime_str(content_type)
                .map_err(|_| ApiError::InvalidUpload(format!("{}: {content_type}", file.file_name)))?,
            None => part,
        };
        multipart = multipart.part(name.clone(), part);
    }
    Ok(multipart)
}
