use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Method;

use crate::domain::envelope::Envelope;
use crate::domain::session::{AdminUser, LoginCredentials, SessionInfo, TokenGrant};
use crate::usecase::client::{ApiClient, RequestBody};
use crate::usecase::error::server_message;
use crate::usecase::events::AuthEvent;

const LOGIN_FAILED: &str = "Login failed";
const CONNECTION_FAILED: &str = "Could not connect to the server";

#[derive(Clone)]
pub struct AuthApi {
    client: Arc<ApiClient>,
}

impl AuthApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Logs in and stores the issued tokens. Goes around the refresh cycle: a
    /// `401` here means bad credentials, not an expired session.
    #[tracing::instrument(skip(self, credentials), fields(name = %credentials.name))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Envelope<SessionInfo> {
        tracing::debug!("attempting login");

        let body = match RequestBody::json(credentials) {
            Ok(body) => body,
            Err(e) => return Envelope::from_result(Err(e), LOGIN_FAILED),
        };

        let response = match self
            .client
            .send(Method::POST, "/admin/login", &body, None)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "login request failed");
                return Envelope::failure(CONNECTION_FAILED);
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "failed to read login response");
                return Envelope::failure(CONNECTION_FAILED);
            }
        };

        if status.is_success() {
            let grant: TokenGrant = serde_json::from_slice(&bytes).unwrap_or_default();
            if let (Some(access_token), Some(refresh_token)) =
                (grant.access_token(), grant.refresh_token())
            {
                let user = grant.admin();
                let expires_in = grant
                    .expires_in
                    .map(Duration::from_secs)
                    .unwrap_or(self.client.token_lifetime());
                let pair = self.client.store().set_tokens(
                    access_token,
                    refresh_token,
                    expires_in,
                    user.as_ref(),
                );
                self.client.emit(AuthEvent::LoggedIn);

                tracing::info!(expires_at = %pair.expires_at, "login successful");
                return Envelope::ok(SessionInfo {
                    user,
                    expires_at: pair.expires_at,
                });
            }
        }

        tracing::warn!(%status, "login rejected");
        Envelope::failure(server_message(&bytes).unwrap_or_else(|| LOGIN_FAILED.to_string()))
    }

    /// Tells the backend, ignoring any failure, then always clears the session.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) -> Envelope<()> {
        if let Some(token) = self.client.store().access_token() {
            tracing::debug!("logging out");
            if let Err(e) = self
                .client
                .send(Method::POST, "/admin/logout", &RequestBody::Empty, Some(&token))
                .await
            {
                tracing::debug!(error = %e, "ignoring logout endpoint failure");
            }
        }

        self.client.store().clear_tokens();
        self.client.emit(AuthEvent::LoggedOut);
        tracing::info!("logout completed");
        Envelope::ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.store().is_authenticated()
    }

    pub fn user(&self) -> Option<AdminUser> {
        self.client.store().user()
    }

    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.client.store().expires_at()
    }

    /// Manual refresh; true when a new token pair was stored.
    pub async fn refresh(&self) -> bool {
        match self.client.force_refresh().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "manual token refresh failed");
                false
            }
        }
    }
}
