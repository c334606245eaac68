use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::domain::session::{TokenGrant, TokenPair};
use crate::usecase::auth_store::AuthStore;
use crate::usecase::error::RefreshError;
use crate::usecase::events::AuthEvent;

pub type RefreshOutcome = Result<TokenPair, RefreshError>;

type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

#[derive(Default)]
struct Slot {
    next_generation: u64,
    pending: Option<(u64, PendingRefresh)>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Exchanges the refresh token for a new token pair, at most one exchange at
/// a time. Callers arriving while an exchange is in flight await its outcome
/// instead of starting another one.
///
/// The exchange runs as its own task and clears the slot when it settles, so
/// cancelled callers never leave a stale exchange behind for the next one to
/// join.
pub struct RefreshCoordinator {
    http: reqwest::Client,
    endpoint: String,
    store: Arc<AuthStore>,
    default_lifetime: Duration,
    events: broadcast::Sender<AuthEvent>,
    slot: Arc<Mutex<Slot>>,
}

impl RefreshCoordinator {
    pub fn new(
        http: reqwest::Client,
        endpoint: String,
        store: Arc<AuthStore>,
        default_lifetime: Duration,
        events: broadcast::Sender<AuthEvent>,
    ) -> Self {
        Self {
            http,
            endpoint,
            store,
            default_lifetime,
            events,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        self.join_or_start().await
    }

    pub fn in_flight(&self) -> bool {
        self.slot.lock().pending.is_some()
    }

    fn join_or_start(&self) -> PendingRefresh {
        let mut slot = self.slot.lock();
        if let Some((generation, pending)) = &slot.pending {
            tracing::debug!(generation, "joining in-flight token refresh");
            return pending.clone();
        }

        let generation = slot.next_generation;
        slot.next_generation += 1;

        let exchange = exchange(
            self.http.clone(),
            self.endpoint.clone(),
            self.store.clone(),
            self.default_lifetime,
            self.events.clone(),
        );
        let settled = self.slot.clone();
        let task = tokio::spawn(async move {
            let outcome = exchange.await;
            let mut slot = settled.lock();
            if slot
                .pending
                .as_ref()
                .is_some_and(|(current, _)| *current == generation)
            {
                slot.pending = None;
            }
            outcome
        });

        let pending = async move {
            task.await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "token refresh task failed");
                Err(RefreshError::Interrupted(e.to_string()))
            })
        }
        .boxed()
        .shared();
        slot.pending = Some((generation, pending.clone()));
        pending
    }
}

async fn exchange(
    http: reqwest::Client,
    endpoint: String,
    store: Arc<AuthStore>,
    default_lifetime: Duration,
    events: broadcast::Sender<AuthEvent>,
) -> RefreshOutcome {
    let Some(current_refresh) = store.refresh_token() else {
        tracing::info!("no refresh token available");
        return Err(RefreshError::MissingRefreshToken);
    };

    tracing::debug!("refreshing access token");
    let response = http
        .post(&endpoint)
        .json(&RefreshRequest {
            refresh_token: &current_refresh,
        })
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "token refresh request failed");
            RefreshError::Transport(e.to_string())
        })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%status, "token refresh rejected");
        return Err(RefreshError::Rejected(status));
    }

    let grant: TokenGrant = response.json().await.map_err(|e| {
        tracing::warn!(error = %e, "failed to parse token refresh response");
        RefreshError::Transport(e.to_string())
    })?;

    let Some(access_token) = grant.access_token() else {
        tracing::warn!("token refresh response has no access token");
        return Err(RefreshError::MissingAccessToken);
    };
    let refresh_token = grant.refresh_token().unwrap_or(&current_refresh);
    let expires_in = grant
        .expires_in
        .map(Duration::from_secs)
        .unwrap_or(default_lifetime);

    let Some(pair) = store.rotate_tokens(
        &current_refresh,
        access_token,
        refresh_token,
        expires_in,
        grant.admin().as_ref(),
    ) else {
        // a login or logout replaced the session while the exchange was out
        tracing::info!("session changed during token refresh, discarding grant");
        return store.token_pair().ok_or(RefreshError::Superseded);
    };
    tracing::info!(expires_at = %pair.expires_at, "token refresh successful");
    // no subscribers is fine
    let _ = events.send(AuthEvent::Refreshed);

    Ok(pair)
}
