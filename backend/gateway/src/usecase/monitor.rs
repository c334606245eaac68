use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::usecase::client::ApiClient;
use crate::usecase::events::AuthEvent;

const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Background session check.
///
/// Every `period` the monitor refreshes a token that is about to expire and
/// publishes [`AuthEvent::LoginRequired`] once when the session is gone. The
/// task is aborted when the monitor is stopped or dropped.
pub struct SessionMonitor {
    handle: JoinHandle<()>,
}

impl SessionMonitor {
    pub fn spawn(client: Arc<ApiClient>, period: Duration) -> Self {
        if period < MIN_PERIOD {
            tracing::warn!(?period, "session check period too short, using minimum");
        }
        let period = period.max(MIN_PERIOD);
        tracing::info!(?period, "starting session monitor");
        let handle = tokio::spawn(run(client, period));
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {
        tracing::info!("stopping session monitor");
        self.handle.abort();
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(client: Arc<ApiClient>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut login_requested = false;

    loop {
        ticker.tick().await;
        let store = client.store();

        if !store.is_authenticated() {
            if !login_requested {
                tracing::info!("no active session, login required");
                client.emit(AuthEvent::LoginRequired);
                login_requested = true;
            }
            continue;
        }
        login_requested = false;

        if store.is_expiring_soon(client.refresh_threshold()) {
            tracing::debug!("session expiring soon, refreshing");
            if let Err(e) = client.force_refresh().await {
                tracing::warn!(error = %e, "scheduled token refresh failed");
            }
        }
    }
}
