pub mod v1;

use std::sync::Arc;

use axum::{Router, extract::State, middleware, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::delivery::http::v1::guard::admin_guard;
use crate::delivery::http::v1::images::get_image;

/// Image proxy and health endpoints, with the built site served for every
/// other path. The admin guard runs in front of all of them.
pub fn router(state: Arc<AppState>, static_dir: &str) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/images/{*path}", get(get_image))
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(admin_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    metrics_process::Collector::default().collect();
    state.metrics_handle.render()
}

#[tracing::instrument]
async fn healthz() -> &'static str {
    "OK"
}
