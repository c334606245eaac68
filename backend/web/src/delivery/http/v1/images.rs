use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::usecase::error::ProxyError;

const CACHE_FOREVER: &str = "public, max-age=31536000, immutable";

#[tracing::instrument(skip(state))]
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ProxyError> {
    let image = match state.image_proxy.fetch(&path).await {
        Ok(image) => image,
        Err(e) => {
            let outcome = match &e {
                ProxyError::NotFound => "not_found",
                ProxyError::Upstream(_) => "error",
            };
            metrics::counter!("image_proxy_requests_total", "outcome" => outcome).increment(1);
            return Err(e);
        }
    };

    metrics::counter!("image_proxy_requests_total", "outcome" => "ok").increment(1);
    tracing::debug!(content_type = %image.content_type, "streaming image");

    let headers = [
        (CONTENT_TYPE, image.content_type),
        (CACHE_CONTROL, CACHE_FOREVER.to_string()),
    ];
    Ok((headers, Body::from_stream(image.response.bytes_stream())).into_response())
}
