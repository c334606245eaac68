use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Image not found")]
    NotFound,

    #[error("Error fetching image")]
    Upstream(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ProxyError::NotFound => StatusCode::NOT_FOUND,
            ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &self {
            ProxyError::Upstream(cause) => {
                tracing::error!(error = %cause, "image upstream failure");
            }
            ProxyError::NotFound => {
                tracing::debug!(error = %self);
            }
        }

        (status, self.to_string()).into_response()
    }
}
