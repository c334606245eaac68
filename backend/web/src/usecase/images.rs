use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};

use crate::usecase::error::ProxyError;

const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Upstream image ready to be streamed back to the browser.
pub struct UpstreamImage {
    pub content_type: String,
    pub response: Response,
}

#[derive(Clone)]
pub struct ImageProxy {
    client: Client,
    uploads_url: String,
}

impl ImageProxy {
    pub fn new(backend_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("hotel-web/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            uploads_url: format!("{}/uploads", backend_url.trim_end_matches('/')),
        })
    }

    /// Fetches `<backend>/uploads/<path>`. The response body is left unread.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, path: &str) -> Result<UpstreamImage, ProxyError> {
        if !is_safe_path(path) {
            tracing::warn!("rejected image path");
            return Err(ProxyError::NotFound);
        }

        let url = format!("{}/{}", self.uploads_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, "upstream has no such image");
            return Err(ProxyError::NotFound);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        Ok(UpstreamImage {
            content_type,
            response,
        })
    }
}

/// Relative path below `/uploads` with no traversal or empty segments.
fn is_safe_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && !segment.contains(['\\', '?', '#'])
        })
}
