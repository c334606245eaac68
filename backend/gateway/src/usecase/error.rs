use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure of a single gateway call. `Display` is short and safe to show to
/// the user.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("Could not connect to the server")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from the server")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::AuthenticationFailed => Some(StatusCode::UNAUTHORIZED),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            ApiError::Decode(_) | ApiError::InvalidUpload(_) => None,
        }
    }
}

/// Outcome shared by every caller waiting on one refresh, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("no refresh token available")]
    MissingRefreshToken,

    #[error("refresh rejected with status {0}")]
    Rejected(StatusCode),

    #[error("refresh response did not contain an access token")]
    MissingAccessToken,

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("session was replaced during refresh")]
    Superseded,

    #[error("refresh task did not finish: {0}")]
    Interrupted(String),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<ServerMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServerMessage {
    Text(String),
    List(Vec<String>),
}

/// Message the backend put in an error body (`message`, then `error`).
pub(crate) fn server_message(body: &[u8]) -> Option<String> {
    let body: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = body.message.map(|message| match message {
        ServerMessage::Text(text) => text,
        ServerMessage::List(items) => items.join(", "),
    });

    message
        .filter(|m| !m.trim().is_empty())
        .or(body.error.filter(|e| !e.trim().is_empty()))
}

pub(crate) fn http_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message =
        server_message(body).unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
    ApiError::Http { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_takes_precedence() {
        let body = br#"{"message": "Room not found", "error": "Not Found", "statusCode": 404}"#;

        assert_eq!(server_message(body).as_deref(), Some("Room not found"));
    }

    #[test]
    fn test_message_list_is_joined() {
        let body = br#"{"message": ["title should not be empty", "price must be a string"], "error": "Bad Request"}"#;

        assert_eq!(
            server_message(body).as_deref(),
            Some("title should not be empty, price must be a string")
        );
    }

    #[test]
    fn test_falls_back_to_error_field() {
        assert_eq!(server_message(br#"{"error": "Forbidden"}"#).as_deref(), Some("Forbidden"));
    }

    #[test]
    fn test_generic_status_message() {
        let error = http_error(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");

        assert_eq!(error.to_string(), "HTTP error! status: 502");
        assert_eq!(error.status(), Some(StatusCode::BAD_GATEWAY));
    }
}
