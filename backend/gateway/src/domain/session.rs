use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Administrator profile cached next to the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user: Option<AdminUser>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub name: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("name", &self.name)
            .field("password", &"***")
            .finish()
    }
}

/// Body of a successful `/admin/login` or `/admin/refresh` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    admin: Option<serde_json::Value>,
}

impl TokenGrant {
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Decodes the admin profile, dropping it if the backend sent something unexpected.
    pub fn admin(&self) -> Option<AdminUser> {
        let value = self.admin.clone()?;
        match serde_json::from_value(value) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed admin profile");
                None
            }
        }
    }
}

/// First characters of a token, safe for logs.
pub fn redact(token: &str) -> String {
    let head: String = token.chars().take(8).collect();
    format!("{head}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_decodes_login_response() {
        let body = r#"{
            "accessToken": "access",
            "refreshToken": "refresh",
            "admin": {
                "id": 1,
                "name": "admin",
                "refreshToken": "refresh",
                "createdAt": "2024-05-01T10:00:00.000Z",
                "updatedAt": "2024-05-01T10:00:00.000Z"
            }
        }"#;

        let grant: TokenGrant = serde_json::from_str(body).unwrap();

        assert_eq!(grant.access_token(), Some("access"));
        assert_eq!(grant.refresh_token(), Some("refresh"));
        let admin = grant.admin().unwrap();
        assert_eq!(admin.id, 1);
        assert_eq!(admin.name, "admin");
        assert!(admin.created_at.is_some());
    }

    #[test]
    fn test_grant_ignores_malformed_admin() {
        let grant: TokenGrant =
            serde_json::from_str(r#"{"accessToken": "a", "admin": {"id": "x"}}"#).unwrap();

        assert!(grant.admin().is_none());
        assert!(grant.refresh_token().is_none());
    }

    #[test]
    fn test_empty_tokens_are_absent() {
        let grant: TokenGrant =
            serde_json::from_str(r#"{"accessToken": "", "refreshToken": ""}"#).unwrap();

        assert!(grant.access_token().is_none());
        assert!(grant.refresh_token().is_none());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = LoginCredentials::new("admin", "hunter2");

        let debug = format!("{credentials:?}");

        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_redact_keeps_prefix_only() {
        assert_eq!(redact("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGci…");
        assert_eq!(redact("abc"), "abc…");
    }
}
