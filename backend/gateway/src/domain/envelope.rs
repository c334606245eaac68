use std::fmt::Display;

use serde::{Serialize, Serializer};

const UNKNOWN_ERROR: &str = "Unexpected error";

/// `{success, data?, error?}` result returned by every façade call.
///
/// Exactly one of `data` and `error` is populated; a failure always carries a
/// non-empty message.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T>(Result<T, String>);

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self(Ok(data))
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self(Err(UNKNOWN_ERROR.to_string()));
        }
        Self(Err(message))
    }

    /// Uses `fallback` when the error renders as an empty string.
    pub fn from_result<E: Display>(result: Result<T, E>, fallback: &str) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let message = e.to_string();
                if message.trim().is_empty() {
                    Self::failure(fallback)
                } else {
                    Self::failure(message)
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.0.is_ok()
    }

    pub fn data(&self) -> Option<&T> {
        self.0.as_ref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.0.as_ref().err().map(String::as_str)
    }

    pub fn into_result(self) -> Result<T, String> {
        self.0
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a, T> {
            success: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            data: Option<&'a T>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a str>,
        }

        Wire {
            success: self.is_success(),
            data: self.data(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_has_data_only() {
        let envelope = Envelope::ok(5);

        assert!(envelope.is_success());
        assert_eq!(envelope.data(), Some(&5));
        assert!(envelope.error().is_none());
    }

    #[test]
    fn test_failure_never_has_empty_message() {
        let envelope: Envelope<i32> = Envelope::failure("  ");

        assert!(!envelope.is_success());
        assert!(envelope.data().is_none());
        assert_eq!(envelope.error(), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn test_from_result_uses_fallback_for_blank_errors() {
        let envelope: Envelope<()> = Envelope::from_result(Err(""), "Failed to load rooms");

        assert_eq!(envelope.error(), Some("Failed to load rooms"));
    }

    #[test]
    fn test_serialized_shape() {
        let ok = serde_json::to_value(Envelope::ok(vec![1, 2])).unwrap();
        let err = serde_json::to_value(Envelope::<Vec<i32>>::failure("Authentication failed")).unwrap();
        let void = serde_json::to_value(Envelope::ok(())).unwrap();

        assert_eq!(ok, serde_json::json!({"success": true, "data": [1, 2]}));
        assert_eq!(
            err,
            serde_json::json!({"success": false, "error": "Authentication failed"})
        );
        assert_eq!(void, serde_json::json!({"success": true, "data": null}));
    }
}
