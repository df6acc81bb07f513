//! Error types for lumen-store
//!
//! Failures are classified the way a view needs them: no response at all
//! (transport) versus a response with an error status (application). Both end
//! up as a human-readable message inside a slice, never as a raw exception.

use serde_json::Value;
use thiserror::Error;

/// Message shown for any failure where no response was received
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";

/// Request executor errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response received (connectivity loss, timeout, TLS failure)
    #[error("Network error: {0}")]
    Transport(String),

    /// Response received with an error status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Caller supplied unusable parameters; nothing was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 2xx response that lacks something the caller requires
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Persisted credential store failed
    #[error("Credential store error: {0}")]
    Credentials(String),
}

impl ApiError {
    /// Build an application failure from an error response.
    ///
    /// The server message is taken from `message`, `error` (string or
    /// `{ message }`) or `detail`; otherwise a status-derived text is used.
    pub fn from_response(status: u16, body: &Value) -> Self {
        let message = server_message(body).unwrap_or_else(|| status_message(status).to_string());
        Self::Status { status, message }
    }

    /// Text stored in a slice's `error` field
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => CONNECTIVITY_MESSAGE.to_string(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::InvalidInput(msg) | ApiError::InvalidResponse(msg) => msg.clone(),
            ApiError::Credentials(_) => "Could not access saved credentials.".to_string(),
        }
    }

    /// HTTP status if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether blind retry may help (idempotent reads only)
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { status, .. } => matches!(status, 408 | 429) || *status >= 500,
            ApiError::InvalidInput(_) | ApiError::InvalidResponse(_) | ApiError::Credentials(_) => false,
        }
    }
}

impl From<lumen_common::Error> for ApiError {
    fn from(err: lumen_common::Error) -> Self {
        ApiError::Credentials(err.to_string())
    }
}

fn server_message(body: &Value) -> Option<String> {
    let candidates = [
        body.get("message"),
        body.get("error").and_then(|e| e.get("message")),
        body.get("error"),
        body.get("detail"),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn status_message(status: u16) -> &'static str {
    match status {
        400 => "The request was rejected by the server.",
        401 => "Your session has expired. Please sign in again.",
        403 => "You do not have access to this content.",
        404 => "The requested content could not be found.",
        408 | 504 => "The server took too long to respond.",
        429 => "Too many requests. Please wait a moment and try again.",
        500..=599 => "The server encountered an error. Please try again later.",
        _ => "The request could not be completed.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_extracted_from_body() {
        let err = ApiError::from_response(422, &json!({ "message": "Email already registered" }));
        assert_eq!(err.user_message(), "Email already registered");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_nested_error_message() {
        let err = ApiError::from_response(400, &json!({ "error": { "message": "Bad quiz id" } }));
        assert_eq!(err.user_message(), "Bad quiz id");

        let err = ApiError::from_response(400, &json!({ "error": "Missing field" }));
        assert_eq!(err.user_message(), "Missing field");
    }

    #[test]
    fn test_status_derived_message_when_body_empty() {
        let err = ApiError::from_response(404, &Value::Null);
        assert_eq!(err.user_message(), "The requested content could not be found.");

        let err = ApiError::from_response(503, &json!({ "message": "  " }));
        assert_eq!(
            err.user_message(),
            "The server encountered an error. Please try again later."
        );
    }

    #[test]
    fn test_transport_message_is_generic() {
        let err = ApiError::Transport("connection refused (os error 111)".to_string());
        assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
        assert!(err.status().is_none());
    }

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Transport("timeout".into()).is_transient());
        assert!(ApiError::from_response(503, &Value::Null).is_transient());
        assert!(ApiError::from_response(429, &Value::Null).is_transient());
        assert!(!ApiError::from_response(400, &Value::Null).is_transient());
        assert!(!ApiError::InvalidInput("empty".into()).is_transient());
    }
}
