//! Error types for the geotrigger library.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, remote API, decoding, and input validation
//! errors.
//!
//! [`Error`] is `Clone`: a single refresh outcome is handed to every request
//! that was waiting on it.

use std::fmt;
use thiserror::Error;

/// The unified error type for geotrigger operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (rejected credentials, rejected tokens).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Error bodies returned by the Geotrigger API or the OAuth endpoints.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A response that could not be decoded into the expected shape.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// Input validation errors (invalid URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// The token manager task is no longer running.
    #[error("token manager stopped")]
    ManagerStopped,
}

impl Error {
    /// Returns true if this error means the access token was refused.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Error::Api(err) => err.is_auth_failure(),
            Error::Auth(AuthError::TokenRejected) => true,
            _ => false,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedResponse {
            message: message.into(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Error::malformed(err.to_string());
        }
        Error::Transport(TransportError::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::malformed(err.to_string())
    }
}

/// Authentication-related errors.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The OAuth endpoint refused the client id or secret.
    #[error("credentials rejected: {message}")]
    CredentialsRejected { message: String },

    /// A device refresh was attempted without a refresh token.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The API refused the access token again after a refresh.
    #[error("access token rejected after refresh")]
    TokenRejected,
}

/// An error body returned by a remote endpoint.
///
/// Geotrigger wraps errors as `{"error": {"type", "message", "code", "headers"}}`;
/// the OAuth endpoints use `{"error": {"code", "error", "error_description", "message"}}`.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Numeric error code from the body, if present.
    pub code: Option<i64>,
    /// Error type or OAuth error identifier, if present.
    pub kind: Option<String>,
    /// Human-readable message, if present.
    pub message: Option<String>,
    /// Whether the body flagged the `Authorization` header as invalid.
    pub invalid_authorization: bool,
}

/// Codes the API uses for a missing, invalid or expired token.
const AUTH_FAILURE_CODES: [i64; 2] = [401, 498];

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(code) = self.code {
            write!(f, " code {}", code)?;
        }
        if let Some(ref kind) = self.kind {
            write!(f, " [{}]", kind)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create an error with only a status code.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            code: None,
            kind: None,
            message: None,
            invalid_authorization: false,
        }
    }

    /// Build an error from the `error` member of a response body.
    ///
    /// Accepts either an object or a bare string.
    pub fn from_body(status: u16, error: &serde_json::Value) -> Self {
        let mut api_error = Self::new(status);

        if let Some(text) = error.as_str() {
            api_error.kind = Some(text.to_string());
            return api_error;
        }

        api_error.code = error.get("code").and_then(serde_json::Value::as_i64);
        api_error.kind = error
            .get("type")
            .or_else(|| error.get("error"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        api_error.message = error
            .get("message")
            .or_else(|| error.get("error_description"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        api_error.invalid_authorization = error
            .get("headers")
            .and_then(|headers| headers.get("Authorization"))
            .is_some();

        api_error
    }

    /// Check if this error means the access token is expired or invalid.
    pub fn is_auth_failure(&self) -> bool {
        AUTH_FAILURE_CODES.contains(&i64::from(self.status))
            || self.code.is_some_and(|c| AUTH_FAILURE_CODES.contains(&c))
            || self.invalid_authorization
    }
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid service URL format.
    #[error("invalid service URL '{value}': {reason}")]
    ServiceUrl { value: String, reason: String },

    /// Invalid API route.
    #[error("invalid route '{value}': {reason}")]
    Route { value: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expired_token_body_is_auth_failure() {
        let body = json!({
            "type": "invalidHeader",
            "message": "invalid header or header value",
            "headers": {
                "Authorization": [{"type": "invalid", "message": "Invalid token."}]
            },
            "code": 498
        });
        let err = ApiError::from_body(200, &body);
        assert!(err.is_auth_failure());
        assert_eq!(err.code, Some(498));
        assert_eq!(err.kind.as_deref(), Some("invalidHeader"));
        assert!(err.invalid_authorization);
    }

    #[test]
    fn oauth_error_body_fields() {
        let body = json!({
            "code": 400,
            "error": "invalid_client_id",
            "error_description": "Invalid client_id",
            "message": "Invalid client_id"
        });
        let err = ApiError::from_body(200, &body);
        assert!(!err.is_auth_failure());
        assert_eq!(err.kind.as_deref(), Some("invalid_client_id"));
        assert_eq!(err.message.as_deref(), Some("Invalid client_id"));
    }

    #[test]
    fn status_401_is_auth_failure() {
        assert!(ApiError::new(401).is_auth_failure());
        assert!(!ApiError::new(500).is_auth_failure());
    }

    #[test]
    fn string_error_body() {
        let err = ApiError::from_body(400, &json!("bad request"));
        assert_eq!(err.kind.as_deref(), Some("bad request"));
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = ApiError::from_body(
            400,
            &json!({"type": "invalidParameter", "message": "bad tag", "code": 400}),
        );
        let text = err.to_string();
        assert!(text.contains("HTTP 400"));
        assert!(text.contains("[invalidParameter]"));
        assert!(text.contains("bad tag"));
    }

    #[test]
    fn token_rejected_counts_as_auth_failure() {
        assert!(Error::from(AuthError::TokenRejected).is_auth_failure());
        assert!(!Error::ManagerStopped.is_auth_failure());
    }
}
