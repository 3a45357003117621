//! Client error types

use bop_core::CoreError;
use serde_json::Value;
use std::fmt::{self, Display};
use thiserror::Error;

/// Body of a non-success response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub status: u16,
    /// Structured `message`, `error` or `detail` field, when the server sent one
    pub message: Option<String>,
    pub raw: String,
}

impl ApiErrorBody {
    /// Parse a response body, pulling out the structured message if present
    pub fn parse(status: u16, raw: String) -> Self {
        let message = serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(|value| structured_message(&value));
        Self {
            status,
            message,
            raw,
        }
    }
}

fn structured_message(value: &Value) -> Option<String> {
    ["message", "error", "detail"].iter().find_map(|key| {
        match value.get(key)? {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            // FastAPI validation errors: [{"msg": ...}, ...]
            Value::Array(items) => items
                .iter()
                .find_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        }
    })
}

impl Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, self.raw.trim()) {
            (Some(message), _) => write!(f, "{message}"),
            (None, "") => write!(f, "HTTP {}", self.status),
            (None, raw) => write!(f, "{raw}"),
        }
    }
}

/// Coarse error taxonomy used for user-facing handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, timeout or DNS failure
    Transport,
    /// Missing or expired credentials
    Authentication,
    /// Authenticated but not allowed
    Authorization,
    /// Request rejected with a structured message
    Validation,
    NotFound,
    Server,
    /// Local failure: configuration, storage, decoding
    Internal,
}

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// 401 that could not be recovered
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(ApiErrorBody),

    #[error("Forbidden: {0}")]
    Forbidden(ApiErrorBody),

    #[error("Resource not found: {0}")]
    NotFound(ApiErrorBody),

    #[error("Bad request: {0}")]
    BadRequest(ApiErrorBody),

    #[error("Conflict: {0}")]
    Conflict(ApiErrorBody),

    #[error("Unprocessable request: {0}")]
    Unprocessable(ApiErrorBody),

    /// Any other non-success status
    #[error("Server error {status}: {0}", status = .0.status)]
    ServerError(ApiErrorBody),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Rejected locally before anything was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A login or token exchange answered 2xx without an access token
    #[error("Authentication failed: no access token in response")]
    MissingToken,

    /// Token refresh failed; credentials were cleared
    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error(transparent)]
    Storage(#[from] CoreError),
}

impl ClientError {
    /// Create error from HTTP status code and response body
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        let body = ApiErrorBody::parse(status.as_u16(), body);
        match status.as_u16() {
            400 => Self::BadRequest(body),
            401 => Self::AuthenticationFailed(body),
            403 => Self::Forbidden(body),
            404 => Self::NotFound(body),
            409 => Self::Conflict(body),
            422 => Self::Unprocessable(body),
            _ => Self::ServerError(body),
        }
    }

    /// Response body for HTTP status errors
    pub fn api_body(&self) -> Option<&ApiErrorBody> {
        match self {
            Self::AuthenticationFailed(body)
            | Self::Forbidden(body)
            | Self::NotFound(body)
            | Self::BadRequest(body)
            | Self::Conflict(body)
            | Self::Unprocessable(body)
            | Self::ServerError(body) => Some(body),
            _ => None,
        }
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        self.api_body()
            .map(|body| body.status)
            .or_else(|| match self {
                Self::Request(e) => e.status().map(|s| s.as_u16()),
                _ => None,
            })
    }

    /// Structured message sent by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        self.api_body().and_then(|body| body.message.as_deref())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Request(_) => ErrorCategory::Transport,
            Self::AuthenticationFailed(_) | Self::SessionExpired(_) | Self::MissingToken => {
                ErrorCategory::Authentication
            }
            Self::Forbidden(_) => ErrorCategory::Authorization,
            Self::BadRequest(_)
            | Self::Conflict(_)
            | Self::Unprocessable(_)
            | Self::InvalidInput(_) => ErrorCategory::Validation,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::ServerError(body) if body.status >= 500 => ErrorCategory::Server,
            Self::ServerError(_) => ErrorCategory::Validation,
            Self::Serialization(_) | Self::Configuration(_) | Self::Storage(_) => {
                ErrorCategory::Internal
            }
        }
    }
}
