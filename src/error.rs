use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Main error type for the lobbywatch service
#[derive(Debug)]
pub enum LobbyError {
    /// Configuration errors: unknown bucket names, malformed rate limits.
    /// These are programming or deployment mistakes, never retried.
    Config(String),

    /// Provider/session registration failed; fatal until restart
    Bootstrap(String),

    /// Transport or HTTP failure talking to the remote API
    Remote(RemoteError),

    /// Malformed user-supplied option value
    Validation(String),

    /// Lookup of a lobby code we are not tracking
    NotFound(String),

    /// Internal lock poisoning or closed channels
    Concurrency(String),

    /// JSON serialization/deserialization errors
    Serialization(serde_json::Error),
}

/// Failure of a single remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// HTTP status when the remote answered at all
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl fmt::Display for LobbyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LobbyError::Config(msg) => write!(f, "Configuration error: {}", msg),
            LobbyError::Bootstrap(msg) => write!(f, "Bootstrap error: {}", msg),
            LobbyError::Remote(err) => write!(f, "Remote call error: {}", err),
            LobbyError::Validation(msg) => write!(f, "{}", msg),
            LobbyError::NotFound(msg) => write!(f, "Not found: {}", msg),
            LobbyError::Concurrency(msg) => write!(f, "Concurrency error: {}", msg),
            LobbyError::Serialization(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for LobbyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LobbyError::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

// Convenient type alias for Results using our error type
pub type Result<T> = std::result::Result<T, LobbyError>;

impl IntoResponse for LobbyError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = json!({
            "error": {
                "code": status_code.as_u16(),
                "message": self.to_string(),
                "type": self.error_type(),
            }
        });

        (status_code, Json(error_response)).into_response()
    }
}

impl LobbyError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            LobbyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LobbyError::Bootstrap(_) => StatusCode::SERVICE_UNAVAILABLE,
            LobbyError::Remote(_) => StatusCode::BAD_GATEWAY,
            LobbyError::Validation(_) => StatusCode::BAD_REQUEST,
            LobbyError::NotFound(_) => StatusCode::NOT_FOUND,
            LobbyError::Concurrency(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LobbyError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            LobbyError::Config(_) => "configuration_error",
            LobbyError::Bootstrap(_) => "bootstrap_error",
            LobbyError::Remote(_) => "remote_call_error",
            LobbyError::Validation(_) => "validation_error",
            LobbyError::NotFound(_) => "not_found",
            LobbyError::Concurrency(_) => "concurrency_error",
            LobbyError::Serialization(_) => "serialization_error",
        }
    }
}

impl From<RemoteError> for LobbyError {
    fn from(err: RemoteError) -> Self {
        LobbyError::Remote(err)
    }
}

impl From<reqwest::Error> for LobbyError {
    fn from(err: reqwest::Error) -> Self {
        LobbyError::Remote(RemoteError::new(
            err.status().map(|status| status.as_u16()),
            err.to_string(),
        ))
    }
}

impl From<serde_json::Error> for LobbyError {
    fn from(err: serde_json::Error) -> Self {
        LobbyError::Serialization(err)
    }
}

// Helper macros for common error construction patterns
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::LobbyError::Config($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::LobbyError::Config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! bootstrap_error {
    ($msg:expr) => {
        $crate::error::LobbyError::Bootstrap($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::LobbyError::Bootstrap(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr) => {
        $crate::error::LobbyError::Validation($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::LobbyError::Validation(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! concurrency_error {
    ($msg:expr) => {
        $crate::error::LobbyError::Concurrency($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::LobbyError::Concurrency(format!($fmt, $($arg)*))
    };
}
