//! Error types for the transport layer.

use serde_json::Value;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can occur while executing an operation on either transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The native bridge, or the named method on it, is not exposed.
    /// Raised before any callback is registered.
    #[error("native bridge unavailable: {0}")]
    Unavailable(String),

    /// The native side reported an error (structured payload or raw value),
    /// or threw synchronously while being invoked.
    #[error("native call failed: {0}")]
    NativeCall(Value),

    /// The HTTP backend answered with a non-success status.
    #[error("HTTP error! status: {status}, message: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The pending callback was released without ever being settled.
    #[error("native callback dropped before settlement")]
    CallbackDropped,

    /// A configured call deadline expired.
    #[error("operation timed out")]
    Timeout,
}

impl TransportError {
    /// HTTP status code, if this error came from a non-success response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message suitable for an error view.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NativeCall(Value::String(msg)) => msg.clone(),
            Self::NativeCall(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| Value::Object(map.clone()).to_string(), str::to_string),
            Self::Status { body, .. } if !body.is_empty() => body.clone(),
            other => other.to_string(),
        }
    }
}
