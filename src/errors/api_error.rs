use serde_json::Value;
use thiserror::Error;

use super::codes::{NETWORK_ERROR, REQUEST_TIMEOUT};

const DEFAULT_HTTP_MESSAGE: &str = "request failed";

/// Failure of a single `HttpClient` call.
///
/// `code` is the HTTP status for protocol failures, `408` when the client
/// timer fired first and `0` when no response was received at all.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} (code {code})")]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    /// Raw response payload, when the server sent one
    pub data: Option<Value>,
}

impl ApiError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn timeout() -> Self {
        Self::new(REQUEST_TIMEOUT, "request timeout")
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(NETWORK_ERROR, message)
    }

    /// Build the error for a non-2xx response.
    ///
    /// The message is taken from a `message` string field of the body when
    /// present.
    pub fn http(status: u16, data: Value) -> Self {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_HTTP_MESSAGE)
            .to_string();

        Self {
            code: status,
            message,
            data: Some(data),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.code == REQUEST_TIMEOUT && self.data.is_none()
    }

    pub fn is_network(&self) -> bool {
        self.code == NETWORK_ERROR
    }
}
