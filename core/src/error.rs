//! Error types for fetching todos.
//!
//! # Design
//! Two layers. `ApiError` is what the client and transport report, and it
//! keeps the HTTP status and body around for logs. `FetchError` is the only
//! error that crosses the repository boundary: callers above the repository
//! get a message and nothing else to branch on.

use thiserror::Error;

/// Message shown when a failure carries no message of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Errors returned by `TodoClient` parse methods and by transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused, timeout, I/O).
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

/// The single "fetch failed" error seen by the use case and presenter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .message.as_deref().unwrap_or(UNKNOWN_ERROR))]
pub struct FetchError {
    message: Option<String>,
}

impl FetchError {
    /// An empty message is treated the same as no message, so a blank
    /// error never reaches the screen; `display_message` shows
    /// `UNKNOWN_ERROR` instead.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: (!message.is_empty()).then_some(message),
        }
    }

    pub fn without_message() -> Self {
        Self { message: None }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The message, or `UNKNOWN_ERROR` when there is none.
    pub fn display_message(&self) -> &str {
        self.message().unwrap_or(UNKNOWN_ERROR)
    }
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        Self::new(err.to_string())
    }
}

/// Success/failure wrapper used across layer boundaries.
pub type Outcome<T> = Result<T, FetchError>;
