//! The `error` module defines the error type shared by every broker-facing
//! operation of the console.
//!
//! Failures fall into three kinds: the broker could not be reached or
//! answered with something unreadable, the broker rejected the request, or
//! the operator's input was rejected before any request was made.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response whose body could not be decoded.
    #[error("malformed broker response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// A non-2xx response. `message` is the broker's own text when it sent one.
    #[error("broker error ({status}): {message}")]
    Broker { status: u16, message: String },

    /// Input rejected before contacting the broker.
    #[error("invalid input: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Broker,
    Validation,
}

impl ConsoleError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ConsoleError::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::Transport(_) | ConsoleError::MalformedResponse(_) => ErrorKind::Transport,
            ConsoleError::Broker { .. } => ErrorKind::Broker,
            ConsoleError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// The text shown to the operator: the broker's message for broker
    /// errors, the full description otherwise.
    pub fn operator_message(&self) -> String {
        match self {
            ConsoleError::Broker { message, .. } => message.clone(),
            ConsoleError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
