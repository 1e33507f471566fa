//! Registry client errors

use std::fmt;
use thiserror::Error;

/// Why a call stopped before completing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller cancelled the context
    Cancelled,
    /// The context deadline passed
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("context cancelled"),
            Self::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Coarse classification of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Encoding,
    Transport,
    Registry,
    Cancelled,
    Decode,
}

/// Errors returned by the registry client
///
/// None of these are retried by the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A local precondition failed; nothing was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encoding(#[source] serde_json::Error),

    /// No response was obtained from the registry.
    #[error("failed to reach registry: {0}")]
    Transport(String),

    /// The registry answered with a non-2xx status.
    #[error("registry returned {status}{}", message_suffix(.message))]
    Registry {
        status: u16,
        message: Option<String>,
    },

    /// The caller's context ended before the exchange completed.
    #[error("request aborted: {0}")]
    Cancelled(CancelReason),

    /// A 2xx response carried a body we could not decode.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Registry { .. } => ErrorKind::Registry,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Decode(_) => ErrorKind::Decode,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// HTTP status, for registry errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Registry { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Format an API error for display on the command line
pub fn format_api_error(error: &ApiError) -> String {
    match error {
        ApiError::Cancelled(_) => "Aborted.".to_string(),
        ApiError::InvalidArgument(msg) => format!("Invalid argument: {}", msg),
        ApiError::Transport(_) => {
            "Could not reach the registry. Check your network connection and try again."
                .to_string()
        }
        ApiError::Encoding(_) | ApiError::Decode(_) => error.to_string(),
        ApiError::Registry { status, message } => {
            // Prefer the registry's own explanation when it sent one
            if let Some(message) = message {
                return message.clone();
            }
            match status {
                401 => "Authentication failed. Log in again and retry.".to_string(),
                403 => "Permission denied.".to_string(),
                404 => "Resource not found.".to_string(),
                409 => "Resource conflict. The resource may already exist.".to_string(),
                429 => "Rate limit exceeded. Please try again later.".to_string(),
                400 => "Invalid request. Check your parameters.".to_string(),
                500..=599 => "Registry temporarily unavailable. Please try again.".to_string(),
                _ => format!("Request failed with status {}.", status),
            }
        }
    }
}
