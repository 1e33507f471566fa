//! Progress events
//!
//! Advisory notifications emitted while a call is in flight. Delivery is
//! fire-and-forget: the transport calls the callback inline and never
//! waits on anything it does.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::error::ApiError;

/// Stage of a call being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A request body is being sent
    Uploading,
    /// The registry has answered and the response is being handled
    Processing,
}

impl EventKind {
    pub fn present_participle(&self) -> &'static str {
        match self {
            Self::Uploading => "Uploading",
            Self::Processing => "Processing",
        }
    }
}

/// A single progress notification
#[derive(Debug, Clone)]
pub struct Event {
    pub id: Uuid,
    pub kind: EventKind,
    pub message: String,
}

impl Event {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn for_request(kind: EventKind, method: &str, path: &str) -> Self {
        Self::new(
            kind,
            format!("{} {} {}", kind.present_participle(), method, path),
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Callback receiving `(event, error)` pairs; at most one side is set
pub type ProgressFn = Arc<dyn Fn(Option<&Event>, Option<&ApiError>) + Send + Sync>;

/// Progress callback that prints event messages to stdout
pub fn print_progress() -> ProgressFn {
    Arc::new(|event: Option<&Event>, _err: Option<&ApiError>| {
        if let Some(event) = event {
            println!("{}", event.message);
        }
    })
}
