//! The single failure type carried by a rejected [`Deferred`].
//!
//! There is no distinction between transient and fatal failures here. Anything a
//! producer reports, a panic caught while running it, or a failure to spawn it
//! ends up as an [`Error`] inside [`Deferred::Rejected`].
//!
//! [`Deferred`]: crate::Deferred
//! [`Deferred::Rejected`]: crate::Deferred::Rejected
use std::{any::Any, fmt, sync::Arc};

use futures::{channel::oneshot::Canceled, task::SpawnError};

type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// A failure message with an optional underlying cause.
///
/// `Error` is cheap to clone, so a rejected state can be copied into snapshots,
/// joined by [`all`](crate::all) and handed to subscribers without moving the
/// original out of its owner.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    message: Arc<str>,
    #[source]
    cause: Option<Cause>,
}

impl Error {
    /// Wraps an existing error, keeping it reachable through
    /// [`std::error::Error::source`].
    pub fn new(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message: error.to_string().into(),
            cause: Some(Arc::new(error)),
        }
    }

    /// Creates an error from a plain message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string().into(),
            cause: None,
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    // Panic payloads are almost always `&str` or `String`.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::msg(format_args!("producer panicked: {detail}"))
    }
}

/// Two errors are equal when their messages match and they share the same cause
/// (or both have none).
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        let same_cause = match (&self.cause, &other.cause) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.message == other.message && same_cause
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::new(error)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync + 'static>> for Error {
    fn from(error: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        Self {
            message: error.to_string().into(),
            cause: Some(Arc::from(error)),
        }
    }
}

impl From<SpawnError> for Error {
    fn from(error: SpawnError) -> Self {
        Self::new(error)
    }
}

impl From<Canceled> for Error {
    fn from(error: Canceled) -> Self {
        Self::new(error)
    }
}
