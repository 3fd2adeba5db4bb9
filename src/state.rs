//! Defines the `Deferred` tri-state value and its transition function.
//!
//! A `Deferred<T>` is a value that may not exist yet ([`Deferred::Pending`]), may
//! have failed ([`Deferred::Rejected`]) or may be ready ([`Deferred::Resolved`]).
//! It is never mutated in place: every [`Action`] applied through
//! [`Deferred::transition`] consumes the current snapshot and returns the next
//! one.
use std::fmt;

use crate::Error;

/// The state of a result that is produced asynchronously.
///
/// Exactly one variant is active at any time. A rejected state carries only its
/// error, a resolved state only its value.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub enum Deferred<T> {
    /// No value and no error yet.
    Pending,

    /// The produced value.
    Resolved(T),

    /// The failure that ended the computation.
    Rejected(Error),
}

impl<T> Deferred<T> {
    /// Returns `true` if no outcome is available yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Deferred::Pending)
    }

    /// Returns `true` if a value is available.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Deferred::Resolved(_))
    }

    /// Returns `true` if the computation failed.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Deferred::Rejected(_))
    }

    /// Returns the resolved value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Deferred::Resolved(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the rejection error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match self {
            Deferred::Rejected(error) => Some(error),
            _ => None,
        }
    }

    /// Borrows the resolved value without consuming the state.
    pub fn as_ref(&self) -> Deferred<&T> {
        match self {
            Deferred::Pending => Deferred::Pending,
            Deferred::Resolved(value) => Deferred::Resolved(value),
            Deferred::Rejected(error) => Deferred::Rejected(error.clone()),
        }
    }

    /// Maps the resolved value, leaving pending and rejected states as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Deferred<U> {
        match self {
            Deferred::Pending => Deferred::Pending,
            Deferred::Resolved(value) => Deferred::Resolved(f(value)),
            Deferred::Rejected(error) => Deferred::Rejected(error),
        }
    }

    /// Converts a settled state into a `Result`. Returns `None` while pending.
    #[must_use]
    pub fn into_result(self) -> Option<Result<T, Error>> {
        match self {
            Deferred::Pending => None,
            Deferred::Resolved(value) => Some(Ok(value)),
            Deferred::Rejected(error) => Some(Err(error)),
        }
    }

    /// Applies `action` and returns the next state.
    ///
    /// - [`Action::Init`] always yields `Pending`.
    /// - [`Action::Reset`] yields `Pending` only from `Rejected`; any other state
    ///   is returned unchanged.
    /// - [`Action::Resolve`] yields `Resolved`. An [`Update::With`] updater
    ///   receives `Some(previous)` when the current state is resolved and `None`
    ///   otherwise.
    /// - [`Action::Reject`] yields `Rejected`, dropping any previous value.
    ///
    /// # Example
    /// ```
    /// # use deferred::{Action, Deferred};
    /// #
    /// let state = Deferred::Resolved(1)
    ///     .transition(Action::resolve_with(|prev: Option<i32>| prev.unwrap_or(0) + 1));
    /// assert_eq!(state, Deferred::Resolved(2));
    ///
    /// // Resolved states ignore a reset.
    /// assert_eq!(state.transition(Action::Reset), Deferred::Resolved(2));
    /// ```
    pub fn transition(self, action: Action<T>) -> Self {
        match action {
            Action::Init => Deferred::Pending,
            Action::Reset => match self {
                Deferred::Rejected(_) => Deferred::Pending,
                state => state,
            },
            Action::Resolve(Update::Value(value)) => Deferred::Resolved(value),
            Action::Resolve(Update::With(updater)) => {
                let previous = match self {
                    Deferred::Resolved(value) => Some(value),
                    _ => None,
                };
                Deferred::Resolved(updater(previous))
            }
            Action::Reject(error) => Deferred::Rejected(error),
        }
    }
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Deferred::Pending
    }
}

impl<T, E: Into<Error>> From<Result<T, E>> for Deferred<T> {
    /// Seeds a state from an initial outcome: `Ok` resolves, `Err` rejects.
    fn from(initial: Result<T, E>) -> Self {
        match initial {
            Ok(value) => Deferred::Resolved(value),
            Err(error) => Deferred::Rejected(error.into()),
        }
    }
}

type Updater<T> = Box<dyn FnOnce(Option<T>) -> T + Send>;

/// The payload of [`Action::Resolve`]: either a new value or an updater that
/// derives one from the previous value.
pub enum Update<T> {
    /// Store this value.
    Value(T),

    /// Compute the value from the previous one. The argument is `None` when the
    /// state being updated is not resolved.
    With(Updater<T>),
}

impl<T: fmt::Debug> fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Update::With(_) => f.write_str("With(..)"),
        }
    }
}

/// The mutations a [`Deferred`] accepts.
///
/// New actions may be added; [`Deferred::transition`] leaves the state untouched
/// for any action it does not handle.
#[derive(Debug)]
#[non_exhaustive]
pub enum Action<T> {
    /// Force the state back to `Pending`.
    Init,

    /// Return to `Pending` only if currently `Rejected`.
    Reset,

    /// Store a value, or the result of an updater.
    Resolve(Update<T>),

    /// Store an error.
    Reject(Error),
}

impl<T> Action<T> {
    /// Resolve with a plain value.
    pub fn resolve(value: T) -> Self {
        Action::Resolve(Update::Value(value))
    }

    /// Resolve with the result of `updater` applied to the previous value.
    pub fn resolve_with(updater: impl FnOnce(Option<T>) -> T + Send + 'static) -> Self {
        Action::Resolve(Update::With(Box::new(updater)))
    }

    /// Reject with `error`.
    pub fn reject(error: impl Into<Error>) -> Self {
        Action::Reject(error.into())
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Action::Init => "init",
            Action::Reset => "reset",
            Action::Resolve(_) => "resolve",
            Action::Reject(_) => "reject",
        }
    }
}
