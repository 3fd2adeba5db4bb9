//! Provides `DeferCell`, the observable owner of one [`Deferred`] value.
//!
//! A cell replaces its snapshot on every dispatched [`Action`] and broadcasts the
//! new snapshot to every subscriber obtained through [`DeferCell::changes`].
//! [`Controller`] is built on top of a cell; a cell can also be driven by hand.
//!
//! [`Controller`]: crate::Controller
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::channel::mpsc;

use crate::{Action, Deferred, Error, Update};

/// A stream of state snapshots, one per change.
pub type Changes<T> = mpsc::UnboundedReceiver<Deferred<T>>;

struct Slot<T> {
    state: Deferred<T>,
    // Bumped by the controller for every new producer run.
    generation: u64,
    watchers: Vec<mpsc::UnboundedSender<Deferred<T>>>,
}

impl<T: Clone> Slot<T> {
    fn apply(&mut self, action: Action<T>) {
        // A reset outside the rejected state is the identity transition.
        let changes = !matches!(action, Action::Reset) || self.state.is_rejected();
        // An updater may panic; the current snapshot stays in place until it returns.
        let state = match action {
            Action::Resolve(Update::With(_)) => self.state.clone(),
            _ => std::mem::take(&mut self.state),
        };
        self.state = state.transition(action);
        if changes {
            self.broadcast();
        }
    }

    fn broadcast(&mut self) {
        let state = &self.state;
        self.watchers
            .retain(|watcher| watcher.unbounded_send(state.clone()).is_ok());
    }
}

/// Shared owner of a single [`Deferred`] value.
///
/// All methods take `&self`; transitions are serialized through an internal
/// mutex. Updaters passed to [`resolve_with`](DeferCell::resolve_with) run while
/// that mutex is held and must not call back into the same cell.
///
/// # Example
/// ```
/// # use deferred::{DeferCell, Deferred, Error};
/// #
/// let cell = DeferCell::new();
/// cell.resolve(5);
/// cell.resolve_with(|prev: Option<i32>| prev.unwrap_or_default() * 2);
/// assert_eq!(cell.get(), Deferred::Resolved(10));
///
/// cell.reject(Error::msg("offline"));
/// cell.reset();
/// assert!(cell.get().is_pending());
/// ```
pub struct DeferCell<T> {
    slot: Mutex<Slot<T>>,
}

impl<T: Clone> DeferCell<T> {
    /// Creates a pending cell.
    #[must_use]
    pub fn new() -> Self {
        Self::from(Deferred::Pending)
    }

    /// Returns a snapshot of the current state.
    pub fn get(&self) -> Deferred<T> {
        self.lock().state.clone()
    }

    /// Reads the current state without cloning it.
    ///
    /// `read` runs while the cell's mutex is held and must not call back into
    /// the same cell.
    pub fn with<R>(&self, read: impl FnOnce(&Deferred<T>) -> R) -> R {
        read(&self.lock().state)
    }

    /// Subscribes to state changes.
    ///
    /// The stream yields a snapshot after every transition that changed the
    /// state. It ends when the cell is dropped.
    pub fn changes(&self) -> Changes<T> {
        let (sender, receiver) = mpsc::unbounded();
        let mut slot = self.lock();
        slot.watchers.retain(|watcher| !watcher.is_closed());
        slot.watchers.push(sender);
        receiver
    }

    /// Applies `action` to the current state.
    pub fn dispatch(&self, action: Action<T>) {
        tracing::trace!(action = action.kind(), "dispatching");
        self.lock().apply(action);
    }

    /// Forces the state back to pending.
    pub fn init(&self) {
        self.dispatch(Action::Init);
    }

    /// Returns to pending if the state is rejected.
    pub fn reset(&self) {
        self.dispatch(Action::Reset);
    }

    /// Resolves with `value`.
    pub fn resolve(&self, value: T) {
        self.dispatch(Action::resolve(value));
    }

    /// Resolves with `updater` applied to the previous value, which is `None`
    /// unless the state is currently resolved.
    pub fn resolve_with(&self, updater: impl FnOnce(Option<T>) -> T + Send + 'static) {
        self.dispatch(Action::resolve_with(updater));
    }

    /// Rejects with `error`.
    pub fn reject(&self, error: impl Into<Error>) {
        self.dispatch(Action::reject(error));
    }

    /// Starts a new generation and applies `action` under the same lock, so no
    /// outcome of an older generation can land in between.
    pub(crate) fn advance(&self, action: Option<Action<T>>) -> u64 {
        let mut slot = self.lock();
        slot.generation += 1;
        if let Some(action) = action {
            slot.apply(action);
        }
        slot.generation
    }

    /// Applies `action` only if `generation` is still the latest one. Returns
    /// whether it was applied.
    pub(crate) fn settle(&self, generation: u64, action: Action<T>) -> bool {
        let mut slot = self.lock();
        if slot.generation != generation {
            return false;
        }
        slot.apply(action);
        true
    }
}

impl<T> DeferCell<T> {
    /// Starts a new generation without running anything, discarding every
    /// outcome still in flight.
    pub(crate) fn invalidate(&self) -> u64 {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.generation
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // A panicking updater leaves the previous snapshot in place.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Default for DeferCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Deferred<T>> for DeferCell<T> {
    fn from(state: Deferred<T>) -> Self {
        Self {
            slot: Mutex::new(Slot {
                state,
                generation: 0,
                watchers: Vec::new(),
            }),
        }
    }
}
