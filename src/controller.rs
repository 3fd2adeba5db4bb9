//! Defines the `Controller`, which runs a [`Producer`] and feeds its outcome into
//! a [`DeferCell`].
//!
//! Every run of the producer belongs to a generation. Starting a run (on build,
//! when the producer changes, or on reload) advances the generation, and an
//! outcome is applied only if its generation is still the latest one when it
//! arrives. A slow earlier run therefore can never overwrite a faster later
//! one; its result is simply dropped.
//!
//! There is no cooperative cancellation: superseded runs still complete, only
//! their effect on the state is suppressed. Producers should be idempotent,
//! read-style computations.
//!
//! The controller never suspends. Runs are spawned on a
//! [`futures::task::Spawn`] implementor (a shared [`ThreadPool`] by default) and
//! the calling thread returns immediately.
use std::{
    num::NonZeroUsize,
    panic::AssertUnwindSafe,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak},
    task::{Context, Poll},
};

use futures::{
    FutureExt,
    executor::{ThreadPool, ThreadPoolBuilder},
    future::{self, CatchUnwind},
    ready,
    task::{FutureObj, Spawn},
};
use pin_project_lite::pin_project;

use crate::{Action, Changes, DeferCell, Deferred, Error, Producer};

static THREAD_POOL: OnceLock<Result<ThreadPool, Error>> = OnceLock::new();

fn default_pool() -> Result<&'static ThreadPool, Error> {
    THREAD_POOL
        .get_or_init(|| {
            let size = std::thread::available_parallelism().map_or(4, NonZeroUsize::get);
            ThreadPoolBuilder::new()
                .pool_size(size)
                .name_prefix("deferred-")
                .create()
                .map_err(Error::new)
        })
        .as_ref()
        .map_err(Clone::clone)
}

type SharedSpawn = Arc<dyn Spawn + Send + Sync>;

pin_project! {
    // One run of the producer, tagged with the generation it was started in.
    struct Generation<F, T> {
        #[pin]
        outcome: CatchUnwind<AssertUnwindSafe<F>>,
        generation: u64,
        cell: Arc<DeferCell<T>>,
        binding: Arc<str>,
    }
}

impl<F, T> Future for Generation<F, T>
where
    F: Future<Output = Result<T, Error>>,
    T: Clone,
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let generation = *this.generation;

        let action = match ready!(this.outcome.poll(cx)) {
            Ok(Ok(value)) => Action::resolve(value),
            Ok(Err(error)) => Action::Reject(error),
            Err(panic) => {
                let error = Error::from_panic(panic);
                tracing::warn!(binding = %this.binding, generation, %error, "producer panicked");
                Action::Reject(error)
            }
        };

        if this.cell.settle(generation, action) {
            tracing::debug!(binding = %this.binding, generation, "applied producer outcome");
        } else {
            tracing::trace!(binding = %this.binding, generation, "discarded stale producer outcome");
        }
        Poll::Ready(())
    }
}

struct Shared<T> {
    cell: Arc<DeferCell<T>>,
    producer: Mutex<Producer<T>>,
    spawner: Option<SharedSpawn>,
    binding: Arc<str>,
}

impl<T> Shared<T> {
    fn producer(&self) -> MutexGuard<'_, Producer<T>> {
        self.producer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + 'static> Shared<T> {
    // Starts a new generation, applying `action` atomically with the advance.
    fn launch(&self, action: Option<Action<T>>) {
        let generation = self.cell.advance(action);
        let producer = self.producer().clone();
        tracing::debug!(binding = %self.binding, generation, "starting producer");

        // The producer is invoked on first poll, so synchronous producers run on
        // the spawner too.
        let run = Generation {
            outcome: AssertUnwindSafe(future::lazy(move |_| producer.produce()).flatten())
                .catch_unwind(),
            generation,
            cell: Arc::clone(&self.cell),
            binding: Arc::clone(&self.binding),
        };

        let spawned = match &self.spawner {
            Some(spawner) => spawner
                .spawn_obj(FutureObj::new(Box::new(run)))
                .map_err(Error::from),
            None => default_pool().map(|pool| pool.spawn_ok(run)),
        };

        if let Err(error) = spawned {
            tracing::warn!(binding = %self.binding, generation, %error, "failed to spawn producer");
            self.cell.settle(generation, Action::Reject(error));
        }
    }

    fn reload(&self, hard: bool) {
        tracing::debug!(binding = %self.binding, hard, "reloading");
        let action = if hard { Action::Init } else { Action::Reset };
        self.launch(Some(action));
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        // Outcomes still in flight belong to a binding nobody observes anymore.
        let generation = self.cell.invalidate();
        tracing::trace!(binding = %self.binding, generation, "controller dropped");
    }
}

/// Configures and builds a [`Controller`].
///
/// # Example
/// ```
/// # use deferred::{Controller, Producer};
/// #
/// let controller = Controller::builder(Producer::new(|| async { Ok::<_, std::io::Error>(7) }))
///     .seed(Ok::<_, std::io::Error>(1))
///     .name("answer")
///     .build();
///
/// // The seed stays visible until the first run lands.
/// assert!(controller.state().is_resolved());
/// ```
#[must_use]
pub struct Builder<T> {
    producer: Producer<T>,
    initial: Deferred<T>,
    spawner: Option<SharedSpawn>,
    binding: Arc<str>,
}

impl<T: Clone + Send + 'static> Builder<T> {
    /// Sets the state observed before the first run completes. Defaults to
    /// [`Deferred::Pending`].
    pub fn initial(mut self, state: Deferred<T>) -> Self {
        self.initial = state;
        self
    }

    /// Seeds the state from an initial outcome: `Ok` resolves, `Err` rejects.
    pub fn seed<E: Into<Error>>(self, initial: Result<T, E>) -> Self {
        self.initial(Deferred::from(initial))
    }

    /// Sets where producer runs are spawned.
    ///
    /// Defaults to a thread pool shared by all controllers. Producers spawned
    /// there must not rely on executor-specific facilities such as
    /// `tokio::time::sleep()`.
    pub fn spawner(mut self, spawner: impl Spawn + Send + Sync + 'static) -> Self {
        self.spawner = Some(Arc::new(spawner));
        self
    }

    /// Names the binding in log events.
    pub fn name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.binding = name.into();
        self
    }

    /// Builds the controller and starts the first run.
    pub fn build(self) -> Controller<T> {
        let shared = Arc::new(Shared {
            cell: Arc::new(DeferCell::from(self.initial)),
            producer: Mutex::new(self.producer),
            spawner: self.spawner,
            binding: self.binding,
        });
        shared.launch(None);
        Controller { shared }
    }
}

/// Runs a [`Producer`] and exposes its latest outcome as a [`Deferred`].
///
/// Each controller owns exactly one state. Only the outcome of the most recent
/// run is ever applied to it.
///
/// # Example
/// ```
/// # use deferred::{Controller, Deferred, Producer};
/// # use futures::StreamExt;
/// #
/// # futures::executor::block_on(async {
/// let controller = Controller::new(Producer::new(|| async { Ok::<_, std::io::Error>(42) }));
/// let mut changes = controller.changes();
/// while controller.state().is_pending() {
///     changes.next().await;
/// }
/// assert_eq!(controller.state(), Deferred::Resolved(42));
///
/// // Keeps showing 42 while the producer runs again.
/// controller.reload(false);
/// # });
/// ```
pub struct Controller<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> Controller<T> {
    /// Creates a pending controller on the default spawner and starts the first
    /// run.
    pub fn new(producer: Producer<T>) -> Self {
        Self::builder(producer).build()
    }

    /// Returns a [`Builder`] for a controller running `producer`.
    pub fn builder(producer: Producer<T>) -> Builder<T> {
        Builder {
            producer,
            initial: Deferred::Pending,
            spawner: None,
            binding: Arc::from("anonymous"),
        }
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> Deferred<T> {
        self.shared.cell.get()
    }

    /// Reads the current state without cloning it.
    ///
    /// `read` runs while the state is locked. Calling back into this controller
    /// from inside it deadlocks.
    pub fn with_state<R>(&self, read: impl FnOnce(&Deferred<T>) -> R) -> R {
        self.shared.cell.with(read)
    }

    /// Subscribes to state changes. See [`DeferCell::changes`].
    pub fn changes(&self) -> Changes<T> {
        self.shared.cell.changes()
    }

    /// Replaces the producer and starts a new run if `producer` is a different
    /// producer than the current one. Returns whether a run was started.
    ///
    /// Producers are compared by identity, so passing a clone of the current
    /// producer does nothing.
    pub fn set_producer(&self, producer: Producer<T>) -> bool {
        {
            let mut current = self.shared.producer();
            if *current == producer {
                return false;
            }
            *current = producer;
        }
        self.shared.launch(None);
        true
    }

    /// Runs the producer again, invalidating any run still in flight.
    ///
    /// A soft reload (`hard == false`) only clears a rejected state, so a
    /// resolved value stays visible until the new outcome lands. A hard reload
    /// returns to pending immediately.
    pub fn reload(&self, hard: bool) {
        self.shared.reload(hard);
    }

    /// Returns a handle that reloads this controller from elsewhere.
    #[must_use]
    pub fn reload_handle(&self) -> ReloadHandle<T> {
        ReloadHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

/// A handle for reloading a [`Controller`] without owning it.
///
/// Obtained from [`Controller::reload_handle`]. Once the controller is dropped
/// the handle does nothing.
pub struct ReloadHandle<T> {
    shared: Weak<Shared<T>>,
}

impl<T: Clone + Send + 'static> ReloadHandle<T> {
    /// Reloads the controller. See [`Controller::reload`].
    pub fn reload(&self, hard: bool) {
        if let Some(shared) = self.shared.upgrade() {
            shared.reload(hard);
        }
    }
}

impl<T> Clone for ReloadHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}
