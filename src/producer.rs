//! Defines `Producer`, the zero-argument computation a [`Controller`] runs.
//!
//! A producer is compared by identity, not by what it computes: clones of the
//! same producer are equal, two producers built from identical closures are not.
//! Handing a [`Controller`] a different producer is what makes it run again.
//!
//! [`Controller`]: crate::Controller
use std::{fmt, sync::Arc};

use futures::{FutureExt, TryFutureExt, future::BoxFuture};

use crate::Error;

type ProduceFn<T> = dyn Fn() -> BoxFuture<'static, Result<T, Error>> + Send + Sync;

/// A shareable handle to a function producing a `T` or an [`Error`].
pub struct Producer<T> {
    produce: Arc<ProduceFn<T>>,
}

impl<T: Send + 'static> Producer<T> {
    /// Creates a producer from an asynchronous function.
    ///
    /// Any error type convertible into [`Error`] may be returned.
    ///
    /// # Example
    /// ```
    /// # use deferred::Producer;
    /// #
    /// let producer = Producer::new(|| async { Ok::<_, std::io::Error>(42) });
    /// assert_eq!(producer, producer.clone());
    /// ```
    pub fn new<F, Fut, E>(produce: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<Error> + 'static,
    {
        Self {
            produce: Arc::new(move || produce().map_err(Into::<Error>::into).boxed()),
        }
    }

    /// Creates a producer from a synchronous function.
    ///
    /// The function runs on the controller's spawner, not on the caller's
    /// thread.
    pub fn from_fn<F, E>(produce: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<Error> + 'static,
    {
        Self {
            produce: Arc::new(move || {
                futures::future::ready(produce().map_err(Into::<Error>::into)).boxed()
            }),
        }
    }
}

impl<T> Producer<T> {
    /// Starts one run of the producer.
    pub(crate) fn produce(&self) -> BoxFuture<'static, Result<T, Error>> {
        (self.produce)()
    }
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self {
            produce: Arc::clone(&self.produce),
        }
    }
}

impl<T> PartialEq for Producer<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.produce, &other.produce)
    }
}

impl<T> Eq for Producer<T> {}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("id", &Arc::as_ptr(&self.produce).cast::<()>())
            .finish()
    }
}
