//! Defines the `Gate`, which branches a render over a [`Deferred`] value.
//!
//! A gate renders a pending fallback, a failed fallback, or its children. When it
//! renders its children it publishes the resolved value in a [`Scope`], where
//! any descendant holding the same gate can look it up with [`Gate::value`].
//! Publication is scoped to the children's render; there is no global state.
//!
//! A gate only reads the state it is given. It never performs a transition.
use std::{
    any::Any,
    fmt,
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::Deferred;

static NEXT_GATE: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GateKey(u64);

/// A borrowed chain of values published by enclosing gates.
///
/// Start from [`Scope::root`] and hand the scope a gate gives its children to
/// nested gates, so inner descendants can still see outer values.
pub struct Scope<'a> {
    parent: Option<&'a Scope<'a>>,
    entry: Option<(GateKey, &'a (dyn Any + Send + Sync + 'static))>,
}

impl Scope<'static> {
    /// An empty scope.
    #[must_use]
    pub const fn root() -> Self {
        Scope {
            parent: None,
            entry: None,
        }
    }
}

impl<'a> Scope<'a> {
    fn provide<'b>(
        &'b self,
        key: GateKey,
        value: &'b (dyn Any + Send + Sync + 'static),
    ) -> Scope<'b> {
        Scope {
            parent: Some(self),
            entry: Some((key, value)),
        }
    }

    // The nearest publication for `key` wins.
    fn lookup<T: 'static>(&self, key: GateKey) -> Option<&'a T> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            match current.entry {
                Some((published, value)) if published == key => return value.downcast_ref(),
                _ => scope = current.parent,
            }
        }
        None
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0;
        let mut scope = Some(self);
        while let Some(current) = scope {
            depth += usize::from(current.entry.is_some());
            scope = current.parent;
        }
        f.debug_struct("Scope").field("depth", &depth).finish()
    }
}

type Validate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Fallbacks and validation for one [`Gate::render`] call.
///
/// By default both fallbacks render nothing and every value is valid.
pub struct GateOptions<T, R> {
    pending: Option<R>,
    failed: Option<R>,
    validate: Option<Validate<T>>,
}

impl<T, R> GateOptions<T, R> {
    /// Options with no fallbacks and no validation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: None,
            failed: None,
            validate: None,
        }
    }

    /// Rendered while the state is pending.
    #[must_use]
    pub fn pending(mut self, fallback: R) -> Self {
        self.pending = Some(fallback);
        self
    }

    /// Rendered when the state is rejected or its value fails validation.
    #[must_use]
    pub fn failed(mut self, fallback: R) -> Self {
        self.failed = Some(fallback);
        self
    }

    /// Rejects resolved values for which `validate` returns `false`.
    #[must_use]
    pub fn validate(mut self, validate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.validate = Some(Box::new(validate));
        self
    }

    fn is_valid(&self, value: &T) -> bool {
        self.validate.as_ref().is_none_or(|validate| validate(value))
    }
}

impl<T, R> Default for GateOptions<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

/// A render boundary over a [`Deferred<T>`].
///
/// Each gate has its own key, so values published by different gates never
/// collide even when they share a type.
///
/// # Example
/// ```
/// # use deferred::{Deferred, Gate, GateOptions, Scope};
/// #
/// let user = Gate::<String>::new();
/// let options = GateOptions::new().pending("loading").failed("unavailable");
///
/// let rendered = user.render(&Scope::root(), &Deferred::Pending, &options, |_| "profile");
/// assert_eq!(rendered, Some("loading"));
///
/// let state = Deferred::Resolved("ada".to_string());
/// let rendered = user.render(&Scope::root(), &state, &options, |scope| {
///     // Descendants read the published value through the scope.
///     assert_eq!(user.value(scope).map(String::as_str), Some("ada"));
///     "profile"
/// });
/// assert_eq!(rendered, Some("profile"));
/// ```
pub struct Gate<T> {
    key: GateKey,
    _value: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Gate<T> {
    /// Creates a gate with a fresh key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            key: GateKey(NEXT_GATE.fetch_add(1, Ordering::Relaxed)),
            _value: PhantomData,
        }
    }

    /// Renders one branch for `state`.
    ///
    /// - Pending: the pending fallback, or `None`.
    /// - Rejected, or resolved with a value that fails validation: the failed
    ///   fallback, or `None`.
    /// - Resolved with a valid value: `children`, called with a scope in which
    ///   this gate publishes the value.
    pub fn render<R, C>(
        &self,
        scope: &Scope<'_>,
        state: &Deferred<T>,
        options: &GateOptions<T, R>,
        children: C,
    ) -> Option<R>
    where
        R: Clone,
        C: FnOnce(&Scope<'_>) -> R,
    {
        match state {
            Deferred::Pending => options.pending.clone(),
            Deferred::Resolved(value) if options.is_valid(value) => {
                Some(children(&scope.provide(self.key, value)))
            }
            Deferred::Resolved(_) | Deferred::Rejected(_) => options.failed.clone(),
        }
    }

    /// Looks up the value this gate published in an enclosing render.
    ///
    /// Returns `None` outside the gate's children.
    #[must_use]
    pub fn value<'a>(&self, scope: &Scope<'a>) -> Option<&'a T> {
        scope.lookup(self.key)
    }
}

impl<T: Send + Sync + 'static> Default for Gate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Gate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate").field("key", &self.key.0).finish()
    }
}
