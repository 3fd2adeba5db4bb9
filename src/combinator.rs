//! Joins several [`Deferred`] values into one.
//!
//! The precedence is fixed: any rejection wins over anything pending, and
//! anything pending wins over resolved values. When more than one input is
//! rejected, the leftmost error is reported. An empty input resolves to an empty
//! collection.
use crate::Deferred;

/// Joins a homogeneous list of states into a state of all their values.
///
/// # Example
/// ```
/// # use deferred::{all, Deferred, Error};
/// #
/// let joined = all([Deferred::Resolved(1), Deferred::Pending, Deferred::Resolved(3)]);
/// assert!(joined.is_pending());
///
/// let joined = all([
///     Deferred::Resolved(1),
///     Deferred::Rejected(Error::msg("first")),
///     Deferred::Pending,
///     Deferred::Rejected(Error::msg("second")),
/// ]);
/// assert_eq!(joined.error().map(Error::message), Some("first"));
///
/// assert_eq!(all(Vec::<Deferred<u8>>::new()), Deferred::Resolved(vec![]));
/// ```
pub fn all<T>(states: impl IntoIterator<Item = Deferred<T>>) -> Deferred<Vec<T>> {
    let mut values = Vec::new();
    let mut pending = false;

    for state in states {
        match state {
            Deferred::Rejected(error) => return Deferred::Rejected(error),
            Deferred::Pending => pending = true,
            Deferred::Resolved(value) if !pending => values.push(value),
            // Values after a pending input can no longer be returned.
            Deferred::Resolved(_) => {}
        }
    }

    if pending {
        Deferred::Pending
    } else {
        Deferred::Resolved(values)
    }
}

/// Joins a tuple of states of possibly different types.
///
/// Implemented for `()` and for tuples of up to twelve [`Deferred`] values.
///
/// # Example
/// ```
/// # use deferred::{All, Deferred};
/// #
/// let joined = (Deferred::Resolved(1), Deferred::Resolved("a")).all();
/// assert_eq!(joined, Deferred::Resolved((1, "a")));
/// ```
pub trait All {
    /// The tuple of resolved values.
    type Output;

    /// Joins the states with reject > pending > resolved precedence.
    fn all(self) -> Deferred<Self::Output>;
}

impl All for () {
    type Output = ();

    fn all(self) -> Deferred<()> {
        Deferred::Resolved(())
    }
}

macro_rules! impl_all_for_tuple {
    ($($T:ident),+) => {
        impl<$($T),+> All for ($(Deferred<$T>,)+) {
            type Output = ($($T,)+);

            #[allow(non_snake_case)]
            fn all(self) -> Deferred<Self::Output> {
                let ($($T,)+) = self;
                $(
                    if let Deferred::Rejected(error) = $T {
                        return Deferred::Rejected(error);
                    }
                )+
                match ($($T,)+) {
                    ($(Deferred::Resolved($T),)+) => Deferred::Resolved(($($T,)+)),
                    _ => Deferred::Pending,
                }
            }
        }
    };
}

impl_all_for_tuple!(A);
impl_all_for_tuple!(A, B);
impl_all_for_tuple!(A, B, C);
impl_all_for_tuple!(A, B, C, D);
impl_all_for_tuple!(A, B, C, D, E);
impl_all_for_tuple!(A, B, C, D, E, F);
impl_all_for_tuple!(A, B, C, D, E, F, G);
impl_all_for_tuple!(A, B, C, D, E, F, G, H);
impl_all_for_tuple!(A, B, C, D, E, F, G, H, I);
impl_all_for_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_all_for_tuple!(A, B, C, D, E, F, G, H, I, J, K);
impl_all_for_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);
