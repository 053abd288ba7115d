use core::fmt;

use thiserror::Error;

/// Recoverable failures reported by the collections in this crate.
///
/// Precondition violations (querying an empty structure, ranks out of range)
/// are programmer errors and panic instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The global allocator could not provide storage for `requested` elements.
    #[error("out of memory: failed to allocate storage for {requested} elements")]
    OutOfMemory { requested: usize },

    /// The structure's [`Growth`](crate::Growth) policy does not allow storage for
    /// `requested` elements.
    #[error("growth denied: storage for {requested} elements exceeds the limit of {limit}")]
    GrowthDenied { requested: usize, limit: usize },

    /// The node arena has no handles left.
    #[error("node arena is at maximum capacity ({max} nodes)")]
    TooManyNodes { max: usize },

    /// A percentage outside `1..=100` was supplied.
    #[error("percent must be within 1..=100, got {0}")]
    PercentOutOfRange(u8),
}

impl Error {
    /// Returns `true` if storage could not be obtained, whether the allocator
    /// refused it ([`Error::OutOfMemory`]) or the growth policy did
    /// ([`Error::GrowthDenied`]).
    ///
    /// A collection whose growth is [`Disabled`](crate::Growth::Disabled)
    /// behaves like one backed by an allocator that always fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::Error;
    ///
    /// assert!(Error::GrowthDenied { requested: 2, limit: 0 }.is_out_of_memory());
    /// assert!(Error::OutOfMemory { requested: 2 }.is_out_of_memory());
    /// assert!(!Error::PercentOutOfRange(0).is_out_of_memory());
    /// ```
    #[must_use]
    pub const fn is_out_of_memory(self) -> bool {
        matches!(self, Error::OutOfMemory { .. } | Error::GrowthDenied { .. })
    }
}

/// The error returned by fallible insertions.
///
/// Carries the rejected value back to the caller. The target collection is
/// left exactly as it was before the call.
///
/// # Examples
///
/// ```
/// use ostat::{BoundedStack, Error, Growth};
///
/// let mut stack: BoundedStack<u32, 1> = BoundedStack::with_growth(Growth::Disabled);
/// stack.push(1).unwrap();
///
/// let err = stack.push(2).unwrap_err();
/// assert_eq!(err.error(), Error::GrowthDenied { requested: 2, limit: 0 });
/// assert_eq!(err.into_inner(), 2);
/// assert_eq!(stack.len(), 1);
/// ```
#[derive(Clone, Eq, PartialEq, Error)]
#[error("{error}")]
pub struct TryInsertError<T> {
    value: T,
    error: Error,
}

impl<T> TryInsertError<T> {
    pub(crate) const fn new(value: T, error: Error) -> Self {
        Self { value, error }
    }

    pub(crate) fn map<U>(self, f: impl FnOnce(T) -> U) -> TryInsertError<U> {
        TryInsertError::new(f(self.value), self.error)
    }

    /// Returns the cause of the failure.
    #[must_use]
    pub const fn error(&self) -> Error {
        self.error
    }

    /// Returns a reference to the value that could not be inserted.
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Recovers the value that could not be inserted.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

// Hand-written so the rejected value does not need to be `Debug`.
impl<T> fmt::Debug for TryInsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryInsertError").field("error", &self.error).finish_non_exhaustive()
    }
}
