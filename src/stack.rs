//! A LIFO stack with inline slots that spills to the heap on demand.
//!
//! [`BoundedStack`] keeps its first `N` elements inside the struct itself, so
//! a traversal whose depth stays within `N` never touches the allocator. Once
//! the inline slots are exhausted the stack moves to heap storage, doubling
//! its capacity each time, subject to its [`Growth`] policy. An element is
//! never dropped silently: a push that cannot be stored is handed back to the
//! caller inside a [`TryInsertError`].

use core::fmt;

use log::trace;
use smallvec::SmallVec;

use crate::{Error, Growth, TryInsertError};

/// A LIFO stack with `N` inline slots and policy-controlled heap spill.
///
/// # Examples
///
/// ```
/// use ostat::BoundedStack;
///
/// let mut stack: BoundedStack<u32, 4> = BoundedStack::new();
/// for i in 0..10 {
///     stack.push(i).unwrap();
/// }
/// assert!(stack.spilled());
/// assert_eq!(stack.top(), Some(&9));
/// assert_eq!(stack.pop(), Some(9));
/// assert_eq!(stack.len(), 9);
/// ```
pub struct BoundedStack<T, const N: usize> {
    items: SmallVec<[T; N]>,
    growth: Growth,
}

impl<T, const N: usize> BoundedStack<T, N> {
    /// Creates an empty stack that may spill without limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_growth(Growth::Unbounded)
    }

    /// Creates an empty stack whose heap spill is governed by `growth`.
    ///
    /// With [`Growth::Disabled`] the stack holds at most `N` elements.
    #[must_use]
    pub fn with_growth(growth: Growth) -> Self {
        Self {
            items: SmallVec::new(),
            growth,
        }
    }

    /// Returns the number of inline slots.
    #[inline]
    #[must_use]
    pub const fn inline_capacity(&self) -> usize {
        N
    }

    /// Returns the number of elements the stack can hold without allocating.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Returns the growth policy this stack was created with.
    #[inline]
    #[must_use]
    pub const fn growth(&self) -> Growth {
        self.growth
    }

    /// Returns `true` once the elements live in heap storage.
    #[inline]
    #[must_use]
    pub fn spilled(&self) -> bool {
        self.items.spilled()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pushes `value` onto the stack.
    ///
    /// Amortized O(1). When the current storage is full, capacity doubles into
    /// heap storage.
    ///
    /// # Errors
    ///
    /// Hands `value` back if the growth policy forbids the required storage
    /// ([`Error::GrowthDenied`]) or the allocator fails ([`Error::OutOfMemory`]).
    /// The stack is unchanged in either case. With [`Growth::Disabled`], push
    /// `N + 1` is the out-of-memory case of a stack without backing storage;
    /// [`Error::is_out_of_memory`] is `true` for both variants.
    pub fn push(&mut self, value: T) -> Result<(), TryInsertError<T>> {
        if let Err(error) = self.reserve_one() {
            return Err(TryInsertError::new(value, error));
        }
        self.items.push(value);
        Ok(())
    }

    /// Removes and returns the top element, or `None` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Returns the top element, or `None` if the stack is empty.
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<&T> {
        self.items.last()
    }

    /// Returns the top element mutably, or `None` if the stack is empty.
    #[inline]
    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    /// Drops every element. Heap storage, if any, is kept for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn reserve_one(&mut self) -> Result<(), Error> {
        let len = self.items.len();
        if len < self.items.capacity() {
            return Ok(());
        }

        let requested = len.saturating_mul(2).max(1);
        self.growth.admit(requested)?;
        if !self.items.spilled() {
            trace!("BoundedStack: spilling {len} inline elements to heap storage for {requested}");
        }
        self.items
            .try_reserve_exact(requested - len)
            .map_err(|_| Error::OutOfMemory { requested })
    }
}

impl<T, const N: usize> Default for BoundedStack<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for BoundedStack<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedStack")
            .field("items", &self.items.as_slice())
            .field("growth", &self.growth)
            .finish()
    }
}
