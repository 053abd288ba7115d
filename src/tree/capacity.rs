use super::OrderStatisticTree;
use crate::raw::RawTree;
use crate::{Growth, Identity, KeyFn};

impl<T: Ord> OrderStatisticTree<T> {
    /// Creates an empty tree with room for at least `capacity` distinct keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::OrderStatisticTree;
    ///
    /// let tree: OrderStatisticTree<i32> = OrderStatisticTree::with_capacity(32);
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_key_and_capacity(Identity, capacity)
    }
}

impl<T, F: KeyFn<T>> OrderStatisticTree<T, F> {
    /// Creates an empty tree ordered by `key_fn` with room for at least
    /// `capacity` distinct keys.
    #[must_use]
    pub fn with_key_and_capacity(key_fn: F, capacity: usize) -> Self {
        OrderStatisticTree {
            raw: RawTree::with_capacity(capacity),
            key_fn,
            growth: Growth::Unbounded,
        }
    }

    /// Sets the policy for heap-allocated value groups, the storage a key
    /// needs once it has more than one value.
    ///
    /// With [`Growth::Disabled`] every key holds at most one value; with
    /// [`Growth::Limited`] a key holds at most the largest power of two within
    /// the limit, and never fewer than one value. Denied insertions fail
    /// without touching the tree.
    ///
    /// The policy is part of construction and cannot change once values are
    /// stored.
    ///
    /// # Panics
    ///
    /// Panics if the tree already holds values.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::{Growth, OrderStatisticTree};
    ///
    /// let mut tree = OrderStatisticTree::new().with_growth(Growth::Limited(4));
    /// for _ in 0..4 {
    ///     tree.try_insert('x').unwrap();
    /// }
    /// assert!(tree.try_insert('x').is_err());
    /// assert!(tree.try_insert('y').is_ok());
    /// ```
    #[must_use]
    pub fn with_growth(mut self, growth: Growth) -> Self {
        assert!(self.is_empty(), "`OrderStatisticTree::with_growth()` - tree already holds values!");
        self.growth = growth;
        self
    }

    /// Returns the growth policy for value groups.
    #[must_use]
    pub const fn growth(&self) -> Growth {
        self.growth
    }

    /// Returns the number of distinct keys the tree can hold without
    /// reallocating its node storage.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
