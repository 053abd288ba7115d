//! Streaming access to one fixed percentile.
//!
//! [`PercentileTracker`] splits everything it has seen into two binary heaps:
//! `lower`, a max-heap of the smallest `min(p * n / 100 + 1, n)` elements, and
//! `higher`, a min-heap of the rest. The p'th percentile is then the top of
//! `lower`, i.e. the element at rank `min(p * n / 100, n - 1)` of the stably
//! sorted stream. An insertion changes that target by at most one, so at most
//! one element crosses between the heaps per call.
//!
//! Both heaps order their values through the tracker's [`KeyFn`], so keys are
//! never stored and values are never cloned.

use core::fmt;

use crate::{Error, Identity, KeyFn, Percent, TryInsertError};

use heap::KeyedHeap;

mod heap;

/// Tracks a fixed percentile of an insert-only stream.
///
/// Insertion is O(log n) amortized and the current percentile is available in
/// O(1). Elements cannot be removed.
///
/// # Examples
///
/// ```
/// use ostat::{Percent, PercentileTracker};
///
/// let mut p90 = PercentileTracker::new(Percent::new(90).unwrap());
/// for latency_ms in [12, 7, 30, 9, 11, 250, 8, 10, 14, 13] {
///     p90.insert(latency_ms);
/// }
/// assert_eq!(p90.get(), &250);
///
/// let mut median = PercentileTracker::new(Percent::MEDIAN);
/// median.extend([5, 1, 4, 2, 3]);
/// assert_eq!(median.get(), &3);
/// ```
pub struct PercentileTracker<T, F: KeyFn<T> = Identity> {
    percent: Percent,
    key_fn: F,
    // Max-heap: every element at or below the percentile.
    lower: KeyedHeap<T>,
    // Min-heap: every element above it.
    higher: KeyedHeap<T>,
}

impl<T: Ord> PercentileTracker<T> {
    /// Creates a tracker for the `percent`'th percentile of values ordered by
    /// themselves.
    #[must_use]
    pub fn new(percent: Percent) -> Self {
        Self::with_key(percent, Identity)
    }

    /// Creates a tracker ordered by the values themselves with room for at
    /// least `capacity` elements.
    #[must_use]
    pub fn with_capacity(percent: Percent, capacity: usize) -> Self {
        Self::with_key_and_capacity(percent, Identity, capacity)
    }
}

impl<T, F: KeyFn<T>> PercentileTracker<T, F> {
    /// Creates a tracker for the `percent`'th percentile of values ordered by
    /// `key_fn`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::{Percent, PercentileTracker};
    ///
    /// let mut oldest = PercentileTracker::with_key(Percent::MAX, |fish: &(u32, &str)| fish.0);
    /// oldest.insert((4, "salmon"));
    /// oldest.insert((100, "shark"));
    /// oldest.insert((3, "clownfish"));
    /// assert_eq!(oldest.get().1, "shark");
    /// ```
    #[must_use]
    pub fn with_key(percent: Percent, key_fn: F) -> Self {
        Self {
            percent,
            key_fn,
            lower: KeyedHeap::new(),
            higher: KeyedHeap::new(),
        }
    }

    /// Creates a tracker with room for at least `capacity` elements.
    #[must_use]
    pub fn with_key_and_capacity(percent: Percent, key_fn: F, capacity: usize) -> Self {
        let lower = if capacity == 0 { 0 } else { percent.rank_in(capacity) + 1 };
        Self {
            percent,
            key_fn,
            lower: KeyedHeap::with_capacity(lower),
            higher: KeyedHeap::with_capacity(capacity - lower),
        }
    }

    /// Returns the tracked percentile.
    #[must_use]
    pub const fn percent(&self) -> Percent {
        self.percent
    }

    /// Returns the number of elements inserted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lower.len() + self.higher.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// Returns the element at the tracked percentile: the element at rank
    /// `min(percent * len / 100, len - 1)` of the inserted elements sorted by
    /// key.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been inserted yet.
    #[must_use]
    pub fn get(&self) -> &T {
        self.peek().expect("`PercentileTracker::get()` - tracker is empty!")
    }

    /// Returns the element at the tracked percentile, or `None` if nothing has
    /// been inserted yet.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.lower.peek()
    }

    /// Adds `value` to the stream.
    ///
    /// # Panics
    ///
    /// Panics if the heaps cannot grow; see [`try_insert`](Self::try_insert).
    pub fn insert(&mut self, value: T) {
        if let Err(err) = self.try_insert(value) {
            panic!("`PercentileTracker::insert()` - {}", err.error());
        }
    }

    /// Adds `value` to the stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] with the value if the heaps cannot grow.
    /// Storage is reserved up front, so the tracker is unchanged on failure.
    pub fn try_insert(&mut self, value: T) -> Result<(), TryInsertError<T>> {
        let requested = self.len() + 1;
        if self.lower.try_reserve(1).is_err() || self.higher.try_reserve(1).is_err() {
            return Err(TryInsertError::new(value, Error::OutOfMemory { requested }));
        }

        let key_fn = &self.key_fn;
        let above = self.lower.peek().is_some_and(|top| key_fn.compare(&value, top).is_gt());
        if above {
            self.higher.push(value, |a, b| key_fn.compare(b, a));
        } else {
            self.lower.push(value, |a, b| key_fn.compare(a, b));
        }
        self.rebalance();
        Ok(())
    }

    // Moves extreme elements across until `lower` holds the target count.
    fn rebalance(&mut self) {
        let target = self.percent.rank_in(self.len()) + 1;
        let key_fn = &self.key_fn;
        let max_first = |a: &T, b: &T| key_fn.compare(a, b);
        let min_first = |a: &T, b: &T| key_fn.compare(b, a);
        while self.lower.len() < target {
            let value = self.higher.pop(min_first).expect("`PercentileTracker::rebalance()` - `higher` is empty!");
            self.lower.push(value, max_first);
        }
        while self.lower.len() > target {
            let value = self.lower.pop(max_first).expect("`PercentileTracker::rebalance()` - `lower` is empty!");
            self.higher.push(value, min_first);
        }
    }
}

impl<T, F: KeyFn<T>> Extend<T> for PercentileTracker<T, F> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: fmt::Debug, F: KeyFn<T>> fmt::Debug for PercentileTracker<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PercentileTracker")
            .field("percent", &self.percent.get())
            .field("len", &self.len())
            .field("current", &self.peek())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[test]
    #[should_panic(expected = "`PercentileTracker::get()` - tracker is empty!")]
    fn get_on_empty() {
        let tracker: PercentileTracker<u32> = PercentileTracker::new(Percent::MEDIAN);
        let _ = tracker.get();
    }

    #[test]
    fn first_value_seeds_lower() {
        let mut tracker = PercentileTracker::new(Percent::new(1).unwrap());
        assert!(tracker.is_empty());
        assert_eq!(tracker.peek(), None);
        tracker.insert(17);
        assert_eq!(tracker.get(), &17);
        assert_eq!(tracker.lower.len(), 1);
        assert!(tracker.higher.is_empty());
    }

    #[test]
    fn extremes() {
        let mut min = PercentileTracker::new(Percent::new(1).unwrap());
        let mut max = PercentileTracker::new(Percent::MAX);
        for value in [5, 3, 9, 1, 7, 2, 8] {
            min.insert(value);
            max.insert(value);
        }
        assert_eq!(min.get(), &1);
        assert_eq!(max.get(), &9);
        assert_eq!(max.len(), 7);
    }

    #[test]
    fn capacity_is_split_between_heaps() {
        let tracker: PercentileTracker<u32> = PercentileTracker::with_capacity(Percent::MEDIAN, 10);
        assert!(tracker.lower.capacity() >= 6);
        assert!(tracker.higher.capacity() >= 4);
        let empty: PercentileTracker<u32> = PercentileTracker::with_key_and_capacity(Percent::MEDIAN, Identity, 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn debug_shows_current() {
        let mut tracker = PercentileTracker::new(Percent::MEDIAN);
        tracker.extend([3, 1, 2]);
        assert_eq!(format!("{tracker:?}"), "PercentileTracker { percent: 50, len: 3, current: Some(2) }");
    }

    proptest! {
        #[test]
        fn tracks_stable_sorted_rank(percent in 1u8..=100, values in prop::collection::vec(0u16..64, 1..300)) {
            let percent = Percent::new(percent).unwrap();
            let mut tracker = PercentileTracker::new(percent);
            let mut sorted: Vec<u16> = Vec::new();

            for value in values {
                tracker.insert(value);
                let at = sorted.partition_point(|&other| other <= value);
                sorted.insert(at, value);

                let n = sorted.len();
                prop_assert_eq!(tracker.len(), n);
                prop_assert_eq!(tracker.lower.len(), percent.rank_in(n) + 1);
                prop_assert_eq!(*tracker.get(), sorted[percent.rank_in(n)]);
                if let Some(low) = tracker.higher.peek() {
                    prop_assert!(tracker.get() <= low);
                }
            }
        }
    }
}
