use core::ops::{Index, Range};

use super::OrderStatisticTree;
use crate::{KeyFn, Percent, Rank};

impl<T, F: KeyFn<T>> OrderStatisticTree<T, F> {
    /// Returns the value at position `rank` in ascending-key order, where
    /// values sharing a key are ordered by insertion. Returns `None` if
    /// `rank` is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::OrderStatisticTree;
    ///
    /// let tree = OrderStatisticTree::from_iter([30, 10, 20]);
    /// assert_eq!(tree.get(1), Some(&20));
    /// assert_eq!(tree.get(3), None);
    /// ```
    #[must_use]
    pub fn get(&self, rank: usize) -> Option<&T> {
        self.raw.get(rank)
    }

    /// Returns the value at position `rank` in ascending-key order, where
    /// values sharing a key are ordered by insertion.
    ///
    /// # Panics
    ///
    /// Panics if `rank >= self.len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::OrderStatisticTree;
    ///
    /// let mut tree = OrderStatisticTree::with_key(|pair: &(char, u8)| pair.0);
    /// tree.insert(('b', 0));
    /// tree.insert(('a', 1));
    /// tree.insert(('b', 2));
    ///
    /// assert_eq!(tree.nth_element(0), &('a', 1));
    /// assert_eq!(tree.nth_element(1), &('b', 0));
    /// assert_eq!(tree.nth_element(2), &('b', 2));
    /// ```
    #[must_use]
    pub fn nth_element(&self, rank: usize) -> &T {
        self.raw.get(rank).unwrap_or_else(|| {
            panic!("`OrderStatisticTree::nth_element()` - rank {rank} out of bounds (len {})", self.len())
        })
    }

    /// Returns every value whose key is the key at position `rank`, in
    /// insertion order.
    ///
    /// Because values can share a key, several ranks can map to the same run.
    /// For the sorted sequence `[A0, B0, B1, C0]`, ranks 1 and 2 both return
    /// `[B0, B1]`.
    ///
    /// # Panics
    ///
    /// Panics if `rank >= self.len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::OrderStatisticTree;
    ///
    /// let tree = OrderStatisticTree::from_iter(['c', 'a', 'b', 'b']);
    /// assert_eq!(tree.nth_elements(0), ['a']);
    /// assert_eq!(tree.nth_elements(1), ['b', 'b']);
    /// assert_eq!(tree.nth_elements(2), ['b', 'b']);
    /// assert_eq!(tree.nth_elements(3), ['c']);
    /// ```
    #[must_use]
    pub fn nth_elements(&self, rank: usize) -> &[T] {
        self.raw.group(rank).unwrap_or_else(|| {
            panic!("`OrderStatisticTree::nth_elements()` - rank {rank} out of bounds (len {})", self.len())
        })
    }

    /// Returns every value whose key is the `percent`'th percentile: the
    /// smallest key `k` such that at least `percent`% of the values have a
    /// key less than or equal to `k`.
    ///
    /// This is `nth_elements(min(percent * len / 100, len - 1))`.
    ///
    /// # Panics
    ///
    /// Panics if the tree is empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::{OrderStatisticTree, Percent};
    ///
    /// let tree = OrderStatisticTree::from_iter(1..=10);
    /// assert_eq!(tree.percentile(Percent::new(25).unwrap()), [3]);
    /// assert_eq!(tree.percentile(Percent::MEDIAN), [6]);
    /// assert_eq!(tree.percentile(Percent::MAX), [10]);
    /// ```
    #[must_use]
    pub fn percentile(&self, percent: Percent) -> &[T] {
        assert!(!self.is_empty(), "`OrderStatisticTree::percentile()` - tree is empty!");
        self.nth_elements(percent.rank_in(self.len()))
    }

    /// Returns the ranks occupied by values with the same key as `value`.
    ///
    /// The range starts at the number of values with a smaller key. When no
    /// value shares the key the range is empty, positioned where `value`
    /// would be inserted.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::OrderStatisticTree;
    ///
    /// let tree = OrderStatisticTree::from_iter([1, 2, 2, 2, 5]);
    /// assert_eq!(tree.rank_of(&2), 1..4);
    /// assert_eq!(tree.rank_of(&3), 4..4);
    /// ```
    #[must_use]
    pub fn rank_of(&self, value: &T) -> Range<usize> {
        self.raw.rank_range(value, &self.key_fn)
    }

    /// Returns every value with the same key as `value`, in insertion order.
    /// The slice is empty if no value shares the key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::OrderStatisticTree;
    ///
    /// let mut tree = OrderStatisticTree::with_key(|word: &&str| word.len());
    /// tree.extend(["to", "be", "or", "not"]);
    /// assert_eq!(tree.equal_range(&"is"), ["to", "be", "or"]);
    /// assert!(tree.equal_range(&"a").is_empty());
    /// ```
    #[must_use]
    pub fn equal_range(&self, value: &T) -> &[T] {
        self.raw.equal_range(value, &self.key_fn)
    }
}

/// Indexes into the tree by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use ostat::{OrderStatisticTree, Rank};
///
/// let tree = OrderStatisticTree::from_iter(["b", "a"]);
/// assert_eq!(tree[Rank(0)], "a");
/// ```
impl<T, F: KeyFn<T>> Index<Rank> for OrderStatisticTree<T, F> {
    type Output = T;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.nth_element(rank.0)
    }
}
