use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{Handle, RawTree, TraversalStack};
use crate::{Growth, Identity, KeyFn, TryInsertError};

mod capacity;
mod order_statistic;

/// An ordered multiset with O(log n) access by rank.
///
/// Values are ordered by the key a [`KeyFn`] projects from them; values with
/// equal keys keep their insertion order. The tree is an AVL tree whose nodes
/// each hold every value of one key and are augmented with the number of
/// values in their subtree, so both insertion and rank lookup take O(log n).
///
/// A node holding a single value stores it inline. The first duplicate moves
/// the node's values into a heap-allocated group that doubles as it fills;
/// the tree's [`Growth`] policy decides whether such groups may be allocated.
///
/// Values cannot be removed individually; [`clear`](Self::clear) empties the
/// whole tree. The tree is intentionally not `Clone`: copying means rebuilding
/// it from its values.
///
/// It is a logic error for a value's key to change while it is in the tree.
///
/// # Examples
///
/// ```
/// use ostat::{OrderStatisticTree, Percent};
///
/// let mut words = OrderStatisticTree::with_key(|word: &&str| word.len());
/// for word in ["a", "b", "ab", "abc", "abcde", "edcba", "abcd"] {
///     words.insert(word);
/// }
///
/// assert_eq!(words.len(), 7);
/// assert_eq!(*words.nth_element(0), "a");
/// assert_eq!(*words.nth_element(1), "b");
/// assert_eq!(words.nth_elements(6), ["abcde", "edcba"]);
/// assert_eq!(words.percentile(Percent::MEDIAN), ["abc"]);
/// ```
pub struct OrderStatisticTree<T, F = Identity> {
    raw: RawTree<T>,
    key_fn: F,
    growth: Growth,
}

/// An iterator over the values of an [`OrderStatisticTree`] in rank order.
///
/// This `struct` is created by the [`iter`] method on [`OrderStatisticTree`].
/// It walks the tree with an explicit stack rather than recursion.
///
/// [`iter`]: OrderStatisticTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    raw: &'a RawTree<T>,
    pending: TraversalStack,
    group: core::slice::Iter<'a, T>,
    remaining: usize,
}

impl<T: Ord> OrderStatisticTree<T> {
    /// Makes a new, empty tree ordered by the values themselves.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::OrderStatisticTree;
    ///
    /// let mut tree = OrderStatisticTree::new();
    /// tree.insert(3);
    /// tree.insert(1);
    /// assert_eq!(tree.nth_element(0), &1);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_key(Identity)
    }
}

impl<T, F: KeyFn<T>> OrderStatisticTree<T, F> {
    /// Makes a new, empty tree ordered by `key_fn`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::OrderStatisticTree;
    ///
    /// let mut tree = OrderStatisticTree::with_key(|pair: &(u32, char)| pair.0);
    /// tree.insert((2, 'x'));
    /// tree.insert((1, 'y'));
    /// tree.insert((2, 'z'));
    /// assert_eq!(tree.nth_elements(1), [(2, 'x'), (2, 'z')]);
    /// ```
    #[must_use]
    pub const fn with_key(key_fn: F) -> Self {
        Self {
            raw: RawTree::new(),
            key_fn,
            growth: Growth::Unbounded,
        }
    }

    /// Returns the key projection.
    #[must_use]
    pub const fn key_fn(&self) -> &F {
        &self.key_fn
    }

    /// Returns the number of values in the tree, duplicates included.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of distinct keys in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::OrderStatisticTree;
    ///
    /// let tree: OrderStatisticTree<_> = [1, 1, 2, 3, 3, 3].into_iter().collect();
    /// assert_eq!(tree.len(), 6);
    /// assert_eq!(tree.key_count(), 3);
    /// ```
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.raw.node_count()
    }

    /// Adds `value` to the tree, after every value that has the same key.
    ///
    /// # Panics
    ///
    /// Panics if storage for the value cannot be obtained; see
    /// [`try_insert`](Self::try_insert) for the fallible version.
    ///
    /// # Complexity
    ///
    /// O(log n) amortized.
    pub fn insert(&mut self, value: T) {
        if let Err(err) = self.try_insert(value) {
            panic!("`OrderStatisticTree::insert()` - {}", err.error());
        }
    }

    /// Adds `value` to the tree, after every value that has the same key.
    ///
    /// # Errors
    ///
    /// Fails if the growth policy denies, or the allocator cannot provide, the
    /// storage the value needs. The tree is then exactly as it was before the
    /// call and the value is returned inside the error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::{Error, Growth, OrderStatisticTree};
    ///
    /// let mut tree = OrderStatisticTree::new().with_growth(Growth::Disabled);
    /// tree.try_insert(1).unwrap();
    /// tree.try_insert(2).unwrap();
    ///
    /// // A second `1` would need a heap-allocated group.
    /// let err = tree.try_insert(1).unwrap_err();
    /// assert_eq!(err.error(), Error::GrowthDenied { requested: 2, limit: 0 });
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn try_insert(&mut self, value: T) -> Result<(), TryInsertError<T>> {
        self.raw.try_insert(value, &self.key_fn, self.growth)
    }

    /// Removes every value from the tree.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator over the values of the tree in rank order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostat::OrderStatisticTree;
    ///
    /// let tree = OrderStatisticTree::from_iter([3, 1, 2, 1]);
    /// assert!(tree.iter().eq(&[1, 1, 2, 3]));
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.raw)
    }
}

impl<T: Ord> Default for OrderStatisticTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, F: KeyFn<T>> fmt::Debug for OrderStatisticTree<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, F: KeyFn<T>> Extend<T> for OrderStatisticTree<T, F> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for OrderStatisticTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, T, F: KeyFn<T>> IntoIterator for &'a OrderStatisticTree<T, F> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iter<'a, T> {
    fn new(raw: &'a RawTree<T>) -> Self {
        let mut iter = Self {
            raw,
            pending: TraversalStack::new(),
            group: Default::default(),
            remaining: raw.len(),
        };
        iter.descend(raw.root());
        iter
    }

    // Stacks `link` and its chain of left descendants.
    fn descend(&mut self, mut link: Option<Handle>) {
        while let Some(handle) = link {
            if let Err(err) = self.pending.push(handle) {
                panic!("`Iter::descend()` - traversal stack cannot grow: {}", err.error());
            }
            link = self.raw.node(handle).left();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some(value) = self.group.next() {
                self.remaining -= 1;
                return Some(value);
            }
            let raw = self.raw;
            let node = raw.node(self.pending.pop()?);
            self.group = node.values().iter();
            self.descend(node.right());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish_non_exhaustive()
    }
}
