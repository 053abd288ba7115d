use core::cmp::{Ordering, max};
use core::ops::Range;

use log::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::TreeNode;
use crate::{BoundedStack, Growth, KeyFn, TryInsertError};

/// Inline slots for traversal stacks. An AVL tree over at most `Handle::MAX`
/// nodes is shallower than this, so traversals never spill.
pub(crate) const TRAVERSAL_INLINE: usize = 48;

pub(crate) type TraversalStack = BoundedStack<Handle, TRAVERSAL_INLINE>;

/// The AVL engine backing `OrderStatisticTree`.
///
/// Nodes are ordered by the key of their values; all values with equal keys
/// share one node. The key projection is supplied per call so that this type
/// only depends on the value type.
pub(crate) struct RawTree<T> {
    /// Arena storing all tree nodes.
    nodes: Arena<TreeNode<T>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
}

impl<T> RawTree<T> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates a tree with room for `capacity` distinct keys.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns the number of values, duplicates included.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.weight_of(self.root)
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of distinct keys.
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &TreeNode<T> {
        self.nodes.get(handle)
    }

    #[inline]
    fn weight_of(&self, link: Option<Handle>) -> usize {
        link.map_or(0, |handle| self.nodes.get(handle).weight())
    }

    #[inline]
    fn height_of(&self, link: Option<Handle>) -> u8 {
        link.map_or(0, |handle| self.nodes.get(handle).height())
    }

    /// Removes every value.
    ///
    /// Nodes are released in pre-order, walking the tree with an explicit stack
    /// instead of recursion. Should the stack fail to spill, the remaining
    /// nodes are released when the arena is reset.
    pub(crate) fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            trace!("RawTree: tearing down {} nodes", self.nodes.len());

            let mut pending = TraversalStack::new();
            let mut next = Some(root);
            while let Some(handle) = next.or_else(|| pending.pop()) {
                let node = self.nodes.take(handle);
                if let Some(right) = node.right()
                    && pending.push(right).is_err()
                {
                    break;
                }
                next = node.left();
            }
        }
        self.nodes.clear();
    }

    /// Finds the node holding the value at `rank` and the value's offset in
    /// that node's group.
    pub(crate) fn locate(&self, rank: usize) -> Option<(Handle, usize)> {
        if rank >= self.len() {
            return None;
        }

        let mut remaining = rank;
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            let left_weight = self.weight_of(node.left());
            if remaining < left_weight {
                current = node.left().expect("`RawTree::locate()` - left weight without a left child!");
                continue;
            }

            let offset = remaining - left_weight;
            if offset < node.size() {
                return Some((current, offset));
            }

            remaining = offset - node.size();
            current = node
                .right()
                .unwrap_or_else(|| panic!("`RawTree::locate()` - weight invariant violated at rank {rank}!"));
        }
    }

    /// Returns the value at `rank`.
    pub(crate) fn get(&self, rank: usize) -> Option<&T> {
        let (handle, offset) = self.locate(rank)?;
        Some(&self.nodes.get(handle).values()[offset])
    }

    /// Returns the whole group of equal-key values containing `rank`.
    pub(crate) fn group(&self, rank: usize) -> Option<&[T]> {
        let (handle, _) = self.locate(rank)?;
        Some(self.nodes.get(handle).values())
    }

    fn relink(&mut self, handle: Handle, left: Option<Handle>, right: Option<Handle>) {
        let child_weight = self.weight_of(left) + self.weight_of(right);
        let child_height = max(self.height_of(left), self.height_of(right));
        let node = self.nodes.get_mut(handle);
        node.set_left(left);
        node.set_right(right);
        node.refresh(child_weight, child_height);
    }

    /// Restores the AVL balance at `handle` and returns the subtree's new root.
    fn balance(&mut self, handle: Handle) -> Handle {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left(), node.right());
        let diff = i16::from(self.height_of(right)) - i16::from(self.height_of(left));
        match diff {
            2 => {
                // Right-heavy. If the right child leans left, a single left
                // rotation would leave us left-heavy; straighten it first.
                let right = right.expect("`RawTree::balance()` - right-heavy without a right child!");
                let inner = self.nodes.get(right);
                if self.height_of(inner.left()) > self.height_of(inner.right()) {
                    let right = self.rotate_right(right);
                    self.nodes.get_mut(handle).set_right(Some(right));
                }
                self.rotate_left(handle)
            }
            -2 => {
                let left = left.expect("`RawTree::balance()` - left-heavy without a left child!");
                let inner = self.nodes.get(left);
                if self.height_of(inner.right()) > self.height_of(inner.left()) {
                    let left = self.rotate_left(left);
                    self.nodes.get_mut(handle).set_left(Some(left));
                }
                self.rotate_right(handle)
            }
            -1..=1 => handle,
            _ => unreachable!("`RawTree::balance()` - height difference {diff} out of range!"),
        }
    }

    //         B                     A
    //       ./ \.                 ./ \.
    //     low   A        →        B  high
    //         ./ \.             ./ \.
    //     middle  high        low  middle
    fn rotate_left(&mut self, b: Handle) -> Handle {
        let node = self.nodes.get(b);
        let low = node.left();
        let a = node.right().expect("`RawTree::rotate_left()` - missing right child!");
        let node = self.nodes.get(a);
        let (middle, high) = (node.left(), node.right());

        self.relink(b, low, middle);
        self.relink(a, Some(b), high);
        a
    }

    //           A                 B
    //         ./ \.             ./ \.
    //         B  high    →    low   A
    //       ./ \.                 ./ \.
    //     low  middle         middle  high
    fn rotate_right(&mut self, a: Handle) -> Handle {
        let node = self.nodes.get(a);
        let b = node.left().expect("`RawTree::rotate_right()` - missing left child!");
        let high = node.right();
        let node = self.nodes.get(b);
        let (low, middle) = (node.left(), node.right());

        self.relink(a, middle, high);
        self.relink(b, low, Some(a));
        b
    }
}

impl<T> RawTree<T> {
    /// Inserts `value` after every value with an equal key.
    ///
    /// On failure the tree is exactly as it was and `value` is handed back.
    pub(crate) fn try_insert<F: KeyFn<T>>(
        &mut self,
        value: T,
        key_fn: &F,
        growth: Growth,
    ) -> Result<(), TryInsertError<T>> {
        let root = self.insert_at(self.root, value, key_fn, growth)?;
        self.root = Some(root);
        Ok(())
    }

    // Every fallible step happens at the bottom of the descent, before any
    // node on the path has been touched.
    fn insert_at<F: KeyFn<T>>(
        &mut self,
        link: Option<Handle>,
        value: T,
        key_fn: &F,
        growth: Growth,
    ) -> Result<Handle, TryInsertError<T>> {
        let Some(handle) = link else {
            return self.nodes.try_alloc(TreeNode::new(value)).map_err(|err| err.map(TreeNode::into_only_value));
        };

        let node = self.nodes.get(handle);
        let (left, right) = (node.left(), node.right());
        match key_fn.compare(&value, node.first()) {
            Ordering::Less => {
                let left = self.insert_at(left, value, key_fn, growth)?;
                self.relink(handle, Some(left), right);
            }
            Ordering::Greater => {
                let right = self.insert_at(right, value, key_fn, growth)?;
                self.relink(handle, left, Some(right));
            }
            Ordering::Equal => {
                // Heights are unchanged, so no rebalancing is needed.
                self.nodes.get_mut(handle).try_push(value, growth)?;
                return Ok(handle);
            }
        }
        Ok(self.balance(handle))
    }

    // Returns the node whose key equals `probe`'s, and the number of values
    // with a smaller key.
    fn find<F: KeyFn<T>>(&self, probe: &T, key_fn: &F) -> (Option<Handle>, usize) {
        let mut less = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key_fn.compare(probe, node.first()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    less += self.weight_of(node.left()) + node.size();
                    current = node.right();
                }
                Ordering::Equal => return (Some(handle), less + self.weight_of(node.left())),
            }
        }
        (None, less)
    }

    /// Returns the ranks occupied by values with the same key as `probe`.
    /// When no value has that key the range is empty and starts where it
    /// would be inserted.
    pub(crate) fn rank_range<F: KeyFn<T>>(&self, probe: &T, key_fn: &F) -> Range<usize> {
        match self.find(probe, key_fn) {
            (Some(handle), start) => start..start + self.nodes.get(handle).size(),
            (None, start) => start..start,
        }
    }

    /// Returns every value with the same key as `probe`, in arrival order.
    pub(crate) fn equal_range<F: KeyFn<T>>(&self, probe: &T, key_fn: &F) -> &[T] {
        match self.find(probe, key_fn) {
            (Some(handle), _) => self.nodes.get(handle).values(),
            (None, _) => &[],
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
mod tests {
    use super::*;
    use crate::{Error, Identity};
    use alloc::string::String;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<T> RawTree<T> {
        /// Validates the AVL, weight and ordering invariants. Panics with a
        /// descriptive message if any are violated.
        pub(crate) fn validate_invariants<F: KeyFn<T>>(&self, key_fn: &F) {
            let mut errors: Vec<String> = Vec::new();
            if let Some(root) = self.root {
                self.validate_node(root, key_fn, &mut errors);
            }
            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        // Returns (weight, height) as recomputed from scratch.
        fn validate_node<F: KeyFn<T>>(&self, handle: Handle, key_fn: &F, errors: &mut Vec<String>) -> (usize, u8) {
            let node = self.nodes.get(handle);
            let index = handle.to_index();
            let first = node.first();

            if node.values().iter().any(|value| key_fn.compare(value, first).is_ne()) {
                errors.push(alloc::format!("node {index}: group holds mixed keys"));
            }
            if let Some(left) = node.left()
                && key_fn.compare(self.nodes.get(left).first(), first).is_ge()
            {
                errors.push(alloc::format!("node {index}: left child key is not smaller"));
            }
            if let Some(right) = node.right()
                && key_fn.compare(self.nodes.get(right).first(), first).is_le()
            {
                errors.push(alloc::format!("node {index}: right child key is not larger"));
            }

            let (left_weight, left_height) =
                node.left().map_or((0, 0), |left| self.validate_node(left, key_fn, errors));
            let (right_weight, right_height) =
                node.right().map_or((0, 0), |right| self.validate_node(right, key_fn, errors));

            let weight = node.size() + left_weight + right_weight;
            let height = 1 + max(left_height, right_height);
            if node.weight() != weight {
                errors.push(alloc::format!("node {index}: weight {} != {weight}", node.weight()));
            }
            if node.height() != height {
                errors.push(alloc::format!("node {index}: height {} != {height}", node.height()));
            }
            if left_height.abs_diff(right_height) > 1 {
                errors.push(alloc::format!("node {index}: unbalanced ({left_height} vs {right_height})"));
            }
            (weight, height)
        }
    }

    fn by_key(pair: &(u8, u32)) -> u8 {
        pair.0
    }

    fn build(values: &[(u8, u32)]) -> RawTree<(u8, u32)> {
        let mut tree = RawTree::new();
        for &value in values {
            tree.try_insert(value, &by_key, Growth::Unbounded).unwrap();
        }
        tree
    }

    #[test]
    fn empty_tree() {
        let tree: RawTree<i32> = RawTree::new();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert!(tree.get(0).is_none());
        assert!(tree.group(0).is_none());
        assert_eq!(tree.rank_range(&5, &Identity), 0..0);
        assert!(tree.equal_range(&5, &Identity).is_empty());
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut tree = RawTree::new();
        for value in 0..1024 {
            tree.try_insert(value, &Identity, Growth::Unbounded).unwrap();
            tree.validate_invariants(&Identity);
        }
        // A perfectly balanced tree of 1023 nodes has height 10.
        assert!(tree.node(tree.root().unwrap()).height() <= 11);
        assert_eq!(tree.len(), 1024);
    }

    #[test]
    fn double_rotations() {
        // Right-left and left-right cases.
        for values in [[1, 3, 2], [3, 1, 2]] {
            let mut tree = RawTree::new();
            for value in values {
                tree.try_insert(value, &Identity, Growth::Unbounded).unwrap();
            }
            tree.validate_invariants(&Identity);
            assert_eq!(*tree.node(tree.root().unwrap()).first(), 2);
        }
    }

    #[test]
    fn duplicates_share_a_node() {
        let tree = build(&[(5, 0), (3, 1), (5, 2), (7, 3), (5, 4)]);
        tree.validate_invariants(&by_key);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.group(2), Some(&[(5, 0), (5, 2), (5, 4)][..]));
        assert_eq!(tree.get(3), Some(&(5, 4)));
        assert_eq!(tree.rank_range(&(5, 99), &by_key), 1..4);
        assert_eq!(tree.rank_range(&(6, 99), &by_key), 4..4);
        assert_eq!(tree.equal_range(&(7, 99), &by_key), &[(7, 3)]);
    }

    #[test]
    fn failed_insert_leaves_tree_untouched() {
        let mut tree = RawTree::new();
        for value in [(2, 0), (1, 1), (3, 2)] {
            tree.try_insert(value, &by_key, Growth::Disabled).unwrap();
        }

        let err = tree.try_insert((1, 9), &by_key, Growth::Disabled).unwrap_err();
        assert_eq!(err.error(), Error::GrowthDenied { requested: 2, limit: 0 });
        assert_eq!(err.into_inner(), (1, 9));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.group(0), Some(&[(1, 1)][..]));
        tree.validate_invariants(&by_key);
    }

    #[test]
    fn clear_releases_everything() {
        let mut tree = build(&[(4, 0), (2, 1), (6, 2), (2, 3)]);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.node_count(), 0);
        tree.try_insert((1, 0), &by_key, Growth::Unbounded).unwrap();
        assert_eq!(tree.get(0), Some(&(1, 0)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn invariants_hold_after_every_insert(values in prop::collection::vec(any::<u8>(), 0..400)) {
            let mut tree = RawTree::new();
            for (i, &key) in values.iter().enumerate() {
                tree.try_insert((key, i as u32), &by_key, Growth::Unbounded).unwrap();
                tree.validate_invariants(&by_key);
                prop_assert_eq!(tree.len(), i + 1);
            }
        }

        #[test]
        fn locate_matches_stable_sort(values in prop::collection::vec(0u8..32, 1..300)) {
            let values: Vec<(u8, u32)> = values.iter().enumerate().map(|(i, &key)| (key, i as u32)).collect();
            let tree = build(&values);

            let mut expected = values.clone();
            expected.sort_by_key(by_key);

            for (rank, value) in expected.iter().enumerate() {
                prop_assert_eq!(tree.get(rank), Some(value), "get({})", rank);
                let group = tree.group(rank).unwrap();
                let start = expected.partition_point(|other| other.0 < value.0);
                let end = expected.partition_point(|other| other.0 <= value.0);
                prop_assert_eq!(group, &expected[start..end], "group({})", rank);
                prop_assert_eq!(tree.rank_range(value, &by_key), start..end);
            }
            prop_assert!(tree.get(expected.len()).is_none());
        }
    }
}
