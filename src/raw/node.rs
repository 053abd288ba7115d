use alloc::vec::Vec;
use core::mem;

use log::{debug, trace};

use super::handle::Handle;
use crate::{Error, Growth, TryInsertError};

/// The values of one node: every value shares the node's key and they are
/// kept in arrival order.
pub(crate) enum Values<T> {
    // A node with a single value needs no allocation.
    Inline(T),
    // Capacity is always a power of two and at least 2.
    Grown(Vec<T>),
}

/// An AVL node augmented with its subtree weight.
pub(crate) struct TreeNode<T> {
    values: Values<T>,
    // Number of values in the subtree rooted here, duplicates included.
    weight: usize,
    // Longest path to a leaf, counted in nodes. A leaf has height 1.
    height: u8,
    left: Option<Handle>,
    right: Option<Handle>,
}

impl<T> Values<T> {
    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        match self {
            Values::Inline(value) => core::slice::from_ref(value),
            Values::Grown(group) => group,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Values::Inline(_) => 1,
            Values::Grown(group) => group.len(),
        }
    }
}

impl<T> TreeNode<T> {
    /// Creates a leaf holding `value` inline.
    pub(crate) const fn new(value: T) -> Self {
        Self {
            values: Values::Inline(value),
            weight: 1,
            height: 1,
            left: None,
            right: None,
        }
    }

    /// Recovers the value of a node that was never linked into a tree.
    pub(crate) fn into_only_value(self) -> T {
        match self.values {
            Values::Inline(value) => value,
            Values::Grown(_) => unreachable!("`TreeNode::into_only_value()` - node holds a group!"),
        }
    }

    /// Returns the node's values in arrival order.
    #[inline]
    pub(crate) fn values(&self) -> &[T] {
        self.values.as_slice()
    }

    /// Returns the oldest value, which stands for the node's key.
    #[inline]
    pub(crate) fn first(&self) -> &T {
        match &self.values {
            Values::Inline(value) => value,
            Values::Grown(group) => &group[0],
        }
    }

    /// Returns `true` if the values live in a separate allocation.
    #[cfg(test)]
    pub(crate) fn is_grown(&self) -> bool {
        matches!(self.values, Values::Grown(_))
    }

    /// Returns the number of values held by this node alone.
    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub(crate) fn weight(&self) -> usize {
        self.weight
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    #[inline]
    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    /// Recomputes `weight` and `height` from the combined weight of the
    /// children and the taller child's height.
    #[inline]
    pub(crate) fn refresh(&mut self, child_weight: usize, child_height: u8) {
        self.weight = self.size() + child_weight;
        self.height = child_height + 1;
    }

    /// Appends `value` to this node's group.
    ///
    /// Either the value is appended and `weight` grows by one, or the node is
    /// left untouched and the value is handed back. All storage is reserved
    /// before the node is modified.
    pub(crate) fn try_push(&mut self, value: T, growth: Growth) -> Result<(), TryInsertError<T>> {
        match self.values {
            Values::Inline(_) => {
                let group = match Self::reserve(Vec::new(), 2, growth) {
                    Ok(group) => group,
                    Err((_, error)) => return Err(TryInsertError::new(value, error)),
                };
                let Values::Inline(first) = mem::replace(&mut self.values, Values::Grown(group)) else {
                    unreachable!("`TreeNode::try_push()` - node changed representation");
                };
                if let Values::Grown(group) = &mut self.values {
                    group.push(first);
                    group.push(value);
                }
                trace!("TreeNode: moved inline value into a grown group of 2");
            }
            Values::Grown(ref mut group) => {
                if group.len() == group.capacity() {
                    let Some(requested) = group.len().checked_mul(2) else {
                        return Err(TryInsertError::new(value, Error::OutOfMemory { requested: usize::MAX }));
                    };
                    let taken = mem::take(group);
                    match Self::reserve(taken, requested, growth) {
                        Ok(bigger) => *group = bigger,
                        Err((taken, error)) => {
                            *group = taken;
                            return Err(TryInsertError::new(value, error));
                        }
                    }
                    trace!("TreeNode: doubled group capacity to {requested}");
                }
                group.push(value);
            }
        }
        self.weight += 1;
        Ok(())
    }

    // Grows `group` to exactly `capacity`. On failure `group` comes back as it was.
    fn reserve(mut group: Vec<T>, capacity: usize, growth: Growth) -> Result<Vec<T>, (Vec<T>, Error)> {
        if let Err(error) = growth.admit(capacity) {
            debug!("TreeNode: {error}");
            return Err((group, error));
        }
        match group.try_reserve_exact(capacity - group.len()) {
            Ok(()) => Ok(group),
            Err(_) => Err((group, Error::OutOfMemory { requested: capacity })),
        }
    }
}
