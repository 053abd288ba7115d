use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::mem;

/// A binary heap whose order is supplied on every call, so that values can
/// be ordered by a projection that lives outside the heap.
///
/// `order(a, b) == Ordering::Greater` means `a` belongs closer to the top.
/// Callers must pass the same order to every call.
pub(super) struct KeyedHeap<T> {
    items: Vec<T>,
}

impl<T> KeyedHeap<T> {
    pub(super) const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[cfg(test)]
    pub(super) fn capacity(&self) -> usize {
        self.items.capacity()
    }

    #[inline]
    pub(super) fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub(super) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub(super) fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    pub(super) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.items.try_reserve(additional)
    }

    pub(super) fn push(&mut self, value: T, order: impl Fn(&T, &T) -> Ordering) {
        self.items.push(value);
        let mut child = self.items.len() - 1;
        while child > 0 {
            let parent = (child - 1) / 2;
            if order(&self.items[child], &self.items[parent]).is_le() {
                break;
            }
            self.items.swap(child, parent);
            child = parent;
        }
    }

    pub(super) fn pop(&mut self, order: impl Fn(&T, &T) -> Ordering) -> Option<T> {
        let last = self.items.pop()?;
        if self.items.is_empty() {
            return Some(last);
        }
        let top = mem::replace(&mut self.items[0], last);

        let len = self.items.len();
        let mut parent = 0;
        loop {
            let left = 2 * parent + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && order(&self.items[right], &self.items[left]).is_gt() {
                right
            } else {
                left
            };
            if order(&self.items[child], &self.items[parent]).is_le() {
                break;
            }
            self.items.swap(child, parent);
            parent = child;
        }
        Some(top)
    }
}
