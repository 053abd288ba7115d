use alloc::vec::Vec;

use super::handle::Handle;
use crate::{Error, TryInsertError};

/// Append-only node storage addressed by [`Handle`].
///
/// Slots are only vacated by [`Arena::take`] during teardown and are not reused;
/// [`Arena::clear`] resets the arena.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of slots handed out since the last [`Arena::clear`].
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Stores `element` and returns its handle.
    ///
    /// On failure the element is handed back and the arena is unchanged.
    pub(crate) fn try_alloc(&mut self, element: T) -> Result<Handle, TryInsertError<T>> {
        let Some(handle) = Handle::try_from_index(self.slots.len()) else {
            return Err(TryInsertError::new(element, Error::TooManyNodes { max: Handle::MAX + 1 }));
        };
        if self.slots.try_reserve(1).is_err() {
            let requested = self.slots.len() + 1;
            return Err(TryInsertError::new(element, Error::OutOfMemory { requested }));
        }
        self.slots.push(Some(element));
        Ok(handle)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Moves an element out, leaving its slot vacant.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!")
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn arena_capacity() {
        let arena: Arena<u32> = Arena::with_capacity(10);
        assert_eq!(arena.capacity(), 10);
    }

    #[test]
    #[should_panic(expected = "`Arena::get()` - `handle` is invalid!")]
    fn taken_slot_is_invalid() {
        let mut arena: Arena<u32> = Arena::new();
        let handle = arena.try_alloc(7).unwrap();
        assert_eq!(arena.take(handle), 7);
        let _ = arena.get(handle);
    }

    #[test]
    fn full_arena_hands_element_back() {
        // Test builds use 16-bit handles, so the arena fills up quickly.
        let mut arena: Arena<()> = Arena::new();
        for _ in 0..=Handle::MAX {
            arena.try_alloc(()).unwrap();
        }
        let err = arena.try_alloc(()).unwrap_err();
        assert_eq!(err.error(), Error::TooManyNodes { max: Handle::MAX + 1 });
        assert_eq!(arena.len(), Handle::MAX + 1);
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, Option<u32>)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let handle = arena.try_alloc(value).unwrap();
                        model.push((handle, Some(value)));
                    }
                    Operation::GetMut(which, value) => {
                        let live: Vec<usize> = (0..model.len()).filter(|&i| model[i].1.is_some()).collect();
                        if live.is_empty() {
                            continue;
                        }

                        let index = live[which % live.len()];
                        *arena.get_mut(model[index].0) = value;
                        model[index].1 = Some(value);
                    }
                    Operation::Take(which) => {
                        let live: Vec<usize> = (0..model.len()).filter(|&i| model[i].1.is_some()).collect();
                        if live.is_empty() {
                            continue;
                        }

                        let index = live[which % live.len()];
                        let value = arena.take(model[index].0);
                        prop_assert_eq!(Some(value), model[index].1.take());
                    }
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());
                for &(handle, value) in &model {
                    if let Some(value) = value {
                        prop_assert_eq!(*arena.get(handle), value);
                    }
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        GetMut(usize, u32),
        Take(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::GetMut(which, value)),
            5 => any::<usize>().prop_map(Operation::Take),
            1 => Just(Operation::Clear),
        ]
    }
}
