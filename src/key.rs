use core::cmp::Ordering;

/// Projects a value onto the key it is ordered by.
///
/// Implemented for every `Fn(&T) -> K` where `K: Ord`, and by [`Identity`]
/// for values that are their own key. The key may borrow from the value, so
/// [`Identity`] never copies anything. A projection must be pure: a value's
/// key may not change while the value is stored in a collection.
///
/// # Examples
///
/// ```
/// use core::cmp::Ordering;
/// use ostat::{Identity, KeyFn};
///
/// let by_len = |s: &&str| s.len();
/// assert_eq!(by_len.key(&"abc"), 3);
/// assert_eq!(by_len.compare(&"ab", &"cd"), Ordering::Equal);
///
/// let word = String::from("borrowed");
/// assert_eq!(Identity.key(&word), &word);
/// ```
pub trait KeyFn<T> {
    /// The ordered key type, possibly borrowing from the value.
    type Key<'a>: Ord
    where
        Self: 'a,
        T: 'a;

    /// Returns the key of `value`.
    fn key<'a>(&'a self, value: &'a T) -> Self::Key<'a>;

    /// Orders two values by their keys.
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }
}

impl<T, K, F> KeyFn<T> for F
where
    F: Fn(&T) -> K,
    K: Ord,
{
    type Key<'a>
        = K
    where
        Self: 'a,
        T: 'a;

    #[inline]
    fn key<'a>(&'a self, value: &'a T) -> K {
        self(value)
    }
}

/// The identity projection: a value is its own key.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Identity;

impl<T: Ord> KeyFn<T> for Identity {
    type Key<'a>
        = &'a T
    where
        T: 'a;

    #[inline]
    fn key<'a>(&'a self, value: &'a T) -> &'a T {
        value
    }

    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn identity_borrows_the_value() {
        let value = 7u32;
        assert!(core::ptr::eq(Identity.key(&value), &value));
        assert_eq!(Identity.compare(&1, &2), Ordering::Less);
    }

    #[test]
    fn closure_compare_projects_both_sides() {
        let calls = Cell::new(0);
        let by_tens = |value: &u32| {
            calls.set(calls.get() + 1);
            value / 10
        };
        assert_eq!(by_tens.compare(&12, &17), Ordering::Equal);
        assert_eq!(by_tens.compare(&12, &27), Ordering::Less);
        assert_eq!(calls.get(), 4);
    }
}
