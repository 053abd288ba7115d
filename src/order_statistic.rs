use crate::Error;

/// A zero-based rank into the ascending-key order of a collection.
///
/// Elements sharing a key are ranked by insertion order.
///
/// # Examples
///
/// ```
/// use ostat::{OrderStatisticTree, Rank};
///
/// let mut tree = OrderStatisticTree::new();
/// tree.insert(20);
/// tree.insert(10);
///
/// assert_eq!(tree[Rank(0)], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);

/// A percentage in `1..=100`, used to select a percentile.
///
/// The p'th percentile of a multiset is the smallest key `k` such that at
/// least p% of the elements have a key less than or equal to `k`.
///
/// # Examples
///
/// ```
/// use ostat::Percent;
///
/// let p90 = Percent::new(90).unwrap();
/// assert_eq!(p90.get(), 90);
/// assert!(Percent::new(0).is_err());
/// assert!(Percent::new(101).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Percent(u8);

impl Percent {
    /// The 50th percentile.
    pub const MEDIAN: Self = Self(50);
    /// The 100th percentile, i.e. the maximum.
    pub const MAX: Self = Self(100);

    /// Creates a percentage, rejecting values outside `1..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PercentOutOfRange`] if `percent` is `0` or greater than `100`.
    pub const fn new(percent: u8) -> Result<Self, Error> {
        if percent == 0 || percent > 100 {
            return Err(Error::PercentOutOfRange(percent));
        }
        Ok(Self(percent))
    }

    /// Returns the percentage as an integer in `1..=100`.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns the zero-based rank selected by this percentage in a collection
    /// of `len` elements: `min(percent * len / 100, len - 1)`.
    ///
    /// `len` must be non-zero.
    #[inline]
    pub(crate) const fn rank_in(self, len: usize) -> usize {
        debug_assert!(len > 0);
        // `percent * len` cannot overflow for any collection that fits in memory
        // on a 64-bit target, but saturate anyway so the clamp still applies.
        let rank = (self.0 as usize).saturating_mul(len) / 100;
        if rank < len { rank } else { len - 1 }
    }
}

impl TryFrom<u8> for Percent {
    type Error = Error;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<Percent> for u8 {
    fn from(percent: Percent) -> Self {
        percent.get()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn percent_bounds() {
        assert_eq!(Percent::new(0), Err(Error::PercentOutOfRange(0)));
        assert_eq!(Percent::new(101), Err(Error::PercentOutOfRange(101)));
        assert_eq!(Percent::new(1).map(Percent::get), Ok(1));
        assert_eq!(Percent::new(100), Ok(Percent::MAX));
        assert_eq!(Percent::try_from(50), Ok(Percent::MEDIAN));
    }

    #[test]
    fn rank_in_clamps_to_last() {
        assert_eq!(Percent::MAX.rank_in(1), 0);
        assert_eq!(Percent::MAX.rank_in(7), 6);
        assert_eq!(Percent::MEDIAN.rank_in(1), 0);
        assert_eq!(Percent::MEDIAN.rank_in(2), 1);
        assert_eq!(Percent::MEDIAN.rank_in(3), 1);
    }

    proptest! {
        #[test]
        fn rank_in_is_floored_and_clamped(percent in 1u8..=100, len in 1usize..10_000) {
            let rank = Percent::new(percent).unwrap().rank_in(len);
            prop_assert!(rank < len);
            prop_assert_eq!(rank, core::cmp::min(percent as usize * len / 100, len - 1));
        }
    }
}
