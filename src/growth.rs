use crate::Error;

/// Decides whether a collection may allocate heap storage beyond its inline
/// representation.
///
/// - [`BoundedStack`](crate::BoundedStack) consults it before spilling past its inline slots.
/// - [`OrderStatisticTree`](crate::OrderStatisticTree) consults it before giving a node a
///   grown value group (the storage used once a key has duplicates).
///
/// A denied allocation surfaces as [`Error::GrowthDenied`] and never alters the collection.
///
/// # Examples
///
/// ```
/// use ostat::Growth;
///
/// assert!(Growth::Unbounded.admit(1 << 20).is_ok());
/// assert!(Growth::Limited(8).admit(8).is_ok());
/// assert!(Growth::Limited(8).admit(16).is_err());
/// assert!(Growth::Disabled.admit(1).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Growth {
    /// Grow as far as the global allocator allows.
    #[default]
    Unbounded,
    /// Never hold heap storage for more than this many elements.
    Limited(usize),
    /// Never allocate heap storage.
    Disabled,
}

impl Growth {
    /// Checks whether heap storage for `requested` elements is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GrowthDenied`] if the policy forbids the allocation.
    pub const fn admit(self, requested: usize) -> Result<(), Error> {
        match self {
            Growth::Unbounded => Ok(()),
            Growth::Limited(limit) if requested <= limit => Ok(()),
            Growth::Limited(limit) => Err(Error::GrowthDenied { requested, limit }),
            Growth::Disabled => Err(Error::GrowthDenied { requested, limit: 0 }),
        }
    }
}
