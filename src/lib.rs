//! Exact, in-memory order statistics for Rust.
//!
//! This crate answers "what is the k-th smallest element of this dynamic
//! multiset?" without a database or an external index:
//!
//! - [`OrderStatisticTree`] - an ordered multiset keyed by a projection, with O(log n)
//!   [`nth_element`](OrderStatisticTree::nth_element),
//!   [`nth_elements`](OrderStatisticTree::nth_elements) and
//!   [`percentile`](OrderStatisticTree::percentile) queries
//! - [`PercentileTracker`] - O(1) access to one fixed percentile of an insert-only stream
//! - [`BoundedStack`] - a LIFO stack with inline slots that spills to the heap under a
//!   [`Growth`] policy, used for recursion-free traversal
//!
//! # Example
//!
//! ```
//! use ostat::{OrderStatisticTree, Percent, PercentileTracker, Rank};
//!
//! let ages = [4, 4, 100, 4, 3, 15, 20, 23, 6, 200, 1, 2];
//!
//! let mut tree = OrderStatisticTree::new();
//! let mut p70 = PercentileTracker::new(Percent::new(70).unwrap());
//! for age in ages {
//!     tree.insert(age);
//!     p70.insert(age);
//! }
//!
//! // Sorted: [1, 2, 3, 4, 4, 4, 6, 15, 20, 23, 100, 200]
//! assert_eq!(tree[Rank(0)], 1);
//! assert_eq!(tree.nth_elements(4), [4, 4, 4]);
//! assert_eq!(tree.percentile(Percent::new(70).unwrap()), [20]);
//! assert_eq!(p70.get(), &20);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **Exact** - No sketches or approximations; ties keep insertion order
//! - **Strong failure guarantee** - `try_insert`/`push` either succeed or leave the
//!   collection untouched and hand the value back
//!
//! # Implementation
//!
//! The tree is an AVL tree stored in an arena and augmented with subtree
//! weights. All values sharing a key live in one node: inline while there is
//! one, in a power-of-two sized group once there are more.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod growth;
mod key;
mod order_statistic;
mod raw;

pub mod percentile;
pub mod stack;
pub mod tree;

pub use error::{Error, TryInsertError};
pub use growth::Growth;
pub use key::{Identity, KeyFn};
pub use order_statistic::{Percent, Rank};
pub use percentile::PercentileTracker;
pub use stack::BoundedStack;
pub use tree::OrderStatisticTree;
