//! # verseq
//!
//! Fully persistent linked sequences together with a version-ordering index.
//!
//! ## Overview
//!
//! "Fully persistent" means every mutating operation produces a new version
//! while leaving all previous versions intact and independently queryable.
//! Any version, not only the latest, may be the basis for a further
//! mutation, so the versions of one structure form a tree rather than a
//! line. This crate provides the two primitives that make such histories
//! practical:
//!
//! - **[`PersistentList`]**: a persistent singly-linked sequence with
//!   structural sharing (path copying) and per-version size tracking. Each
//!   mutation registers a new version descriptor in a dense, append-only
//!   registry indexed by a small integer.
//! - **[`VersionTree`]**: an order-maintenance index over caller-supplied
//!   version identifiers, answering the preorder precedence query
//!   "does version *a* precede version *b*?" in expected constant time
//!   through a doubly-labeled event list with hierarchical relabeling.
//!
//! The two components are independent: [`PersistentList`] does not consume
//! [`VersionTree`], and [`VersionTree`] is agnostic of payload. A higher
//! layer may pair them to implement confluent structures where
//! "which version is older?" matters.
//!
//! ## Feature Flags
//!
//! - `persistent`: the persistent sequence ([`PersistentList`])
//! - `order`: the version-ordering index ([`VersionTree`])
//! - `full`: enable all features (default)
//!
//! ## Example
//!
//! ```rust
//! use verseq::persistent::PersistentList;
//!
//! let mut list = PersistentList::new();
//! let v1 = list.push_back(0, 1)?;          // v1 = [1]
//! let v2 = list.push_back(v1, 2)?;         // v2 = [1, 2]
//! let v3 = list.push_front(v1, 0)?;        // v3 = [0, 1], branched off v1
//!
//! assert_eq!(list.len(v2)?, 2);
//! assert_eq!(list.front(v3)?, &0);
//! assert_eq!(list.len(v1)?, 1);            // v1 is untouched
//! # Ok::<(), verseq::OutOfRangeError>(())
//! ```
//!
//! [`PersistentList`]: persistent::PersistentList
//! [`VersionTree`]: order::VersionTree

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: the density arithmetic of the order-maintenance index works on
// small exact integers well inside f64 range
#![allow(clippy::cast_precision_loss)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types.
///
/// # Usage
///
/// ```rust
/// use verseq::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::OutOfRangeError;

    #[cfg(feature = "persistent")]
    pub use crate::persistent::{Cursor, PersistentList, VersionId};

    #[cfg(feature = "order")]
    pub use crate::order::VersionTree;
}

pub mod error;

pub use error::OutOfRangeError;

#[cfg(feature = "persistent")]
pub mod persistent;

#[cfg(feature = "order")]
pub mod order;
