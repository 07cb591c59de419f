//! Order maintenance over a tree of versions.
//!
//! This module provides [`VersionTree`], an index over caller-supplied
//! version identifiers that answers the preorder precedence query
//! "does version *a* precede version *b*?" in expected constant time.
//!
//! The index keeps two *events* per version (the entry into and the exit
//! from its subtree) on a doubly-linked list that mirrors a preorder walk
//! of the version tree. Every event carries an integer *label* from a
//! dense label space, strictly increasing along the list, so precedence
//! reduces to two integer comparisons. When an insertion finds no room
//! between neighboring labels, a hierarchical relabeling pass spreads a
//! crowded region out, or doubles the label space when the whole of it is
//! too dense. This is the classic order-maintenance construction of
//! Bender, Cole, Demaine, Farach-Colton and Zito.
//!
//! # Examples
//!
//! ```rust
//! use verseq::order::VersionTree;
//!
//! let mut tree = VersionTree::new();
//! tree.insert(1, 0)?;                      // child of the root
//! tree.insert(2, 1)?;
//! tree.insert(3, 0)?;
//!
//! assert!(tree.before(0, 2)?);             // the root precedes everything
//! assert!(tree.before(1, 2)?);
//! assert!(!tree.before(1, 3)?);            // siblings are unordered
//! # Ok::<(), verseq::OutOfRangeError>(())
//! ```

mod tree;

pub use tree::VersionTree;
