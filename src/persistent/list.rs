//! Fully persistent singly-linked list with a version registry.
//!
//! This module provides [`PersistentList`], a singly-linked sequence in
//! which every mutation registers a new version while all earlier versions
//! remain readable and may themselves be mutated further.
//!
//! # Overview
//!
//! A [`PersistentList`] owns a dense, append-only registry of version
//! descriptors. The position in the registry is the version's numeric
//! identifier; version 0 is the empty sequence, created at construction.
//! Mutating operations take a source [`VersionId`], register the result as
//! exactly one new version, and never touch the source:
//!
//! - O(1) `push_front` / `pop_front`
//! - O(n) `push_back` / `pop_back`
//! - O(k) `insert` / `erase` at a cursor over the k-th node
//! - O(1) `front`, O(n) `back`
//!
//! Nodes on the path from the head to the edit point are copied; the
//! suffix after the edit point is physically shared with the source
//! version. Reads never allocate.
//!
//! # Examples
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
//! assert_eq!(list.back(v2)?, &2);
//!
//! // every version is still readable
//! let elements: Vec<i32> = list.iter(v2)?.copied().collect();
//! assert_eq!(elements, vec![1, 2]);
//! # Ok::<(), verseq::OutOfRangeError>(())
//! ```
//!
//! # Cursors
//!
//! [`Cursor`] is the position type for `insert` and `erase`. A cursor owns
//! a strong reference into the node graph, so it stays valid and keeps
//! its node alive independently of any later mutations:
//!
//! ```rust
//! use verseq::persistent::PersistentList;
//!
//! let mut list = PersistentList::new();
//! let v1 = list.push_back(0, 1)?;
//! let cursor = list.begin(v1)?;
//!
//! list.push_front(v1, 0)?;                 // does not invalidate `cursor`
//! assert_eq!(cursor.value()?, &1);
//! # Ok::<(), verseq::OutOfRangeError>(())
//! ```

use std::fmt;
use std::rc::Rc;

use crate::error::OutOfRangeError;

/// Identifier of a registered version.
///
/// Version identifiers are dense 0-based indices into the version
/// registry and stay stable for the lifetime of the list. Version 0 is
/// the empty sequence.
pub type VersionId = usize;

/// Internal node of the linked sequence.
///
/// Nodes are immutable after construction and shared between versions
/// through `Rc`.
struct Node<T> {
    /// The element stored in this node.
    element: T,
    /// Reference to the next node (if any).
    next: Option<Rc<Self>>,
}

/// One registered version: a head pointer plus the chain length.
struct Version<T> {
    head: Option<Rc<Node<T>>>,
    length: usize,
}

impl<T> Version<T> {
    fn iter(&self) -> Iter<'_, T> {
        Iter {
            current: self.head.as_deref(),
        }
    }
}

impl<T> Clone for Version<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            length: self.length,
        }
    }
}

/// A fully persistent singly-linked list.
///
/// Every mutating operation reads one source version, appends exactly one
/// new version descriptor to the registry, and leaves the source intact.
/// The new version's identifier is `version_count() - 1` after the call;
/// mutators return it directly where no cursor is involved.
///
/// # Time Complexity
///
/// | Operation     | Complexity |
/// |---------------|------------|
/// | `new`         | O(1)       |
/// | `front`       | O(1)       |
/// | `back`        | O(n)       |
/// | `push_front`  | O(1)       |
/// | `pop_front`   | O(1)       |
/// | `push_back`   | O(n)       |
/// | `pop_back`    | O(n)       |
/// | `insert`      | O(k)       |
/// | `erase`       | O(k)       |
///
/// where k is the index of the edit point in the source version.
///
/// # Examples
///
/// ```rust
/// use verseq::persistent::PersistentList;
///
/// let mut list = PersistentList::new();
/// let v1 = list.push_front(0, 42)?;
/// assert_eq!(list.front(v1)?, &42);
/// # Ok::<(), verseq::OutOfRangeError>(())
/// ```
pub struct PersistentList<T> {
    versions: Vec<Version<T>>,
}

impl<T> PersistentList<T> {
    /// Creates a list whose registry holds version 0, the empty sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use verseq::persistent::PersistentList;
    ///
    /// let list: PersistentList<i32> = PersistentList::new();
    /// assert_eq!(list.version_count(), 1);
    /// assert!(list.is_empty(0).unwrap());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            versions: vec![Version {
                head: None,
                length: 0,
            }],
        }
    }

    /// Returns the number of registered versions.
    ///
    /// Always at least 1: version 0 exists from construction.
    #[inline]
    #[must_use]
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Returns the identifier of the most recently registered version.
    #[inline]
    #[must_use]
    pub fn latest_version(&self) -> VersionId {
        self.versions.len() - 1
    }

    /// Returns `true` if the given version holds no elements.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered.
    pub fn is_empty(&self, version: VersionId) -> Result<bool, OutOfRangeError> {
        Ok(self.version(version)?.length == 0)
    }

    /// Returns the number of elements in the given version.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered.
    pub fn len(&self, version: VersionId) -> Result<usize, OutOfRangeError> {
        Ok(self.version(version)?.length)
    }

    /// Returns a reference to the first element of the given version.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered, or [`OutOfRangeError::EmptyVersion`] if the version is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use verseq::persistent::PersistentList;
    ///
    /// let mut list = PersistentList::new();
    /// let v1 = list.push_front(0, 7)?;
    /// assert_eq!(list.front(v1)?, &7);
    /// assert!(list.front(0).is_err());
    /// # Ok::<(), verseq::OutOfRangeError>(())
    /// ```
    pub fn front(&self, version: VersionId) -> Result<&T, OutOfRangeError> {
        self.version(version)?
            .head
            .as_deref()
            .map(|node| &node.element)
            .ok_or(OutOfRangeError::EmptyVersion(version))
    }

    /// Returns a reference to the last element of the given version.
    ///
    /// Walks the chain, so this is O(n).
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered, or [`OutOfRangeError::EmptyVersion`] if the version is
    /// empty.
    pub fn back(&self, version: VersionId) -> Result<&T, OutOfRangeError> {
        let mut node = self
            .version(version)?
            .head
            .as_deref()
            .ok_or(OutOfRangeError::EmptyVersion(version))?;
        while let Some(next) = node.next.as_deref() {
            node = next;
        }
        Ok(&node.element)
    }

    /// Returns a cursor positioned at the head of the given version.
    ///
    /// For an empty version the returned cursor equals [`end`](Self::end).
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered.
    pub fn begin(&self, version: VersionId) -> Result<Cursor<T>, OutOfRangeError> {
        Ok(Cursor {
            node: self.version(version)?.head.clone(),
        })
    }

    /// Returns the terminal cursor.
    ///
    /// The end cursor is version-agnostic: it compares equal to every
    /// cursor that has walked off the end of any version.
    #[inline]
    #[must_use]
    pub fn end(&self) -> Cursor<T> {
        Cursor { node: None }
    }

    /// Returns a borrowing iterator over the elements of the given version.
    ///
    /// Iteration is read-only and allocation-free.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use verseq::persistent::PersistentList;
    ///
    /// let mut list = PersistentList::new();
    /// let v1 = list.push_back(0, 1)?;
    /// let v2 = list.push_back(v1, 2)?;
    ///
    /// let elements: Vec<i32> = list.iter(v2)?.copied().collect();
    /// assert_eq!(elements, vec![1, 2]);
    /// # Ok::<(), verseq::OutOfRangeError>(())
    /// ```
    pub fn iter(&self, version: VersionId) -> Result<Iter<'_, T>, OutOfRangeError> {
        Ok(self.version(version)?.iter())
    }

    /// Drops every registered version and reinstates version 0, the empty
    /// sequence.
    ///
    /// After `clear` the list is in the same state as a freshly
    /// constructed one; previously issued version identifiers are no
    /// longer valid. Outstanding cursors keep their nodes alive and stay
    /// readable.
    pub fn clear(&mut self) {
        self.release_versions();
        self.versions.push(Version {
            head: None,
            length: 0,
        });
    }

    fn version(&self, version: VersionId) -> Result<&Version<T>, OutOfRangeError> {
        self.versions
            .get(version)
            .ok_or(OutOfRangeError::UnknownVersion(version))
    }

    /// Tears down the registry iteratively so that dropping a long
    /// uniquely-owned chain cannot overflow the stack. Shared nodes are
    /// left to their remaining owners.
    fn release_versions(&mut self) {
        for version in self.versions.drain(..) {
            let mut current = version.head;
            while let Some(node) = current {
                match Rc::try_unwrap(node) {
                    Ok(node) => current = node.next,
                    Err(_) => break,
                }
            }
        }
    }
}

impl<T: Clone> PersistentList<T> {
    /// Inserts `element` before the node designated by `position` in the
    /// given source version, registering the result as a new version.
    ///
    /// The nodes before the edit point are copied; the edit point and
    /// everything after it are shared with the source version. Passing the
    /// end cursor appends. The returned cursor designates the newly
    /// created node; the new version's identifier is
    /// `version_count() - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered, or [`OutOfRangeError::ForeignCursor`] if `position`
    /// designates a node that is not reachable in the source version. On
    /// error no version is registered.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use verseq::persistent::PersistentList;
    ///
    /// let mut list = PersistentList::new();
    /// let v1 = list.push_back(0, 1)?;
    /// let v2 = list.push_back(v1, 3)?;
    ///
    /// // insert 2 before the 3
    /// let mut position = list.begin(v2)?;
    /// position.advance();
    /// let cursor = list.insert(v2, &position, 2)?;
    /// let v3 = list.latest_version();
    ///
    /// assert_eq!(cursor.value()?, &2);
    /// let elements: Vec<i32> = list.iter(v3)?.copied().collect();
    /// assert_eq!(elements, vec![1, 2, 3]);
    /// # Ok::<(), verseq::OutOfRangeError>(())
    /// ```
    pub fn insert(
        &mut self,
        version: VersionId,
        position: &Cursor<T>,
        element: T,
    ) -> Result<Cursor<T>, OutOfRangeError> {
        let source = self.version(version)?;
        let length = source.length;

        // Empty source: the new node is the whole sequence, wherever the
        // cursor points.
        let Some(head) = source.head.clone() else {
            let node = Rc::new(Node {
                element,
                next: None,
            });
            self.versions.push(Version {
                head: Some(Rc::clone(&node)),
                length: 1,
            });
            return Ok(Cursor { node: Some(node) });
        };

        let (prefix, suffix) = Self::split_before(&head, position, version)?;
        let node = Rc::new(Node {
            element,
            next: suffix,
        });
        let cursor = Cursor {
            node: Some(Rc::clone(&node)),
        };
        self.versions.push(Version {
            head: Self::rebuild_prefix(prefix, Some(node)),
            length: length + 1,
        });
        Ok(cursor)
    }

    /// Removes the node designated by `position` from the given source
    /// version, registering the result as a new version.
    ///
    /// Returns a cursor at the node following the removed one (the end
    /// cursor if the last node was removed). If the source version is
    /// empty or `position` is the end cursor, this is a no-op that returns
    /// the end cursor and registers nothing.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered, or [`OutOfRangeError::ForeignCursor`] if `position`
    /// designates a node that is not reachable in the source version. On
    /// error no version is registered.
    pub fn erase(
        &mut self,
        version: VersionId,
        position: &Cursor<T>,
    ) -> Result<Cursor<T>, OutOfRangeError> {
        let source = self.version(version)?;
        let length = source.length;
        let (Some(head), Some(target)) = (source.head.clone(), position.node.as_ref()) else {
            return Ok(Cursor { node: None });
        };

        let mut prefix = Vec::new();
        let mut current = Some(&head);
        let after = loop {
            match current {
                Some(node) if Rc::ptr_eq(node, target) => break node.next.clone(),
                Some(node) => {
                    prefix.push(node.element.clone());
                    current = node.next.as_ref();
                }
                None => return Err(OutOfRangeError::ForeignCursor(version)),
            }
        };

        let cursor = Cursor {
            node: after.clone(),
        };
        self.versions.push(Version {
            head: Self::rebuild_prefix(prefix, after),
            length: length - 1,
        });
        Ok(cursor)
    }

    /// Prepends `element` to the given version and returns the new
    /// version's identifier.
    ///
    /// O(1): the whole source chain is shared.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered.
    pub fn push_front(
        &mut self,
        version: VersionId,
        element: T,
    ) -> Result<VersionId, OutOfRangeError> {
        let begin = self.begin(version)?;
        self.insert(version, &begin, element)?;
        Ok(self.latest_version())
    }

    /// Removes the first element of the given version and returns the new
    /// version's identifier.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered, or [`OutOfRangeError::EmptyVersion`] if the version is
    /// empty.
    pub fn pop_front(&mut self, version: VersionId) -> Result<VersionId, OutOfRangeError> {
        if self.is_empty(version)? {
            return Err(OutOfRangeError::EmptyVersion(version));
        }
        let begin = self.begin(version)?;
        self.erase(version, &begin)?;
        Ok(self.latest_version())
    }

    /// Appends `element` to the given version and returns the new
    /// version's identifier.
    ///
    /// O(n): the whole source chain is copied.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered.
    pub fn push_back(
        &mut self,
        version: VersionId,
        element: T,
    ) -> Result<VersionId, OutOfRangeError> {
        let end = self.end();
        self.insert(version, &end, element)?;
        Ok(self.latest_version())
    }

    /// Removes the last element of the given version and returns the new
    /// version's identifier.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownVersion`] if `version` is not
    /// registered, or [`OutOfRangeError::EmptyVersion`] if the version is
    /// empty.
    pub fn pop_back(&mut self, version: VersionId) -> Result<VersionId, OutOfRangeError> {
        let source = self.version(version)?;
        let mut node = source
            .head
            .as_ref()
            .ok_or(OutOfRangeError::EmptyVersion(version))?;
        while let Some(next) = node.next.as_ref() {
            node = next;
        }
        let last = Cursor {
            node: Some(Rc::clone(node)),
        };
        self.erase(version, &last)?;
        Ok(self.latest_version())
    }

    /// Walks the chain from `head`, collecting copies of the elements
    /// before the node designated by `position`. Returns the collected
    /// prefix together with the shared node at the edit point (`None` for
    /// the end cursor).
    fn split_before(
        head: &Rc<Node<T>>,
        position: &Cursor<T>,
        version: VersionId,
    ) -> Result<(Vec<T>, Option<Rc<Node<T>>>), OutOfRangeError> {
        let mut prefix = Vec::new();
        let mut current = Some(head);
        loop {
            match (current, position.node.as_ref()) {
                (Some(node), Some(target)) if Rc::ptr_eq(node, target) => {
                    return Ok((prefix, Some(Rc::clone(target))));
                }
                (Some(node), _) => {
                    prefix.push(node.element.clone());
                    current = node.next.as_ref();
                }
                (None, None) => return Ok((prefix, None)),
                (None, Some(_)) => return Err(OutOfRangeError::ForeignCursor(version)),
            }
        }
    }

    /// Rebuilds the copied prefix in front of `tail`, returning the new
    /// head. Consumes the prefix back to front so each node can point at
    /// the one built before it.
    fn rebuild_prefix(prefix: Vec<T>, tail: Option<Rc<Node<T>>>) -> Option<Rc<Node<T>>> {
        let mut head = tail;
        for element in prefix.into_iter().rev() {
            head = Some(Rc::new(Node {
                element,
                next: head,
            }));
        }
        head
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// An owning cursor into one version of a [`PersistentList`].
///
/// A cursor holds a strong reference to its node, so it outlives the
/// version it was obtained from and keeps its suffix alive. Cursors
/// compare by node identity: two cursors are equal when they designate
/// the same physical node, and all end cursors are equal to each other.
///
/// # Examples
///
/// ```rust
/// use verseq::persistent::PersistentList;
///
/// let mut list = PersistentList::new();
/// let v1 = list.push_back(0, 1)?;
/// let v2 = list.push_back(v1, 2)?;
///
/// let mut cursor = list.begin(v2)?;
/// assert_eq!(cursor.value()?, &1);
/// cursor.advance();
/// assert_eq!(cursor.value()?, &2);
/// cursor.advance();
/// assert!(cursor.is_end());
/// assert_eq!(cursor, list.end());
/// # Ok::<(), verseq::OutOfRangeError>(())
/// ```
pub struct Cursor<T> {
    node: Option<Rc<Node<T>>>,
}

impl<T> Cursor<T> {
    /// Returns a reference to the element at the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::EndCursor`] if the cursor is positioned
    /// past the end.
    pub fn value(&self) -> Result<&T, OutOfRangeError> {
        self.node
            .as_deref()
            .map(|node| &node.element)
            .ok_or(OutOfRangeError::EndCursor)
    }

    /// Moves the cursor to the next node.
    ///
    /// Advancing the end cursor is a no-op.
    pub fn advance(&mut self) {
        let next = self.node.as_ref().and_then(|node| node.next.clone());
        self.node = next;
    }

    /// Returns `true` if the cursor is positioned past the end.
    #[inline]
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }
}

impl<T> Clone for Cursor<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<T> Default for Cursor<T> {
    /// The default cursor is the terminal cursor.
    fn default() -> Self {
        Self { node: None }
    }
}

impl<T> PartialEq for Cursor<T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.node, &other.node) {
            (None, None) => true,
            (Some(left), Some(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl<T> Eq for Cursor<T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node.as_deref() {
            Some(node) => formatter.debug_tuple("Cursor").field(&node.element).finish(),
            None => formatter.write_str("Cursor(end)"),
        }
    }
}

impl<T> Drop for Cursor<T> {
    /// Releases the suffix iteratively; see
    /// `PersistentList::release_versions`.
    fn drop(&mut self) {
        let mut current = self.node.take();
        while let Some(node) = current {
            match Rc::try_unwrap(node) {
                Ok(node) => current = node.next,
                Err(_) => break,
            }
        }
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// A borrowing iterator over the elements of one version of a
/// [`PersistentList`].
pub struct Iter<'a, T> {
    current: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.current.map(|node| {
            self.current = node.next.as_deref();
            &node.element
        })
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentList<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PersistentList<T> {
    fn clone(&self) -> Self {
        Self {
            versions: self.versions.clone(),
        }
    }
}

/// Registry equality: two lists are equal when their registries hold the
/// same number of versions and corresponding versions have identical
/// length and the same physical head node. Element values are not
/// compared, so no `PartialEq` bound on `T` is needed.
impl<T> PartialEq for PersistentList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.versions.len() == other.versions.len()
            && self
                .versions
                .iter()
                .zip(&other.versions)
                .all(|(left, right)| {
                    left.length == right.length
                        && match (&left.head, &right.head) {
                            (None, None) => true,
                            (Some(first), Some(second)) => Rc::ptr_eq(first, second),
                            _ => false,
                        }
                })
    }
}

impl<T> Eq for PersistentList<T> {}

impl<T: fmt::Debug> fmt::Debug for PersistentList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_list()
            .entries(
                self.versions
                    .iter()
                    .map(|version| version.iter().collect::<Vec<_>>()),
            )
            .finish()
    }
}

impl<T> Drop for PersistentList<T> {
    fn drop(&mut self) {
        self.release_versions();
    }
}
