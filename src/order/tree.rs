//! Version tree with order-maintenance labels.
//!
//! [`VersionTree`] tracks each registered version through two events on a
//! doubly-linked *event list* that mirrors a preorder walk of the version
//! tree: an open event carrying the version's own identifier and a close
//! event carrying its arithmetic negation. Every event owns a *label*
//! drawn from a dense integer space of capacity `M`; labels are strictly
//! increasing along the list, so the preorder ancestor query
//! [`before`](VersionTree::before) reduces to two label comparisons.
//!
//! When an insertion finds no free label between its neighbors, the
//! smallest enclosing power-of-two window whose occupancy density is
//! acceptable is redistributed at equal spacing; when no window
//! qualifies, the label space doubles and every event is redistributed.
//! Slot `M - 1` is permanently reserved for a right sentinel that also
//! serves as the root version's close event, so the root's bracket
//! encloses every other event.
//!
//! # Examples
//!
//! ```rust
//! use verseq::order::VersionTree;
//!
//! let mut tree = VersionTree::new();
//! tree.insert(10, 0)?;
//! tree.insert(20, 10)?;
//!
//! assert!(tree.before(10, 20)?);           // 10 is an ancestor of 20
//! assert!(!tree.before(20, 10)?);
//! assert!(tree.before(10, 10)?);           // reflexive
//! # Ok::<(), verseq::OutOfRangeError>(())
//! ```

use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;

use crate::error::OutOfRangeError;

/// Reserved version key acting as the right sentinel of the label space.
///
/// User versions must differ from this value; `insert` rejects it like
/// any other occupied key.
const NONE_KEY: i64 = i64::MIN;

/// One entry of the event list.
///
/// `prev`/`next` are indices into the event arena. The arena only ever
/// grows (the tree supports no removal), so indices stay stable.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Event {
    key: i64,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Where a key currently lives: its label and its event-arena index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    label: usize,
    event: usize,
}

/// An order-maintenance index over a tree of versions.
///
/// Versions are caller-supplied `i64` identifiers. The root version 0 is
/// registered at construction; every other version is inserted as the
/// child of an already-registered parent. [`before`](Self::before)
/// answers the preorder ancestor-or-equal relation in expected constant
/// time; [`insert`](Self::insert) is amortized constant time over any
/// insertion sequence.
///
/// # Examples
///
/// ```rust
/// use verseq::order::VersionTree;
///
/// let mut tree = VersionTree::new();
/// assert!(tree.is_empty());
/// tree.insert(1, 0)?;
/// assert_eq!(tree.version_count(), 2);
/// # Ok::<(), verseq::OutOfRangeError>(())
/// ```
#[derive(Clone)]
pub struct VersionTree {
    /// Event arena; list order is given by `prev`/`next`, not by index.
    events: Vec<Event>,
    /// Arena index of the root's open event, the list head.
    head: usize,
    /// Label -> key. `NONE_KEY` marks a free slot; the sentinel slot
    /// `M - 1` also reads as free so that density counts skip it.
    label_to_key: Vec<i64>,
    /// Key -> (label, event).
    positions: HashMap<i64, Slot>,
}

impl VersionTree {
    /// Base of the per-level density thresholds used during relabeling.
    ///
    /// A window of size `2^i` accepts a redistribution when its occupancy
    /// density is below `OVERFLOW_THRESHOLD_BASE^(-i)`. The value must
    /// keep every acceptable window sparse enough that redistribution
    /// opens a gap of at least two labels even next to the pinned
    /// sentinel; bases in roughly (1.27, 1.41) do, and 1.3 is the
    /// conventional choice from the order-maintenance literature.
    pub const OVERFLOW_THRESHOLD_BASE: f64 = 1.3;

    /// Creates a tree holding only the root version 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use verseq::order::VersionTree;
    ///
    /// let tree = VersionTree::new();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.version_count(), 1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Self {
            events: Vec::new(),
            head: 0,
            label_to_key: Vec::new(),
            positions: HashMap::new(),
        };
        tree.reset();
        tree
    }

    /// Registers `version` as a child of `parent`.
    ///
    /// The new version's bracket is placed at the very beginning of the
    /// parent's subtree. Exactly two events are added; relabeling may
    /// move existing labels but never reorders events.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownTreeVersion`] if `parent` is not
    /// a registered version, and [`OutOfRangeError::DuplicateTreeVersion`]
    /// if `version` (or its negation, which would collide with an
    /// existing bracket key, or the reserved sentinel value) is already
    /// occupied. On error the tree is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use verseq::order::VersionTree;
    ///
    /// let mut tree = VersionTree::new();
    /// tree.insert(1, 0)?;
    /// assert!(tree.insert(1, 0).is_err());     // duplicate
    /// assert!(tree.insert(2, 99).is_err());    // unknown parent
    /// # Ok::<(), verseq::OutOfRangeError>(())
    /// ```
    pub fn insert(&mut self, version: i64, parent: i64) -> Result<(), OutOfRangeError> {
        if !self.contains(parent) {
            return Err(OutOfRangeError::UnknownTreeVersion(parent));
        }
        if self.positions.contains_key(&version) {
            return Err(OutOfRangeError::DuplicateTreeVersion(version));
        }
        // `version` cannot be i64::MIN here: that key is the sentinel and
        // always occupied, so the duplicate check above already fired.
        let close_key = -version;
        if self.positions.contains_key(&close_key) {
            return Err(OutOfRangeError::DuplicateTreeVersion(version));
        }

        let parent_event = self.positions.get(&parent).map_or(0, |slot| slot.event);
        let open_event = self.link_after(parent_event, version);
        self.assign_label(open_event);
        let close_event = self.link_after(open_event, close_key);
        self.assign_label(close_event);
        Ok(())
    }

    /// Returns whether `first` precedes-or-equals `second` in preorder.
    ///
    /// True iff `first == second` or `first` is an ancestor of `second`;
    /// siblings are unordered under this relation. Expected O(1).
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::UnknownTreeVersion`] if either argument
    /// is not a registered version.
    pub fn before(&self, first: i64, second: i64) -> Result<bool, OutOfRangeError> {
        let (first_open, first_close) = self.bracket(first)?;
        let (second_open, second_close) = self.bracket(second)?;
        Ok(first_open <= second_open && second_close <= first_close)
    }

    /// Returns `true` if `version` is registered in the tree.
    ///
    /// The root version 0 is always registered. A key that merely occurs
    /// as the close key of another version does not count.
    #[must_use]
    pub fn contains(&self, version: i64) -> bool {
        if version == 0 {
            return true;
        }
        let Some(open) = self.positions.get(&version) else {
            return false;
        };
        version.checked_neg().is_some_and(|negated| {
            self.positions
                .get(&negated)
                .is_some_and(|close| open.label < close.label)
        })
    }

    /// Returns `true` if no version besides the root is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.len() == 2
    }

    /// Returns the number of registered versions, including the root.
    #[must_use]
    pub fn version_count(&self) -> usize {
        self.events.len() / 2
    }

    /// Returns the current capacity `M` of the label space.
    ///
    /// Grows by doubling under insertion pressure; useful for observing
    /// relabeling behavior from tests and diagnostics.
    #[must_use]
    pub fn label_capacity(&self) -> usize {
        self.label_to_key.len()
    }

    /// Returns the labels in event-list order, sentinel included.
    ///
    /// The sequence is strictly increasing; exposed for diagnostics and
    /// tests.
    pub fn event_labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.event_indices().map(|index| self.event_label(index))
    }

    /// Resets the tree to its initial root-only state.
    ///
    /// The label space shrinks back to its initial capacity.
    pub fn clear(&mut self) {
        self.reset();
    }

    // =========================================================================
    // Event list
    // =========================================================================

    fn reset(&mut self) {
        self.events.clear();
        self.positions.clear();
        self.label_to_key = vec![NONE_KEY; 2];
        self.events.push(Event {
            key: 0,
            prev: None,
            next: Some(1),
        });
        self.events.push(Event {
            key: NONE_KEY,
            prev: Some(0),
            next: None,
        });
        self.head = 0;
        self.label_to_key[0] = 0;
        self.positions.insert(0, Slot { label: 0, event: 0 });
        self.positions.insert(NONE_KEY, Slot { label: 1, event: 1 });
    }

    /// Links a fresh event carrying `key` into the list right after
    /// `anchor` and returns its arena index. The label is assigned
    /// separately.
    fn link_after(&mut self, anchor: usize, key: i64) -> usize {
        let index = self.events.len();
        let next = self.events[anchor].next;
        self.events.push(Event {
            key,
            prev: Some(anchor),
            next,
        });
        self.events[anchor].next = Some(index);
        if let Some(next_index) = next {
            self.events[next_index].prev = Some(index);
        }
        index
    }

    fn event_indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(self.head), move |&index| self.events[index].next)
    }

    fn event_keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.event_indices().map(|index| self.events[index].key)
    }

    fn event_label(&self, event: usize) -> usize {
        let key = self.events[event].key;
        self.positions.get(&key).map_or(0, |slot| slot.label)
    }

    /// Open and close labels of a registered version. The sentinel closes
    /// the root's bracket.
    fn bracket(&self, version: i64) -> Result<(usize, usize), OutOfRangeError> {
        if !self.contains(version) {
            return Err(OutOfRangeError::UnknownTreeVersion(version));
        }
        let open = self.positions.get(&version).map_or(0, |slot| slot.label);
        let close = if version == 0 {
            self.label_capacity() - 1
        } else {
            self.positions.get(&(-version)).map_or(0, |slot| slot.label)
        };
        Ok((open, close))
    }

    // =========================================================================
    // Label allocation
    // =========================================================================

    /// Assigns a label to a freshly linked event: the midpoint of its
    /// neighbors' gap, relabeling until the gap admits one.
    fn assign_label(&mut self, event: usize) {
        loop {
            let left = self.events[event]
                .prev
                .map_or(0, |index| self.event_label(index));
            let right = self.events[event]
                .next
                .map_or_else(|| self.label_capacity() - 1, |index| self.event_label(index));
            if right - left >= 2 {
                let label = left + (right - left + 1) / 2;
                let key = self.events[event].key;
                self.label_to_key[label] = key;
                self.positions.insert(key, Slot { label, event });
                return;
            }
            self.rebalance(left, right);
        }
    }

    /// Finds the smallest power-of-two window containing both colliding
    /// labels whose density is acceptable and redistributes it; doubles
    /// the label space when no window qualifies.
    fn rebalance(&mut self, left: usize, right: usize) {
        let mut size = 2;
        while size <= self.label_capacity() {
            if left / size == right / size {
                let start = left / size * size;
                let occupied = self.occupied_in(start, start + size);
                let density = occupied as f64 / size as f64;
                if density < Self::density_threshold(size) {
                    self.spread_range(start, start + size);
                    return;
                }
            }
            size *= 2;
        }
        self.grow();
    }

    /// Density threshold for a window of size `2^i`:
    /// `OVERFLOW_THRESHOLD_BASE^(-i)`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn density_threshold(size: usize) -> f64 {
        Self::OVERFLOW_THRESHOLD_BASE.powi(-(size.trailing_zeros() as i32))
    }

    /// Occupied slots in `[start, end)`. The pinned sentinel counts as an
    /// occupant of the last window even though its slot reads as free.
    fn occupied_in(&self, start: usize, end: usize) -> usize {
        let occupants = self.label_to_key[start..end]
            .iter()
            .filter(|key| **key != NONE_KEY)
            .count();
        occupants + usize::from(end == self.label_capacity())
    }

    /// Redistributes the occupants of `[start, end)` at equal spacing,
    /// preserving their order. The sentinel slot is never written.
    fn spread_range(&mut self, start: usize, end: usize) {
        let mut keys: SmallVec<[i64; 16]> = SmallVec::new();
        for slot in start..end {
            if self.label_to_key[slot] != NONE_KEY {
                keys.push(self.label_to_key[slot]);
                self.label_to_key[slot] = NONE_KEY;
            }
        }
        if keys.is_empty() {
            return;
        }
        let step = (end - start) / keys.len();
        for (offset, key) in keys.iter().enumerate() {
            let label = start + offset * step;
            self.label_to_key[label] = *key;
            if let Some(slot) = self.positions.get_mut(key) {
                slot.label = label;
            }
        }
    }

    /// Doubles the label space and redistributes every event at equal
    /// spacing, re-pinning the sentinel to the new `M - 1`.
    fn grow(&mut self) {
        let capacity = self.label_capacity() * 2;
        let keys: Vec<i64> = self
            .label_to_key
            .iter()
            .copied()
            .filter(|key| *key != NONE_KEY)
            .collect();
        self.label_to_key = vec![NONE_KEY; capacity];
        let step = capacity / keys.len();
        for (offset, key) in keys.iter().enumerate() {
            let label = offset * step;
            self.label_to_key[label] = *key;
            if let Some(slot) = self.positions.get_mut(key) {
                slot.label = label;
            }
        }
        if let Some(slot) = self.positions.get_mut(&NONE_KEY) {
            slot.label = capacity - 1;
        }
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl Default for VersionTree {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Two trees are equal when their event-key sequences (in list order),
/// label tables, and key-to-label mappings all agree.
impl PartialEq for VersionTree {
    fn eq(&self, other: &Self) -> bool {
        self.label_to_key == other.label_to_key
            && self.events.len() == other.events.len()
            && self.event_keys().eq(other.event_keys())
            && self.positions.len() == other.positions.len()
            && self.positions.iter().all(|(key, slot)| {
                other
                    .positions
                    .get(key)
                    .is_some_and(|counterpart| counterpart.label == slot.label)
            })
    }
}

impl Eq for VersionTree {}

impl fmt::Debug for VersionTree {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("VersionTree")
            .field("events", &self.event_keys().collect::<Vec<_>>())
            .field("capacity", &self.label_capacity())
            .finish()
    }
}
