//! Property and pressure tests for the order-maintenance VersionTree.
//!
//! The tree's `before` answers are checked against a naive reference that
//! stores the preorder bracket sequence in a plain vector, where
//! precedence is decided by comparing positions directly. The pressure
//! tests push enough insertions through the index to force label-space
//! growth and verify that every previously registered version still
//! answers consistently.

use std::collections::HashMap;

use proptest::prelude::*;
use verseq::order::VersionTree;

// =============================================================================
// Naive preorder reference
// =============================================================================

/// Bracket sequence reference: each version contributes an open and a
/// close entry, kept in preorder by vector position. Insertion is O(n),
/// queries are O(n); correctness is obvious.
struct NaiveTree {
    entries: Vec<(i64, bool)>,
}

impl NaiveTree {
    fn new() -> Self {
        Self {
            entries: vec![(0, true), (0, false)],
        }
    }

    fn insert(&mut self, version: i64, parent: i64) {
        let position = self
            .entries
            .iter()
            .position(|entry| *entry == (parent, true))
            .expect("parent is registered");
        self.entries.insert(position + 1, (version, true));
        self.entries.insert(position + 2, (version, false));
    }

    /// Position lookup table for bulk queries: `before(a, b)` holds iff
    /// `a`'s open entry is at or before `b`'s and `b`'s close entry is at
    /// or before `a`'s.
    fn positions(&self) -> HashMap<(i64, bool), usize> {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (*entry, position))
            .collect()
    }
}

fn assert_strictly_increasing(tree: &VersionTree) {
    let labels: Vec<usize> = tree.event_labels().collect();
    for window in labels.windows(2) {
        assert!(
            window[0] < window[1],
            "labels not strictly increasing near {} -> {}",
            window[0],
            window[1]
        );
    }
}

// =============================================================================
// Property tests against the reference
// =============================================================================

proptest! {
    /// For arbitrary insertion sequences, every pair of registered
    /// versions answers `before` exactly like the naive preorder walk,
    /// and the labels along the event list stay strictly increasing.
    #[test]
    fn prop_before_matches_the_naive_reference(parent_picks in prop::collection::vec(any::<usize>(), 1..48)) {
        let mut tree = VersionTree::new();
        let mut naive = NaiveTree::new();
        let mut versions: Vec<i64> = vec![0];

        for (offset, pick) in parent_picks.iter().enumerate() {
            let version = i64::try_from(offset).unwrap() + 1;
            let parent = versions[pick % versions.len()];
            tree.insert(version, parent).unwrap();
            naive.insert(version, parent);
            versions.push(version);
        }

        assert_strictly_increasing(&tree);
        let positions = naive.positions();
        for &first in &versions {
            for &second in &versions {
                let expected = positions[&(first, true)] <= positions[&(second, true)]
                    && positions[&(second, false)] <= positions[&(first, false)];
                prop_assert_eq!(
                    tree.before(first, second).unwrap(),
                    expected,
                    "before({}, {}) diverged", first, second
                );
            }
        }
    }

    /// Ancestry invariant: right after `insert(child, parent)`,
    /// the parent precedes the child and not vice versa.
    #[test]
    fn prop_insert_orders_parent_before_child(parent_picks in prop::collection::vec(any::<usize>(), 1..64)) {
        let mut tree = VersionTree::new();
        let mut versions: Vec<i64> = vec![0];

        for (offset, pick) in parent_picks.iter().enumerate() {
            let version = i64::try_from(offset).unwrap() + 1;
            let parent = versions[pick % versions.len()];
            tree.insert(version, parent).unwrap();
            versions.push(version);

            prop_assert!(tree.before(parent, version).unwrap());
            prop_assert!(!tree.before(version, parent).unwrap());
            prop_assert!(tree.before(0, version).unwrap());
        }
    }

    /// Labels stay pairwise distinct through arbitrary relabeling.
    #[test]
    fn prop_labels_stay_distinct(parent_picks in prop::collection::vec(any::<usize>(), 1..64)) {
        let mut tree = VersionTree::new();
        let mut versions: Vec<i64> = vec![0];

        for (offset, pick) in parent_picks.iter().enumerate() {
            let version = i64::try_from(offset).unwrap() + 1;
            let parent = versions[pick % versions.len()];
            tree.insert(version, parent).unwrap();
            versions.push(version);
        }

        let mut labels: Vec<usize> = tree.event_labels().collect();
        let total = labels.len();
        labels.sort_unstable();
        labels.dedup();
        prop_assert_eq!(labels.len(), total);
    }
}

// =============================================================================
// Pressure tests
// =============================================================================

/// Scenario: 10 000 chain insertions, each a child of the previous one.
/// The label space must have grown, labels must stay strictly
/// increasing, and the root must keep preceding the newest version.
#[test]
fn chain_of_ten_thousand_versions_forces_growth() {
    let mut tree = VersionTree::new();
    let initial_capacity = tree.label_capacity();
    let mut parent = 0;

    for version in 1..=10_000_i64 {
        tree.insert(version, parent).unwrap();
        parent = version;

        assert!(tree.before(0, version).unwrap());
        assert!(!tree.before(version, 0).unwrap());
        if version % 512 == 0 {
            assert_strictly_increasing(&tree);
        }
    }

    assert!(tree.label_capacity() > initial_capacity);
    assert!(tree.label_capacity().is_power_of_two());
    assert_strictly_increasing(&tree);
    assert_eq!(tree.version_count(), 10_001);

    // spot checks along the chain
    assert!(tree.before(1, 10_000).unwrap());
    assert!(tree.before(5_000, 9_999).unwrap());
    assert!(!tree.before(9_999, 5_000).unwrap());
}

/// 10 000 insertions at pseudo-random parents, verified against the
/// naive reference on a sample of version pairs after at least one
/// label-space grow.
#[test]
fn random_parents_match_the_reference_after_growth() {
    let mut tree = VersionTree::new();
    let mut naive = NaiveTree::new();
    let mut versions: Vec<i64> = vec![0];

    // small multiplicative congruential generator; the pattern only needs
    // to be arbitrary, not statistically strong
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = move || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        (state >> 33) as usize
    };

    for version in 1..=10_000_i64 {
        let parent = versions[next() % versions.len()];
        tree.insert(version, parent).unwrap();
        naive.insert(version, parent);
        versions.push(version);
    }

    assert!(tree.label_capacity() > 2);
    assert_strictly_increasing(&tree);

    let positions = naive.positions();
    let naive_before = |first: i64, second: i64| {
        positions[&(first, true)] <= positions[&(second, true)]
            && positions[&(second, false)] <= positions[&(first, false)]
    };

    // every 37th version against every 53rd: a few tens of thousands of
    // pairs spread over the whole tree
    for first in versions.iter().step_by(37) {
        for second in versions.iter().step_by(53) {
            assert_eq!(
                tree.before(*first, *second).unwrap(),
                naive_before(*first, *second),
                "before({first}, {second}) diverged from the reference"
            );
        }
    }
}
