//! Unit tests for the order-maintenance VersionTree.
//!
//! These tests pin the preorder bracket semantics, failure behavior, and
//! the observable effects of relabeling.

use rstest::rstest;
use verseq::order::VersionTree;
use verseq::OutOfRangeError;

fn assert_strictly_increasing(tree: &VersionTree) {
    let labels: Vec<usize> = tree.event_labels().collect();
    for window in labels.windows(2) {
        assert!(
            window[0] < window[1],
            "labels not strictly increasing: {labels:?}"
        );
    }
}

// =============================================================================
// Initial state
// =============================================================================

#[rstest]
fn test_fresh_tree_holds_only_the_root() {
    let tree = VersionTree::new();
    assert!(tree.is_empty());
    assert_eq!(tree.version_count(), 1);
    assert!(tree.contains(0));
    assert_eq!(tree.before(0, 0), Ok(true));
}

#[rstest]
fn test_default_equals_new() {
    assert_eq!(VersionTree::default(), VersionTree::new());
}

// =============================================================================
// Scenario: preorder brackets
// =============================================================================

#[rstest]
fn test_preorder_bracket_queries() {
    let mut tree = VersionTree::new();
    tree.insert(1, 0).unwrap();
    tree.insert(2, 1).unwrap();
    tree.insert(3, 0).unwrap();

    assert_eq!(tree.before(0, 2), Ok(true));
    assert_eq!(tree.before(1, 2), Ok(true));
    assert_eq!(tree.before(1, 3), Ok(false));
    assert_eq!(tree.before(3, 1), Ok(false));
    assert_eq!(tree.before(2, 1), Ok(false));
    assert_strictly_increasing(&tree);
}

#[rstest]
fn test_before_is_reflexive_for_every_version() {
    let mut tree = VersionTree::new();
    tree.insert(4, 0).unwrap();
    tree.insert(-7, 4).unwrap();
    tree.insert(12, -7).unwrap();

    for version in [0, 4, -7, 12] {
        assert_eq!(tree.before(version, version), Ok(true));
    }
}

#[rstest]
fn test_root_precedes_every_version() {
    let mut tree = VersionTree::new();
    let mut parent = 0;
    for version in 1..=20 {
        tree.insert(version, parent).unwrap();
        parent = version;
        assert_eq!(tree.before(0, version), Ok(true));
        assert_eq!(tree.before(version, 0), Ok(false));
    }
}

#[rstest]
fn test_siblings_are_unordered() {
    let mut tree = VersionTree::new();
    tree.insert(1, 0).unwrap();
    tree.insert(2, 0).unwrap();
    tree.insert(3, 0).unwrap();

    for (left, right) in [(1, 2), (2, 1), (1, 3), (3, 1), (2, 3), (3, 2)] {
        assert_eq!(tree.before(left, right), Ok(false));
    }
}

// =============================================================================
// Failure semantics
// =============================================================================

#[rstest]
fn test_insert_with_unknown_parent_changes_nothing() {
    let mut tree = VersionTree::new();
    assert_eq!(
        tree.insert(1, 99),
        Err(OutOfRangeError::UnknownTreeVersion(99))
    );
    assert!(tree.is_empty());
    assert_eq!(tree, VersionTree::new());
}

#[rstest]
fn test_duplicate_insert_is_rejected() {
    let mut tree = VersionTree::new();
    tree.insert(1, 0).unwrap();
    let snapshot = tree.clone();

    assert_eq!(
        tree.insert(1, 0),
        Err(OutOfRangeError::DuplicateTreeVersion(1))
    );
    // the negated key collides with version 1's close event
    assert_eq!(
        tree.insert(-1, 0),
        Err(OutOfRangeError::DuplicateTreeVersion(-1))
    );
    assert_eq!(tree, snapshot);
}

#[rstest]
fn test_before_with_unknown_version_is_rejected() {
    let mut tree = VersionTree::new();
    tree.insert(1, 0).unwrap();

    assert_eq!(
        tree.before(1, 2),
        Err(OutOfRangeError::UnknownTreeVersion(2))
    );
    assert_eq!(
        tree.before(2, 1),
        Err(OutOfRangeError::UnknownTreeVersion(2))
    );
    // a close key is not a registered version
    assert_eq!(
        tree.before(-1, 1),
        Err(OutOfRangeError::UnknownTreeVersion(-1))
    );
}

// =============================================================================
// Relabeling pressure
// =============================================================================

#[rstest]
fn test_deep_chain_keeps_answers_after_growth() {
    let mut tree = VersionTree::new();
    let initial_capacity = tree.label_capacity();
    let mut parent = 0;
    for version in 1..=256 {
        tree.insert(version, parent).unwrap();
        parent = version;
    }

    assert!(tree.label_capacity() > initial_capacity);
    assert_strictly_increasing(&tree);

    // ancestry along the chain survives every relabel
    assert_eq!(tree.before(1, 256), Ok(true));
    assert_eq!(tree.before(128, 200), Ok(true));
    assert_eq!(tree.before(200, 128), Ok(false));
}

#[rstest]
fn test_wide_fanout_keeps_answers_after_growth() {
    let mut tree = VersionTree::new();
    for version in 1..=256 {
        tree.insert(version, 0).unwrap();
    }

    assert_strictly_increasing(&tree);
    for version in [1, 100, 256] {
        assert_eq!(tree.before(0, version), Ok(true));
        assert_eq!(tree.before(version, 0), Ok(false));
    }
    assert_eq!(tree.before(7, 8), Ok(false));
}

// =============================================================================
// Clear and equality
// =============================================================================

#[rstest]
fn test_clear_resets_capacity_and_contents() {
    let mut tree = VersionTree::new();
    let mut parent = 0;
    for version in 1..=64 {
        tree.insert(version, parent).unwrap();
        parent = version;
    }
    assert!(tree.label_capacity() > 2);

    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.label_capacity(), 2);
    assert_eq!(tree, VersionTree::new());
    assert!(!tree.contains(1));

    // usable again after clear
    tree.insert(1, 0).unwrap();
    assert_eq!(tree.before(0, 1), Ok(true));
}

#[rstest]
fn test_clone_preserves_all_answers() {
    let mut tree = VersionTree::new();
    tree.insert(1, 0).unwrap();
    tree.insert(2, 1).unwrap();
    tree.insert(3, 0).unwrap();

    let copy = tree.clone();
    assert_eq!(copy, tree);
    assert_eq!(copy.before(1, 2), Ok(true));
    assert_eq!(copy.before(3, 2), Ok(false));
}
