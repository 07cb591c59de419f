//! Error types shared by the versioned containers.
//!
//! Every fallible operation in this crate surfaces the same error kind:
//! [`OutOfRangeError`]. It is returned when an operation refers to a
//! version, position, or identifier that the target structure does not
//! hold. No error is recovered internally, and a failed operation never
//! leaves the structure partially modified.

use std::fmt;

/// Error returned when an operation refers to a version, cursor position,
/// or identifier that is out of range for the target structure.
///
/// The variants distinguish what exactly was missing, which keeps the
/// messages actionable, but they are all the same kind of failure: the
/// caller asked for something the structure does not hold.
///
/// # Examples
///
/// ```rust
/// use verseq::OutOfRangeError;
///
/// let error = OutOfRangeError::UnknownVersion(7);
/// assert_eq!(format!("{error}"), "version 7 is not registered");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRangeError {
    /// The version id is not present in the version registry.
    UnknownVersion(usize),
    /// The operation requires a non-empty version.
    EmptyVersion(usize),
    /// The cursor is positioned past the end of the sequence.
    EndCursor,
    /// The cursor does not reference a node reachable in the source version.
    ForeignCursor(usize),
    /// The version identifier is not registered in the version tree.
    UnknownTreeVersion(i64),
    /// The version identifier (or its negation) is already registered in
    /// the version tree.
    DuplicateTreeVersion(i64),
}

impl fmt::Display for OutOfRangeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVersion(version) => {
                write!(formatter, "version {version} is not registered")
            }
            Self::EmptyVersion(version) => {
                write!(formatter, "version {version} is empty")
            }
            Self::EndCursor => {
                write!(formatter, "cursor is out of range")
            }
            Self::ForeignCursor(version) => {
                write!(
                    formatter,
                    "cursor does not reference a node of version {version}"
                )
            }
            Self::UnknownTreeVersion(version) => {
                write!(
                    formatter,
                    "version tree does not contain version {version}"
                )
            }
            Self::DuplicateTreeVersion(version) => {
                write!(
                    formatter,
                    "version tree already contains version {version}"
                )
            }
        }
    }
}

impl std::error::Error for OutOfRangeError {}
