//! List mutations that back a settled drag.
//!
//! These are synchronous and pure; persisting the result is the caller's job.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitError {
    /// The source index no longer points at an item.
    SourceOutOfRange { index: usize, len: usize },
    /// The destination lies past the end of the list.
    TargetOutOfRange { index: usize, len: usize },
    /// A container the drag referred to is gone from the data model.
    MissingContainer(String),
}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceOutOfRange { index, len } => {
                write!(f, "Item {index} not found (list has {len})")
            }
            Self::TargetOutOfRange { index, len } => {
                write!(f, "Cannot move to position {index} (list has {len})")
            }
            Self::MissingContainer(what) => write!(f, "{what} not found."),
        }
    }
}

impl std::error::Error for CommitError {}

/// Move one element within `items`; `to` is the index the element ends up at.
///
/// Returns `false` (and leaves the list alone) when the indices are equal or
/// either of them is out of bounds.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let moved = items.remove(from);
    items.insert(to, moved);
    true
}

/// Move `source[from]` into `target`, clamping `to` to the target's bounds.
///
/// Returns the index the element was inserted at.
pub fn move_between<T>(
    source: &mut Vec<T>,
    from: usize,
    target: &mut Vec<T>,
    to: usize,
) -> Result<usize, CommitError> {
    if from >= source.len() {
        return Err(CommitError::SourceOutOfRange {
            index: from,
            len: source.len(),
        });
    }
    let moved = source.remove(from);
    let at = to.min(target.len());
    target.insert(at, moved);
    Ok(at)
}

/// Two distinct mutable elements of one slice.
pub fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> Option<(&mut T, &mut T)> {
    if a == b || a >= items.len() || b >= items.len() {
        return None;
    }
    if a < b {
        let (head, tail) = items.split_at_mut(b);
        Some((&mut head[a], &mut tail[0]))
    } else {
        let (head, tail) = items.split_at_mut(a);
        Some((&mut tail[0], &mut head[b]))
    }
}
