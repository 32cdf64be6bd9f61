use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use super::Identified;

/// How a feed orders its items.
pub enum MergeOrder<T> {
    /// Insertion order: each page is appended after what is already there.
    Append,
    /// A canonical order defined outside the feed; the merged set is
    /// re-sorted (stable) after every page.
    Sorted(fn(&T, &T) -> Ordering),
}

impl<T> Clone for MergeOrder<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MergeOrder<T> {}

impl<T> fmt::Debug for MergeOrder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "Append"),
            Self::Sorted(_) => write!(f, "Sorted"),
        }
    }
}

/// Merge `incoming` into `items`, dropping ids that are already present
/// (including repeats within `incoming`). Returns the number of items added.
pub fn merge_page<T: Identified>(items: &mut Vec<T>, incoming: Vec<T>, order: &MergeOrder<T>) -> usize {
    let mut seen: HashSet<T::Id> = items.iter().map(|item| item.id().clone()).collect();
    let fresh: Vec<T> = incoming
        .into_iter()
        .filter(|item| seen.insert(item.id().clone()))
        .collect();
    let added = fresh.len();
    if added == 0 {
        return 0;
    }

    let mut merged = std::mem::take(items);
    merged.reserve(added);
    merged.extend(fresh);
    if let MergeOrder::Sorted(cmp) = order {
        merged.sort_by(cmp);
    }
    *items = merged;
    added
}

/// How a placeholder was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The placeholder slot now holds the authoritative item.
    Replaced,
    /// The authoritative item was already present; the placeholder was dropped
    /// and the existing entry refreshed.
    Deduplicated,
    /// No placeholder, but an entry with the authoritative id was refreshed.
    Updated,
    /// Neither was present; the authoritative item was inserted.
    Inserted,
}

/// Replace an optimistic placeholder with its server-confirmed version.
pub fn reconcile<T: Identified>(
    items: &mut Vec<T>,
    placeholder: &T::Id,
    authoritative: T,
    order: &MergeOrder<T>,
) -> Reconciled {
    let placeholder_pos = items.iter().position(|item| item.id() == placeholder);
    let existing_pos = items.iter().position(|item| item.id() == authoritative.id());

    let result = match (placeholder_pos, existing_pos) {
        (Some(p), Some(e)) if p == e => {
            items[p] = authoritative;
            Reconciled::Replaced
        }
        (Some(p), Some(e)) => {
            items[e] = authoritative;
            items.remove(p);
            Reconciled::Deduplicated
        }
        (Some(p), None) => {
            items[p] = authoritative;
            Reconciled::Replaced
        }
        (None, Some(e)) => {
            items[e] = authoritative;
            Reconciled::Updated
        }
        (None, None) => {
            items.insert(0, authoritative);
            Reconciled::Inserted
        }
    };

    if let MergeOrder::Sorted(cmp) = order {
        items.sort_by(cmp);
    }
    result
}
