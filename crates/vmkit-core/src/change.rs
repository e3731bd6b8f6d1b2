#![forbid(unsafe_code)]

//! Change notifications emitted by observable collections.
//!
//! A [`CollectionChange`] describes one discrete mutation of a list. The
//! vocabulary is the full set an observable list can produce; consumers that
//! only understand a subset (the binder forwards adds, removes and resets)
//! reject the rest with [`BindError::UnsupportedChange`](crate::BindError).
//!
//! # Invariants
//!
//! 1. Item payloads are in list order.
//! 2. `Reset` carries no payload: observers must re-read the source.

use std::fmt;

/// The kind of a [`CollectionChange`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    Add,
    Remove,
    Replace,
    Move,
    Reset,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::Move => "move",
            Self::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// A single change notification from an observable collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChange<T> {
    /// `items` were inserted starting at `index`.
    Added { items: Vec<T>, index: usize },
    /// `items` were removed; they used to start at `index`.
    Removed { items: Vec<T>, index: usize },
    /// `old_items` at `index` were overwritten by `new_items`.
    Replaced {
        old_items: Vec<T>,
        new_items: Vec<T>,
        index: usize,
    },
    /// `items` moved from `old_index` to `new_index`.
    Moved {
        items: Vec<T>,
        old_index: usize,
        new_index: usize,
    },
    /// The collection changed wholesale (typically cleared).
    Reset,
}

impl<T> CollectionChange<T> {
    /// Notification for items appended or inserted at `index`.
    #[must_use]
    pub fn added(items: Vec<T>, index: usize) -> Self {
        Self::Added { items, index }
    }

    /// Notification for items removed from `index`.
    #[must_use]
    pub fn removed(items: Vec<T>, index: usize) -> Self {
        Self::Removed { items, index }
    }

    /// The payload-free kind of this change.
    #[must_use]
    pub fn action(&self) -> ChangeAction {
        match self {
            Self::Added { .. } => ChangeAction::Add,
            Self::Removed { .. } => ChangeAction::Remove,
            Self::Replaced { .. } => ChangeAction::Replace,
            Self::Moved { .. } => ChangeAction::Move,
            Self::Reset => ChangeAction::Reset,
        }
    }

    /// Items that entered the collection (empty for removes and resets).
    #[must_use]
    pub fn new_items(&self) -> &[T] {
        match self {
            Self::Added { items, .. } | Self::Moved { items, .. } => items,
            Self::Replaced { new_items, .. } => new_items,
            Self::Removed { .. } | Self::Reset => &[],
        }
    }

    /// Items that left the collection (empty for adds and resets).
    #[must_use]
    pub fn old_items(&self) -> &[T] {
        match self {
            Self::Removed { items, .. } | Self::Moved { items, .. } => items,
            Self::Replaced { old_items, .. } => old_items,
            Self::Added { .. } | Self::Reset => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_matches_variant() {
        assert_eq!(CollectionChange::added(vec![1], 0).action(), ChangeAction::Add);
        assert_eq!(
            CollectionChange::removed(vec![1], 0).action(),
            ChangeAction::Remove
        );
        assert_eq!(CollectionChange::<i32>::Reset.action(), ChangeAction::Reset);
        let replaced = CollectionChange::Replaced {
            old_items: vec![1],
            new_items: vec![2],
            index: 0,
        };
        assert_eq!(replaced.action(), ChangeAction::Replace);
    }

    #[test]
    fn payload_accessors() {
        let added = CollectionChange::added(vec!['a', 'b'], 3);
        assert_eq!(added.new_items(), &['a', 'b']);
        assert!(added.old_items().is_empty());

        let removed = CollectionChange::removed(vec!['c'], 0);
        assert!(removed.new_items().is_empty());
        assert_eq!(removed.old_items(), &['c']);

        let replaced = CollectionChange::Replaced {
            old_items: vec!['x'],
            new_items: vec!['y'],
            index: 1,
        };
        assert_eq!(replaced.old_items(), &['x']);
        assert_eq!(replaced.new_items(), &['y']);

        let reset = CollectionChange::<char>::Reset;
        assert!(reset.new_items().is_empty());
        assert!(reset.old_items().is_empty());
    }

    #[test]
    fn moved_reports_items_on_both_sides() {
        let moved = CollectionChange::Moved {
            items: vec![7],
            old_index: 0,
            new_index: 2,
        };
        assert_eq!(moved.action(), ChangeAction::Move);
        assert_eq!(moved.new_items(), &[7]);
        assert_eq!(moved.old_items(), &[7]);
    }

    #[test]
    fn action_display() {
        assert_eq!(ChangeAction::Add.to_string(), "add");
        assert_eq!(ChangeAction::Reset.to_string(), "reset");
    }
}
