// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched structural change notifications.

use alloc::vec::Vec;

use crate::types::ElementId;

/// A single structural change recorded by the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Change {
    /// A new element was created (detached until an `Attached` follows).
    Inserted(ElementId),
    /// An element was destroyed. Its id is stale from now on.
    Removed(ElementId),
    /// `child` was linked under `parent` at `index`.
    Attached {
        /// New parent.
        parent: ElementId,
        /// Linked element.
        child: ElementId,
        /// Position among the parent's children.
        index: usize,
    },
    /// `child` was unlinked from `parent`.
    Detached {
        /// Former parent.
        parent: ElementId,
        /// Unlinked element.
        child: ElementId,
    },
    /// A child of `parent` moved from one position to another.
    Moved {
        /// Parent whose children were reordered.
        parent: ElementId,
        /// Old position.
        from: usize,
        /// New position.
        to: usize,
    },
    /// Label, flags, style, or selection of an element changed.
    Updated(ElementId),
}

/// Changes accumulated since the previous [`ElementTree::commit`](crate::ElementTree::commit).
///
/// Replay in order to keep a materialized widget tree in sync.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Changes {
    /// Changes in the order they happened.
    pub changes: Vec<Change>,
}

impl Changes {
    /// Returns true if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Ids destroyed in this batch.
    pub fn removed(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.changes.iter().filter_map(|c| match c {
            Change::Removed(id) => Some(*id),
            _ => None,
        })
    }

    /// Ids created in this batch.
    pub fn inserted(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.changes.iter().filter_map(|c| match c {
            Change::Inserted(id) => Some(*id),
            _ => None,
        })
    }
}
