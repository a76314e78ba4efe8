// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Synthesis itself never fails: null values, reference cycles, and values without a
//! synthesis path become placeholder elements. These errors are returned by direct value
//! access and by UI-driven operations on an already built tree.

use understory_element::ElementId;

/// Failure reading or writing a value through an [`Accessor`](crate::Accessor).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The accessor has no write path.
    #[error("value is read-only")]
    ReadOnly,
    /// The value (or a value on the path to it) is currently `None`.
    #[error("value is null")]
    Null,
    /// A collection slot no longer exists.
    #[error("index {index} is out of range for length {len}")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Current collection length.
        len: usize,
    },
    /// A shared value is mutably borrowed elsewhere.
    #[error("value is already borrowed")]
    Borrow,
    /// The value type cannot produce new instances.
    #[error("`{0}` cannot create new values")]
    NotCreatable(&'static str),
}

/// Failure of a UI-driven operation on an [`Inspector`](crate::Inspector).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InspectError {
    /// The element id is stale.
    #[error("element {0:?} is not alive")]
    StaleElement(ElementId),
    /// The element is not a bound collection.
    #[error("element {0:?} is not a bound list")]
    NotAList(ElementId),
    /// The element is not a button.
    #[error("element {0:?} is not a button")]
    NotAButton(ElementId),
    /// The element is not a tab strip.
    #[error("element {0:?} is not a tab strip")]
    NotTabs(ElementId),
    /// The list was built with `fixed_size` or its storage cannot grow or shrink.
    #[error("list {0:?} has a fixed size")]
    FixedSize(ElementId),
    /// The list was not built with `reorderable`.
    #[error("list {0:?} is not reorderable")]
    NotReorderable(ElementId),
    /// The underlying value access failed.
    #[error(transparent)]
    Access(#[from] AccessError),
}
