// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_element --heading-base-level=0

//! Understory Element: a renderer-agnostic element tree.
//!
//! Understory Element is the output format of generated inspector UIs and a reusable building block
//! for any toolkit that wants to describe widgets as data before materializing them.
//!
//! - Represents a forest of abstract UI nodes: fields, sliders, dropdowns, lists, labels, buttons,
//!   and layout groups (rows, columns, folds, windows, tabs).
//! - Each node carries interaction flags, Kurbo-native style hints, and an optional link payload
//!   pointing at the value it displays.
//! - Records structural edits and hands them out in batches via [`ElementTree::commit`], so a
//!   renderer can detach and reattach its materialized widgets when a subtree is replaced.
//!
//! ## Where this fits
//!
//! - Value binding and UI synthesis: produces element subtrees (`understory_inspector`).
//! - Element tree: structure and change notifications (this crate).
//! - Renderer: turns elements into on-screen widgets (your toolkit).
//!
//! ## Not a layout engine
//!
//! [`Style`] carries hints only. Measuring, arranging, and painting are left to the renderer.
//!
//! ## API overview
//!
//! - [`ElementTree`]: arena managing elements and their parent/child links.
//! - [`Element`]: per-node data (kind, label, flags, style, selection, link).
//! - [`ElementFlags`]: enable/interact controls and presentation hints.
//! - [`ElementId`]: generational handle of an element.
//! - [`Changes`]: batched structural changes since the previous commit.
//!
//! ## Minimal usage
//!
//! ```
//! use understory_element::{
//!     Change, Element, ElementKind, ElementTree, FieldKind, GroupKind,
//! };
//!
//! let mut tree: ElementTree<()> = ElementTree::new();
//! let window = tree.insert(
//!     None,
//!     Element::new(ElementKind::Group(GroupKind::Window)).with_label("Inspector"),
//! );
//! let speed = tree.insert(
//!     Some(window),
//!     Element::new(ElementKind::Field(FieldKind::Float)).with_label("speed"),
//! );
//!
//! let changes = tree.commit();
//! assert!(changes.changes.contains(&Change::Attached { parent: window, child: speed, index: 0 }));
//!
//! // Replace the field; the renderer learns about it on the next commit.
//! tree.remove(speed);
//! let changes = tree.commit();
//! assert_eq!(changes.removed().collect::<Vec<_>>(), vec![speed]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod changes;
mod tree;
mod types;

pub use changes::{Change, Changes};
pub use tree::ElementTree;
pub use types::{
    Color, Element, ElementFlags, ElementId, ElementKind, FieldKind, GroupKind, SliderKind, Style,
};
