// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_inspector --heading-base-level=0

//! Understory Inspector: type-directed UI synthesis over live values.
//!
//! Point the inspector at a value through an [`Accessor`] and it builds an element tree
//! ([`understory_element`]) that edits that value: fields for primitives, dropdowns for enums,
//! folds for records, lists for collections. The tree stays live: [`Inspector::poll`] rebuilds
//! the parts whose shape depends on data (absent values, collection lengths) and leaves the rest
//! alone, so per-element UI state such as open folds survives.
//!
//! ## Concepts
//!
//! - [`Accessor`]: a typed read/write handle decoupled from storage. Derive member, item, cast,
//!   and unwrapped views of it.
//! - [`Inspect`]: implemented by every type the inspector can show; yields a [`ValueKind`].
//! - [`Registry`]: per-type creation functions, member allow-lists, and labels, with scoped
//!   overrides that apply to one subtree.
//! - [`CycleGuard`]: the values on the current synthesis path. A reference that is already on the
//!   path becomes a placeholder instead of an infinite tree.
//! - Dynamic elements ([`Synth::dynamic`], [`Synth::null_guard`]): subtrees rebuilt when a status
//!   changes.
//! - Collection binding: one element per item, reconciled with the data and reorderable with
//!   [`Inspector::move_item`].
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use understory_element::{ElementKind, GroupKind};
//! use understory_inspector::{Accessor, Composite, Inspect, Inspector, Options, ValueKind, ui};
//!
//! #[derive(Default)]
//! struct Node {
//!     name: String,
//!     weight: f32,
//!     next: Option<Rc<RefCell<Node>>>,
//! }
//!
//! impl Inspect for Node {
//!     fn kind(acc: &Accessor<Self>) -> ValueKind {
//!         Composite::of(acc)
//!             .member("name", |n| &n.name, |n| &mut n.name)
//!             .member("weight", |n| &n.weight, |n| &mut n.weight)
//!             .member("next", |n| &n.next, |n| &mut n.next)
//!             .build()
//!     }
//! }
//!
//! // A node pointing at itself.
//! let node = Rc::new(RefCell::new(Node { name: "root".into(), ..Node::default() }));
//! node.borrow_mut().next = Some(node.clone());
//!
//! let mut inspector = Inspector::new();
//! let window = inspector.mount(
//!     None,
//!     &ui::window(
//!         "Inspector",
//!         [ui::field("node", Accessor::constant(node.clone()), Options::default())],
//!     ),
//! );
//!
//! // The window holds a fold with one element per member; the self reference is cut short.
//! let tree = inspector.tree();
//! let fold = tree.children(window)[0];
//! assert_eq!(tree.get(fold).unwrap().kind, ElementKind::Group(GroupKind::Fold));
//! assert_eq!(tree.children(fold).len(), 3);
//!
//! // Clearing the reference swaps its subtree for a placeholder on the next poll.
//! node.borrow_mut().next = None;
//! assert_eq!(inspector.poll().len(), 1);
//! ```
//!
//! ## Redrawing
//!
//! The inspector never draws. After [`Inspector::poll`], call [`Inspector::commit`] and replay
//! the returned [`Changes`](understory_element::Changes) into your widget tree. Leaves carry a
//! [`Binding`] with the accessor to read and write.
//!
//! This crate uses `std`: accessors are built on `Rc` and `RefCell`.

mod accessor;
mod collection;
mod config;
mod cycle;
mod dynamic;
mod error;
mod inspect;
mod inspector;
mod kind;
mod registry;
mod synth;

pub mod ui;

pub use accessor::{Accessor, Numeric, Source};
pub use config::{InspectorConfig, Options};
pub use cycle::{CycleGuard, Snapshot};
pub use error::{AccessError, InspectError};
pub use inspect::{AnyAccessor, Inspect, ObjectId, TypeInfo, static_chain};
pub use inspector::{Inspector, Rebuilt};
pub use kind::{
    BuildFn, Composite, CompositeBuilder, EnumBinding, InspectEnum, ListAccess, ListBinding,
    Member, MemberMeta, NullableBinding, Primitive, SelfDescribing, ValueKind,
};
pub use registry::{CreationFn, Registry, Scope};
pub use synth::{Binding, Synth, Tree};
