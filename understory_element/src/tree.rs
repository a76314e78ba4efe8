// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, updates, queries.

use alloc::string::String;
use alloc::vec::Vec;

use crate::changes::{Change, Changes};
use crate::types::{Element, ElementFlags, ElementId};

/// Arena of [`Element`]s linked into a forest.
///
/// Every element has at most one parent, so any subtree is a strict tree.
/// Structural edits are recorded and handed out in batches by [`ElementTree::commit`].
pub struct ElementTree<L> {
    nodes: Vec<Option<Node<L>>>, // slots
    generations: Vec<u32>,       // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    changes: Vec<Change>,
    epoch: u64,
}

impl<L> Default for ElementTree<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> core::fmt::Debug for ElementTree<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("ElementTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("pending_changes", &self.changes.len())
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

struct Node<L> {
    generation: u32,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    element: Element<L>,
}

impl<L> ElementTree<L> {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            changes: Vec::new(),
            epoch: 0,
        }
    }

    /// Insert a new element as the last child of `parent` (or as a root if `None`).
    pub fn insert(&mut self, parent: Option<ElementId>, element: Element<L>) -> ElementId {
        let id = self.alloc(element);
        if let Some(p) = parent {
            self.attach(p, id);
        }
        id
    }

    /// Insert a new element as the child of `parent` at `index` (clamped to the child count).
    pub fn insert_at(&mut self, parent: ElementId, index: usize, element: Element<L>) -> ElementId {
        let id = self.alloc(element);
        self.attach_at(parent, index, id);
        id
    }

    fn alloc(&mut self, element: Element<L>) -> ElementId {
        let node = Node {
            generation: 0,
            parent: None,
            children: Vec::new(),
            element,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node { generation, ..node });
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId stores 32-bit slot indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node { generation, ..node }));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId stores 32-bit slot indices."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = ElementId::new(idx, generation);
        self.changes.push(Change::Inserted(id));
        id
    }

    /// Link a detached `child` as the last child of `parent`.
    ///
    /// Returns `false` (and changes nothing) if either id is stale, `child` already has a
    /// parent, or linking would create a cycle.
    pub fn attach(&mut self, parent: ElementId, child: ElementId) -> bool {
        let index = self.children(parent).len();
        self.attach_at(parent, index, child)
    }

    /// Link a detached `child` under `parent` at `index` (clamped to the child count).
    ///
    /// See [`ElementTree::attach`] for the cases that are rejected.
    pub fn attach_at(&mut self, parent: ElementId, index: usize, child: ElementId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return false;
        }
        if self.node(child).parent.is_some() || self.is_ancestor_or_self(child, parent) {
            return false;
        }
        let p = self.node_mut(parent);
        let index = index.min(p.children.len());
        p.children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
        self.changes.push(Change::Attached {
            parent,
            child,
            index,
        });
        true
    }

    /// Unlink `child` from its parent, returning the former parent.
    pub fn detach(&mut self, child: ElementId) -> Option<ElementId> {
        if !self.is_alive(child) {
            return None;
        }
        let parent = self.node(child).parent?;
        self.node_mut(parent).children.retain(|c| *c != child);
        self.node_mut(child).parent = None;
        self.changes.push(Change::Detached { parent, child });
        Some(parent)
    }

    /// Remove an element and its subtree.
    ///
    /// Returns the destroyed ids in pre-order (the root first). Stale ids yield an empty list.
    pub fn remove(&mut self, id: ElementId) -> Vec<ElementId> {
        if !self.is_alive(id) {
            return Vec::new();
        }
        self.detach(id);
        let removed = self.descendants(id);
        for &r in &removed {
            self.nodes[r.idx()] = None;
            self.free_list.push(r.idx());
            self.changes.push(Change::Removed(r));
        }
        removed
    }

    /// Remove every child subtree of `id`, keeping `id` itself.
    pub fn remove_children(&mut self, id: ElementId) -> Vec<ElementId> {
        let children: Vec<ElementId> = self.children(id).to_vec();
        let mut removed = Vec::new();
        for c in children {
            removed.extend(self.remove(c));
        }
        removed
    }

    /// Move the child of `parent` at position `from` to position `to`.
    ///
    /// Positions in between shift by one. Returns `false` if either position is out of range.
    pub fn move_child(&mut self, parent: ElementId, from: usize, to: usize) -> bool {
        let Some(p) = self.node_opt_mut(parent) else {
            return false;
        };
        let len = p.children.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let child = p.children.remove(from);
            p.children.insert(to, child);
            self.changes.push(Change::Moved { parent, from, to });
        }
        true
    }

    /// Children of `id` in order. Empty for stale ids.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.node_opt(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Position of `child` among its parent's children.
    pub fn index_in_parent(&self, child: ElementId) -> Option<usize> {
        let parent = self.parent(child)?;
        self.children(parent).iter().position(|c| *c == child)
    }

    /// Parent of `id`, if any.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Access an element.
    pub fn get(&self, id: ElementId) -> Option<&Element<L>> {
        self.node_opt(id).map(|n| &n.element)
    }

    /// Access an element mutably. Records an [`Change::Updated`] for it.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element<L>> {
        if !self.is_alive(id) {
            return None;
        }
        self.changes.push(Change::Updated(id));
        self.node_opt_mut(id).map(|n| &mut n.element)
    }

    /// Replace the flags of an element.
    pub fn set_flags(&mut self, id: ElementId, flags: ElementFlags) {
        self.update_if(id, |e| {
            let changed = e.flags != flags;
            e.flags = flags;
            changed
        });
    }

    /// Open or close a fold or window.
    pub fn set_open(&mut self, id: ElementId, open: bool) {
        self.update_if(id, |e| {
            let changed = e.flags.contains(ElementFlags::OPEN) != open;
            e.flags.set(ElementFlags::OPEN, open);
            changed
        });
    }

    /// Replace the label of an element.
    pub fn set_label(&mut self, id: ElementId, label: Option<String>) {
        self.update_if(id, |e| {
            let changed = e.label != label;
            e.label = label;
            changed
        });
    }

    /// Set the selected index of a dropdown or tab strip.
    pub fn set_selected(&mut self, id: ElementId, selected: usize) {
        self.update_if(id, |e| {
            let changed = e.selected != selected;
            e.selected = selected;
            changed
        });
    }

    fn update_if(&mut self, id: ElementId, f: impl FnOnce(&mut Element<L>) -> bool) {
        if let Some(n) = self.node_opt_mut(id)
            && f(&mut n.element)
        {
            self.changes.push(Change::Updated(id));
        }
    }

    /// `id` and all of its descendants in pre-order. Empty for stale ids.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if !self.is_alive(id) {
            return out;
        }
        let mut stack = alloc::vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            for &c in self.node(cur).children.iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Elements without a parent, in slot order.
    pub fn roots(&self) -> Vec<ElementId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "ElementId stores 32-bit slot indices."
                    )]
                    Some(ElementId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns true if the tree holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand out the changes recorded since the previous commit.
    pub fn commit(&mut self) -> Changes {
        self.epoch = self.epoch.wrapping_add(1);
        Changes {
            changes: core::mem::take(&mut self.changes),
        }
    }

    /// Number of commits so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns true if `id` refers to a live element.
    ///
    /// See [`ElementId`] docs for the generational semantics.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.node_opt(id).is_some()
    }

    // --- internals ---

    fn is_ancestor_or_self(&self, ancestor: ElementId, mut id: ElementId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.node(id).parent {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn node(&self, id: ElementId) -> &Node<L> {
        self.node_opt(id).expect("dangling ElementId")
    }

    fn node_mut(&mut self, id: ElementId) -> &mut Node<L> {
        self.node_opt_mut(id).expect("dangling ElementId")
    }

    fn node_opt(&self, id: ElementId) -> Option<&Node<L>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: ElementId) -> Option<&mut Node<L>> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }
}
