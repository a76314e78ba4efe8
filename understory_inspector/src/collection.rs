// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collection binding: one element per item, kept in step with the data.
//!
//! Each item element reads its value through an accessor whose position lives in a shared index
//! cell. Reordering moves the data, the element, and the slot together and then renumbers the
//! cells, so an item element keeps its whole subtree state (open folds, rebuilt dynamic parts)
//! wherever it goes.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};
use understory_element::{Element, ElementFlags, ElementId, ElementKind};

use crate::config::Options;
use crate::error::{AccessError, InspectError};
use crate::inspect::ObjectId;
use crate::inspector::Rebuilt;
use crate::kind::ListBinding;
use crate::synth::{Context, Synth, Tables, Tree};

pub(crate) struct Slot {
    index: Rc<Cell<usize>>,
    element: ElementId,
}

pub(crate) struct ListState {
    list: ListBinding,
    slots: Vec<Slot>,
    identity: Option<ObjectId>,
    ctx: Context,
    item_options: Options,
    resizable: bool,
    reorderable: bool,
}

impl ListState {
    fn check(&self, index: usize) -> Result<(), AccessError> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(AccessError::OutOfRange {
                index,
                len: self.slots.len(),
            })
        }
    }

    /// Point every slot from `start` on at its position and relabel its element.
    fn renumber(&self, tree: &mut Tree, start: usize) {
        for (i, slot) in self.slots.iter().enumerate().skip(start) {
            slot.index.set(i);
            relabel(tree, slot.element, &self.ctx.config.item_label(i));
        }
    }
}

/// Set the label of an item element, following dynamic wrappers down to the shown element.
fn relabel(tree: &mut Tree, mut id: ElementId, label: &str) {
    loop {
        let Some(element) = tree.get(id) else {
            return;
        };
        let dynamic = element.kind == ElementKind::Dynamic;
        tree.set_label(id, Some(label.to_owned()));
        if !dynamic {
            return;
        }
        match tree.children(id).first() {
            Some(&child) => id = child,
            None => return,
        }
    }
}

impl Synth<'_> {
    pub(crate) fn list_elements(
        &mut self,
        label: &str,
        list: ListBinding,
        options: &Options,
    ) -> ElementId {
        let len = list.len().unwrap_or(0);
        let item_options = options.nested();
        let slots: Vec<Slot> = (0..len)
            .map(|i| self.list_item(&list, i, &item_options))
            .collect();
        let resizable = !options.fixed_size && list.is_resizable();

        let mut flags = ElementFlags::empty();
        flags.set(ElementFlags::REORDERABLE, options.reorderable);
        flags.set(ElementFlags::FIXED_SIZE, !resizable);
        flags.set(ElementFlags::SHOW_HEADER, options.show_header);
        let element = Element::new(ElementKind::List)
            .with_optional_label(label)
            .with_flags(flags);
        let id = self.group(element, slots.iter().map(|s| s.element));
        trace!(?id, len, item = list.item_type().name(), "list built");
        self.tables.lists.insert(
            id,
            ListState {
                identity: list.identity(),
                list,
                slots,
                ctx: self.ctx.clone(),
                item_options,
                resizable,
                reorderable: options.reorderable,
            },
        );
        id
    }

    fn list_item(&mut self, list: &ListBinding, index: usize, options: &Options) -> Slot {
        let cell = Rc::new(Cell::new(index));
        let accessor = list.item(cell.clone());
        let label = self.ctx.config.item_label(index);
        let element = self.field(&label, &accessor, options);
        Slot {
            index: cell,
            element,
        }
    }
}

/// Bring the items of list `id` in line with the data if its length or identity changed.
///
/// Elements of indices that are still valid are kept.
pub(crate) fn poll_list(tree: &mut Tree, tables: &mut Tables, id: ElementId) -> Option<Rebuilt> {
    let mut state = tables.lists.remove(&id)?;
    let len = state.list.len().unwrap_or(0);
    let identity = state.list.identity();
    let mut result = None;
    if len != state.slots.len() || identity != state.identity {
        let mut removed = Vec::new();
        while state.slots.len() > len {
            if let Some(slot) = state.slots.pop() {
                removed.extend(tree.remove(slot.element));
            }
        }
        tables.purge(&removed);

        let mut added = Vec::new();
        let mut synth = Synth::resume(tree, tables, state.ctx.clone());
        for i in state.slots.len()..len {
            let slot = synth.list_item(&state.list, i, &state.item_options);
            synth.tree.attach(id, slot.element);
            added.push(slot.element);
            state.slots.push(slot);
        }
        if !removed.is_empty() || !added.is_empty() {
            debug!(?id, removed = removed.len(), added = added.len(), "list reconciled");
            result = Some(Rebuilt {
                element: id,
                removed,
                added,
            });
        }
        state.identity = identity;
    }
    tables.lists.insert(id, state);
    result
}

/// Move item `from` of list `id` to `to`, data and element alike.
pub(crate) fn move_item(
    tree: &mut Tree,
    tables: &mut Tables,
    id: ElementId,
    from: usize,
    to: usize,
) -> Result<(), InspectError> {
    let state = tables.lists.get_mut(&id).ok_or(InspectError::NotAList(id))?;
    if !state.reorderable {
        return Err(InspectError::NotReorderable(id));
    }
    state.check(from)?;
    state.check(to)?;
    state.list.move_item(from, to)?;
    let slot = state.slots.remove(from);
    state.slots.insert(to, slot);
    tree.move_child(id, from, to);
    state.renumber(tree, from.min(to));
    state.identity = state.list.identity();
    debug!(?id, from, to, "list item moved");
    Ok(())
}

/// Remove item `index` of list `id`. Returns the destroyed element ids.
pub(crate) fn remove_item(
    tree: &mut Tree,
    tables: &mut Tables,
    id: ElementId,
    index: usize,
) -> Result<Vec<ElementId>, InspectError> {
    let state = tables.lists.get_mut(&id).ok_or(InspectError::NotAList(id))?;
    if !state.resizable {
        return Err(InspectError::FixedSize(id));
    }
    state.check(index)?;
    state.list.remove(index)?;
    let slot = state.slots.remove(index);
    let removed = tree.remove(slot.element);
    state.renumber(tree, index);
    state.identity = state.list.identity();
    tables.purge(&removed);
    debug!(?id, index, "list item removed");
    Ok(removed)
}

/// Append a fresh item to list `id`. Returns the new item element.
pub(crate) fn add_item(
    tree: &mut Tree,
    tables: &mut Tables,
    id: ElementId,
) -> Result<ElementId, InspectError> {
    let mut state = tables.lists.remove(&id).ok_or(InspectError::NotAList(id))?;
    let result = append(tree, tables, id, &mut state);
    tables.lists.insert(id, state);
    result
}

fn append(
    tree: &mut Tree,
    tables: &mut Tables,
    id: ElementId,
    state: &mut ListState,
) -> Result<ElementId, InspectError> {
    if !state.resizable {
        return Err(InspectError::FixedSize(id));
    }
    let index = state.slots.len();
    state.list.insert_new(index)?;
    let mut synth = Synth::resume(tree, tables, state.ctx.clone());
    let slot = synth.list_item(&state.list, index, &state.item_options);
    let element = slot.element;
    tree.attach(id, element);
    state.slots.push(slot);
    state.identity = state.list.identity();
    debug!(?id, index, "list item added");
    Ok(element)
}
