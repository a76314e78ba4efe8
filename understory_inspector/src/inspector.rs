// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Inspector`]: owner of the element tree and of everything that keeps it live.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};
use understory_element::{Changes, ElementId, ElementKind, GroupKind};

use crate::collection;
use crate::config::InspectorConfig;
use crate::dynamic;
use crate::error::{AccessError, InspectError};
use crate::registry::Registry;
use crate::synth::{Binding, Synth, Tables, Tree};
use crate::ui::Template;

/// A subtree replacement performed by [`Inspector::poll`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rebuilt {
    /// The dynamic element or list whose children changed.
    pub element: ElementId,
    /// Destroyed ids, each subtree in pre-order.
    pub removed: Vec<ElementId>,
    /// Roots of the new children.
    pub added: Vec<ElementId>,
}

/// Builds element trees from templates and keeps them in sync with the data they show.
///
/// Call [`Inspector::poll`] once per frame (or whenever the data may have changed), then
/// [`Inspector::commit`] to collect the structural changes for the renderer.
pub struct Inspector {
    tree: Tree,
    tables: Tables,
    registry: Registry,
    config: Rc<InspectorConfig>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Inspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspector")
            .field("tree", &self.tree)
            .field("dynamics", &self.tables.dynamics.len())
            .field("lists", &self.tables.lists.len())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Inspector {
    /// Create an inspector with default settings and an empty registry.
    pub fn new() -> Self {
        Self::with_config(InspectorConfig::default())
    }

    /// Create an inspector with `config`.
    pub fn with_config(config: InspectorConfig) -> Self {
        Self {
            tree: Tree::new(),
            tables: Tables::default(),
            registry: Registry::new(),
            config: Rc::new(config),
        }
    }

    /// The root registry. Registrations made here apply to every later build and rebuild.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Settings.
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// The element tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Build `template` and attach it as the last child of `parent`, or as a new root.
    pub fn mount(&mut self, parent: Option<ElementId>, template: &Template) -> ElementId {
        let mut synth = Synth::new(
            &mut self.tree,
            &mut self.tables,
            self.registry.clone(),
            self.config.clone(),
        );
        let id = template.build(&mut synth);
        if let Some(parent) = parent {
            self.tree.attach(parent, id);
        }
        debug!(?id, ?parent, "template mounted");
        id
    }

    /// Destroy the subtree at `id`. Returns the destroyed ids.
    pub fn unmount(&mut self, id: ElementId) -> Vec<ElementId> {
        let removed = self.tree.remove(id);
        self.tables.purge(&removed);
        removed
    }

    /// Rebuild every dynamic element whose status changed and reconcile every list whose data
    /// changed, in tree pre-order.
    ///
    /// Each element is checked at most once per call; elements created during the call are
    /// first checked on the next one. Dropdowns whose bound index changed get their
    /// [`selected`](understory_element::Element::selected) refreshed, which is reported by
    /// [`Inspector::commit`] rather than here.
    pub fn poll(&mut self) -> Vec<Rebuilt> {
        let pending: Vec<ElementId> = self
            .tree
            .roots()
            .into_iter()
            .flat_map(|root| self.tree.descendants(root))
            .filter(|id| {
                self.tables.dynamics.contains_key(id) || self.tables.lists.contains_key(id)
            })
            .collect();
        let mut out = Vec::new();
        for id in pending {
            // An earlier rebuild in this pass may have destroyed it.
            if !self.tree.is_alive(id) {
                continue;
            }
            let rebuilt = if self.tables.dynamics.contains_key(&id) {
                dynamic::poll_dynamic(&mut self.tree, &mut self.tables, id)
            } else {
                collection::poll_list(&mut self.tree, &mut self.tables, id)
            };
            out.extend(rebuilt);
        }
        self.sync_selection();
        out
    }

    fn sync_selection(&mut self) {
        let stale: Vec<(ElementId, usize)> = self
            .tree
            .roots()
            .into_iter()
            .flat_map(|root| self.tree.descendants(root))
            .filter_map(|id| {
                let element = self.tree.get(id)?;
                let Some(Binding::Index(index)) = &element.link else {
                    return None;
                };
                let current = index.get().ok()?;
                (current != element.selected).then_some((id, current))
            })
            .collect();
        for (id, selected) in stale {
            trace!(?id, selected, "dropdown selection refreshed");
            self.tree.set_selected(id, selected);
        }
    }

    /// Hand out the structural changes since the previous commit.
    pub fn commit(&mut self) -> Changes {
        self.tree.commit()
    }

    /// Move item `from` of list `id` to position `to`, in the data and in the tree.
    pub fn move_item(&mut self, id: ElementId, from: usize, to: usize) -> Result<(), InspectError> {
        self.check_alive(id)?;
        collection::move_item(&mut self.tree, &mut self.tables, id, from, to)
    }

    /// Append a fresh item to list `id`. Returns the new item's element.
    pub fn add_item(&mut self, id: ElementId) -> Result<ElementId, InspectError> {
        self.check_alive(id)?;
        collection::add_item(&mut self.tree, &mut self.tables, id)
    }

    /// Remove item `index` of list `id`. Returns the destroyed element ids.
    pub fn remove_item(
        &mut self,
        id: ElementId,
        index: usize,
    ) -> Result<Vec<ElementId>, InspectError> {
        self.check_alive(id)?;
        collection::remove_item(&mut self.tree, &mut self.tables, id, index)
    }

    /// Invoke the handler of button `id`.
    pub fn click(&mut self, id: ElementId) -> Result<(), InspectError> {
        self.check_alive(id)?;
        let handler = self
            .tables
            .buttons
            .get(&id)
            .cloned()
            .ok_or(InspectError::NotAButton(id))?;
        handler();
        Ok(())
    }

    /// Select page `index` of tab strip `id`.
    pub fn select_tab(&mut self, id: ElementId, index: usize) -> Result<(), InspectError> {
        self.check_alive(id)?;
        if self.tree.get(id).map(|e| &e.kind) != Some(&ElementKind::Group(GroupKind::Tabs)) {
            return Err(InspectError::NotTabs(id));
        }
        let pages = self.tree.children(id).len();
        if index >= pages {
            return Err(AccessError::OutOfRange { index, len: pages }.into());
        }
        self.tree.set_selected(id, index);
        Ok(())
    }

    /// Open or close a fold or window.
    pub fn set_open(&mut self, id: ElementId, open: bool) {
        self.tree.set_open(id, open);
    }

    fn check_alive(&self, id: ElementId) -> Result<(), InspectError> {
        if self.tree.is_alive(id) {
            Ok(())
        } else {
            Err(InspectError::StaleElement(id))
        }
    }
}
