// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-type overrides: creation functions, member allow-lists, and member labels.
//!
//! A [`Registry`] is a stack of layers. The root layer holds process-wide registrations;
//! `scope_*` calls return a [`Scope`] whose registry adds one layer on top. Synthesis passes a
//! registry down explicitly, so a scoped override is visible exactly to the subtree built with
//! it and to every later rebuild of that subtree. Dropping the scope's registry ends the scope.
//!
//! Layers are shared: registering into a layer through any clone of a registry is seen by every
//! registry stacked on top of it.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};
use understory_element::ElementId;

use crate::inspect::{AnyAccessor, Inspect, TypeInfo};
use crate::synth::Synth;

/// Builds the element subtree for a value, replacing default synthesis.
///
/// Receives the synthesis context, the field label, and the value's accessor, and returns a
/// detached root.
pub type CreationFn = Rc<dyn Fn(&mut Synth<'_>, &str, &AnyAccessor) -> ElementId>;

/// An entry in a layer. `None` masks entries of outer layers.
type Entry<V> = Option<V>;

#[derive(Default)]
struct Layer {
    creation: HashMap<TypeInfo, Entry<CreationFn>>,
    members: HashMap<TypeInfo, Entry<Vec<String>>>,
    labels: HashMap<(Option<TypeInfo>, String), Entry<String>>,
}

struct LayerNode {
    layer: RefCell<Layer>,
    version: Cell<u64>,
    parent: Option<Rc<LayerNode>>,
    // Type chains with no creation function, tagged with the stack version they were found at.
    misses: RefCell<HashMap<Vec<TypeInfo>, u64>>,
}

impl LayerNode {
    fn new(parent: Option<Rc<Self>>) -> Self {
        Self {
            layer: RefCell::new(Layer::default()),
            version: Cell::new(0),
            parent,
            misses: RefCell::new(HashMap::new()),
        }
    }

    fn bump(&self) {
        self.version.set(self.version.get() + 1);
    }
}

/// Layered per-type override tables.
///
/// Cloning is cheap and shares every layer.
#[derive(Clone)]
pub struct Registry {
    node: Rc<LayerNode>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layer = self.node.layer.borrow();
        f.debug_struct("Registry")
            .field("depth", &self.depth())
            .field("creation_fns", &layer.creation.len())
            .field("member_lists", &layer.members.len())
            .field("labels", &layer.labels.len())
            .finish_non_exhaustive()
    }
}

/// A registry with one more layer, plus what the layer shadows.
///
/// `previous` is the value the override replaced as seen from the enclosing registry.
#[derive(Debug)]
pub struct Scope<P> {
    /// The registry to synthesize the scoped subtree with.
    pub registry: Registry,
    /// The entry visible before the override.
    pub previous: P,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            node: Rc::new(LayerNode::new(None)),
        }
    }

    /// A registry with an empty layer on top of this one.
    pub fn child(&self) -> Self {
        Self {
            node: Rc::new(LayerNode::new(Some(self.node.clone()))),
        }
    }

    /// Number of layers.
    pub fn depth(&self) -> usize {
        self.layers().count()
    }

    fn layers(&self) -> impl Iterator<Item = &LayerNode> {
        core::iter::successors(Some(&*self.node), |n| n.parent.as_deref())
    }

    fn version(&self) -> u64 {
        self.layers().map(|n| n.version.get()).sum()
    }

    fn edit(&self, f: impl FnOnce(&mut Layer)) {
        f(&mut self.node.layer.borrow_mut());
        self.node.bump();
    }

    // --- creation functions ---

    /// Register a creation function for `ty` in the top layer, replacing any previous one.
    pub fn register_creation_fn(
        &self,
        ty: TypeInfo,
        f: impl Fn(&mut Synth<'_>, &str, &AnyAccessor) -> ElementId + 'static,
    ) {
        debug!(ty = ty.name(), "register creation fn");
        let f: CreationFn = Rc::new(f);
        self.edit(|l| {
            l.creation.insert(ty, Some(f));
        });
    }

    /// Register a creation function for `T`.
    pub fn register_creation_fn_for<T: Inspect>(
        &self,
        f: impl Fn(&mut Synth<'_>, &str, &AnyAccessor) -> ElementId + 'static,
    ) {
        self.register_creation_fn(T::type_info(), f);
    }

    /// Remove the top layer's creation function for `ty`, returning it.
    ///
    /// Outer layers are untouched; use [`Registry::scope_without_creation_fn`] to hide them.
    pub fn unregister_creation_fn(&self, ty: TypeInfo) -> Option<CreationFn> {
        debug!(ty = ty.name(), "unregister creation fn");
        let mut removed = None;
        self.edit(|l| removed = l.creation.remove(&ty).flatten());
        removed
    }

    /// The creation function for a value with this type chain, if any.
    ///
    /// Walks `chain` most derived first; for each type, layers innermost first. A masking entry
    /// stops the search for that type only. Misses are cached per whole chain.
    pub fn creation_fn(&self, chain: &[TypeInfo]) -> Option<CreationFn> {
        let head = *chain.first()?;
        let version = self.version();
        if self.node.misses.borrow().get(chain) == Some(&version) {
            trace!(ty = head.name(), "creation fn miss (cached)");
            return None;
        }
        for ty in chain {
            for node in self.layers() {
                match node.layer.borrow().creation.get(ty) {
                    Some(Some(f)) => {
                        trace!(ty = ty.name(), value = head.name(), "creation fn hit");
                        return Some(f.clone());
                    }
                    Some(None) => break,
                    None => {}
                }
            }
        }
        self.node.misses.borrow_mut().insert(chain.to_vec(), version);
        None
    }

    /// A registry where `ty` uses `f`.
    pub fn scope_creation_fn(
        &self,
        ty: TypeInfo,
        f: impl Fn(&mut Synth<'_>, &str, &AnyAccessor) -> ElementId + 'static,
    ) -> Scope<Option<CreationFn>> {
        let previous = self.creation_fn(&[ty]);
        let registry = self.child();
        registry.register_creation_fn(ty, f);
        Scope { registry, previous }
    }

    /// A registry where `ty` has no creation function, whatever outer layers hold.
    pub fn scope_without_creation_fn(&self, ty: TypeInfo) -> Scope<Option<CreationFn>> {
        let previous = self.creation_fn(&[ty]);
        let registry = self.child();
        registry.edit(|l| {
            l.creation.insert(ty, None);
        });
        Scope { registry, previous }
    }

    // --- member allow-lists ---

    /// Restrict and order the members shown for `ty`.
    ///
    /// Names that do not match a member are skipped at synthesis time. An empty list restores
    /// the default member set.
    pub fn register_members<S: Into<String>>(
        &self,
        ty: TypeInfo,
        names: impl IntoIterator<Item = S>,
    ) {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        debug!(ty = ty.name(), ?names, "register members");
        self.edit(|l| {
            l.members.insert(ty, Some(names));
        });
    }

    /// Remove the top layer's allow-list for `ty`.
    pub fn unregister_members(&self, ty: TypeInfo) {
        self.edit(|l| {
            l.members.remove(&ty);
        });
    }

    /// The allow-list for `ty`, if one is registered and non-empty.
    pub fn members(&self, ty: TypeInfo) -> Option<Vec<String>> {
        self.layers()
            .find_map(|n| n.layer.borrow().members.get(&ty).cloned())
            .flatten()
            .filter(|names| !names.is_empty())
    }

    /// A registry where `ty` shows `names`.
    pub fn scope_members<S: Into<String>>(
        &self,
        ty: TypeInfo,
        names: impl IntoIterator<Item = S>,
    ) -> Scope<Option<Vec<String>>> {
        let previous = self.members(ty);
        let registry = self.child();
        registry.register_members(ty, names);
        Scope { registry, previous }
    }

    // --- labels ---

    /// Label `member` of `ty`. With `ty` of `None` the label applies to that member name on
    /// every type without a type-specific label.
    pub fn register_label(&self, ty: Option<TypeInfo>, member: &str, label: impl Into<String>) {
        let label = label.into();
        debug!(ty = ty.map(|t| t.name()), member, label = %label, "register label");
        self.edit(|l| {
            l.labels.insert((ty, member.to_owned()), Some(label));
        });
    }

    /// Remove the top layer's label for `member` of `ty`.
    pub fn unregister_label(&self, ty: Option<TypeInfo>, member: &str) {
        self.edit(|l| {
            l.labels.remove(&(ty, member.to_owned()));
        });
    }

    /// The display label of `member` on `ty`: type-specific, then any-type, then the member
    /// name itself.
    pub fn label(&self, ty: TypeInfo, member: &str) -> String {
        self.lookup_label(Some(ty), member)
            .or_else(|| self.lookup_label(None, member))
            .unwrap_or_else(|| member.to_owned())
    }

    fn lookup_label(&self, ty: Option<TypeInfo>, member: &str) -> Option<String> {
        let key = (ty, member.to_owned());
        self.layers()
            .find_map(|n| n.layer.borrow().labels.get(&key).cloned())
            .flatten()
    }

    /// A registry where `member` of `ty` is labeled `label`.
    pub fn scope_label(
        &self,
        ty: Option<TypeInfo>,
        member: &str,
        label: impl Into<String>,
    ) -> Scope<Option<String>> {
        let previous = self.lookup_label(ty, member);
        let registry = self.child();
        registry.register_label(ty, member, label);
        Scope { registry, previous }
    }
}

#[cfg(test)]
mod tests {
    use understory_element::{Element, ElementKind};

    use super::*;
    use crate::synth::Tables;
    use crate::{Binding, InspectorConfig};

    struct Base;
    struct Derived;

    fn marker(text: &'static str) -> impl Fn(&mut Synth<'_>, &str, &AnyAccessor) -> ElementId {
        move |s, _, _| s.leaf(Element::new(ElementKind::Label).with_text(text))
    }

    fn run(registry: &Registry, chain: &[TypeInfo]) -> Option<String> {
        let f = registry.creation_fn(chain)?;
        let mut tree = understory_element::ElementTree::<Binding>::new();
        let mut tables = Tables::default();
        let mut synth = Synth::new(
            &mut tree,
            &mut tables,
            registry.clone(),
            Rc::new(InspectorConfig::default()),
        );
        let acc = AnyAccessor::new(crate::Accessor::constant(0_i32));
        let id = f(&mut synth, "", &acc);
        tree.get(id).and_then(|e| e.text.clone())
    }

    #[test]
    fn lookup_walks_chain_most_derived_first() {
        let registry = Registry::new();
        let chain = [TypeInfo::of::<Derived>(), TypeInfo::of::<Base>()];
        assert!(registry.creation_fn(&chain).is_none());

        registry.register_creation_fn(TypeInfo::of::<Base>(), marker("base"));
        assert_eq!(run(&registry, &chain).as_deref(), Some("base"));

        registry.register_creation_fn(TypeInfo::of::<Derived>(), marker("derived"));
        assert_eq!(run(&registry, &chain).as_deref(), Some("derived"));

        assert!(registry.unregister_creation_fn(TypeInfo::of::<Derived>()).is_some());
        assert_eq!(run(&registry, &chain).as_deref(), Some("base"));
    }

    #[test]
    fn miss_cache_is_invalidated_by_any_layer() {
        let root = Registry::new();
        let scoped = root.child();
        let chain = [TypeInfo::of::<Base>()];
        assert!(scoped.creation_fn(&chain).is_none());
        assert!(scoped.creation_fn(&chain).is_none());
        root.register_creation_fn(TypeInfo::of::<Base>(), marker("late"));
        assert_eq!(run(&scoped, &chain).as_deref(), Some("late"));
    }

    #[test]
    fn nested_scopes_apply_innermost_and_end_with_their_registry() {
        let root = Registry::new();
        let ty = TypeInfo::of::<Base>();
        root.register_creation_fn(ty, marker("global"));

        let a = root.scope_creation_fn(ty, marker("a"));
        assert!(a.previous.is_some());
        let b = a.registry.scope_creation_fn(ty, marker("b"));
        assert_eq!(run(&b.registry, &[ty]).as_deref(), Some("b"));
        assert_eq!(run(&a.registry, &[ty]).as_deref(), Some("a"));
        drop(b);
        assert_eq!(run(&a.registry, &[ty]).as_deref(), Some("a"));
        drop(a);
        assert_eq!(run(&root, &[ty]).as_deref(), Some("global"));

        let hidden = root.scope_without_creation_fn(ty);
        assert!(hidden.registry.creation_fn(&[ty]).is_none());
        assert_eq!(run(&root, &[ty]).as_deref(), Some("global"));
    }

    #[test]
    fn scoped_previous_lookups_do_not_hide_ancestor_fns() {
        let root = Registry::new();
        root.register_creation_fn(TypeInfo::of::<Base>(), marker("base"));
        let chain = [TypeInfo::of::<Derived>(), TypeInfo::of::<Base>()];
        assert_eq!(run(&root, &chain).as_deref(), Some("base"));

        let hidden = root.scope_without_creation_fn(TypeInfo::of::<Derived>());
        assert!(hidden.previous.is_none());
        drop(hidden);
        assert_eq!(run(&root, &chain).as_deref(), Some("base"));

        let scoped = root.scope_creation_fn(TypeInfo::of::<Derived>(), marker("derived"));
        assert!(scoped.previous.is_none());
        assert_eq!(run(&root, &chain).as_deref(), Some("base"));
        assert_eq!(run(&scoped.registry, &chain).as_deref(), Some("derived"));
    }

    #[test]
    fn masking_only_stops_the_masked_type() {
        let root = Registry::new();
        root.register_creation_fn(TypeInfo::of::<Base>(), marker("base"));
        root.register_creation_fn(TypeInfo::of::<Derived>(), marker("derived"));
        let scope = root.scope_without_creation_fn(TypeInfo::of::<Derived>());
        let chain = [TypeInfo::of::<Derived>(), TypeInfo::of::<Base>()];
        assert_eq!(run(&scope.registry, &chain).as_deref(), Some("base"));
    }

    #[test]
    fn labels_fall_back_from_type_to_any_to_name() {
        let registry = Registry::new();
        let ty = TypeInfo::of::<Base>();
        assert_eq!(registry.label(ty, "pos"), "pos");
        registry.register_label(None, "pos", "Position");
        assert_eq!(registry.label(ty, "pos"), "Position");
        registry.register_label(Some(ty), "pos", "Base position");
        assert_eq!(registry.label(ty, "pos"), "Base position");
        assert_eq!(registry.label(TypeInfo::of::<Derived>(), "pos"), "Position");

        let scope = registry.scope_label(Some(ty), "pos", "Scoped");
        assert_eq!(scope.previous.as_deref(), Some("Base position"));
        assert_eq!(scope.registry.label(ty, "pos"), "Scoped");
        assert_eq!(registry.label(ty, "pos"), "Base position");
    }

    #[test]
    fn empty_allow_list_means_default_members() {
        let registry = Registry::new();
        let ty = TypeInfo::of::<Base>();
        registry.register_members(ty, ["b", "a"]);
        assert_eq!(registry.members(ty), Some(vec!["b".into(), "a".into()]));
        let scope = registry.scope_members(ty, Vec::<String>::new());
        assert_eq!(scope.registry.members(ty), None);
        assert_eq!(scope.previous, Some(vec!["b".into(), "a".into()]));
        registry.unregister_members(ty);
        assert_eq!(registry.members(ty), None);
    }
}
