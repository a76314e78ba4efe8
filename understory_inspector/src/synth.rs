// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-directed element synthesis.
//!
//! Every `Synth` method returns the id of a detached root. Containers are created after their
//! children and then adopt them in order, so a half-built subtree is never attached anywhere.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};
use understory_element::{
    Element, ElementFlags, ElementId, ElementKind, ElementTree, FieldKind, GroupKind, SliderKind,
};

use crate::accessor::Accessor;
use crate::collection::ListState;
use crate::config::{InspectorConfig, Options};
use crate::cycle::CycleGuard;
use crate::dynamic::DynamicState;
use crate::inspect::{AnyAccessor, TypeInfo};
use crate::kind::{Composite, EnumBinding, Member, Primitive, ValueKind};
use crate::registry::Registry;

/// Link payload of synthesized leaves: the value a renderer reads and writes.
#[derive(Clone, Debug)]
pub enum Binding {
    /// An editable field.
    Value(Primitive),
    /// A slider with optional live bounds.
    Slider {
        /// The bound value.
        value: Primitive,
        /// Lower bound.
        min: Option<Accessor<f64>>,
        /// Upper bound.
        max: Option<Accessor<f64>>,
    },
    /// A dropdown's selected index.
    Index(Accessor<usize>),
}

impl Binding {
    /// The bound value of fields and sliders.
    pub fn value(&self) -> Option<&Primitive> {
        match self {
            Self::Value(v) | Self::Slider { value: v, .. } => Some(v),
            Self::Index(_) => None,
        }
    }
}

/// The element tree produced by an [`Inspector`](crate::Inspector).
pub type Tree = ElementTree<Binding>;

/// Everything a (possibly deferred) synthesis step needs from its surroundings.
#[derive(Clone, Debug)]
pub(crate) struct Context {
    pub(crate) registry: Registry,
    pub(crate) guard: CycleGuard,
    pub(crate) config: Rc<InspectorConfig>,
    pub(crate) depth: usize,
}

/// Per-element state that lives beside the tree.
#[derive(Default)]
pub(crate) struct Tables {
    pub(crate) dynamics: HashMap<ElementId, DynamicState>,
    pub(crate) lists: HashMap<ElementId, ListState>,
    pub(crate) buttons: HashMap<ElementId, Rc<dyn Fn()>>,
}

impl Tables {
    /// Drop the state of destroyed elements.
    pub(crate) fn purge(&mut self, removed: &[ElementId]) {
        for id in removed {
            self.dynamics.remove(id);
            self.lists.remove(id);
            self.buttons.remove(id);
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mode {
    Field,
    Slider,
}

/// A synthesis session: the tree being built plus the context of the current position.
///
/// Creation functions and self-describing values receive a `Synth` and use it to build their
/// subtree, usually by recursing into [`Synth::field`] for their parts.
pub struct Synth<'a> {
    pub(crate) tree: &'a mut Tree,
    pub(crate) tables: &'a mut Tables,
    pub(crate) ctx: Context,
}

impl fmt::Debug for Synth<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synth")
            .field("tree", &self.tree)
            .field("guard", &self.ctx.guard)
            .field("depth", &self.ctx.depth)
            .finish_non_exhaustive()
    }
}

impl<'a> Synth<'a> {
    pub(crate) fn new(
        tree: &'a mut Tree,
        tables: &'a mut Tables,
        registry: Registry,
        config: Rc<InspectorConfig>,
    ) -> Self {
        Self::resume(
            tree,
            tables,
            Context {
                registry,
                guard: CycleGuard::new(),
                config,
                depth: 0,
            },
        )
    }

    pub(crate) fn resume(tree: &'a mut Tree, tables: &'a mut Tables, ctx: Context) -> Self {
        Self { tree, tables, ctx }
    }
}

impl Synth<'_> {
    /// The tree under construction.
    pub fn tree(&self) -> &Tree {
        &*self.tree
    }

    /// The tree under construction, mutably.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut *self.tree
    }

    /// The registry in effect at this position.
    pub fn registry(&self) -> &Registry {
        &self.ctx.registry
    }

    /// Inspector settings.
    pub fn config(&self) -> &InspectorConfig {
        &self.ctx.config
    }

    /// The reference-typed values being synthesized around this position.
    pub fn guard(&self) -> &CycleGuard {
        &self.ctx.guard
    }

    /// Run `f` with `registry` in effect.
    ///
    /// Deferred rebuilds created inside `f` keep using `registry`.
    pub fn with_registry<R>(&mut self, registry: Registry, f: impl FnOnce(&mut Self) -> R) -> R {
        let outer = core::mem::replace(&mut self.ctx.registry, registry);
        let out = f(self);
        self.ctx.registry = outer;
        out
    }

    /// Insert a detached element.
    pub fn leaf(&mut self, element: Element<Binding>) -> ElementId {
        self.tree.insert(None, element)
    }

    /// Insert a detached container adopting `children` in order.
    pub fn group(
        &mut self,
        element: Element<Binding>,
        children: impl IntoIterator<Item = ElementId>,
    ) -> ElementId {
        let id = self.tree.insert(None, element);
        for child in children {
            self.tree.attach(id, child);
        }
        id
    }

    /// A static text label.
    pub fn text(&mut self, text: &str) -> ElementId {
        self.leaf(Element::new(ElementKind::Label).with_text(text))
    }

    /// A disabled label standing in for a value that cannot be shown.
    pub fn placeholder(&mut self, label: &str, text: &str) -> ElementId {
        self.leaf(
            Element::new(ElementKind::Label)
                .with_optional_label(label)
                .with_text(text)
                .disabled(),
        )
    }

    /// A button invoking `on_click` from [`Inspector::click`](crate::Inspector::click).
    pub fn button(&mut self, label: &str, on_click: impl Fn() + 'static) -> ElementId {
        let id = self.leaf(Element::new(ElementKind::Button).with_label(label));
        self.tables.buttons.insert(id, Rc::new(on_click));
        id
    }

    /// Synthesize the editor for `accessor`'s value.
    ///
    /// In order: a reference cycle yields a placeholder; a creation function registered for the
    /// value's runtime type chain builds the subtree; otherwise the value's [`ValueKind`] decides.
    pub fn field(&mut self, label: &str, accessor: &AnyAccessor, options: &Options) -> ElementId {
        self.enter(label, accessor, options, |s| {
            s.dispatch(label, accessor, options, Mode::Field)
        })
    }

    /// Synthesize a slider for `accessor`'s value.
    ///
    /// Numbers become sliders bounded by `options.min`/`options.max`. A composite with numeric
    /// members becomes a group of per-member sliders, each bounded by the same member of the
    /// composite bounds. Anything else falls back to [`Synth::field`].
    pub fn slider(&mut self, label: &str, accessor: &AnyAccessor, options: &Options) -> ElementId {
        self.enter(label, accessor, options, |s| {
            s.dispatch(label, accessor, options, Mode::Slider)
        })
    }

    fn enter(
        &mut self,
        label: &str,
        accessor: &AnyAccessor,
        options: &Options,
        f: impl FnOnce(&mut Self) -> ElementId,
    ) -> ElementId {
        if self.ctx.guard.is_circular(accessor) {
            let ty = accessor.type_info();
            debug!(ty = ty.name(), label, "circular reference, placeholder inserted");
            let text = format!("{}: {}", self.ctx.config.circular_text, ty.short_name());
            return self.placeholder(label, &text);
        }
        if self.ctx.depth >= self.ctx.config.max_depth {
            warn!(
                ty = accessor.type_info().name(),
                label,
                max_depth = self.ctx.config.max_depth,
                "max synthesis depth reached"
            );
            let text = self.ctx.config.depth_text.clone();
            return self.placeholder(label, &text);
        }
        let inner = self.ctx.guard.enter(accessor);
        let outer = core::mem::replace(&mut self.ctx.guard, inner);
        self.ctx.depth += 1;
        let id = f(self);
        self.ctx.depth -= 1;
        self.ctx.guard = outer;
        if options.style != understory_element::Style::default()
            && let Some(element) = self.tree.get_mut(id)
        {
            element.style = options.style.clone();
        }
        id
    }

    fn dispatch(
        &mut self,
        label: &str,
        accessor: &AnyAccessor,
        options: &Options,
        mode: Mode,
    ) -> ElementId {
        if let Some(f) = self.ctx.registry.creation_fn(&accessor.runtime_chain()) {
            return f(self, label, accessor);
        }
        match accessor.kind() {
            ValueKind::Primitive(p) => match mode {
                Mode::Slider if p.is_numeric() => self.slider_leaf(label, p, options),
                _ => self.primitive(label, p, options),
            },
            ValueKind::Enum(e) => self.dropdown(label, e),
            ValueKind::Nullable(n) => {
                let inner = n.inner.clone();
                let options = options.clone();
                self.null_guard(label, &n.outer, move |s, label| match mode {
                    Mode::Field => s.field(label, &inner, &options),
                    Mode::Slider => s.slider(label, &inner, &options),
                })
            }
            ValueKind::SelfDescribing(sd) => (sd.0)(self, label),
            ValueKind::Collection(list) => self.list_elements(label, list, options),
            ValueKind::Composite(c) => {
                let mode = if mode == Mode::Slider && c.members().iter().any(slider_capable) {
                    Mode::Slider
                } else {
                    Mode::Field
                };
                self.composite(label, accessor.type_info(), &c, options, mode)
            }
        }
    }

    fn primitive(&mut self, label: &str, value: Primitive, options: &Options) -> ElementId {
        let (kind, writable) = match &value {
            Primitive::Bool(a) => (FieldKind::Bool, a.is_writable()),
            Primitive::Int(a) => (FieldKind::Int, a.is_writable()),
            Primitive::Float(a) => (FieldKind::Float, a.is_writable()),
            Primitive::Text(a) => (FieldKind::Text, a.is_writable()),
            Primitive::Color(a) => (FieldKind::Color, a.is_writable()),
        };
        let mut element = Element::new(ElementKind::Field(kind))
            .with_optional_label(label)
            .with_link(Binding::Value(value));
        input_flags(&mut element, writable, options);
        self.leaf(element)
    }

    fn slider_leaf(&mut self, label: &str, value: Primitive, options: &Options) -> ElementId {
        let (kind, writable) = match &value {
            Primitive::Int(a) => (SliderKind::Int, a.is_writable()),
            Primitive::Float(a) => (SliderKind::Float, a.is_writable()),
            Primitive::Bool(_) | Primitive::Text(_) | Primitive::Color(_) => {
                return self.primitive(label, value, options);
            }
        };
        let bound = |b: &Option<AnyAccessor>| match b.as_ref().map(AnyAccessor::kind) {
            Some(ValueKind::Primitive(p)) => p.as_f64(),
            _ => None,
        };
        let mut element = Element::new(ElementKind::Slider(kind))
            .with_optional_label(label)
            .with_link(Binding::Slider {
                value,
                min: bound(&options.min),
                max: bound(&options.max),
            });
        input_flags(&mut element, writable, options);
        self.leaf(element)
    }

    fn dropdown(&mut self, label: &str, binding: EnumBinding) -> ElementId {
        let selected = binding.index.get().unwrap_or(0);
        let mut element = Element::new(ElementKind::Dropdown {
            options: binding.variants.iter().map(|v| (*v).to_owned()).collect(),
        })
        .with_optional_label(label)
        .with_link(Binding::Index(binding.index.clone()));
        element.selected = selected;
        if !binding.index.is_writable() {
            element.flags.remove(ElementFlags::INTERACTABLE);
        }
        self.leaf(element)
    }

    fn composite(
        &mut self,
        label: &str,
        ty: TypeInfo,
        composite: &Composite,
        options: &Options,
        mode: Mode,
    ) -> ElementId {
        let members: Vec<&Member> = match self.ctx.registry.members(ty) {
            Some(names) => names
                .iter()
                .filter_map(|name| {
                    let member = composite.member(name);
                    if member.is_none() {
                        debug!(
                            ty = ty.name(),
                            member = %name,
                            "allow-listed member not found, skipped"
                        );
                    }
                    member
                })
                .collect(),
            None => composite.members().iter().collect(),
        };
        let children: Vec<ElementId> = members
            .into_iter()
            .map(|m| self.member(ty, m, options, mode))
            .collect();

        let element = if composite.is_single_line() {
            Element::new(ElementKind::Composite).with_optional_label(label)
        } else if label.is_empty() {
            Element::new(ElementKind::Group(GroupKind::Column))
        } else {
            let mut fold = Element::new(ElementKind::Group(GroupKind::Fold)).with_label(label);
            fold.flags.set(ElementFlags::OPEN, self.ctx.config.folds_open);
            fold
        };
        self.group(element, children)
    }

    fn member(&mut self, ty: TypeInfo, member: &Member, parent: &Options, mode: Mode) -> ElementId {
        let label = self.ctx.registry.label(ty, &member.name);
        let mut options = parent.nested();
        options.reorderable = member.meta.reorderable;
        let range = member.meta.range.map(|(lo, hi)| {
            (
                AnyAccessor::new(Accessor::constant(lo)),
                AnyAccessor::new(Accessor::constant(hi)),
            )
        });
        let id = match mode {
            Mode::Slider => {
                options.min = parent.min.as_ref().and_then(|b| member_of(b, &member.name));
                options.max = parent.max.as_ref().and_then(|b| member_of(b, &member.name));
                if let Some((lo, hi)) = range {
                    options.min.get_or_insert(lo);
                    options.max.get_or_insert(hi);
                }
                self.slider(&label, &member.accessor, &options)
            }
            Mode::Field => match range {
                Some((lo, hi)) => {
                    options.min = Some(lo);
                    options.max = Some(hi);
                    self.slider(&label, &member.accessor, &options)
                }
                None => self.field(&label, &member.accessor, &options),
            },
        };
        if member.meta.multiline
            && let Some(element) = self.tree.get_mut(id)
            && element.kind == ElementKind::Field(FieldKind::Text)
        {
            element.flags.insert(ElementFlags::MULTILINE);
        }
        id
    }
}

fn input_flags(element: &mut Element<Binding>, writable: bool, options: &Options) {
    if !writable {
        element.flags.remove(ElementFlags::INTERACTABLE);
    }
    if options.delay_input {
        element.flags.insert(ElementFlags::DELAY_INPUT);
    }
}

/// Numbers, possibly optional, can be shown as sliders.
fn slider_capable(member: &Member) -> bool {
    match member.accessor.kind() {
        ValueKind::Primitive(p) => p.is_numeric(),
        ValueKind::Nullable(n) => {
            matches!(n.inner.kind(), ValueKind::Primitive(p) if p.is_numeric())
        }
        _ => false,
    }
}

fn member_of(accessor: &AnyAccessor, name: &str) -> Option<AnyAccessor> {
    match accessor.kind() {
        ValueKind::Composite(c) => c.member(name).map(|m| m.accessor.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use understory_element::{Change, Color};

    use super::*;
    use crate::{Inspect, InspectEnum, Inspector, MemberMeta, SelfDescribing, ui};

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Blend {
        Normal,
        Additive,
    }

    impl InspectEnum for Blend {
        const VARIANTS: &'static [&'static str] = &["Normal", "Additive"];

        fn index(&self) -> usize {
            *self as usize
        }

        fn from_index(index: usize) -> Option<Self> {
            [Self::Normal, Self::Additive].get(index).copied()
        }
    }

    impl Inspect for Blend {
        fn kind(acc: &Accessor<Self>) -> ValueKind {
            ValueKind::Enum(EnumBinding::of(acc))
        }
    }

    struct Settings {
        enabled: bool,
        count: u32,
        ratio: f64,
        title: String,
        tint: Color,
        blend: Blend,
        notes: String,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                enabled: true,
                count: 3,
                ratio: 0.5,
                title: "settings".into(),
                tint: Color::BLACK,
                blend: Blend::Additive,
                notes: String::new(),
            }
        }
    }

    impl Inspect for Settings {
        fn kind(acc: &Accessor<Self>) -> ValueKind {
            Composite::of(acc)
                .member("enabled", |s| &s.enabled, |s| &mut s.enabled)
                .member("count", |s| &s.count, |s| &mut s.count)
                .member_with("ratio", MemberMeta::range(0.0, 1.0), |s| &s.ratio, |s| {
                    &mut s.ratio
                })
                .member("title", |s| &s.title, |s| &mut s.title)
                .member("tint", |s| &s.tint, |s| &mut s.tint)
                .member("blend", |s| &s.blend, |s| &mut s.blend)
                .member_with("notes", MemberMeta::multiline(), |s| &s.notes, |s| {
                    &mut s.notes
                })
                .build()
        }
    }

    struct Link {
        value: i32,
        next: Option<Rc<RefCell<Link>>>,
    }

    impl Inspect for Link {
        fn kind(acc: &Accessor<Self>) -> ValueKind {
            Composite::of(acc)
                .member("value", |l| &l.value, |l| &mut l.value)
                .member("next", |l| &l.next, |l| &mut l.next)
                .build()
        }
    }

    struct Left {
        right: Option<Rc<RefCell<Right>>>,
    }

    struct Right {
        left: Option<Rc<RefCell<Left>>>,
    }

    impl Inspect for Left {
        fn kind(acc: &Accessor<Self>) -> ValueKind {
            Composite::of(acc)
                .member("right", |l| &l.right, |l| &mut l.right)
                .build()
        }
    }

    impl Inspect for Right {
        fn kind(acc: &Accessor<Self>) -> ValueKind {
            Composite::of(acc)
                .member("left", |r| &r.left, |r| &mut r.left)
                .build()
        }
    }

    #[derive(Clone, Default)]
    struct Vec2 {
        x: f32,
        y: f32,
        tag: String,
    }

    impl Inspect for Vec2 {
        fn kind(acc: &Accessor<Self>) -> ValueKind {
            Composite::of(acc)
                .member("x", |v| &v.x, |v| &mut v.x)
                .member("y", |v| &v.y, |v| &mut v.y)
                .member("tag", |v| &v.tag, |v| &mut v.tag)
                .single_line()
                .build()
        }
    }

    fn shared<T: Inspect>(value: T) -> Accessor<T> {
        Accessor::from_shared(Rc::new(RefCell::new(value)))
    }

    fn marker(text: &'static str) -> impl Fn(&mut Synth<'_>, &str, &AnyAccessor) -> ElementId {
        move |s, label, _| {
            s.leaf(
                Element::new(ElementKind::Label)
                    .with_optional_label(label)
                    .with_text(text),
            )
        }
    }

    type Shape = Vec<(usize, ElementKind, Option<String>, Option<String>, ElementFlags)>;

    fn shape(tree: &Tree, id: ElementId) -> Shape {
        fn walk(tree: &Tree, id: ElementId, depth: usize, out: &mut Shape) {
            let e = tree.get(id).unwrap();
            out.push((depth, e.kind.clone(), e.label.clone(), e.text.clone(), e.flags));
            for &c in tree.children(id) {
                walk(tree, c, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        walk(tree, id, 0, &mut out);
        out
    }

    fn texts(tree: &Tree, root: ElementId) -> Vec<String> {
        tree.descendants(root)
            .into_iter()
            .filter_map(|id| tree.get(id).unwrap().text.clone())
            .collect()
    }

    fn kind_of(tree: &Tree, id: ElementId) -> ElementKind {
        tree.get(id).unwrap().kind.clone()
    }

    #[test]
    fn members_map_to_editors_in_declaration_order() {
        let mut inspector = Inspector::new();
        let root = inspector.mount(
            None,
            &ui::field("settings", shared(Settings::default()), Options::default()),
        );
        let tree = inspector.tree();
        assert_eq!(kind_of(tree, root), ElementKind::Group(GroupKind::Fold));
        let kinds: Vec<_> = tree.children(root).iter().map(|&c| kind_of(tree, c)).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::Field(FieldKind::Bool),
                ElementKind::Field(FieldKind::Int),
                ElementKind::Slider(SliderKind::Float),
                ElementKind::Field(FieldKind::Text),
                ElementKind::Field(FieldKind::Color),
                ElementKind::Dropdown {
                    options: vec!["Normal".into(), "Additive".into()]
                },
                ElementKind::Field(FieldKind::Text),
            ]
        );
        let children = tree.children(root);
        let dropdown = tree.get(children[5]).unwrap();
        assert_eq!(dropdown.selected, 1);
        assert!(tree.get(children[6]).unwrap().flags.contains(ElementFlags::MULTILINE));
        assert!(!tree.get(children[3]).unwrap().flags.contains(ElementFlags::MULTILINE));

        let Some(Binding::Slider { min, max, .. }) = &tree.get(children[2]).unwrap().link else {
            panic!("expected a slider binding");
        };
        assert_eq!(min.as_ref().map(|m| m.get()), Some(Ok(0.0)));
        assert_eq!(max.as_ref().map(|m| m.get()), Some(Ok(1.0)));
    }

    #[test]
    fn bindings_write_through_to_the_value() {
        let cell = Rc::new(RefCell::new(Settings::default()));
        let mut inspector = Inspector::new();
        let root = inspector.mount(
            None,
            &ui::field("s", Accessor::from_shared(cell.clone()), Options::default()),
        );
        let tree = inspector.tree();
        let children = tree.children(root);
        let Some(Binding::Value(Primitive::Int(count))) = &tree.get(children[1]).unwrap().link
        else {
            panic!("expected an int binding");
        };
        count.set(-5).unwrap();
        assert_eq!(cell.borrow().count, 0, "u32 saturates at zero");
        let Some(Binding::Index(blend)) = &tree.get(children[5]).unwrap().link else {
            panic!("expected an index binding");
        };
        blend.set(0).unwrap();
        assert_eq!(cell.borrow().blend, Blend::Normal);
    }

    #[test]
    fn poll_refreshes_dropdown_selection() {
        let cell = Rc::new(RefCell::new(Settings::default()));
        let mut inspector = Inspector::new();
        let root = inspector.mount(
            None,
            &ui::field("s", Accessor::from_shared(cell.clone()), Options::default()),
        );
        let dropdown = inspector.tree().children(root)[5];
        let _ = inspector.commit();

        cell.borrow_mut().blend = Blend::Normal;
        assert!(inspector.poll().is_empty());
        assert_eq!(inspector.tree().get(dropdown).unwrap().selected, 0);
        assert_eq!(inspector.commit().changes, vec![Change::Updated(dropdown)]);

        assert!(inspector.poll().is_empty());
        assert!(inspector.commit().is_empty());
    }

    #[test]
    fn read_only_values_are_not_interactable() {
        let mut inspector = Inspector::new();
        let id = inspector.mount(
            None,
            &ui::field("fps", Accessor::read_only(|| 60_u16), Options::default().delay_input()),
        );
        let flags = inspector.tree().get(id).unwrap().flags;
        assert!(flags.contains(ElementFlags::ENABLED));
        assert!(!flags.contains(ElementFlags::INTERACTABLE));
        assert!(flags.contains(ElementFlags::DELAY_INPUT));
    }

    #[test]
    fn mutual_references_end_in_a_placeholder() {
        let left = Rc::new(RefCell::new(Left { right: None }));
        let right = Rc::new(RefCell::new(Right {
            left: Some(left.clone()),
        }));
        left.borrow_mut().right = Some(right);

        let mut inspector = Inspector::new();
        let root = inspector.mount(
            None,
            &ui::field("left", Accessor::constant(left.clone()), Options::default()),
        );
        let tree = inspector.tree();
        let placeholders: Vec<_> = tree
            .descendants(root)
            .into_iter()
            .filter(|&id| {
                tree.get(id)
                    .and_then(|e| e.text.as_deref())
                    .is_some_and(|t| t.starts_with("circular reference detected"))
            })
            .collect();
        assert_eq!(placeholders.len(), 1);
        let placeholder = tree.get(placeholders[0]).unwrap();
        assert_eq!(
            placeholder.text.as_deref(),
            Some("circular reference detected: Left")
        );
        assert_eq!(placeholder.label.as_deref(), Some("left"));
        assert!(!placeholder.is_enabled());
        // left fold -> right dynamic -> right fold -> left dynamic -> placeholder
        assert_eq!(tree.descendants(root).len(), 5);
        left.borrow_mut().right = None;
    }

    #[test]
    fn repeated_synthesis_is_structurally_equal() {
        let value = shared(Settings::default());
        let template = ui::field("settings", value, Options::default());
        let mut inspector = Inspector::new();
        let a = inspector.mount(None, &template);
        let b = inspector.mount(None, &template);
        assert_ne!(a, b);
        assert_eq!(shape(inspector.tree(), a), shape(inspector.tree(), b));
    }

    #[test]
    fn acyclic_chains_terminate_with_one_element_per_member() {
        let tail = Rc::new(RefCell::new(Link {
            value: 2,
            next: None,
        }));
        let head = Rc::new(RefCell::new(Link {
            value: 1,
            next: Some(tail),
        }));
        let mut inspector = Inspector::new();
        let root = inspector.mount(
            None,
            &ui::field("head", Accessor::constant(head), Options::default()),
        );
        let tree = inspector.tree();
        assert_eq!(tree.children(root).len(), 2);
        let next = tree.children(root)[1];
        assert_eq!(kind_of(tree, next), ElementKind::Dynamic);
        let tail_fold = tree.children(next)[0];
        assert_eq!(tree.children(tail_fold).len(), 2);
        assert_eq!(texts(tree, root), ["null"]);
    }

    #[test]
    fn depth_limit_cuts_long_chains() {
        let mut link = None;
        for value in 0..10 {
            link = Some(Rc::new(RefCell::new(Link { value, next: link })));
        }
        let mut inspector = Inspector::with_config(InspectorConfig {
            max_depth: 3,
            ..InspectorConfig::default()
        });
        let root = inspector.mount(None, &ui::field("chain", shared(link), Options::default()));
        assert!(
            texts(inspector.tree(), root)
                .iter()
                .any(|t| t == "max depth reached")
        );
    }

    #[test]
    fn deep_acyclic_chains_build_in_full_by_default() {
        let mut link = None;
        for value in 0..40 {
            link = Some(Rc::new(RefCell::new(Link { value, next: link })));
        }
        let mut inspector = Inspector::new();
        let root = inspector.mount(None, &ui::field("chain", shared(link), Options::default()));
        let tree = inspector.tree();
        assert!(
            !texts(tree, root)
                .iter()
                .any(|t| t == "max depth reached")
        );
        let values = tree
            .descendants(root)
            .into_iter()
            .filter(|&id| kind_of(tree, id) == ElementKind::Field(FieldKind::Int))
            .count();
        assert_eq!(values, 40);
    }

    #[test]
    fn creation_fns_follow_declared_ancestors() {
        struct Figure;
        struct Circle {
            radius: f32,
        }
        impl Inspect for Circle {
            fn ancestors() -> Vec<TypeInfo> {
                vec![TypeInfo::of::<Figure>()]
            }

            fn kind(acc: &Accessor<Self>) -> ValueKind {
                Composite::of(acc)
                    .member("radius", |c| &c.radius, |c| &mut c.radius)
                    .build()
            }
        }

        let mut inspector = Inspector::new();
        inspector
            .registry()
            .register_creation_fn(TypeInfo::of::<Figure>(), marker("figure"));
        let id = inspector.mount(
            None,
            &ui::field("c", shared(Circle { radius: 1.0 }), Options::default()),
        );
        assert_eq!(texts(inspector.tree(), id), ["figure"]);
    }

    #[test]
    fn scoped_overrides_reach_their_subtree_and_its_rebuilds() {
        let mut inspector = Inspector::new();
        let registry = inspector.registry().clone();
        let ty = TypeInfo::of::<i32>();
        registry.register_creation_fn(ty, marker("global"));
        let a = registry.scope_creation_fn(ty, marker("a"));
        let b = a.registry.scope_creation_fn(ty, marker("b"));

        let optional = Rc::new(RefCell::new(None::<i32>));
        let x = || ui::field("x", shared(0_i32), Options::default());
        let root = inspector.mount(
            None,
            &ui::column([
                x(),
                ui::scoped(
                    a.registry.clone(),
                    ui::column([
                        x(),
                        ui::scoped(
                            b.registry.clone(),
                            ui::column([
                                x(),
                                ui::field(
                                    "opt",
                                    Accessor::from_shared(optional.clone()),
                                    Options::default(),
                                ),
                            ]),
                        ),
                        x(),
                    ]),
                ),
                x(),
            ]),
        );
        assert_eq!(
            texts(inspector.tree(), root),
            ["global", "a", "b", "null", "a", "global"]
        );

        *optional.borrow_mut() = Some(4);
        assert_eq!(inspector.poll().len(), 1);
        assert_eq!(
            texts(inspector.tree(), root),
            ["global", "a", "b", "b", "a", "global"]
        );
    }

    #[test]
    fn allow_lists_and_labels_shape_composites() {
        let mut inspector = Inspector::new();
        let ty = TypeInfo::of::<Settings>();
        inspector
            .registry()
            .register_members(ty, ["title", "missing", "enabled"]);
        inspector.registry().register_label(Some(ty), "title", "Title");
        inspector.registry().register_label(None, "enabled", "On");
        let root = inspector.mount(
            None,
            &ui::field("", shared(Settings::default()), Options::default()),
        );
        let tree = inspector.tree();
        assert_eq!(kind_of(tree, root), ElementKind::Group(GroupKind::Column));
        let labels: Vec<_> = tree
            .children(root)
            .iter()
            .map(|&c| tree.get(c).unwrap().label.clone().unwrap())
            .collect();
        assert_eq!(labels, ["Title", "On"]);
    }

    #[test]
    fn composite_sliders_are_bounded_member_wise() {
        let min = Vec2 {
            x: 0.0,
            y: -1.0,
            tag: String::new(),
        };
        let max = Vec2 {
            x: 1.0,
            y: 1.0,
            tag: String::new(),
        };
        let mut inspector = Inspector::new();
        let root = inspector.mount(
            None,
            &ui::slider(
                "v",
                shared(Vec2::default()),
                Options::default().bounds(Accessor::constant(min), Accessor::constant(max)),
            ),
        );
        let tree = inspector.tree();
        assert_eq!(kind_of(tree, root), ElementKind::Composite);
        let children = tree.children(root);
        assert_eq!(kind_of(tree, children[2]), ElementKind::Field(FieldKind::Text));
        let bounds = |id: ElementId| match &tree.get(id).unwrap().link {
            Some(Binding::Slider { min, max, .. }) => (
                min.as_ref().and_then(|m| m.get().ok()),
                max.as_ref().and_then(|m| m.get().ok()),
            ),
            _ => panic!("expected a slider"),
        };
        assert_eq!(bounds(children[0]), (Some(0.0), Some(1.0)));
        assert_eq!(bounds(children[1]), (Some(-1.0), Some(1.0)));
    }

    #[test]
    fn sliders_fall_back_to_fields() {
        struct Name {
            text: String,
        }
        impl Inspect for Name {
            fn kind(acc: &Accessor<Self>) -> ValueKind {
                Composite::of(acc)
                    .member("text", |n| &n.text, |n| &mut n.text)
                    .build()
            }
        }

        let mut inspector = Inspector::new();
        let n = inspector.mount(
            None,
            &ui::slider(
                "n",
                shared(7_i32),
                Options::default().bounds(Accessor::constant(0_i32), Accessor::constant(10_i32)),
            ),
        );
        let s = inspector.mount(None, &ui::slider("s", shared(String::new()), Options::default()));
        let c = inspector.mount(
            None,
            &ui::slider("c", shared(Name { text: String::new() }), Options::default()),
        );
        let tree = inspector.tree();
        assert_eq!(kind_of(tree, n), ElementKind::Slider(SliderKind::Int));
        assert_eq!(kind_of(tree, s), ElementKind::Field(FieldKind::Text));
        assert_eq!(kind_of(tree, c), ElementKind::Group(GroupKind::Fold));
        assert_eq!(
            kind_of(tree, tree.children(c)[0]),
            ElementKind::Field(FieldKind::Text)
        );
    }

    #[test]
    fn self_describing_values_build_their_own_subtree() {
        struct Badge(String);
        impl Inspect for Badge {
            fn kind(acc: &Accessor<Self>) -> ValueKind {
                let acc = acc.clone();
                ValueKind::SelfDescribing(SelfDescribing::new(move |s, label| {
                    let text = acc.read(|b| b.0.clone()).unwrap_or_default();
                    let child = s.text(&text);
                    s.group(
                        Element::new(ElementKind::Group(GroupKind::Row)).with_optional_label(label),
                        [child],
                    )
                }))
            }
        }

        let mut inspector = Inspector::new();
        let id = inspector.mount(
            None,
            &ui::field("badge", shared(Badge("beta".into())), Options::default()),
        );
        let tree = inspector.tree();
        assert_eq!(kind_of(tree, id), ElementKind::Group(GroupKind::Row));
        assert_eq!(tree.get(id).unwrap().label.as_deref(), Some("badge"));
        assert_eq!(texts(tree, id), ["beta"]);
    }

    #[test]
    fn empty_composites_become_empty_groups() {
        struct Unit;
        impl Inspect for Unit {
            fn kind(acc: &Accessor<Self>) -> ValueKind {
                Composite::of(acc).build()
            }
        }
        let mut inspector = Inspector::new();
        let id = inspector.mount(None, &ui::field("unit", shared(Unit), Options::default()));
        assert!(inspector.tree().children(id).is_empty());
    }
}
