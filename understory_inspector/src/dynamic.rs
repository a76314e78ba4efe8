// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic elements: subtrees rebuilt when an observed status changes.
//!
//! A dynamic element is a [`ElementKind::Dynamic`] node with at most one child. Its rebuild
//! logic lives in a side table keyed by the node's id, together with the synthesis context it
//! was created in, so a rebuild sees the same registry layers and cycle path as the first build.

use tracing::{debug, trace};
use understory_element::{Element, ElementId, ElementKind};

use crate::inspect::AnyAccessor;
use crate::inspector::Rebuilt;
use crate::synth::{Context, Synth, Tables, Tree};

/// Rebuild policy of a dynamic element.
pub(crate) trait Rebuild {
    /// Returns true if the subtree must be rebuilt. Called once per poll.
    fn changed(&mut self, tree: &Tree, current: Option<ElementId>) -> bool;

    /// Build a fresh detached subtree.
    fn build(&self, synth: &mut Synth<'_>, label: &str) -> ElementId;
}

/// Rebuilds when a read status value differs from the one the subtree was built for.
struct StatusRebuild<S, R, B> {
    read: R,
    build: B,
    status: S,
}

impl<S, R, B> Rebuild for StatusRebuild<S, R, B>
where
    S: PartialEq,
    R: Fn() -> S,
    B: Fn(&mut Synth<'_>, &str, &S) -> ElementId,
{
    fn changed(&mut self, _: &Tree, _: Option<ElementId>) -> bool {
        let status = (self.read)();
        if status == self.status {
            return false;
        }
        self.status = status;
        true
    }

    fn build(&self, synth: &mut Synth<'_>, label: &str) -> ElementId {
        (self.build)(synth, label, &self.status)
    }
}

/// Rebuilds whenever a predicate over the current subtree holds.
struct EdgeRebuild<P, B> {
    predicate: P,
    build: B,
}

impl<P, B> Rebuild for EdgeRebuild<P, B>
where
    P: Fn(&Tree, Option<ElementId>) -> bool,
    B: Fn(&mut Synth<'_>) -> ElementId,
{
    fn changed(&mut self, tree: &Tree, current: Option<ElementId>) -> bool {
        (self.predicate)(tree, current)
    }

    fn build(&self, synth: &mut Synth<'_>, _: &str) -> ElementId {
        (self.build)(synth)
    }
}

pub(crate) struct DynamicState {
    rebuild: Box<dyn Rebuild>,
    ctx: Context,
}

impl Synth<'_> {
    /// A subtree rebuilt whenever `read` returns a status different from the last one.
    ///
    /// `build` runs immediately and again on each change, receiving the node's current label and
    /// the new status. Nothing is rebuilt while the status stays equal.
    pub fn dynamic<S: PartialEq + 'static>(
        &mut self,
        label: &str,
        read: impl Fn() -> S + 'static,
        build: impl Fn(&mut Synth<'_>, &str, &S) -> ElementId + 'static,
    ) -> ElementId {
        let status = read();
        self.install(label, Box::new(StatusRebuild { read, build, status }))
    }

    /// A subtree rebuilt on every poll where `predicate` holds.
    ///
    /// The predicate sees the tree and the currently built child.
    pub fn dynamic_edge(
        &mut self,
        predicate: impl Fn(&Tree, Option<ElementId>) -> bool + 'static,
        build: impl Fn(&mut Synth<'_>) -> ElementId + 'static,
    ) -> ElementId {
        self.install("", Box::new(EdgeRebuild { predicate, build }))
    }

    /// Show a placeholder while `nullable`'s value is absent and `build`'s subtree otherwise.
    ///
    /// Switches in both directions as the value changes between polls.
    pub fn null_guard(
        &mut self,
        label: &str,
        nullable: &AnyAccessor,
        build: impl Fn(&mut Synth<'_>, &str) -> ElementId + 'static,
    ) -> ElementId {
        let probe = nullable.clone();
        self.dynamic(
            label,
            move || probe.is_null(),
            move |s, label, &is_null| {
                if is_null {
                    let text = s.ctx.config.null_text.clone();
                    s.placeholder(label, &text)
                } else {
                    build(s, label)
                }
            },
        )
    }

    fn install(&mut self, label: &str, rebuild: Box<dyn Rebuild>) -> ElementId {
        let child = rebuild.build(self, label);
        let id = self
            .tree
            .insert(None, Element::new(ElementKind::Dynamic).with_optional_label(label));
        self.tree.attach(id, child);
        self.tables.dynamics.insert(
            id,
            DynamicState {
                rebuild,
                ctx: self.ctx.clone(),
            },
        );
        trace!(?id, label, "dynamic element built");
        id
    }
}

/// Rebuild the dynamic element `id` if its status changed.
pub(crate) fn poll_dynamic(
    tree: &mut Tree,
    tables: &mut Tables,
    id: ElementId,
) -> Option<Rebuilt> {
    let mut state = tables.dynamics.remove(&id)?;
    let current = tree.children(id).first().copied();
    if !state.rebuild.changed(tree, current) {
        tables.dynamics.insert(id, state);
        return None;
    }
    let removed = current.map(|c| tree.remove(c)).unwrap_or_default();
    tables.purge(&removed);
    let label = tree
        .get(id)
        .and_then(|e| e.label.clone())
        .unwrap_or_default();
    let child = {
        let mut synth = Synth::resume(tree, tables, state.ctx.clone());
        state.rebuild.build(&mut synth, &label)
    };
    tree.attach(id, child);
    debug!(?id, removed = removed.len(), "dynamic element rebuilt");
    tables.dynamics.insert(id, state);
    Some(Rebuilt {
        element: id,
        removed,
        added: vec![child],
    })
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use understory_element::ElementFlags;

    use super::*;
    use crate::{Accessor, Binding, Inspector, Options, ui};

    #[test]
    fn status_changes_drive_rebuilds() {
        let status = Rc::new(Cell::new(0_u8));
        let builds = Rc::new(Cell::new(0_usize));
        let mut inspector = Inspector::new();
        let (s, b) = (status.clone(), builds.clone());
        let root = inspector.mount(
            None,
            &ui::dynamic(
                move || s.get(),
                move |v| {
                    b.set(b.get() + 1);
                    ui::label(&format!("status {v}"))
                },
            ),
        );
        assert_eq!(builds.get(), 1);

        let mut rebuilds = 0;
        for next in [0, 0, 1, 0] {
            status.set(next);
            rebuilds += inspector.poll().len();
        }
        assert_eq!(rebuilds, 2);
        assert_eq!(builds.get(), 3);

        let child = inspector.tree().children(root)[0];
        assert_eq!(
            inspector.tree().get(child).unwrap().text.as_deref(),
            Some("status 0")
        );
    }

    #[test]
    fn rebuild_replaces_the_single_child() {
        let flag = Rc::new(Cell::new(false));
        let mut inspector = Inspector::new();
        let f = flag.clone();
        let root = inspector.mount(
            None,
            &ui::dynamic(move || f.get(), |on| {
                if *on {
                    ui::column([ui::label("a"), ui::label("b")])
                } else {
                    ui::label("off")
                }
            }),
        );
        let before = inspector.tree().children(root)[0];
        flag.set(true);
        let rebuilt = inspector.poll();
        assert_eq!(rebuilt.len(), 1);
        assert_eq!(rebuilt[0].removed, vec![before]);
        assert!(!inspector.tree().is_alive(before));
        assert_eq!(inspector.tree().children(root).len(), 1);
        let column = inspector.tree().children(root)[0];
        assert_eq!(inspector.tree().children(column).len(), 2);
    }

    #[test]
    fn edge_triggered_rebuilds_follow_the_predicate() {
        let mut inspector = Inspector::new();
        let root = inspector.mount(
            None,
            &ui::Template::new(|s| {
                s.dynamic_edge(
                    // Rebuild while the current child is closed.
                    |tree, current| current.and_then(|c| tree.get(c)).is_some_and(|e| !e.is_open()),
                    |s| {
                        let e = understory_element::Element::new(ElementKind::Group(
                            understory_element::GroupKind::Fold,
                        ))
                        .with_label("edge");
                        s.leaf(e)
                    },
                )
            }),
        );
        assert_eq!(inspector.poll().len(), 1);
        let child = inspector.tree().children(root)[0];
        inspector.set_open(child, true);
        assert!(inspector.poll().is_empty());
    }

    #[test]
    fn null_guard_switches_both_ways() {
        let cell = Rc::new(RefCell::new(None::<i32>));
        let mut inspector = Inspector::new();
        let root = inspector.mount(
            None,
            &ui::field("value", Accessor::from_shared(cell.clone()), Options::default()),
        );
        let shown = |inspector: &Inspector| {
            let child = inspector.tree().children(root)[0];
            inspector.tree().get(child).unwrap().clone()
        };
        let placeholder = shown(&inspector);
        assert_eq!(placeholder.kind, ElementKind::Label);
        assert_eq!(placeholder.text.as_deref(), Some("null"));
        assert!(!placeholder.flags.contains(ElementFlags::ENABLED));

        *cell.borrow_mut() = Some(3);
        assert_eq!(inspector.poll().len(), 1);
        let field = shown(&inspector);
        assert_eq!(
            field.kind,
            ElementKind::Field(understory_element::FieldKind::Int)
        );
        assert_eq!(field.label.as_deref(), Some("value"));
        let Some(Binding::Value(crate::Primitive::Int(acc))) = field.link else {
            panic!("expected an int binding");
        };
        acc.set(8).unwrap();
        assert_eq!(*cell.borrow(), Some(8));

        *cell.borrow_mut() = None;
        assert_eq!(inspector.poll().len(), 1);
        assert_eq!(shown(&inspector).kind, ElementKind::Label);
        assert!(inspector.poll().is_empty());
    }
}
