// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry overrides.
//!
//! Replace the editor of a type everywhere, then again for a single subtree, and restrict which
//! members of a record are shown.
//!
//! Run:
//! - `cargo run -p understory_demos --example inspector_overrides`

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_element::{Element, ElementId, ElementKind};
use understory_inspector::{
    Accessor, AnyAccessor, Composite, Inspect, Inspector, Options, Synth, Tree, TypeInfo,
    ValueKind, ui,
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Angle(f32);

impl Inspect for Angle {
    fn kind(acc: &Accessor<Self>) -> ValueKind {
        Composite::of(acc)
            .member("radians", |a| &a.0, |a| &mut a.0)
            .build()
    }
}

#[derive(Default)]
struct Camera {
    yaw: Angle,
    pitch: Angle,
    fov: f32,
    debug_id: u64,
}

impl Inspect for Camera {
    fn kind(acc: &Accessor<Self>) -> ValueKind {
        Composite::of(acc)
            .member("yaw", |c| &c.yaw, |c| &mut c.yaw)
            .member("pitch", |c| &c.pitch, |c| &mut c.pitch)
            .member("fov", |c| &c.fov, |c| &mut c.fov)
            .member("debug_id", |c| &c.debug_id, |c| &mut c.debug_id)
            .build()
    }
}

/// Show angles in degrees as a single read-only label.
fn degrees(s: &mut Synth<'_>, label: &str, value: &AnyAccessor) -> ElementId {
    let text = value
        .downcast::<Angle>()
        .and_then(|a| a.get().ok())
        .map(|a| format!("{:.1} deg", a.0.to_degrees()))
        .unwrap_or_default();
    s.leaf(
        Element::new(ElementKind::Label)
            .with_optional_label(label)
            .with_text(text),
    )
}

fn print_tree(tree: &Tree, id: ElementId, depth: usize) {
    let Some(element) = tree.get(id) else {
        return;
    };
    println!(
        "{:indent$}{:?} {:?} {}",
        "",
        element.kind,
        element.label.as_deref().unwrap_or(""),
        element.text.as_deref().unwrap_or(""),
        indent = depth * 2
    );
    for &child in tree.children(id) {
        print_tree(tree, child, depth + 1);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let camera = Rc::new(RefCell::new(Camera {
        yaw: Angle(0.5),
        pitch: Angle(-0.1),
        fov: 60.0,
        debug_id: 7,
    }));
    let camera = || Accessor::from_shared(camera.clone());

    let mut inspector = Inspector::new();
    let registry = inspector.registry().clone();
    registry.register_members(TypeInfo::of::<Camera>(), ["yaw", "pitch", "fov"]);
    registry.register_label(None, "fov", "Field of view");

    // Only the second panel shows angles in degrees.
    let scope = registry.scope_creation_fn(TypeInfo::of::<Angle>(), degrees);
    let root = inspector.mount(
        None,
        &ui::row([
            ui::field("raw", camera(), Options::default()),
            ui::scoped(
                scope.registry.clone(),
                ui::field("friendly", camera(), Options::default()),
            ),
        ]),
    );
    info!(elements = inspector.tree().descendants(root).len(), "panels mounted");
    print_tree(inspector.tree(), root, 0);
}
