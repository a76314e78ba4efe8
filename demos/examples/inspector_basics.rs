// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inspector basics.
//!
//! Inspect a small scene graph with a back reference, edit a value through a binding, and watch
//! a null guard swap its subtree.
//!
//! Run:
//! - `RUST_LOG=understory_inspector=debug cargo run -p understory_demos --example inspector_basics`

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_element::{Color, ElementId};
use understory_inspector::{
    Accessor, Binding, Composite, EnumBinding, Inspect, InspectEnum, Inspector, MemberMeta,
    Options, Primitive, Tree, ValueKind, ui,
};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Kind {
    Point,
    Spot,
}

impl InspectEnum for Kind {
    const VARIANTS: &'static [&'static str] = &["Point", "Spot"];

    fn index(&self) -> usize {
        *self as usize
    }

    fn from_index(index: usize) -> Option<Self> {
        [Self::Point, Self::Spot].get(index).copied()
    }
}

impl Inspect for Kind {
    fn kind(acc: &Accessor<Self>) -> ValueKind {
        ValueKind::Enum(EnumBinding::of(acc))
    }
}

struct Light {
    name: String,
    kind: Kind,
    color: Color,
    intensity: f32,
    parent: Option<Rc<RefCell<Node>>>,
}

impl Inspect for Light {
    fn kind(acc: &Accessor<Self>) -> ValueKind {
        Composite::of(acc)
            .member("name", |l| &l.name, |l| &mut l.name)
            .member("kind", |l| &l.kind, |l| &mut l.kind)
            .member("color", |l| &l.color, |l| &mut l.color)
            .member_with("intensity", MemberMeta::range(0.0, 10.0), |l| &l.intensity, |l| {
                &mut l.intensity
            })
            .member("parent", |l| &l.parent, |l| &mut l.parent)
            .build()
    }
}

struct Node {
    name: String,
    light: Option<Rc<RefCell<Light>>>,
}

impl Inspect for Node {
    fn kind(acc: &Accessor<Self>) -> ValueKind {
        Composite::of(acc)
            .member("name", |n| &n.name, |n| &mut n.name)
            .member("light", |n| &n.light, |n| &mut n.light)
            .build()
    }
}

fn describe(binding: &Binding) -> String {
    let value = match binding {
        Binding::Index(i) => return format!("#{}", i.get().unwrap_or_default()),
        Binding::Value(v) | Binding::Slider { value: v, .. } => v,
    };
    let shown = match value {
        Primitive::Bool(a) => a.get().map(|v| v.to_string()),
        Primitive::Int(a) => a.get().map(|v| v.to_string()),
        Primitive::Float(a) => a.get().map(|v| format!("{v:.2}")),
        Primitive::Text(a) => a.get().map(|v| format!("{v:?}")),
        Primitive::Color(a) => a.get().map(|v| format!("{v:?}")),
    };
    shown.unwrap_or_else(|e| format!("<{e}>"))
}

fn print_tree(tree: &Tree, id: ElementId, depth: usize) {
    let Some(element) = tree.get(id) else {
        return;
    };
    let mut line = format!("{:indent$}{:?}", "", element.kind, indent = depth * 2);
    if let Some(label) = &element.label {
        line.push_str(&format!(" {label:?}"));
    }
    if let Some(text) = &element.text {
        line.push_str(&format!(" [{text}]"));
    }
    if let Some(binding) = &element.link {
        line.push_str(&format!(" = {}", describe(binding)));
    }
    println!("{line}");
    for &child in tree.children(id) {
        print_tree(tree, child, depth + 1);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let node = Rc::new(RefCell::new(Node {
        name: "lamp".into(),
        light: None,
    }));
    let light = Rc::new(RefCell::new(Light {
        name: "key".into(),
        kind: Kind::Spot,
        color: Color::WHITE,
        intensity: 2.5,
        parent: Some(node.clone()),
    }));
    node.borrow_mut().light = Some(light.clone());

    let mut inspector = Inspector::new();
    let window = inspector.mount(
        None,
        &ui::window(
            "Scene",
            [
                ui::label("Selected node"),
                ui::field("node", Accessor::constant(node.clone()), Options::default()),
            ],
        ),
    );
    let initial = inspector.commit();
    info!(changes = initial.changes.len(), epoch = inspector.tree().epoch(), "scene mounted");
    println!("-- initial");
    print_tree(inspector.tree(), window, 0);

    light.borrow_mut().intensity = 7.0;
    println!("-- intensity changed, no structural change: {}", inspector.poll().is_empty());

    // Detaching the light swaps its subtree for the null placeholder.
    node.borrow_mut().light = None;
    let rebuilt = inspector.poll();
    let changes = inspector.commit();
    info!(rebuilt = rebuilt.len(), epoch = inspector.tree().epoch(), "light detached");
    println!(
        "-- light removed: {} rebuild(s), {} element(s) destroyed",
        rebuilt.len(),
        changes.removed().count()
    );
    print_tree(inspector.tree(), window, 0);

    light.borrow_mut().parent = None;
}
