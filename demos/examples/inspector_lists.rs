// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collection binding.
//!
//! Show a list of waypoints, reorder it, and grow it from both the UI and the data side.
//!
//! Run:
//! - `cargo run -p understory_demos --example inspector_lists`

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_element::ElementId;
use understory_inspector::{Accessor, Composite, Inspect, Inspector, Options, ValueKind, ui};

#[derive(Clone, Default)]
struct Waypoint {
    name: String,
    x: f32,
    y: f32,
}

impl Inspect for Waypoint {
    fn create_default() -> Option<Self> {
        Some(Self {
            name: "new".into(),
            ..Self::default()
        })
    }

    fn kind(acc: &Accessor<Self>) -> ValueKind {
        Composite::of(acc)
            .member("name", |w| &w.name, |w| &mut w.name)
            .member("x", |w| &w.x, |w| &mut w.x)
            .member("y", |w| &w.y, |w| &mut w.y)
            .single_line()
            .build()
    }
}

fn print_items(inspector: &Inspector, list: ElementId, route: &RefCell<Vec<Waypoint>>) {
    let tree = inspector.tree();
    for (&item, waypoint) in tree.children(list).iter().zip(route.borrow().iter()) {
        let label = tree
            .get(item)
            .and_then(|e| e.label.clone())
            .unwrap_or_default();
        println!("  {label}: {} ({}, {})", waypoint.name, waypoint.x, waypoint.y);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let route = Rc::new(RefCell::new(vec![
        Waypoint {
            name: "start".into(),
            x: 0.0,
            y: 0.0,
        },
        Waypoint {
            name: "ridge".into(),
            x: 4.0,
            y: 2.0,
        },
        Waypoint {
            name: "camp".into(),
            x: 9.0,
            y: 1.0,
        },
    ]));

    let mut inspector = Inspector::new();
    let list = inspector.mount(
        None,
        &ui::list(
            "route",
            Accessor::from_shared(route.clone()),
            Options::default().reorderable(),
        ),
    );
    println!("-- initial");
    print_items(&inspector, list, &route);

    inspector
        .move_item(list, 2, 0)
        .expect("the list is reorderable");
    println!("-- camp moved to the front");
    print_items(&inspector, list, &route);

    let added = inspector.add_item(list).expect("waypoints have a default");
    info!(?added, len = route.borrow().len(), "waypoint added");
    println!("-- added {added:?} from the UI");
    print_items(&inspector, list, &route);

    route.borrow_mut().truncate(2);
    let rebuilt = inspector.poll();
    let destroyed: usize = rebuilt.iter().map(|r| r.removed.len()).sum();
    info!(len = route.borrow().len(), destroyed, "route reconciled");
    println!("-- data truncated, {destroyed} element(s) destroyed");
    print_items(&inspector, list, &route);
}
