// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative UI building.
//!
//! Factories return [`Template`]s: deferred builders that produce a detached element subtree when
//! mounted with [`Inspector::mount`](crate::Inspector::mount) or built inside another template.
//! A template can be built any number of times; value factories re-run synthesis each time.

use std::fmt;
use std::rc::Rc;

use understory_element::{Element, ElementFlags, ElementId, ElementKind, GroupKind, Style};

use crate::config::Options;
use crate::inspect::AnyAccessor;
use crate::registry::Registry;
use crate::synth::Synth;

/// A deferred element builder.
#[derive(Clone)]
pub struct Template(Rc<dyn Fn(&mut Synth<'_>) -> ElementId>);

impl Template {
    /// Wrap a build function. It must return a detached root.
    pub fn new(build: impl Fn(&mut Synth<'_>) -> ElementId + 'static) -> Self {
        Self(Rc::new(build))
    }

    /// Build the subtree.
    pub fn build(&self, synth: &mut Synth<'_>) -> ElementId {
        (self.0)(synth)
    }

    /// Apply `style` to the root element.
    #[must_use]
    pub fn styled(self, style: Style) -> Self {
        Self::new(move |s| {
            let id = self.build(s);
            if let Some(element) = s.tree_mut().get_mut(id) {
                element.style = style.clone();
            }
            id
        })
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template").finish_non_exhaustive()
    }
}

/// The editor for a value, chosen from its type.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use understory_element::{ElementKind, FieldKind};
/// use understory_inspector::{Accessor, Inspector, Options, ui};
///
/// let speed = Rc::new(RefCell::new(2.5_f32));
/// let mut inspector = Inspector::new();
/// let id = inspector.mount(
///     None,
///     &ui::field("speed", Accessor::from_shared(speed), Options::default()),
/// );
/// assert_eq!(
///     inspector.tree().get(id).unwrap().kind,
///     ElementKind::Field(FieldKind::Float)
/// );
/// ```
pub fn field(label: &str, accessor: impl Into<AnyAccessor>, options: Options) -> Template {
    let label = label.to_owned();
    let accessor = accessor.into();
    Template::new(move |s| s.field(&label, &accessor, &options))
}

/// A slider for a number, or per-member sliders for a composite.
///
/// Bounds come from [`Options::min`]/[`Options::max`] or from member range metadata.
pub fn slider(label: &str, accessor: impl Into<AnyAccessor>, options: Options) -> Template {
    let label = label.to_owned();
    let accessor = accessor.into();
    Template::new(move |s| s.slider(&label, &accessor, &options))
}

/// The editor for a collection.
///
/// Same as [`field`]; the name documents intent at the call site.
pub fn list(label: &str, accessor: impl Into<AnyAccessor>, options: Options) -> Template {
    field(label, accessor, options)
}

/// Static text.
pub fn label(text: &str) -> Template {
    let text = text.to_owned();
    Template::new(move |s| s.text(&text))
}

/// A button running `on_click` when clicked.
pub fn button(label: &str, on_click: impl Fn() + 'static) -> Template {
    let label = label.to_owned();
    let on_click = Rc::new(on_click);
    Template::new(move |s| {
        let on_click = on_click.clone();
        s.button(&label, move || on_click())
    })
}

fn container(element: Element<crate::Binding>, children: Vec<Template>) -> Template {
    Template::new(move |s| {
        let ids: Vec<ElementId> = children.iter().map(|c| c.build(s)).collect();
        s.group(element.clone(), ids)
    })
}

/// Children side by side.
pub fn row(children: impl IntoIterator<Item = Template>) -> Template {
    container(
        Element::new(ElementKind::Group(GroupKind::Row)),
        children.into_iter().collect(),
    )
}

/// Children stacked vertically.
pub fn column(children: impl IntoIterator<Item = Template>) -> Template {
    container(
        Element::new(ElementKind::Group(GroupKind::Column)),
        children.into_iter().collect(),
    )
}

/// A collapsible block, closed initially.
pub fn fold(label: &str, children: impl IntoIterator<Item = Template>) -> Template {
    container(
        Element::new(ElementKind::Group(GroupKind::Fold)).with_label(label),
        children.into_iter().collect(),
    )
}

/// A top-level window, open initially.
pub fn window(title: &str, children: impl IntoIterator<Item = Template>) -> Template {
    container(
        Element::new(ElementKind::Group(GroupKind::Window))
            .with_label(title)
            .with_flags(ElementFlags::OPEN),
        children.into_iter().collect(),
    )
}

/// A tab strip with one page per `(title, content)` pair. The first page is selected.
pub fn tabs<'a>(pages: impl IntoIterator<Item = (&'a str, Template)>) -> Template {
    let pages: Vec<Template> = pages
        .into_iter()
        .map(|(title, content)| {
            container(
                Element::new(ElementKind::Group(GroupKind::Tab)).with_label(title),
                vec![content],
            )
        })
        .collect();
    container(Element::new(ElementKind::Group(GroupKind::Tabs)), pages)
}

/// Content rebuilt whenever `read` returns a different status.
pub fn dynamic<S: PartialEq + 'static>(
    read: impl Fn() -> S + 'static,
    build: impl Fn(&S) -> Template + 'static,
) -> Template {
    let read = Rc::new(read);
    let build = Rc::new(build);
    Template::new(move |s| {
        let (read, build) = (read.clone(), build.clone());
        s.dynamic("", move || read(), move |s, _, status| build(status).build(s))
    })
}

/// `child` built with `registry` in effect, e.g. the registry of a [`Scope`](crate::Scope).
pub fn scoped(registry: Registry, child: Template) -> Template {
    Template::new(move |s| s.with_registry(registry.clone(), |s| child.build(s)))
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use understory_element::FieldKind;

    use super::*;
    use crate::{Accessor, Inspector, InspectError};

    #[test]
    fn containers_adopt_children_in_order() {
        let mut inspector = Inspector::new();
        let root = inspector.mount(
            None,
            &window("Inspector", [label("a"), row([label("b"), label("c")])]),
        );
        let tree = inspector.tree();
        assert!(tree.get(root).unwrap().is_open());
        let children = tree.children(root);
        assert_eq!(children.len(), 2);
        assert_eq!(tree.get(children[0]).unwrap().text.as_deref(), Some("a"));
        assert_eq!(tree.children(children[1]).len(), 2);
        assert_eq!(tree.roots(), vec![root]);
    }

    #[test]
    fn buttons_and_tabs_respond_to_input() {
        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        let mut inspector = Inspector::new();
        let strip = inspector.mount(
            None,
            &tabs([
                ("one", button("press", move || c.set(c.get() + 1))),
                ("two", label("second")),
            ]),
        );
        let page = inspector.tree().children(strip)[0];
        let press = inspector.tree().children(page)[0];
        inspector.click(press).unwrap();
        inspector.click(press).unwrap();
        assert_eq!(clicks.get(), 2);
        assert_eq!(inspector.click(page), Err(InspectError::NotAButton(page)));

        inspector.select_tab(strip, 1).unwrap();
        assert_eq!(inspector.tree().get(strip).unwrap().selected, 1);
        assert!(inspector.select_tab(strip, 2).is_err());
        assert_eq!(inspector.select_tab(page, 0), Err(InspectError::NotTabs(page)));
    }

    #[test]
    fn styled_templates_style_their_root() {
        let style = Style {
            min_size: Some(kurbo::Size::new(120.0, 20.0)),
            ..Style::default()
        };
        let value = Rc::new(RefCell::new(true));
        let mut inspector = Inspector::new();
        let id = inspector.mount(
            None,
            &field("on", Accessor::from_shared(value), Options::default()).styled(style.clone()),
        );
        let element = inspector.tree().get(id).unwrap();
        assert_eq!(element.kind, ElementKind::Field(FieldKind::Bool));
        assert_eq!(element.style, style);
    }

    #[test]
    fn mounting_under_a_parent_attaches() {
        let mut inspector = Inspector::new();
        let window = inspector.mount(None, &window("w", []));
        let child = inspector.mount(Some(window), &label("late"));
        assert_eq!(inspector.tree().children(window), &[child]);
        let removed = inspector.unmount(window);
        assert_eq!(removed, vec![window, child]);
        assert!(inspector.tree().is_empty());
    }
}
