// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the element tree: identifiers, flags, node kinds, and style hints.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Insets, Size};

/// Identifier for an element in the tree.
///
/// This is a small, copyable handle that stays stable while the element is alive
/// but becomes invalid when the element is removed.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `ElementId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `ElementId`.
///
/// Renderers typically key their materialized widgets by `ElementId`. Because stale ids never
/// alias a live element, a renderer that missed a [`Change::Removed`](crate::Change::Removed)
/// can still detect the staleness with [`ElementTree::is_alive`](crate::ElementTree::is_alive).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// The generation of this identifier's slot.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Element flags controlling interaction and presentation hints.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u16 {
        /// Element is enabled. Disabled elements are drawn greyed out.
        const ENABLED      = 0b0000_0000_0001;
        /// Element accepts user input.
        const INTERACTABLE = 0b0000_0000_0010;
        /// Fold or window is expanded.
        const OPEN         = 0b0000_0000_0100;
        /// Text field spans multiple lines.
        const MULTILINE    = 0b0000_0000_1000;
        /// Text input commits on blur instead of per keystroke.
        const DELAY_INPUT  = 0b0000_0001_0000;
        /// List items can be reordered by dragging.
        const REORDERABLE  = 0b0000_0010_0000;
        /// List length is fixed; no add/remove controls.
        const FIXED_SIZE   = 0b0000_0100_0000;
        /// List shows a header row with its label and size.
        const SHOW_HEADER  = 0b0000_1000_0000;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::ENABLED | Self::INTERACTABLE
    }
}

/// Leaf kinds for editable fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Checkbox.
    Bool,
    /// Integer input.
    Int,
    /// Floating-point input.
    Float,
    /// Text input. See [`ElementFlags::MULTILINE`].
    Text,
    /// Color swatch/picker.
    Color,
}

/// Leaf kinds for sliders.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SliderKind {
    /// Integer slider.
    Int,
    /// Floating-point slider.
    Float,
}

/// Container kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Vertical stack.
    Column,
    /// Horizontal stack.
    Row,
    /// Collapsible block with a header. See [`ElementFlags::OPEN`].
    Fold,
    /// Top-level floating window.
    Window,
    /// Tab strip; children are [`GroupKind::Tab`] pages and [`Element::selected`] is the active one.
    Tabs,
    /// A single tab page.
    Tab,
}

/// The kind of an element, as consumed by a renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// Editable value field.
    Field(FieldKind),
    /// Bounded numeric slider.
    Slider(SliderKind),
    /// Choice among named options; [`Element::selected`] mirrors the bound index.
    Dropdown {
        /// Option names in index order.
        options: Vec<String>,
    },
    /// A bound collection; children are the per-item elements in index order.
    List,
    /// A compact single-line row of member elements.
    Composite,
    /// Static or bound text.
    Label,
    /// Clickable button.
    Button,
    /// Layout container.
    Group(GroupKind),
    /// A subtree that is discarded and rebuilt when its status changes.
    ///
    /// Has at most one child: the currently built subtree.
    Dynamic,
}

impl ElementKind {
    /// Returns true for kinds that never have children.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Field(_) | Self::Slider(_) | Self::Dropdown { .. } | Self::Label | Self::Button
        )
    }
}

/// A straight RGBA color with `f32` components in `0.0..=1.0`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Create a color from components.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Size, spacing, and color hints for the renderer.
///
/// All fields are hints; a renderer may ignore any of them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    /// Minimum size.
    pub min_size: Option<Size>,
    /// Maximum size.
    pub max_size: Option<Size>,
    /// Inner padding.
    pub padding: Insets,
    /// Tint or background color.
    pub color: Option<Color>,
}

/// A node in the element tree.
///
/// `L` is the link payload; leaves bound to a value carry one.
#[derive(Clone, Debug)]
pub struct Element<L> {
    /// What the element is.
    pub kind: ElementKind,
    /// Display label, if any.
    pub label: Option<String>,
    /// Static content of labels and placeholders.
    pub text: Option<String>,
    /// Interaction and presentation flags.
    pub flags: ElementFlags,
    /// Style hints.
    pub style: Style,
    /// Selected index for dropdowns and tab strips.
    pub selected: usize,
    /// Link to the displayed value.
    pub link: Option<L>,
}

impl<L> Element<L> {
    /// Create an element of `kind` with default flags and no label.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            label: None,
            text: None,
            flags: ElementFlags::default(),
            style: Style::default(),
            selected: 0,
            link: None,
        }
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the label if `label` is non-empty.
    #[must_use]
    pub fn with_optional_label(mut self, label: &str) -> Self {
        if !label.is_empty() {
            self.label = Some(label.into());
        }
        self
    }

    /// Set the static text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add flags.
    #[must_use]
    pub fn with_flags(mut self, flags: ElementFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Clear [`ElementFlags::ENABLED`] and [`ElementFlags::INTERACTABLE`].
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.flags
            .remove(ElementFlags::ENABLED | ElementFlags::INTERACTABLE);
        self
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the link payload.
    #[must_use]
    pub fn with_link(mut self, link: L) -> Self {
        self.link = Some(link);
        self
    }

    /// Returns true if the element is enabled.
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ElementFlags::ENABLED)
    }

    /// Returns true if the element is a fold/window and is open.
    pub fn is_open(&self) -> bool {
        self.flags.contains(ElementFlags::OPEN)
    }
}
