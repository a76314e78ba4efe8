// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inspector-wide settings and per-field options.

use understory_element::Style;

use crate::inspect::AnyAccessor;

/// Settings shared by everything an [`Inspector`](crate::Inspector) builds.
#[derive(Clone, Debug, PartialEq)]
pub struct InspectorConfig {
    /// Text of the placeholder shown for absent values.
    pub null_text: String,
    /// Text of the placeholder shown where a reference cycle was cut. The type name is appended.
    pub circular_text: String,
    /// Text of the placeholder shown when [`InspectorConfig::max_depth`] is reached.
    pub depth_text: String,
    /// Deepest nesting of value fields before synthesis stops. Unbounded by default, since
    /// reference cycles are already cut by the cycle guard.
    pub max_depth: usize,
    /// Label prefix of list items; the item index is appended.
    pub item_label: String,
    /// Whether synthesized folds start open.
    pub folds_open: bool,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            null_text: "null".into(),
            circular_text: "circular reference detected".into(),
            depth_text: "max depth reached".into(),
            max_depth: usize::MAX,
            item_label: "Item".into(),
            folds_open: false,
        }
    }
}

impl InspectorConfig {
    /// Label of the list item at `index`.
    pub fn item_label(&self, index: usize) -> String {
        format!("{} {index}", self.item_label)
    }
}

/// Options of a single field, slider, or list.
#[derive(Clone, Debug)]
pub struct Options {
    /// List items can be reordered.
    pub reorderable: bool,
    /// List has no add/remove controls.
    pub fixed_size: bool,
    /// List shows its header row.
    pub show_header: bool,
    /// Text input commits on blur.
    pub delay_input: bool,
    /// Lower bound of a slider. For composite sliders, members are bounded member-wise.
    pub min: Option<AnyAccessor>,
    /// Upper bound of a slider.
    pub max: Option<AnyAccessor>,
    /// Style hints for the root element.
    pub style: Style,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            reorderable: false,
            fixed_size: false,
            show_header: true,
            delay_input: false,
            min: None,
            max: None,
            style: Style::default(),
        }
    }
}

impl Options {
    /// Allow list reordering.
    #[must_use]
    pub fn reorderable(mut self) -> Self {
        self.reorderable = true;
        self
    }

    /// Disallow adding and removing list items.
    #[must_use]
    pub fn fixed_size(mut self) -> Self {
        self.fixed_size = true;
        self
    }

    /// Hide the list header.
    #[must_use]
    pub fn without_header(mut self) -> Self {
        self.show_header = false;
        self
    }

    /// Commit text input on blur.
    #[must_use]
    pub fn delay_input(mut self) -> Self {
        self.delay_input = true;
        self
    }

    /// Slider bounds read from accessors.
    #[must_use]
    pub fn bounds(mut self, min: impl Into<AnyAccessor>, max: impl Into<AnyAccessor>) -> Self {
        self.min = Some(min.into());
        self.max = Some(max.into());
        self
    }

    /// Set the style of the root element.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Options inherited by nested values: input behavior only.
    pub(crate) fn nested(&self) -> Self {
        Self {
            delay_input: self.delay_input,
            ..Self::default()
        }
    }
}
