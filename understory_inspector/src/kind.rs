// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value kinds: the closed set of shapes synthesis dispatches on.

use std::cell::Cell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use understory_element::{Color, ElementId};

use crate::accessor::Accessor;
use crate::error::AccessError;
use crate::inspect::{AnyAccessor, Inspect, ObjectId, TypeInfo};
use crate::synth::Synth;

/// How a value is presented.
///
/// Synthesis matches on this exhaustively; there is no fallback arm.
#[derive(Clone, Debug)]
pub enum ValueKind {
    /// A leaf value edited in place.
    Primitive(Primitive),
    /// One of a fixed set of named variants.
    Enum(EnumBinding),
    /// A value that may be absent.
    Nullable(NullableBinding),
    /// A value that builds its own elements.
    SelfDescribing(SelfDescribing),
    /// An ordered, indexable collection.
    Collection(ListBinding),
    /// A record of named members.
    Composite(Composite),
}

/// Leaf values, normalized to one accessor type per editor.
#[derive(Clone, Debug)]
pub enum Primitive {
    /// Checkbox.
    Bool(Accessor<bool>),
    /// Any integer type, viewed as `i64`.
    Int(Accessor<i64>),
    /// Any float type, viewed as `f64`.
    Float(Accessor<f64>),
    /// Text.
    Text(Accessor<String>),
    /// Color.
    Color(Accessor<Color>),
}

impl Primitive {
    /// Returns true for integers and floats.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// The value as an `f64`, for numeric primitives.
    pub fn as_f64(&self) -> Option<Accessor<f64>> {
        match self {
            Self::Int(a) => Some(a.cast()),
            Self::Float(a) => Some(a.clone()),
            Self::Bool(_) | Self::Text(_) | Self::Color(_) => None,
        }
    }
}

/// A fieldless enum the inspector can offer as a dropdown.
pub trait InspectEnum: Sized + 'static {
    /// Variant names in index order.
    const VARIANTS: &'static [&'static str];

    /// Index of this variant in [`InspectEnum::VARIANTS`].
    fn index(&self) -> usize;

    /// The variant at `index`.
    fn from_index(index: usize) -> Option<Self>;
}

/// An enum value viewed as a variant index.
#[derive(Clone, Debug)]
pub struct EnumBinding {
    /// Variant names in index order.
    pub variants: &'static [&'static str],
    /// The selected index. Out-of-range writes are ignored.
    pub index: Accessor<usize>,
}

impl EnumBinding {
    /// Bind an [`InspectEnum`] value.
    pub fn of<E: InspectEnum>(accessor: &Accessor<E>) -> Self {
        Self {
            variants: E::VARIANTS,
            index: accessor.map(E::index, |i, e| {
                if let Some(v) = E::from_index(i) {
                    *e = v;
                }
            }),
        }
    }
}

/// An optional value with its unwrapped view.
#[derive(Clone, Debug)]
pub struct NullableBinding {
    /// The optional value itself.
    pub outer: AnyAccessor,
    /// The contents. Reads fail while the value is absent.
    pub inner: AnyAccessor,
}

/// Build function of a [`SelfDescribing`] value.
pub type BuildFn = Rc<dyn Fn(&mut Synth<'_>, &str) -> ElementId>;

/// A value that supplies its own element subtree.
#[derive(Clone)]
pub struct SelfDescribing(pub(crate) BuildFn);

impl SelfDescribing {
    /// Wrap a build function. It receives the field label and returns a detached root.
    pub fn new(build: impl Fn(&mut Synth<'_>, &str) -> ElementId + 'static) -> Self {
        Self(Rc::new(build))
    }
}

impl fmt::Debug for SelfDescribing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelfDescribing").finish_non_exhaustive()
    }
}

/// Presentation hints attached to a composite member.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemberMeta {
    /// Inclusive numeric range. Members with a range are shown as sliders.
    pub range: Option<(f64, f64)>,
    /// Text members span multiple lines.
    pub multiline: bool,
    /// Collection members can be reordered.
    pub reorderable: bool,
}

impl MemberMeta {
    /// A numeric range.
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            range: Some((min, max)),
            ..Self::default()
        }
    }

    /// Multi-line text.
    pub fn multiline() -> Self {
        Self {
            multiline: true,
            ..Self::default()
        }
    }

    /// Reorderable collection.
    pub fn reorderable() -> Self {
        Self {
            reorderable: true,
            ..Self::default()
        }
    }
}

/// A named member of a [`Composite`].
#[derive(Clone, Debug)]
pub struct Member {
    /// Member name, used as the default label.
    pub name: String,
    /// Presentation hints.
    pub meta: MemberMeta,
    /// Access to the member value.
    pub accessor: AnyAccessor,
}

/// A record of named members, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Composite {
    members: Vec<Member>,
    single_line: bool,
}

impl Composite {
    /// Start describing the members of the value behind `accessor`.
    pub fn of<T: 'static>(accessor: &Accessor<T>) -> CompositeBuilder<T> {
        CompositeBuilder {
            accessor: accessor.clone(),
            composite: Self::default(),
        }
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// The member called `name`.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Returns true if members are laid out on one row.
    pub fn is_single_line(&self) -> bool {
        self.single_line
    }
}

/// Builder returned by [`Composite::of`].
#[derive(Debug)]
pub struct CompositeBuilder<T> {
    accessor: Accessor<T>,
    composite: Composite,
}

impl<T: 'static> CompositeBuilder<T> {
    /// Add a member projected out of the value.
    #[must_use]
    pub fn member<M: Inspect>(
        self,
        name: &str,
        get: impl Fn(&T) -> &M + 'static,
        get_mut: impl Fn(&mut T) -> &mut M + 'static,
    ) -> Self {
        self.member_with(name, MemberMeta::default(), get, get_mut)
    }

    /// Add a member with presentation hints.
    #[must_use]
    pub fn member_with<M: Inspect>(
        self,
        name: &str,
        meta: MemberMeta,
        get: impl Fn(&T) -> &M + 'static,
        get_mut: impl Fn(&mut T) -> &mut M + 'static,
    ) -> Self {
        let accessor = self.accessor.member(get, get_mut);
        self.computed(name, meta, accessor)
    }

    /// Add a member backed by an arbitrary accessor, e.g. a derived property.
    #[must_use]
    pub fn computed(
        mut self,
        name: &str,
        meta: MemberMeta,
        accessor: impl Into<AnyAccessor>,
    ) -> Self {
        self.composite.members.push(Member {
            name: name.to_owned(),
            meta,
            accessor: accessor.into(),
        });
        self
    }

    /// Lay members out on a single row instead of a fold.
    #[must_use]
    pub fn single_line(mut self) -> Self {
        self.composite.single_line = true;
        self
    }

    /// Finish.
    pub fn build(self) -> ValueKind {
        ValueKind::Composite(self.composite)
    }
}

/// Access to an ordered collection of items.
pub trait ListAccess {
    /// Current number of items.
    fn len(&self) -> Result<usize, AccessError>;

    /// Returns true if there are no items.
    fn is_empty(&self) -> Result<bool, AccessError> {
        Ok(self.len()? == 0)
    }

    /// Identity of the backing storage. A change means the collection was replaced.
    fn identity(&self) -> Option<ObjectId>;

    /// Static type of the items.
    fn item_type(&self) -> TypeInfo;

    /// Accessor for the item whose position is held in `index`.
    fn item(&self, index: Rc<Cell<usize>>) -> AnyAccessor;

    /// Move the item at `from` to `to`, shifting the items in between.
    fn move_item(&self, from: usize, to: usize) -> Result<(), AccessError>;

    /// Remove the item at `index`.
    fn remove(&self, index: usize) -> Result<(), AccessError>;

    /// Insert a fresh item at `index`.
    fn insert_new(&self, index: usize) -> Result<(), AccessError>;

    /// Returns true if items can be added and removed.
    fn is_resizable(&self) -> bool;
}

/// A shared handle to a [`ListAccess`].
#[derive(Clone)]
pub struct ListBinding(Rc<dyn ListAccess>);

impl ListBinding {
    /// Wrap a custom collection.
    pub fn new(list: impl ListAccess + 'static) -> Self {
        Self(Rc::new(list))
    }

    /// Bind a `Vec`.
    pub fn of<T: Inspect>(accessor: &Accessor<Vec<T>>) -> Self {
        Self::new(VecList {
            accessor: accessor.clone(),
        })
    }
}

impl Deref for ListBinding {
    type Target = dyn ListAccess;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for ListBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListBinding")
            .field("item_type", &self.0.item_type())
            .field("len", &self.0.len().ok())
            .finish_non_exhaustive()
    }
}

struct VecList<T> {
    accessor: Accessor<Vec<T>>,
}

fn check_index(index: usize, len: usize) -> Result<(), AccessError> {
    if index < len {
        Ok(())
    } else {
        Err(AccessError::OutOfRange { index, len })
    }
}

impl<T: Inspect> ListAccess for VecList<T> {
    fn len(&self) -> Result<usize, AccessError> {
        self.accessor.read(Vec::len)
    }

    fn identity(&self) -> Option<ObjectId> {
        self.accessor
            .read(|v| (!v.is_empty()).then(|| ObjectId::from_addr(v.as_ptr() as usize)))
            .ok()
            .flatten()
    }

    fn item_type(&self) -> TypeInfo {
        T::type_info()
    }

    fn item(&self, index: Rc<Cell<usize>>) -> AnyAccessor {
        AnyAccessor::new(self.accessor.item(index))
    }

    fn move_item(&self, from: usize, to: usize) -> Result<(), AccessError> {
        self.accessor.update(|v| {
            check_index(from, v.len())?;
            check_index(to, v.len())?;
            let item = v.remove(from);
            v.insert(to, item);
            Ok(())
        })?
    }

    fn remove(&self, index: usize) -> Result<(), AccessError> {
        self.accessor.update(|v| {
            check_index(index, v.len())?;
            v.remove(index);
            Ok(())
        })?
    }

    fn insert_new(&self, index: usize) -> Result<(), AccessError> {
        let item = T::create_default()
            .ok_or(AccessError::NotCreatable(T::type_info().name()))?;
        self.accessor.update(|v| {
            check_index(index, v.len() + 1)?;
            v.insert(index, item);
            Ok(())
        })?
    }

    fn is_resizable(&self) -> bool {
        self.accessor.is_writable()
    }
}
