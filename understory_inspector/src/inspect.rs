// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type metadata and the [`Inspect`] trait.
//!
//! Types opt into synthesis by implementing [`Inspect`]. The trait answers three questions
//! about a value: what type is it (statically and at runtime), does it have a reference
//! identity, and how should it be shown ([`ValueKind`]).

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use understory_element::Color;

use crate::accessor::Accessor;
use crate::kind::{ListBinding, NullableBinding, Primitive, ValueKind};

/// Identity and display name of a type.
///
/// Equality and hashing use the [`TypeId`] only.
#[derive(Copy, Clone)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// Info for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// The type id.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The full type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name without module paths, e.g. `Option<Node>`.
    pub fn short_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut segment_start = 0;
        for (i, c) in self.name.char_indices() {
            if matches!(c, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&') {
                out.push_str(last_segment(&self.name[segment_start..i]));
                out.push(c);
                segment_start = i + c.len_utf8();
            }
        }
        out.push_str(last_segment(&self.name[segment_start..]));
        out
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Reference identity of a shared value: the address of its allocation.
///
/// Two handles with the same `ObjectId` point to the same object for as long as both are alive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Identity of the value behind `rc`.
    pub fn of<T: ?Sized>(rc: &Rc<T>) -> Self {
        Self(Rc::as_ptr(rc).cast::<()>() as usize)
    }

    /// Identity from a raw address.
    pub fn from_addr(addr: usize) -> Self {
        Self(addr)
    }
}

/// A type the inspector knows how to present.
///
/// Only [`Inspect::kind`] is required. The remaining items describe nullability, reference
/// identity, and the type chain used for creation function lookup.
///
/// ```
/// use understory_inspector::{Accessor, Composite, Inspect, ValueKind};
///
/// #[derive(Default)]
/// struct Light {
///     intensity: f32,
///     label: String,
/// }
///
/// impl Inspect for Light {
///     fn kind(acc: &Accessor<Self>) -> ValueKind {
///         Composite::of(acc)
///             .member("intensity", |l| &l.intensity, |l| &mut l.intensity)
///             .member("label", |l| &l.label, |l| &mut l.label)
///             .build()
///     }
/// }
/// ```
pub trait Inspect: Sized + 'static {
    /// Static type used for registry lookups and cycle detection.
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>()
    }

    /// Declared supertypes, most derived first.
    ///
    /// A creation function registered for an ancestor applies to this type when none is
    /// registered for the type itself.
    fn ancestors() -> Vec<TypeInfo> {
        Vec::new()
    }

    /// Type chain of this particular value, most derived first.
    ///
    /// Override for values whose runtime type is more specific than `Self`.
    fn runtime_chain(&self) -> Vec<TypeInfo> {
        static_chain::<Self>()
    }

    /// Reference identity, for values that can be reached along more than one path.
    fn identity(&self) -> Option<ObjectId> {
        None
    }

    /// Returns true if this value is absent.
    fn is_null(&self) -> bool {
        false
    }

    /// Returns true if values of this type can be absent.
    fn is_nullable() -> bool {
        false
    }

    /// A fresh value, used when a list grows. `None` if the type has no sensible default.
    fn create_default() -> Option<Self> {
        None
    }

    /// How values of this type are presented.
    fn kind(accessor: &Accessor<Self>) -> ValueKind;
}

/// `T`'s static type followed by its declared ancestors.
pub fn static_chain<T: Inspect>() -> Vec<TypeInfo> {
    let mut chain = vec![T::type_info()];
    chain.extend(T::ancestors());
    chain
}

impl Inspect for bool {
    fn create_default() -> Option<Self> {
        Some(false)
    }

    fn kind(accessor: &Accessor<Self>) -> ValueKind {
        ValueKind::Primitive(Primitive::Bool(accessor.clone()))
    }
}

macro_rules! impl_inspect_int {
    ($($t:ty),*) => {$(
        impl Inspect for $t {
            fn create_default() -> Option<Self> {
                Some(0)
            }

            fn kind(accessor: &Accessor<Self>) -> ValueKind {
                ValueKind::Primitive(Primitive::Int(accessor.cast()))
            }
        }
    )*};
}

impl_inspect_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Inspect for f32 {
    fn create_default() -> Option<Self> {
        Some(0.0)
    }

    fn kind(accessor: &Accessor<Self>) -> ValueKind {
        ValueKind::Primitive(Primitive::Float(accessor.cast()))
    }
}

impl Inspect for f64 {
    fn create_default() -> Option<Self> {
        Some(0.0)
    }

    fn kind(accessor: &Accessor<Self>) -> ValueKind {
        ValueKind::Primitive(Primitive::Float(accessor.clone()))
    }
}

impl Inspect for String {
    fn create_default() -> Option<Self> {
        Some(Self::new())
    }

    fn kind(accessor: &Accessor<Self>) -> ValueKind {
        ValueKind::Primitive(Primitive::Text(accessor.clone()))
    }
}

impl Inspect for Color {
    fn create_default() -> Option<Self> {
        Some(Self::WHITE)
    }

    fn kind(accessor: &Accessor<Self>) -> ValueKind {
        ValueKind::Primitive(Primitive::Color(accessor.clone()))
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn is_nullable() -> bool {
        true
    }

    fn create_default() -> Option<Self> {
        Some(None)
    }

    fn kind(accessor: &Accessor<Self>) -> ValueKind {
        ValueKind::Nullable(NullableBinding {
            outer: AnyAccessor::new(accessor.clone()),
            inner: AnyAccessor::new(accessor.unwrap_nullable()),
        })
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn create_default() -> Option<Self> {
        Some(Self::new())
    }

    fn kind(accessor: &Accessor<Self>) -> ValueKind {
        ValueKind::Collection(ListBinding::of(accessor))
    }
}

/// A shared, mutable object. Presented as its contents, identified by its allocation.
impl<T: Inspect> Inspect for Rc<RefCell<T>> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }

    fn ancestors() -> Vec<TypeInfo> {
        T::ancestors()
    }

    fn runtime_chain(&self) -> Vec<TypeInfo> {
        self.try_borrow()
            .map(|v| v.runtime_chain())
            .unwrap_or_else(|_| static_chain::<T>())
    }

    fn identity(&self) -> Option<ObjectId> {
        Some(ObjectId::of(self))
    }

    fn create_default() -> Option<Self> {
        T::create_default().map(|v| Rc::new(RefCell::new(v)))
    }

    fn kind(accessor: &Accessor<Self>) -> ValueKind {
        T::kind(&accessor.deref_shared())
    }
}

trait ErasedAccess {
    fn type_info(&self) -> TypeInfo;
    fn runtime_chain(&self) -> Vec<TypeInfo>;
    fn identity(&self) -> Option<ObjectId>;
    fn is_null(&self) -> bool;
    fn is_nullable(&self) -> bool;
    fn is_writable(&self) -> bool;
    fn kind(&self) -> ValueKind;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Inspect> ErasedAccess for Accessor<T> {
    fn type_info(&self) -> TypeInfo {
        T::type_info()
    }

    fn runtime_chain(&self) -> Vec<TypeInfo> {
        self.read(T::runtime_chain).unwrap_or_else(|_| static_chain::<T>())
    }

    fn identity(&self) -> Option<ObjectId> {
        self.read(T::identity).ok().flatten()
    }

    fn is_null(&self) -> bool {
        // Unreadable values (a missing parent, a vanished slot) present as absent.
        self.read(T::is_null).unwrap_or(true)
    }

    fn is_nullable(&self) -> bool {
        T::is_nullable()
    }

    fn is_writable(&self) -> bool {
        Self::is_writable(self)
    }

    fn kind(&self) -> ValueKind {
        T::kind(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An [`Accessor`] with its value type erased.
///
/// Carries the value's [`Inspect`] behavior, so synthesis can dispatch on it without knowing
/// the concrete type. Recover the typed handle with [`AnyAccessor::downcast`].
#[derive(Clone)]
pub struct AnyAccessor(Rc<dyn ErasedAccess>);

impl AnyAccessor {
    /// Erase `accessor`.
    pub fn new<T: Inspect>(accessor: Accessor<T>) -> Self {
        Self(Rc::new(accessor))
    }

    /// Static type of the value.
    pub fn type_info(&self) -> TypeInfo {
        self.0.type_info()
    }

    /// Runtime type chain of the current value, most derived first.
    pub fn runtime_chain(&self) -> Vec<TypeInfo> {
        self.0.runtime_chain()
    }

    /// Reference identity of the current value.
    pub fn identity(&self) -> Option<ObjectId> {
        self.0.identity()
    }

    /// Returns true if the current value is absent or cannot be read.
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Returns true if the value type can be absent.
    pub fn is_nullable(&self) -> bool {
        self.0.is_nullable()
    }

    /// Returns true if the value can be written.
    pub fn is_writable(&self) -> bool {
        self.0.is_writable()
    }

    /// How the value is presented.
    pub fn kind(&self) -> ValueKind {
        self.0.kind()
    }

    /// Recover the typed accessor.
    pub fn downcast<T: Inspect>(&self) -> Option<Accessor<T>> {
        self.0.as_any().downcast_ref::<Accessor<T>>().cloned()
    }

    /// Returns true if both handles share the same erased accessor.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Inspect> From<Accessor<T>> for AnyAccessor {
    fn from(accessor: Accessor<T>) -> Self {
        Self::new(accessor)
    }
}

impl fmt::Debug for AnyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyAccessor")
            .field("type", &self.type_info())
            .field("writable", &self.is_writable())
            .finish_non_exhaustive()
    }
}
