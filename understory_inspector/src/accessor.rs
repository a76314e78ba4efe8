// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed read/write handles decoupled from where the value lives.
//!
//! An [`Accessor<T>`] wraps a [`Source<T>`]: a closure pair, a shared cell, a member of another
//! accessor's value, a collection slot, or an adapted view of another accessor. Accessors are
//! cheap to clone and never cache; every read goes back to the source.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::AccessError;

/// Storage behind an [`Accessor`].
///
/// On `Ok`, implementations must have invoked the callback exactly once.
pub trait Source<T> {
    /// Call `f` with a reference to the current value.
    fn with_ref(&self, f: &mut dyn FnMut(&T)) -> Result<(), AccessError>;

    /// Call `f` with a mutable reference to the current value, then store the result.
    fn with_mut(&self, f: &mut dyn FnMut(&mut T)) -> Result<(), AccessError>;

    /// Overwrite the current value.
    fn replace(&self, value: T) -> Result<(), AccessError> {
        let mut value = Some(value);
        self.with_mut(&mut |slot| {
            if let Some(v) = value.take() {
                *slot = v;
            }
        })
    }

    /// Returns true if writes can succeed.
    fn is_writable(&self) -> bool;
}

/// A typed handle for reading and, optionally, writing a value.
pub struct Accessor<T> {
    source: Rc<dyn Source<T>>,
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("type", &core::any::type_name::<T>())
            .field("writable", &self.source.is_writable())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Accessor<T> {
    /// Wrap a custom [`Source`].
    pub fn from_source(source: impl Source<T> + 'static) -> Self {
        Self {
            source: Rc::new(source),
        }
    }

    /// A getter/setter pair.
    pub fn new(get: impl Fn() -> T + 'static, set: impl Fn(T) + 'static) -> Self {
        Self::from_source(FnSource {
            get: Box::new(get),
            set: Some(Box::new(set)),
        })
    }

    /// A getter without a write path.
    pub fn read_only(get: impl Fn() -> T + 'static) -> Self {
        Self::from_source(FnSource {
            get: Box::new(get),
            set: None,
        })
    }

    /// A value owned by a shared cell.
    pub fn from_shared(cell: Rc<RefCell<T>>) -> Self {
        Self::from_source(SharedSource { cell })
    }

    /// A fixed, read-only value.
    pub fn constant(value: T) -> Self {
        Self::from_source(ConstSource { value })
    }

    /// Read the current value through `f`.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, AccessError> {
        let mut f = Some(f);
        let mut out = None;
        self.source.with_ref(&mut |v| {
            if let Some(f) = f.take() {
                out = Some(f(v));
            }
        })?;
        out.ok_or(AccessError::Null)
    }

    /// Modify the current value in place through `f` and write it back.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, AccessError> {
        let mut f = Some(f);
        let mut out = None;
        self.source.with_mut(&mut |v| {
            if let Some(f) = f.take() {
                out = Some(f(v));
            }
        })?;
        out.ok_or(AccessError::Null)
    }

    /// Clone out the current value.
    pub fn get(&self) -> Result<T, AccessError>
    where
        T: Clone,
    {
        self.read(T::clone)
    }

    /// Overwrite the current value.
    pub fn set(&self, value: T) -> Result<(), AccessError> {
        self.source.replace(value)
    }

    /// Returns true if [`Accessor::set`] can succeed.
    pub fn is_writable(&self) -> bool {
        self.source.is_writable()
    }

    /// Returns true if both handles share the same source.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.source, &other.source)
    }

    /// Project onto a member of the value.
    ///
    /// Writes go through this accessor, so the member is writable iff the parent is.
    pub fn member<M: 'static>(
        &self,
        get: impl Fn(&T) -> &M + 'static,
        get_mut: impl Fn(&mut T) -> &mut M + 'static,
    ) -> Accessor<M> {
        Accessor::from_source(MemberSource {
            parent: self.clone(),
            get,
            get_mut,
        })
    }

    /// View the value as another type.
    ///
    /// `to` converts on every read; `from` writes a converted value back into the original.
    pub fn map<U: 'static>(
        &self,
        to: impl Fn(&T) -> U + 'static,
        from: impl Fn(U, &mut T) + 'static,
    ) -> Accessor<U> {
        Accessor::from_source(MapSource {
            parent: self.clone(),
            to,
            from,
        })
    }

    /// View a numeric value as another numeric type.
    ///
    /// Conversions saturate at the target's bounds.
    pub fn cast<U: Numeric>(&self) -> Accessor<U>
    where
        T: Numeric,
    {
        self.map(|t| t.cast::<U>(), |u, t| *t = u.cast::<T>())
    }
}

impl<T: 'static> Accessor<Option<T>> {
    /// View the contents of an optional value.
    ///
    /// Reads and writes fail with [`AccessError::Null`] while the value is `None`.
    pub fn unwrap_nullable(&self) -> Accessor<T> {
        Accessor::from_source(NullableSource {
            parent: self.clone(),
        })
    }
}

impl<T: 'static> Accessor<Rc<RefCell<T>>> {
    /// View the value behind a shared reference.
    ///
    /// Writes go into the shared cell, so the result is writable even if this accessor is not.
    pub fn deref_shared(&self) -> Accessor<T> {
        Accessor::from_source(SharedDerefSource {
            parent: self.clone(),
        })
    }
}

impl<T: 'static> Accessor<Vec<T>> {
    /// View the slot whose position is held in `index`.
    ///
    /// The slot follows `index` as it changes, which lets a list reorder its items without
    /// rebuilding their accessors.
    pub fn item(&self, index: Rc<Cell<usize>>) -> Accessor<T> {
        Accessor::from_source(ItemSource {
            parent: self.clone(),
            index,
        })
    }

    /// View the slot at a fixed position.
    pub fn item_at(&self, index: usize) -> Accessor<T> {
        self.item(Rc::new(Cell::new(index)))
    }
}

/// Numeric types that can be viewed as each other.
pub trait Numeric: Copy + 'static {
    /// True for floating-point types.
    const IS_FLOAT: bool;

    /// Widen to `f64`.
    fn to_f64(self) -> f64;

    /// Narrow from `f64`, saturating.
    fn from_f64(value: f64) -> Self;

    /// Convert to `i64`, saturating.
    fn to_i64(self) -> i64;

    /// Convert from `i64`, saturating.
    fn from_i64(value: i64) -> Self;

    /// Convert to another numeric type.
    fn cast<U: Numeric>(self) -> U {
        if Self::IS_FLOAT || U::IS_FLOAT {
            U::from_f64(self.to_f64())
        } else {
            U::from_i64(self.to_i64())
        }
    }
}

macro_rules! impl_numeric_int {
    ($($t:ty),*) => {$(
        impl Numeric for $t {
            const IS_FLOAT: bool = false;

            #[allow(clippy::cast_lossless, reason = "Generated for every integer width.")]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[allow(
                clippy::cast_possible_truncation,
                reason = "Float to integer casts saturate."
            )]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn to_i64(self) -> i64 {
                i64::try_from(self).unwrap_or(i64::MAX)
            }

            fn from_i64(value: i64) -> Self {
                <$t>::try_from(value).unwrap_or(if value < 0 { <$t>::MIN } else { <$t>::MAX })
            }
        }
    )*};
}

impl_numeric_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Numeric for f32 {
    const IS_FLOAT: bool = true;

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Narrowing to f32 rounds to the nearest representable value."
    )]
    fn from_f64(value: f64) -> Self {
        value as Self
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Float to integer casts saturate."
    )]
    fn to_i64(self) -> i64 {
        self as i64
    }

    fn from_i64(value: i64) -> Self {
        value as Self
    }
}

impl Numeric for f64 {
    const IS_FLOAT: bool = true;

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Float to integer casts saturate."
    )]
    fn to_i64(self) -> i64 {
        self as i64
    }

    fn from_i64(value: i64) -> Self {
        value as Self
    }
}

// --- sources ---

struct FnSource<T> {
    get: Box<dyn Fn() -> T>,
    set: Option<Box<dyn Fn(T)>>,
}

impl<T> Source<T> for FnSource<T> {
    fn with_ref(&self, f: &mut dyn FnMut(&T)) -> Result<(), AccessError> {
        f(&(self.get)());
        Ok(())
    }

    fn with_mut(&self, f: &mut dyn FnMut(&mut T)) -> Result<(), AccessError> {
        let set = self.set.as_ref().ok_or(AccessError::ReadOnly)?;
        let mut value = (self.get)();
        f(&mut value);
        set(value);
        Ok(())
    }

    fn replace(&self, value: T) -> Result<(), AccessError> {
        let set = self.set.as_ref().ok_or(AccessError::ReadOnly)?;
        set(value);
        Ok(())
    }

    fn is_writable(&self) -> bool {
        self.set.is_some()
    }
}

struct SharedSource<T> {
    cell: Rc<RefCell<T>>,
}

impl<T> Source<T> for SharedSource<T> {
    fn with_ref(&self, f: &mut dyn FnMut(&T)) -> Result<(), AccessError> {
        let value = self.cell.try_borrow().map_err(|_| AccessError::Borrow)?;
        f(&value);
        Ok(())
    }

    fn with_mut(&self, f: &mut dyn FnMut(&mut T)) -> Result<(), AccessError> {
        let mut value = self.cell.try_borrow_mut().map_err(|_| AccessError::Borrow)?;
        f(&mut value);
        Ok(())
    }

    fn is_writable(&self) -> bool {
        true
    }
}

struct ConstSource<T> {
    value: T,
}

impl<T> Source<T> for ConstSource<T> {
    fn with_ref(&self, f: &mut dyn FnMut(&T)) -> Result<(), AccessError> {
        f(&self.value);
        Ok(())
    }

    fn with_mut(&self, _: &mut dyn FnMut(&mut T)) -> Result<(), AccessError> {
        Err(AccessError::ReadOnly)
    }

    fn is_writable(&self) -> bool {
        false
    }
}

struct MemberSource<P, G, H> {
    parent: Accessor<P>,
    get: G,
    get_mut: H,
}

impl<P, M, G, H> Source<M> for MemberSource<P, G, H>
where
    P: 'static,
    G: Fn(&P) -> &M,
    H: Fn(&mut P) -> &mut M,
{
    fn with_ref(&self, f: &mut dyn FnMut(&M)) -> Result<(), AccessError> {
        self.parent.source.with_ref(&mut |p| f((self.get)(p)))
    }

    fn with_mut(&self, f: &mut dyn FnMut(&mut M)) -> Result<(), AccessError> {
        self.parent.source.with_mut(&mut |p| f((self.get_mut)(p)))
    }

    fn is_writable(&self) -> bool {
        self.parent.is_writable()
    }
}

struct MapSource<T, F, G> {
    parent: Accessor<T>,
    to: F,
    from: G,
}

impl<T, U, F, G> Source<U> for MapSource<T, F, G>
where
    T: 'static,
    F: Fn(&T) -> U,
    G: Fn(U, &mut T),
{
    fn with_ref(&self, f: &mut dyn FnMut(&U)) -> Result<(), AccessError> {
        self.parent.source.with_ref(&mut |t| f(&(self.to)(t)))
    }

    fn with_mut(&self, f: &mut dyn FnMut(&mut U)) -> Result<(), AccessError> {
        self.parent.source.with_mut(&mut |t| {
            let mut u = (self.to)(t);
            f(&mut u);
            (self.from)(u, t);
        })
    }

    fn is_writable(&self) -> bool {
        self.parent.is_writable()
    }
}

struct NullableSource<T> {
    parent: Accessor<Option<T>>,
}

impl<T: 'static> Source<T> for NullableSource<T> {
    fn with_ref(&self, f: &mut dyn FnMut(&T)) -> Result<(), AccessError> {
        let mut result = Err(AccessError::Null);
        self.parent.source.with_ref(&mut |o| {
            if let Some(v) = o {
                f(v);
                result = Ok(());
            }
        })?;
        result
    }

    fn with_mut(&self, f: &mut dyn FnMut(&mut T)) -> Result<(), AccessError> {
        let mut result = Err(AccessError::Null);
        self.parent.source.with_mut(&mut |o| {
            if let Some(v) = o {
                f(v);
                result = Ok(());
            }
        })?;
        result
    }

    fn is_writable(&self) -> bool {
        self.parent.is_writable()
    }
}

struct SharedDerefSource<T> {
    parent: Accessor<Rc<RefCell<T>>>,
}

impl<T: 'static> Source<T> for SharedDerefSource<T> {
    fn with_ref(&self, f: &mut dyn FnMut(&T)) -> Result<(), AccessError> {
        let mut result = Ok(());
        self.parent.source.with_ref(&mut |rc| match rc.try_borrow() {
            Ok(v) => f(&v),
            Err(_) => result = Err(AccessError::Borrow),
        })?;
        result
    }

    fn with_mut(&self, f: &mut dyn FnMut(&mut T)) -> Result<(), AccessError> {
        let mut result = Ok(());
        self.parent.source.with_ref(&mut |rc| match rc.try_borrow_mut() {
            Ok(mut v) => f(&mut v),
            Err(_) => result = Err(AccessError::Borrow),
        })?;
        result
    }

    fn is_writable(&self) -> bool {
        true
    }
}

struct ItemSource<T> {
    parent: Accessor<Vec<T>>,
    index: Rc<Cell<usize>>,
}

impl<T: 'static> Source<T> for ItemSource<T> {
    fn with_ref(&self, f: &mut dyn FnMut(&T)) -> Result<(), AccessError> {
        let index = self.index.get();
        let mut result = Ok(());
        self.parent.source.with_ref(&mut |v| match v.get(index) {
            Some(item) => f(item),
            None => result = Err(AccessError::OutOfRange { index, len: v.len() }),
        })?;
        result
    }

    fn with_mut(&self, f: &mut dyn FnMut(&mut T)) -> Result<(), AccessError> {
        let index = self.index.get();
        let mut result = Ok(());
        self.parent.source.with_mut(&mut |v| {
            let len = v.len();
            match v.get_mut(index) {
                Some(item) => f(item),
                None => result = Err(AccessError::OutOfRange { index, len }),
            }
        })?;
        result
    }

    fn is_writable(&self) -> bool {
        self.parent.is_writable()
    }
}
