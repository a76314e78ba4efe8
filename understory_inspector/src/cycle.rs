// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference cycle detection along the synthesis path.

use std::fmt;
use std::rc::Rc;

use crate::inspect::{AnyAccessor, ObjectId, TypeInfo};

struct Link {
    ty: TypeInfo,
    id: ObjectId,
    next: Option<Rc<Link>>,
}

/// The reference-typed values currently being synthesized, from the innermost outwards.
///
/// Guards are persistent lists: [`CycleGuard::enter`] returns a new guard and leaves the old one
/// untouched, so leaving a level is simply dropping the inner guard. Cloning is O(1), which makes
/// it cheap for a deferred rebuild to keep the guard it was created under.
#[derive(Clone, Default)]
pub struct CycleGuard {
    head: Option<Rc<Link>>,
    len: usize,
}

impl fmt::Debug for CycleGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|(ty, _)| ty)).finish()
    }
}

impl CycleGuard {
    /// An empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `accessor`'s value is already being synthesized along this path.
    ///
    /// Values without a reference identity, and absent values, are never circular.
    pub fn is_circular(&self, accessor: &AnyAccessor) -> bool {
        if accessor.is_nullable() && accessor.is_null() {
            return false;
        }
        let Some(id) = accessor.identity() else {
            return false;
        };
        let ty = accessor.type_info();
        self.iter().any(|(t, i)| t == ty && i == id)
    }

    /// The guard for synthesizing `accessor`'s value one level down.
    ///
    /// Returns a clone of `self` for values without a reference identity.
    #[must_use]
    pub fn enter(&self, accessor: &AnyAccessor) -> Self {
        match accessor.identity() {
            Some(id) => Self {
                head: Some(Rc::new(Link {
                    ty: accessor.type_info(),
                    id,
                    next: self.head.clone(),
                })),
                len: self.len + 1,
            },
            None => self.clone(),
        }
    }

    /// Number of reference-typed values on the path.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no reference-typed value is on the path.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries from the innermost outwards.
    pub fn iter(&self) -> impl Iterator<Item = (TypeInfo, ObjectId)> + '_ {
        core::iter::successors(self.head.as_deref(), |l| l.next.as_deref()).map(|l| (l.ty, l.id))
    }

    /// Capture the current path for a later rebuild.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.clone())
    }
}

/// A captured [`CycleGuard`] path.
#[derive(Clone, Debug)]
pub struct Snapshot(CycleGuard);

impl Snapshot {
    /// The guard to resume synthesis with.
    pub fn apply(&self) -> CycleGuard {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::{Accessor, Composite, Inspect, ValueKind};

    struct A;
    struct B;

    impl Inspect for A {
        fn kind(acc: &Accessor<Self>) -> ValueKind {
            Composite::of(acc).build()
        }
    }

    impl Inspect for B {
        fn kind(acc: &Accessor<Self>) -> ValueKind {
            Composite::of(acc).build()
        }
    }

    fn shared<T: Inspect>(v: T) -> (Rc<RefCell<T>>, AnyAccessor) {
        let rc = Rc::new(RefCell::new(v));
        (rc.clone(), AnyAccessor::new(Accessor::constant(rc)))
    }

    #[test]
    fn detects_revisits_of_the_same_object_and_type() {
        let (_, a) = shared(A);
        let (_, b) = shared(B);
        let guard = CycleGuard::new();
        assert!(!guard.is_circular(&a));
        let inner = guard.enter(&a).enter(&b);
        assert_eq!(inner.len(), 2);
        assert!(inner.is_circular(&a));
        assert!(inner.is_circular(&b));
        assert!(!guard.is_circular(&a), "entering never mutates the outer guard");
    }

    #[test]
    fn value_types_are_not_tracked() {
        let plain = AnyAccessor::new(Accessor::constant(5_i32));
        let guard = CycleGuard::new().enter(&plain);
        assert!(guard.is_empty());
        assert!(!guard.is_circular(&plain));
    }

    #[test]
    fn absent_values_are_never_circular() {
        let (rc, a) = shared(A);
        let guard = CycleGuard::new().enter(&a);
        let opt = AnyAccessor::new(Accessor::constant(None::<Rc<RefCell<A>>>));
        assert!(!guard.is_circular(&opt));
        let some = AnyAccessor::new(Accessor::constant(Some(rc)));
        assert!(!guard.is_circular(&some), "optional wrappers carry no identity");
    }

    #[test]
    fn snapshots_restore_the_captured_path() {
        let (_, a) = shared(A);
        let guard = CycleGuard::new().enter(&a);
        let snap = guard.snapshot();
        drop(guard);
        assert!(snap.apply().is_circular(&a));
    }
}
