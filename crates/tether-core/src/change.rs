use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

/// Process-unique identity of a property, carried as the `source` of every
/// change it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PropertyId(u64);

impl PropertyId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of a single mutation, handed to every listener of the source.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PropertyChange<T> {
    pub source: PropertyId,
    pub old: T,
    pub new: T,
}

/// Cloneable callback handle.
///
/// Identity is the allocation: clones of one handle are "the same listener"
/// for removal purposes, two handles built from identical closures are not.
pub struct Handler<E>(Rc<dyn Fn(&E)>);

/// Listener for plain value changes.
pub type Listener<T> = Handler<PropertyChange<T>>;

impl<E: 'static> Handler<E> {
    pub fn new(f: impl Fn(&E) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn notify(&self, event: &E) {
        (self.0)(event)
    }

    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<E: 'static> Clone for Handler<E> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<E: 'static> fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Ordered multiset of handlers. Registration order is notification order.
pub(crate) struct Listeners<E> {
    entries: RefCell<Vec<Handler<E>>>,
}

impl<E: 'static> Listeners<E> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, handler: &Handler<E>) {
        self.entries.borrow_mut().push(handler.clone());
    }

    /// Removes the first occurrence only.
    pub(crate) fn remove(&self, handler: &Handler<E>) {
        let mut entries = self.entries.borrow_mut();
        if let Some(pos) = entries.iter().position(|h| h.same(handler)) {
            entries.remove(pos);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Dispatches against a snapshot, so handlers may add or remove
    /// listeners (or set the source again) while being notified.
    pub(crate) fn fire(&self, source: PropertyId, event: &E) {
        let snapshot: SmallVec<[Handler<E>; 4]> = self.entries.borrow().iter().cloned().collect();
        if snapshot.is_empty() {
            return;
        }
        log::trace!("property {source}: notifying {} listener(s)", snapshot.len());
        for handler in &snapshot {
            handler.notify(event);
        }
    }
}
