use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::change::{Listener, Listeners, PropertyChange, PropertyId};
use crate::dispose::Dispose;

/// Read capability: current value plus change notification.
pub trait ReadableProperty<T> {
    fn id(&self) -> PropertyId;

    fn get(&self) -> T;

    /// Appends `listener`; registering the same handle twice means it is
    /// called twice per change.
    fn add_listener(&self, listener: &Listener<T>);

    /// Removes one occurrence of `listener`. Absent listeners are ignored.
    fn remove_listener(&self, listener: &Listener<T>);
}

/// Write capability.
pub trait WritableProperty<T> {
    fn set(&self, value: T);
}

pub type SharedReadable<T> = Rc<dyn ReadableProperty<T>>;
pub type SharedWritable<T> = Rc<dyn WritableProperty<T>>;

/// Equality used for change suppression.
///
/// Plain `==`, except that two self-unequal values (floating NaN) count as
/// equal. Without that, a NaN bounced through a pair of bindings would never
/// settle.
#[allow(clippy::eq_op)]
pub fn values_equal<T: PartialEq + ?Sized>(a: &T, b: &T) -> bool {
    a == b || (a != a && b != b)
}

/// Observable holder of a single value.
///
/// `Property` is a cheap handle: clones share the value and the listener
/// list. Use `Property<Option<V>>` for nullable values.
pub struct Property<T: 'static>(Rc<Inner<T>>);

struct Inner<T: 'static> {
    id: PropertyId,
    value: RefCell<T>,
    listeners: Listeners<PropertyChange<T>>,
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Inner {
            id: PropertyId::next(),
            value: RefCell::new(value),
            listeners: Listeners::new(),
        }))
    }

    pub fn id(&self) -> PropertyId {
        self.0.id
    }

    pub fn get(&self) -> T {
        self.0.value.borrow().clone()
    }

    /// Borrows the value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.value.borrow())
    }

    /// Stores `value` and notifies listeners, unless it equals the current
    /// value, in which case nothing happens.
    ///
    /// Listeners run synchronously, in registration order, after the new
    /// value is stored and before `set` returns. This suppression is what
    /// makes bidirectional bindings terminate.
    pub fn set(&self, value: T) {
        let old = {
            let mut current = self.0.value.borrow_mut();
            if values_equal(&*current, &value) {
                return;
            }
            std::mem::replace(&mut *current, value.clone())
        };
        let change = PropertyChange {
            source: self.0.id,
            old,
            new: value,
        };
        self.0.listeners.fire(self.0.id, &change);
    }

    /// Mutates a copy of the value and assigns it back through [`set`](Self::set).
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    pub fn add_listener(&self, listener: &Listener<T>) {
        self.0.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Listener<T>) {
        self.0.listeners.remove(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.len()
    }

    /// Registers `f` and returns a guard that unregisters it.
    pub fn subscribe(&self, f: impl Fn(&PropertyChange<T>) + 'static) -> Dispose {
        let listener = Listener::new(f);
        self.add_listener(&listener);
        let weak: Weak<Inner<T>> = Rc::downgrade(&self.0);
        Dispose::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.remove(&listener);
            }
        })
    }

    pub fn read_only(&self) -> ReadOnly<Self> {
        ReadOnly::new(self.clone())
    }

    pub fn write_only(&self) -> WriteOnly<Self> {
        WriteOnly::new(self.clone())
    }
}

impl<T: 'static> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.0.id)
            .field("value", &*self.0.value.borrow())
            .field("listeners", &self.0.listeners.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> ReadableProperty<T> for Property<T> {
    fn id(&self) -> PropertyId {
        Property::id(self)
    }

    fn get(&self) -> T {
        Property::get(self)
    }

    fn add_listener(&self, listener: &Listener<T>) {
        Property::add_listener(self, listener)
    }

    fn remove_listener(&self, listener: &Listener<T>) {
        Property::remove_listener(self, listener)
    }
}

impl<T: Clone + PartialEq + 'static> WritableProperty<T> for Property<T> {
    fn set(&self, value: T) {
        Property::set(self, value)
    }
}

pub fn property<T: Clone + PartialEq + 'static>(value: T) -> Property<T> {
    Property::new(value)
}

/// Exposes only the read capability of the wrapped property.
#[derive(Clone, Debug)]
pub struct ReadOnly<P>(P);

impl<P> ReadOnly<P> {
    pub fn new(inner: P) -> Self {
        Self(inner)
    }
}

impl<T, P: ReadableProperty<T>> ReadableProperty<T> for ReadOnly<P> {
    fn id(&self) -> PropertyId {
        self.0.id()
    }

    fn get(&self) -> T {
        self.0.get()
    }

    fn add_listener(&self, listener: &Listener<T>) {
        self.0.add_listener(listener)
    }

    fn remove_listener(&self, listener: &Listener<T>) {
        self.0.remove_listener(listener)
    }
}

/// Exposes only the write capability of the wrapped property.
#[derive(Clone, Debug)]
pub struct WriteOnly<P>(P);

impl<P> WriteOnly<P> {
    pub fn new(inner: P) -> Self {
        Self(inner)
    }
}

impl<T, P: WritableProperty<T>> WritableProperty<T> for WriteOnly<P> {
    fn set(&self, value: T) {
        self.0.set(value)
    }
}
