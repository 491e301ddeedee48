//! Fan-in property over a fixed, ordered set of sources.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::change::{Listener, Listeners, PropertyChange, PropertyId};
use crate::dispose::{Disposable, Dispose};
use crate::error::BindError;
use crate::property::{ReadableProperty, SharedReadable};

/// Read-only property whose value is the ordered sequence of its sources'
/// values.
///
/// Each source change produces exactly one notification carrying the full
/// old and new sequences. Changes are never coalesced: K source changes in a
/// row give K notifications, each reflecting the state at that point. The
/// slot is refreshed from the source itself, so a source corrected during
/// its own dispatch is never left stale.
///
/// Sources keep the composite alive (and notified) until
/// [`Disposable::dispose`] detaches it.
pub struct CompositeProperty<T: 'static> {
    inner: Rc<CompositeInner<T>>,
}

struct CompositeInner<T: 'static> {
    id: PropertyId,
    values: RefCell<Vec<T>>,
    listeners: Listeners<PropertyChange<Vec<T>>>,
    teardown: Dispose,
}

impl<T: Clone + 'static> CompositeProperty<T> {
    pub fn new<I, P>(sources: I) -> Result<Self, BindError>
    where
        I: IntoIterator<Item = P>,
        P: ReadableProperty<T> + 'static,
    {
        let shared = sources
            .into_iter()
            .map(|p| Rc::new(p) as SharedReadable<T>)
            .collect();
        Self::from_shared(shared)
    }

    pub fn from_shared(sources: Vec<SharedReadable<T>>) -> Result<Self, BindError> {
        if sources.is_empty() {
            return Err(BindError::EmptyComposite);
        }
        Ok(Self::build(sources))
    }

    /// Callers guarantee `sources` is non-empty.
    pub(crate) fn build(sources: Vec<SharedReadable<T>>) -> Self {
        let values = sources.iter().map(|s| s.get()).collect();
        let subscriptions: Rc<RefCell<Vec<(SharedReadable<T>, Listener<T>)>>> =
            Rc::new(RefCell::new(Vec::with_capacity(sources.len())));

        let teardown = {
            let subscriptions = subscriptions.clone();
            Dispose::new(move || {
                let subs = std::mem::take(&mut *subscriptions.borrow_mut());
                for (source, listener) in subs {
                    source.remove_listener(&listener);
                }
            })
        };

        let inner = Rc::new(CompositeInner {
            id: PropertyId::next(),
            values: RefCell::new(values),
            listeners: Listeners::new(),
            teardown,
        });

        for (index, source) in sources.into_iter().enumerate() {
            let target = inner.clone();
            let current = Rc::downgrade(&source);
            // A listener ahead of this one may already have moved the source on.
            let listener = Listener::new(move |change: &PropertyChange<T>| {
                let value = match current.upgrade() {
                    Some(source) => source.get(),
                    None => change.new.clone(),
                };
                target.source_changed(index, value);
            });
            source.add_listener(&listener);
            subscriptions.borrow_mut().push((source, listener));
        }

        log::debug!(
            "composite {} over {} source(s)",
            inner.id,
            subscriptions.borrow().len()
        );
        Self { inner }
    }

    pub fn id(&self) -> PropertyId {
        self.inner.id
    }

    pub fn get(&self) -> Vec<T> {
        self.inner.values.borrow().clone()
    }

    pub fn value_at(&self, index: usize) -> Option<T> {
        self.inner.values.borrow().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.values.borrow().len()
    }

    /// Always false: a composite has at least one source.
    pub fn is_empty(&self) -> bool {
        self.inner.values.borrow().is_empty()
    }

    pub fn add_listener(&self, listener: &Listener<Vec<T>>) {
        self.inner.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Listener<Vec<T>>) {
        self.inner.listeners.remove(listener);
    }
}

impl<T: Clone + 'static> CompositeInner<T> {
    fn source_changed(&self, index: usize, value: T) {
        let (old, new) = {
            let mut values = self.values.borrow_mut();
            let old = values.clone();
            match values.get_mut(index) {
                Some(slot) => *slot = value,
                None => return,
            }
            (old, values.clone())
        };
        self.listeners.fire(
            self.id,
            &PropertyChange {
                source: self.id,
                old,
                new,
            },
        );
    }
}

impl<T: 'static> Clone for CompositeProperty<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for CompositeProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeProperty")
            .field("id", &self.inner.id)
            .field("values", &*self.inner.values.borrow())
            .finish()
    }
}

impl<T: Clone + 'static> ReadableProperty<Vec<T>> for CompositeProperty<T> {
    fn id(&self) -> PropertyId {
        CompositeProperty::id(self)
    }

    fn get(&self) -> Vec<T> {
        CompositeProperty::get(self)
    }

    fn add_listener(&self, listener: &Listener<Vec<T>>) {
        CompositeProperty::add_listener(self, listener)
    }

    fn remove_listener(&self, listener: &Listener<Vec<T>>) {
        CompositeProperty::remove_listener(self, listener)
    }
}

impl<T: 'static> Disposable for CompositeProperty<T> {
    fn dispose(&self) {
        if !self.inner.teardown.is_disposed() {
            log::debug!("disposing composite {}", self.inner.id);
        }
        self.inner.teardown.run();
    }

    fn is_disposed(&self) -> bool {
        self.inner.teardown.is_disposed()
    }
}
