//! Sequence-valued property with structural change payloads.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::change::{Handler, Listener, Listeners, PropertyChange, PropertyId};
use crate::dispose::Dispose;
use crate::property::{ReadableProperty, WritableProperty, values_equal};

/// What happened to a range of an [`ObservableList`].
///
/// Consumers must handle all three kinds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ListChangeKind<T> {
    Added { start: usize, items: Vec<T> },
    Removed { start: usize, items: Vec<T> },
    Replaced {
        start: usize,
        removed: Vec<T>,
        added: Vec<T>,
    },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ListChange<T> {
    pub source: PropertyId,
    pub kind: ListChangeKind<T>,
}

impl<T> ListChange<T> {
    pub fn start(&self) -> usize {
        match &self.kind {
            ListChangeKind::Added { start, .. }
            | ListChangeKind::Removed { start, .. }
            | ListChangeKind::Replaced { start, .. } => *start,
        }
    }
}

pub type ListListener<T> = Handler<ListChange<T>>;

/// Observable `Vec<T>`.
///
/// Every effective mutation fires one [`ListChange`] to list listeners and
/// then one `PropertyChange<Vec<T>>` to plain listeners, so a list can sit
/// on either end of a binding. Mutations that change nothing fire nothing.
pub struct ObservableList<T: 'static>(Rc<ListInner<T>>);

struct ListInner<T: 'static> {
    id: PropertyId,
    items: RefCell<Vec<T>>,
    structural: Listeners<ListChange<T>>,
    listeners: Listeners<PropertyChange<Vec<T>>>,
}

impl<T: Clone + PartialEq + 'static> ObservableList<T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self(Rc::new(ListInner {
            id: PropertyId::next(),
            items: RefCell::new(items),
            structural: Listeners::new(),
            listeners: Listeners::new(),
        }))
    }

    pub fn id(&self) -> PropertyId {
        self.0.id
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.0.items.borrow().get(index).cloned()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.0.items.borrow().clone()
    }

    pub fn push(&self, item: T) {
        self.apply(|items| {
            let start = items.len();
            items.push(item.clone());
            Some(ListChangeKind::Added {
                start,
                items: vec![item],
            })
        });
    }

    pub fn extend(&self, new_items: impl IntoIterator<Item = T>) {
        let new_items: Vec<T> = new_items.into_iter().collect();
        if new_items.is_empty() {
            return;
        }
        self.apply(|items| {
            let start = items.len();
            items.extend(new_items.iter().cloned());
            Some(ListChangeKind::Added {
                start,
                items: new_items,
            })
        });
    }

    /// Returns false (and changes nothing) when `index > len`.
    pub fn insert(&self, index: usize, item: T) -> bool {
        self.apply(|items| {
            if index > items.len() {
                return None;
            }
            items.insert(index, item.clone());
            Some(ListChangeKind::Added {
                start: index,
                items: vec![item],
            })
        })
    }

    pub fn remove(&self, index: usize) -> Option<T> {
        let mut removed = None;
        self.apply(|items| {
            if index >= items.len() {
                return None;
            }
            let item = items.remove(index);
            removed = Some(item.clone());
            Some(ListChangeKind::Removed {
                start: index,
                items: vec![item],
            })
        });
        removed
    }

    /// Replaces the item at `index`, returning the previous one. An equal
    /// replacement fires nothing.
    pub fn replace(&self, index: usize, item: T) -> Option<T> {
        let mut previous = None;
        self.apply(|items| {
            let slot = items.get_mut(index)?;
            previous = Some(slot.clone());
            if values_equal(&*slot, &item) {
                return None;
            }
            let old = std::mem::replace(slot, item.clone());
            Some(ListChangeKind::Replaced {
                start: index,
                removed: vec![old],
                added: vec![item],
            })
        });
        previous
    }

    /// Swaps the whole content.
    pub fn set_all(&self, new_items: Vec<T>) {
        self.apply(|items| {
            if items.len() == new_items.len()
                && items.iter().zip(&new_items).all(|(a, b)| values_equal(a, b))
            {
                return None;
            }
            let old = std::mem::replace(items, new_items.clone());
            Some(match (old.is_empty(), new_items.is_empty()) {
                (true, _) => ListChangeKind::Added {
                    start: 0,
                    items: new_items,
                },
                (false, true) => ListChangeKind::Removed {
                    start: 0,
                    items: old,
                },
                (false, false) => ListChangeKind::Replaced {
                    start: 0,
                    removed: old,
                    added: new_items,
                },
            })
        });
    }

    pub fn clear(&self) {
        self.apply(|items| {
            if items.is_empty() {
                return None;
            }
            Some(ListChangeKind::Removed {
                start: 0,
                items: std::mem::take(items),
            })
        });
    }

    pub fn add_list_listener(&self, listener: &ListListener<T>) {
        self.0.structural.add(listener);
    }

    pub fn remove_list_listener(&self, listener: &ListListener<T>) {
        self.0.structural.remove(listener);
    }

    pub fn subscribe_changes(&self, f: impl Fn(&ListChange<T>) + 'static) -> Dispose {
        let listener = ListListener::new(f);
        self.add_list_listener(&listener);
        let weak: Weak<ListInner<T>> = Rc::downgrade(&self.0);
        Dispose::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.structural.remove(&listener);
            }
        })
    }

    pub fn add_listener(&self, listener: &Listener<Vec<T>>) {
        self.0.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Listener<Vec<T>>) {
        self.0.listeners.remove(listener);
    }

    /// Runs `mutate` against the items; `None` means nothing changed.
    fn apply(&self, mutate: impl FnOnce(&mut Vec<T>) -> Option<ListChangeKind<T>>) -> bool {
        let (old, kind, new) = {
            let mut items = self.0.items.borrow_mut();
            let old = items.clone();
            let Some(kind) = mutate(&mut items) else {
                return false;
            };
            (old, kind, items.clone())
        };
        let id = self.0.id;
        self.0.structural.fire(id, &ListChange { source: id, kind });
        self.0.listeners.fire(
            id,
            &PropertyChange {
                source: id,
                old,
                new,
            },
        );
        true
    }
}

impl<T: Clone + PartialEq + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("id", &self.0.id)
            .field("items", &*self.0.items.borrow())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> ReadableProperty<Vec<T>> for ObservableList<T> {
    fn id(&self) -> PropertyId {
        ObservableList::id(self)
    }

    fn get(&self) -> Vec<T> {
        self.to_vec()
    }

    fn add_listener(&self, listener: &Listener<Vec<T>>) {
        ObservableList::add_listener(self, listener)
    }

    fn remove_listener(&self, listener: &Listener<Vec<T>>) {
        ObservableList::remove_listener(self, listener)
    }
}

impl<T: Clone + PartialEq + 'static> WritableProperty<Vec<T>> for ObservableList<T> {
    fn set(&self, value: Vec<T>) {
        self.set_all(value)
    }
}
