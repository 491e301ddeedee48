use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use slotmap::{SlotMap, new_key_type};
use tether_core::{
    Aggregator, Binder, Binding, ReadableProperty, SharedReadable, SharedWritable,
    WritableProperty,
};

use crate::error::RegistryError;

bitflags! {
    /// What a registered property handle may be used for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capability: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

new_key_type! {
    pub struct EntryKey;
}

pub type Action = Rc<dyn Fn()>;

struct PropertyHandle<T: 'static> {
    readable: Option<SharedReadable<T>>,
    writable: Option<SharedWritable<T>>,
}

enum Handle {
    Property {
        handle: Box<dyn Any>,
        value_type: &'static str,
        caps: Capability,
    },
    Action(Action),
}

struct Entry {
    name: String,
    handle: Handle,
}

/// String-keyed table of property and action handles.
///
/// Keys are unique; registering a taken key fails instead of replacing it.
#[derive(Default)]
pub struct Registry {
    entries: SlotMap<EntryKey, Entry>,
    index: HashMap<String, EntryKey>,
    order: Vec<EntryKey>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a readable and writable property, exposing only `caps`.
    pub fn register_property<T, P>(
        &mut self,
        key: impl Into<String>,
        property: P,
        caps: Capability,
    ) -> Result<EntryKey, RegistryError>
    where
        T: 'static,
        P: ReadableProperty<T> + WritableProperty<T> + 'static,
    {
        let shared = Rc::new(property);
        let handle = PropertyHandle::<T> {
            readable: caps
                .contains(Capability::READ)
                .then(|| shared.clone() as SharedReadable<T>),
            writable: caps
                .contains(Capability::WRITE)
                .then(|| shared as SharedWritable<T>),
        };
        self.insert_property(key.into(), handle, caps)
    }

    pub fn register_readable<T, P>(
        &mut self,
        key: impl Into<String>,
        property: P,
    ) -> Result<EntryKey, RegistryError>
    where
        T: 'static,
        P: ReadableProperty<T> + 'static,
    {
        let handle = PropertyHandle::<T> {
            readable: Some(Rc::new(property) as SharedReadable<T>),
            writable: None,
        };
        self.insert_property(key.into(), handle, Capability::READ)
    }

    pub fn register_writable<T, P>(
        &mut self,
        key: impl Into<String>,
        property: P,
    ) -> Result<EntryKey, RegistryError>
    where
        T: 'static,
        P: WritableProperty<T> + 'static,
    {
        let handle = PropertyHandle::<T> {
            readable: None,
            writable: Some(Rc::new(property) as SharedWritable<T>),
        };
        self.insert_property(key.into(), handle, Capability::WRITE)
    }

    pub fn register_action(
        &mut self,
        key: impl Into<String>,
        action: impl Fn() + 'static,
    ) -> Result<EntryKey, RegistryError> {
        self.insert(key.into(), Handle::Action(Rc::new(action)))
    }

    pub fn readable<T: 'static>(&self, key: &str) -> Result<SharedReadable<T>, RegistryError> {
        self.property_handle::<T>(key)?
            .readable
            .clone()
            .ok_or_else(|| RegistryError::MissingCapability {
                key: key.to_string(),
                needed: Capability::READ,
            })
    }

    pub fn writable<T: 'static>(&self, key: &str) -> Result<SharedWritable<T>, RegistryError> {
        self.property_handle::<T>(key)?
            .writable
            .clone()
            .ok_or_else(|| RegistryError::MissingCapability {
                key: key.to_string(),
                needed: Capability::WRITE,
            })
    }

    /// Capabilities of a property handle; empty for actions.
    pub fn capability(&self, key: &str) -> Result<Capability, RegistryError> {
        match &self.entry(key)?.handle {
            Handle::Property { caps, .. } => Ok(*caps),
            Handle::Action(_) => Ok(Capability::empty()),
        }
    }

    /// Value type of a property handle, for diagnostics.
    pub fn value_type(&self, key: &str) -> Option<&'static str> {
        match &self.entry(key).ok()?.handle {
            Handle::Property { value_type, .. } => Some(*value_type),
            Handle::Action(_) => None,
        }
    }

    pub fn action(&self, key: &str) -> Result<Action, RegistryError> {
        match &self.entry(key)?.handle {
            Handle::Action(action) => Ok(action.clone()),
            Handle::Property { .. } => Err(RegistryError::TypeMismatch {
                key: key.to_string(),
                expected: "action",
            }),
        }
    }

    pub fn invoke(&self, key: &str) -> Result<(), RegistryError> {
        let action = self.action(key)?;
        log::trace!("invoking action {key:?}");
        action();
        Ok(())
    }

    /// One-way binding between two registered properties of type `T`.
    pub fn bind<T: Clone + 'static>(
        &self,
        master: &str,
        slave: &str,
    ) -> Result<Binding, RegistryError> {
        let source = self.readable::<T>(master)?;
        let target = self.writable::<T>(slave)?;
        Ok(Binder::from_shared(vec![source])?.to_shared(vec![target])?)
    }

    /// Joint binding from several registered masters, in the order given.
    pub fn bind_aggregate<T, U, A>(
        &self,
        masters: &[&str],
        aggregator: A,
        slave: &str,
    ) -> Result<Binding, RegistryError>
    where
        T: Clone + 'static,
        U: Clone + 'static,
        A: Aggregator<T, U> + 'static,
    {
        let sources = masters
            .iter()
            .map(|key| self.readable::<T>(key))
            .collect::<Result<Vec<_>, _>>()?;
        let target = self.writable::<U>(slave)?;
        Ok(Binder::from_shared(sources)?
            .aggregate(aggregator)?
            .to_shared(vec![target])?)
    }

    /// Returns false when nothing was registered under `key`.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(slot) = self.index.remove(key) else {
            return false;
        };
        self.entries.remove(slot);
        self.order.retain(|k| *k != slot);
        log::debug!("unregistered {key:?}");
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(*k))
            .map(|e| e.name.as_str())
    }

    pub fn key_of(&self, name: &str) -> Option<EntryKey> {
        self.index.get(name).copied()
    }

    fn insert_property<T: 'static>(
        &mut self,
        name: String,
        handle: PropertyHandle<T>,
        caps: Capability,
    ) -> Result<EntryKey, RegistryError> {
        self.insert(
            name,
            Handle::Property {
                handle: Box::new(handle),
                value_type: type_name::<T>(),
                caps,
            },
        )
    }

    fn insert(&mut self, name: String, handle: Handle) -> Result<EntryKey, RegistryError> {
        if self.index.contains_key(&name) {
            log::warn!("rejecting duplicate registration of {name:?}");
            return Err(RegistryError::Duplicate(name));
        }
        let kind = match &handle {
            Handle::Property { value_type, .. } => *value_type,
            Handle::Action(_) => "action",
        };
        log::debug!("registered {name:?} ({kind})");
        let slot = self.entries.insert(Entry {
            name: name.clone(),
            handle,
        });
        self.index.insert(name, slot);
        self.order.push(slot);
        Ok(slot)
    }

    fn entry(&self, key: &str) -> Result<&Entry, RegistryError> {
        self.index
            .get(key)
            .and_then(|slot| self.entries.get(*slot))
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))
    }

    fn property_handle<T: 'static>(&self, key: &str) -> Result<&PropertyHandle<T>, RegistryError> {
        let mismatch = || RegistryError::TypeMismatch {
            key: key.to_string(),
            expected: type_name::<T>(),
        };
        match &self.entry(key)?.handle {
            Handle::Property { handle, .. } => handle
                .downcast_ref::<PropertyHandle<T>>()
                .ok_or_else(mismatch),
            Handle::Action(_) => Err(mismatch()),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}
