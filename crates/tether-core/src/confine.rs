//! Thread confinement, made explicit.
//!
//! The engine itself never locks: a property graph belongs to one thread.
//! [`Confined`] states that contract at construction and checks it on every
//! access; [`Marshalled`] lets other threads hand values over to the owning
//! thread, which applies them when it calls [`Marshalled::drain`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::change::{Listener, PropertyId};
use crate::error::BindError;
use crate::property::{ReadableProperty, WritableProperty};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfinementPolicy {
    /// Violations panic.
    #[default]
    Panic,
    /// Violations are logged; writes and listener changes are dropped,
    /// reads go through.
    Log,
}

/// Decorator pinning a property to the thread that created the wrapper.
#[derive(Debug)]
pub struct Confined<P> {
    inner: P,
    owner: ThreadId,
    policy: ConfinementPolicy,
}

impl<P> Confined<P> {
    pub fn new(inner: P, policy: ConfinementPolicy) -> Self {
        Self {
            inner,
            owner: thread::current().id(),
            policy,
        }
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    pub fn policy(&self) -> ConfinementPolicy {
        self.policy
    }

    pub fn check(&self) -> Result<(), BindError> {
        let current = thread::current().id();
        if current == self.owner {
            Ok(())
        } else {
            Err(BindError::WrongThread {
                owner: self.owner,
                current,
            })
        }
    }

    /// Like `set`, but reports a wrong-thread call instead of applying the
    /// policy.
    pub fn try_set<T>(&self, value: T) -> Result<(), BindError>
    where
        P: WritableProperty<T>,
    {
        self.check()?;
        self.inner.set(value);
        Ok(())
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    /// True when the caller may proceed.
    fn admit(&self, op: &str) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(err) => match self.policy {
                ConfinementPolicy::Panic => panic!("{op}: {err}"),
                ConfinementPolicy::Log => {
                    log::warn!("{op}: {err}");
                    false
                }
            },
        }
    }
}

impl<P: Clone> Clone for Confined<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            owner: self.owner,
            policy: self.policy,
        }
    }
}

impl<T, P: ReadableProperty<T>> ReadableProperty<T> for Confined<P> {
    fn id(&self) -> PropertyId {
        self.inner.id()
    }

    fn get(&self) -> T {
        self.admit("get");
        self.inner.get()
    }

    fn add_listener(&self, listener: &Listener<T>) {
        if self.admit("add_listener") {
            self.inner.add_listener(listener);
        }
    }

    fn remove_listener(&self, listener: &Listener<T>) {
        if self.admit("remove_listener") {
            self.inner.remove_listener(listener);
        }
    }
}

impl<T, P: WritableProperty<T>> WritableProperty<T> for Confined<P> {
    fn set(&self, value: T) {
        if self.admit("set") {
            self.inner.set(value);
        }
    }
}

/// Thread-safe end of a [`Marshalled`] queue.
pub struct MarshalSender<T> {
    queue: Arc<Mutex<VecDeque<T>>>,
}

impl<T> MarshalSender<T> {
    pub fn post(&self, value: T) {
        self.queue.lock().push_back(value);
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<T> Clone for MarshalSender<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

/// Owning-thread end: wraps a writable property and applies posted values
/// in FIFO order.
pub struct Marshalled<T, P> {
    target: P,
    queue: Arc<Mutex<VecDeque<T>>>,
}

impl<T, P: WritableProperty<T>> Marshalled<T, P> {
    pub fn new(target: P) -> Self {
        Self {
            target,
            queue: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn sender(&self) -> MarshalSender<T> {
        MarshalSender {
            queue: self.queue.clone(),
        }
    }

    /// Applies everything posted so far, including values posted by
    /// listeners while draining. Returns how many values were applied.
    pub fn drain(&self) -> usize {
        let mut applied = 0;
        loop {
            // lock released before `set` runs listeners
            let next = self.queue.lock().pop_front();
            let Some(value) = next else { break };
            self.target.set(value);
            applied += 1;
        }
        if applied > 0 {
            log::trace!("marshalled {applied} value(s) onto the owning thread");
        }
        applied
    }

    pub fn target(&self) -> &P {
        &self.target
    }
}

impl<T, P: ReadableProperty<T>> ReadableProperty<T> for Marshalled<T, P> {
    fn id(&self) -> PropertyId {
        self.target.id()
    }

    fn get(&self) -> T {
        self.target.get()
    }

    fn add_listener(&self, listener: &Listener<T>) {
        self.target.add_listener(listener)
    }

    fn remove_listener(&self, listener: &Listener<T>) {
        self.target.remove_listener(listener)
    }
}

impl<T, P: WritableProperty<T>> WritableProperty<T> for Marshalled<T, P> {
    fn set(&self, value: T) {
        self.target.set(value)
    }
}
