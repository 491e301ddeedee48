//! Fluent construction of master -> (transform | aggregate) -> slave edges.
//!
//! ```rust
//! use tether_core::*;
//!
//! let celsius = property(20.0_f64);
//! let label = property(String::new());
//!
//! let binding = Binder::from(&celsius)
//!     .transform(|c: &f64| format!("{:.1} °F", c * 9.0 / 5.0 + 32.0))
//!     .to(&label);
//! assert_eq!(label.get(), "68.0 °F");
//!
//! celsius.set(100.0);
//! assert_eq!(label.get(), "212.0 °F");
//!
//! binding.dispose();
//! ```
//!
//! Bindings are eager: slaves receive the current master value(s) while the
//! binding is being built. Afterwards every master change is pushed, in the
//! same call stack, to every slave through `set`, so slave-side equality
//! suppression applies.
//!
//! Two opposite bindings (`a -> b`, `b -> a`) terminate after one round trip
//! because the echo assignment back to the origin is equal to what it already
//! holds. Nothing else guards against cycles.

use std::rc::Rc;

use crate::change::{Listener, PropertyChange};
use crate::composite::CompositeProperty;
use crate::dispose::{Disposable, Dispose, dispose_all};
use crate::error::BindError;
use crate::property::{ReadableProperty, SharedReadable, SharedWritable, WritableProperty};
use crate::scope::register_with_current;
use crate::transform::{Aggregator, Transformer};

/// Entry point of the fluent binding surface.
pub struct Binder;

impl Binder {
    pub fn from<T, P>(master: &P) -> BindingSource<T>
    where
        T: Clone + 'static,
        P: ReadableProperty<T> + Clone + 'static,
    {
        BindingSource {
            masters: vec![Rc::new(master.clone()) as SharedReadable<T>],
        }
    }

    pub fn from_all<T, I, P>(masters: I) -> Result<BindingSource<T>, BindError>
    where
        T: Clone + 'static,
        I: IntoIterator<Item = P>,
        P: ReadableProperty<T> + 'static,
    {
        Self::from_shared(
            masters
                .into_iter()
                .map(|m| Rc::new(m) as SharedReadable<T>)
                .collect(),
        )
    }

    pub fn from_shared<T: Clone + 'static>(
        masters: Vec<SharedReadable<T>>,
    ) -> Result<BindingSource<T>, BindError> {
        if masters.is_empty() {
            return Err(BindError::NoMasters);
        }
        Ok(BindingSource { masters })
    }

    /// `a -> b` plus `b -> a`. `b` starts out with `a`'s value.
    pub fn bidirectional<T, P, Q>(a: &P, b: &Q) -> Binding
    where
        T: Clone + 'static,
        P: ReadableProperty<T> + WritableProperty<T> + Clone + 'static,
        Q: ReadableProperty<T> + WritableProperty<T> + Clone + 'static,
    {
        let forward = Binder::from(a).to(b);
        let backward = Binder::from(b).to(a);
        Binding::merge([forward, backward])
    }
}

/// Masters collected by [`Binder`], not yet wired to anything.
pub struct BindingSource<T: 'static> {
    masters: Vec<SharedReadable<T>>,
}

impl<T: Clone + 'static> BindingSource<T> {
    pub fn master_count(&self) -> usize {
        self.masters.len()
    }

    /// Pointwise step: each master's change is mapped on its own.
    pub fn transform<U, F>(self, transformer: F) -> Pipeline<T, U>
    where
        U: Clone + 'static,
        F: Transformer<T, U> + 'static,
    {
        Pipeline {
            masters: self.masters,
            step: Step::Pointwise(Rc::new(transformer)),
        }
    }

    /// Joint step: any master change recomputes from all master values, in
    /// declaration order.
    pub fn aggregate<U, A>(self, aggregator: A) -> Result<Pipeline<T, U>, BindError>
    where
        U: Clone + 'static,
        A: Aggregator<T, U> + 'static,
    {
        if let Some(expected) = aggregator.arity()
            && expected != self.masters.len()
        {
            return Err(BindError::ArityMismatch {
                expected,
                actual: self.masters.len(),
            });
        }
        Ok(Pipeline {
            masters: self.masters,
            step: Step::Joint(Rc::new(aggregator)),
        })
    }

    pub fn to<P>(self, slave: &P) -> Binding
    where
        P: WritableProperty<T> + Clone + 'static,
    {
        self.identity().to(slave)
    }

    pub fn to_all<I, P>(self, slaves: I) -> Result<Binding, BindError>
    where
        I: IntoIterator<Item = P>,
        P: WritableProperty<T> + 'static,
    {
        self.identity().to_all(slaves)
    }

    pub fn to_shared(self, slaves: Vec<SharedWritable<T>>) -> Result<Binding, BindError> {
        self.identity().to_shared(slaves)
    }

    fn identity(self) -> Pipeline<T, T> {
        self.transform(|v: &T| v.clone())
    }
}

enum Step<T: 'static, U: 'static> {
    Pointwise(Rc<dyn Transformer<T, U>>),
    Joint(Rc<dyn Aggregator<T, U>>),
}

/// Masters plus a mapping step, waiting for slaves.
pub struct Pipeline<T: 'static, U: 'static> {
    masters: Vec<SharedReadable<T>>,
    step: Step<T, U>,
}

impl<T: Clone + 'static, U: Clone + 'static> Pipeline<T, U> {
    /// Appends another transformer to the step.
    pub fn then<V, F>(self, next: F) -> Pipeline<T, V>
    where
        V: Clone + 'static,
        F: Transformer<U, V> + 'static,
    {
        let step = match self.step {
            Step::Pointwise(first) => {
                let chained = move |v: &T| next.transform(&first.transform(v));
                Step::Pointwise(Rc::new(chained) as Rc<dyn Transformer<T, V>>)
            }
            Step::Joint(first) => {
                let chained = move |inputs: &[T]| next.transform(&first.aggregate(inputs));
                Step::Joint(Rc::new(chained) as Rc<dyn Aggregator<T, V>>)
            }
        };
        Pipeline {
            masters: self.masters,
            step,
        }
    }

    pub fn to<P>(self, slave: &P) -> Binding
    where
        P: WritableProperty<U> + Clone + 'static,
    {
        self.connect(vec![Rc::new(slave.clone()) as SharedWritable<U>])
    }

    pub fn to_all<I, P>(self, slaves: I) -> Result<Binding, BindError>
    where
        I: IntoIterator<Item = P>,
        P: WritableProperty<U> + 'static,
    {
        self.to_shared(
            slaves
                .into_iter()
                .map(|s| Rc::new(s) as SharedWritable<U>)
                .collect(),
        )
    }

    pub fn to_shared(self, slaves: Vec<SharedWritable<U>>) -> Result<Binding, BindError> {
        if slaves.is_empty() {
            return Err(BindError::NoSlaves);
        }
        Ok(self.connect(slaves))
    }

    fn connect(self, slaves: Vec<SharedWritable<U>>) -> Binding {
        let slaves: Rc<[SharedWritable<U>]> = slaves.into();
        let master_count = self.masters.len();
        let slave_count = slaves.len();
        log::debug!("binding {master_count} master(s) -> {slave_count} slave(s)");

        let teardown = match self.step {
            Step::Pointwise(transformer) => {
                let mut guards = Vec::with_capacity(master_count);
                for master in &self.masters {
                    let listener = {
                        let transformer = transformer.clone();
                        let slaves = slaves.clone();
                        let current = Rc::downgrade(master);
                        // Push the master's value now, not the event's: an
                        // earlier listener may have corrected it.
                        Listener::new(move |change: &PropertyChange<T>| match current.upgrade() {
                            Some(master) => push(&slaves, transformer.transform(&master.get())),
                            None => push(&slaves, transformer.transform(&change.new)),
                        })
                    };
                    master.add_listener(&listener);
                    let master = master.clone();
                    guards.push(Dispose::new(move || master.remove_listener(&listener)));
                }
                for master in &self.masters {
                    push(&slaves, transformer.transform(&master.get()));
                }
                dispose_all(guards)
            }
            Step::Joint(aggregator) => {
                let composite = CompositeProperty::build(self.masters);
                let listener = {
                    let aggregator = aggregator.clone();
                    let slaves = slaves.clone();
                    Listener::new(move |change: &PropertyChange<Vec<T>>| {
                        push(&slaves, aggregator.aggregate(&change.new))
                    })
                };
                composite.add_listener(&listener);
                push(&slaves, aggregator.aggregate(&composite.get()));
                Dispose::new(move || {
                    composite.remove_listener(&listener);
                    composite.dispose();
                })
            }
        };

        register_with_current(&teardown);
        Binding {
            teardown,
            masters: master_count,
            slaves: slave_count,
        }
    }
}

fn push<U: Clone>(slaves: &[SharedWritable<U>], value: U) {
    if let Some((last, rest)) = slaves.split_last() {
        for slave in rest {
            slave.set(value.clone());
        }
        last.set(value);
    }
}

/// A live edge set. Stays active until disposed; dropping the handle does
/// not detach anything.
#[derive(Clone, Debug)]
pub struct Binding {
    teardown: Dispose,
    masters: usize,
    slaves: usize,
}

impl Binding {
    pub fn master_count(&self) -> usize {
        self.masters
    }

    pub fn slave_count(&self) -> usize {
        self.slaves
    }

    /// One handle that disposes all of `bindings`.
    pub fn merge(bindings: impl IntoIterator<Item = Binding>) -> Binding {
        let mut masters = 0;
        let mut slaves = 0;
        let guards: Vec<Dispose> = bindings
            .into_iter()
            .map(|b| {
                masters += b.masters;
                slaves += b.slaves;
                b.teardown
            })
            .collect();
        Binding {
            teardown: dispose_all(guards),
            masters,
            slaves,
        }
    }
}

impl Disposable for Binding {
    fn dispose(&self) {
        if !self.teardown.is_disposed() {
            log::debug!(
                "disposing binding {} master(s) -> {} slave(s)",
                self.masters,
                self.slaves
            );
        }
        self.teardown.run();
    }

    fn is_disposed(&self) -> bool {
        self.teardown.is_disposed()
    }
}
