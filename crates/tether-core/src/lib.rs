//! # Properties, Bindings, and Disposal
//!
//! Tether is a small, synchronous value-propagation engine for
//! presentation-layer state. A model publishes properties; presenters bind
//! them to whatever displays them. There are four main pieces:
//!
//! - [`Property<T>`]: observable holder of one value.
//! - [`CompositeProperty<T>`] / [`ObservableList<T>`]: derived and
//!   sequence-valued properties.
//! - [`Binder`]: fluent `from(..).transform(..).to(..)` wiring.
//! - [`Disposable`] / [`Scope`]: explicit teardown of subscriptions.
//!
//! ## Properties
//!
//! ```rust
//! use tether_core::*;
//!
//! let count = property(0);
//! let seen = std::rc::Rc::new(std::cell::Cell::new(0));
//!
//! let _sub = count.subscribe({
//!     let seen = seen.clone();
//!     move |change| seen.set(change.new)
//! });
//!
//! count.set(1);
//! count.set(1); // equal value: no notification
//! count.update(|v| *v += 1);
//! assert_eq!(seen.get(), 2);
//! ```
//!
//! `set` stores the value and then runs every listener, in registration
//! order, before it returns. Assigning a value equal to the current one does
//! nothing at all. That rule is load-bearing: it is the only thing that stops
//! two opposite bindings from recursing forever.
//!
//! ## Capabilities
//!
//! Reading and writing are separate traits, [`ReadableProperty`] and
//! [`WritableProperty`]. [`ReadOnly`] and [`WriteOnly`] narrow a property to
//! one of them, and [`Confined`] / [`Marshalled`] decorate any property with
//! thread-ownership rules.
//!
//! ## Bindings
//!
//! ```rust
//! use tether_core::*;
//!
//! let name = property(String::from("Ada"));
//! let valid = property(false);
//!
//! let binding = Binder::from(&name)
//!     .transform(|s: &String| !s.is_empty())
//!     .to(&valid);
//! assert!(valid.get());
//!
//! name.set(String::new());
//! assert!(!valid.get());
//!
//! binding.dispose();
//! binding.dispose(); // idempotent
//! ```
//!
//! ## Scopes
//!
//! Bindings created inside [`Scope::run`] are registered with that scope, so
//! a presenter can tear down everything it wired with one `dispose` call.
//! Nothing is released on drop.

pub mod binder;
pub mod change;
pub mod composite;
pub mod confine;
pub mod dispose;
pub mod error;
pub mod list;
pub mod prelude;
pub mod property;
pub mod scope;
pub mod transform;

#[cfg(test)]
mod tests;

pub use binder::*;
pub use change::{Handler, Listener, PropertyChange, PropertyId};
pub use composite::*;
pub use confine::*;
pub use dispose::*;
pub use error::*;
pub use list::*;
pub use property::*;
pub use scope::{Scope, current_scope};
pub use transform::*;
