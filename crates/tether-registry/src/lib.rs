//! # Named handles
//!
//! Presenters and models meet through a [`Registry`]: the model registers
//! its properties and actions under string keys, the presenter looks them up
//! with the type it expects. Registration is explicit; nothing is discovered
//! by scanning.
//!
//! ```rust
//! use tether_core::*;
//! use tether_registry::*;
//!
//! let mut registry = Registry::new();
//! registry
//!     .register_property("user.name", property(String::from("Ada")), Capability::READ_WRITE)
//!     .unwrap();
//! registry
//!     .register_property("header.title", property(String::new()), Capability::READ_WRITE)
//!     .unwrap();
//!
//! let _binding = registry.bind::<String>("user.name", "header.title").unwrap();
//! assert_eq!(registry.readable::<String>("header.title").unwrap().get(), "Ada");
//! ```

pub mod error;
pub mod registry;


pub use error::RegistryError;
pub use registry::{Action, Capability, EntryKey, Registry};
