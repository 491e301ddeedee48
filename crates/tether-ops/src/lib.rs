//! # Stock transformers and aggregators
//!
//! Pure building blocks for [`tether_core::Binder`] pipelines. None of them
//! hold subscriptions; a few hold configuration (a threshold, a needle).
//!
//! ```rust
//! use tether_core::*;
//! use tether_ops::*;
//!
//! let accepted = property(true);
//! let named = property(false);
//! let can_submit = property(false);
//!
//! let _b = Binder::from_all([accepted.clone(), named.clone()])
//!     .unwrap()
//!     .aggregate(And)
//!     .unwrap()
//!     .to(&can_submit);
//! assert!(!can_submit.get());
//!
//! named.set(true);
//! assert!(can_submit.get());
//! ```

pub mod collection;
pub mod logic;
pub mod ordering;
pub mod text;


pub use collection::*;
pub use logic::*;
pub use ordering::*;
pub use text::*;
