use tether_core::BindError;

use crate::registry::Capability;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("key {0:?} is already registered")]
    Duplicate(String),
    #[error("no handle registered under {0:?}")]
    NotFound(String),
    #[error("handle {key:?} is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
    #[error("handle {key:?} lacks capability {needed:?}")]
    MissingCapability { key: String, needed: Capability },
    #[error(transparent)]
    Bind(#[from] BindError),
}
