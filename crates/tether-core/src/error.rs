use std::thread::ThreadId;

/// Construction-time failures of the binding engine.
///
/// Idempotent operations (disposing twice, removing a listener that was never
/// added) never produce one of these; they are silent no-ops.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("a binding needs at least one master property")]
    NoMasters,
    #[error("a binding needs at least one slave property")]
    NoSlaves,
    #[error("aggregator expects {expected} input(s) but the binding has {actual} master(s)")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("a composite property needs at least one source")]
    EmptyComposite,
    #[error("property is confined to thread {owner:?} but was accessed from {current:?}")]
    WrongThread { owner: ThreadId, current: ThreadId },
}
