pub use crate::binder::{Binder, Binding, BindingSource, Pipeline};
pub use crate::change::{Listener, PropertyChange, PropertyId};
pub use crate::composite::CompositeProperty;
pub use crate::confine::{ConfinementPolicy, Confined, MarshalSender, Marshalled};
pub use crate::dispose::{Disposable, Dispose};
pub use crate::error::BindError;
pub use crate::list::{ListChange, ListChangeKind, ListListener, ObservableList};
pub use crate::property::{
    Property, ReadOnly, ReadableProperty, WritableProperty, WriteOnly, property,
};
pub use crate::scope::Scope;
pub use crate::transform::{Aggregator, AggregatorExt, Transformer, TransformerExt};
