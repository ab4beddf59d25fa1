//! Core execution types for Braid.
//!
//! This crate defines the vocabulary shared by the exchange and the set
//! operators:
//!
//! - [`ElementComparer`] / [`KeyComparer`]: injected equality and ordering
//!   capabilities, with natural defaults.
//! - [`CompoundKey`]: a tagged key uniting the ordering keys of two sources
//!   into one total order.
//! - [`PartitionedStream`]: a fixed array of per-partition pull enumerators
//!   sharing one key type and key comparer.
//! - [`CancellationHandle`] / [`CancellationToken`]: cooperative, polled
//!   cancellation.
//! - [`QuerySettings`]: the execution settings handed to operators.

pub mod cancellation;
pub mod comparer;
pub mod key;
pub mod settings;
pub mod stream;

pub use cancellation::{CancellationHandle, CancellationToken, POLL_INTERVAL};
pub use comparer::{
    DefaultComparer, ElementComparer, KeyComparer, NaturalOrder, ProjectionComparer, ReverseOrder,
    default_element_comparer,
};
pub use key::{CompoundKey, CompoundKeyComparer};
pub use settings::QuerySettings;
pub use stream::{
    BoxedEnumerator, Element, OrderKey, OrdinalIndexState, PartitionEnumerator, PartitionedStream,
    VecEnumerator,
};
