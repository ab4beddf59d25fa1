//! Repartitioning exchange for Braid.
//!
//! The exchange redistributes a [`PartitionedStream`] by the hash of each
//! element so that equal elements, whatever partition or side they came
//! from, land in the same output partition. Binary set operators rely on this
//! co-location: once both inputs are repartitioned with the same comparer and
//! partition count, every partition can deduplicate on its own.
//!
//! ```text
//!  input partitions          exchange            output partitions
//!  ┌──────────────┐                             ┌──────────────┐
//!  │ p0: a b c    │──┐                      ┌──▶│ p0: a c      │
//!  ├──────────────┤  │   ┌──────────────┐   │   ├──────────────┤
//!  │ p1: c d      │──┼──▶│ hash(e) % N  │───┼──▶│ p1: b        │
//!  ├──────────────┤  │   └──────────────┘   │   ├──────────────┤
//!  │ p2: a e      │──┘                      └──▶│ p2: d e      │
//!  └──────────────┘                             └──────────────┘
//! ```
//!
//! The exchange is a synchronization barrier: the first pull from any output
//! partition drains every input partition.
//!
//! [`PartitionedStream`]: braid_core::PartitionedStream

pub mod exchange;
pub mod partitioning;

pub use exchange::{ExchangeStats, RepartitionMode, hash_repartition, hash_repartition_ordered};
pub use partitioning::HashPartitioner;
