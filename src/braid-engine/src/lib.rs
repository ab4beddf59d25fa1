//! Set operators and local execution for Braid.
//!
//! This crate hosts the distinct-union operator, the partition-local
//! collections it deduplicates with, and a local executor that drives every
//! output partition on its own worker.

#![allow(clippy::missing_const_for_fn)] // Builder patterns often can't be const
#![allow(clippy::return_self_not_must_use)] // Builder patterns don't always need must_use
#![allow(clippy::cast_precision_loss)] // Throughput figures are approximate
#![allow(clippy::needless_pass_by_value)] // Streams and recipients are consumed by value
#![allow(clippy::significant_drop_tightening)] // Some temporaries with Drop must stay alive
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐  open   ┌────────────────┐  give_partitioned_stream  ┌────────────────┐
//! │ QueryOperator │ ──────▶ │ QueryResults   │ ────────────────────────▶ │ StreamRecipient│
//! │ (UnionExec)   │         │ (UnionResults) │                           │ (executor)     │
//! └───────────────┘         └────────────────┘                           └────────────────┘
//!         │                                                                       │
//!         ▼ as_sequential_query                                                   ▼
//!   sequential iterator                                           one worker per partition
//! ```
//!
//! # Key Components
//!
//! ## Operators ([`operators`])
//!
//! - [`ScanExec`]: leaf operator over an in-memory list
//! - [`UnionExec`]: distinct union of two child operators
//!
//! Operator results hand their [`PartitionedStream`] to a [`StreamRecipient`]
//! whose `receive` is generic over the stream's key type. A binary operator
//! chains two recipients so it sees both children's key types at once.
//!
//! ## Collections ([`collections`])
//!
//! - [`ElementSet`]: insert-if-absent set under a pluggable comparer
//! - [`UnionAccumulationMap`]: element to smallest key seen
//!
//! ## Execution ([`executor`])
//!
//! The [`LocalExecutor`] chooses between the partitioned path and the
//! sequential fallback, then gathers results into an [`ExecutionResult`].
//!
//! [`PartitionedStream`]: braid_core::PartitionedStream

pub mod collections;
pub mod executor;
pub mod metrics;
pub mod operators;

pub use collections::{ElementSet, UnionAccumulationMap};
pub use executor::{ExecutionResult, LocalExecutor};
pub use metrics::{ExecutionTimer, MetricsSink, OperatorMetrics};
pub use operators::{
    OrderedUnionEnumerator, QueryOperator, QueryResults, ScanExec, SequentialQuery,
    SequentialUnion, StreamRecipient, StreamResults, UnionExec, UnionStrategy,
    UnorderedUnionEnumerator,
};
