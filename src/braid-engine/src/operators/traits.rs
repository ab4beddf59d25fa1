//! Operator, results and recipient traits.

use braid_core::{CancellationToken, Element, OrderKey, PartitionedStream, QuerySettings};
use common_error::BraidResult;

/// Sequential rendition of an operator's output.
pub type SequentialQuery<T> = Box<dyn Iterator<Item = BraidResult<T>> + Send>;

/// A node of the query tree.
///
/// # Lifecycle
///
/// ```text
/// create → open → give_partitioned_stream → (executor drives partitions)
///        ╰→ as_sequential_query (fallback, no partitions)
/// ```
///
/// - `open()` opens every child and returns results that have not yet pulled
///   any data.
/// - Opening is lazy: no element is read until a partition enumerator is
///   first advanced.
pub trait QueryOperator<T: Element>: Send + Sync {
    /// Results type produced by [`open`](Self::open).
    type Results: QueryResults<T>;

    /// Operator name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Open the operator for partitioned execution.
    ///
    /// `prefer_striping` asks leaves to distribute elements round-robin
    /// rather than in contiguous ranges.
    fn open(&self, settings: &QuerySettings, prefer_striping: bool) -> BraidResult<Self::Results>;

    /// Evaluate the operator on the calling thread.
    fn as_sequential_query(&self, token: &CancellationToken) -> SequentialQuery<T>;

    /// Whether consumers observe this operator's output in a defined order.
    fn output_ordered(&self) -> bool;

    /// Whether this operator is better run through the sequential fallback.
    fn limits_parallelism(&self) -> bool;

    /// One-line description used by [`explain`](Self::explain).
    fn display(&self) -> String {
        self.name().to_string()
    }

    /// Format the operator tree for EXPLAIN output.
    fn explain(&self, indent: usize) -> String {
        format!("{}{}\n", "  ".repeat(indent), self.display())
    }
}

/// Opened operator output that can hand over its partitioned stream.
pub trait QueryResults<T: Element>: Send {
    /// Number of partitions the stream will have.
    fn partition_count(&self) -> usize;

    /// Hand the partitioned stream to `recipient`.
    ///
    /// The stream's key type is only known here, so it is passed on through
    /// the recipient's generic `receive`.
    fn give_partitioned_stream<R: StreamRecipient<T>>(self, recipient: R)
    -> BraidResult<R::Output>;
}

/// Consumer of a partitioned stream of any key type.
pub trait StreamRecipient<T: Element> {
    /// Value produced from the stream.
    type Output;

    /// Receive the stream.
    fn receive<K: OrderKey>(self, stream: PartitionedStream<T, K>) -> BraidResult<Self::Output>;
}

/// Results wrapping an already-built partitioned stream.
#[derive(Debug)]
pub struct StreamResults<T, K> {
    stream: PartitionedStream<T, K>,
}

impl<T, K> StreamResults<T, K> {
    pub fn new(stream: PartitionedStream<T, K>) -> Self {
        Self { stream }
    }

    /// Unwrap the stream.
    pub fn into_stream(self) -> PartitionedStream<T, K> {
        self.stream
    }
}

impl<T: Element, K: OrderKey> QueryResults<T> for StreamResults<T, K> {
    fn partition_count(&self) -> usize {
        self.stream.partition_count()
    }

    fn give_partitioned_stream<R: StreamRecipient<T>>(
        self,
        recipient: R,
    ) -> BraidResult<R::Output> {
        recipient.receive(self.stream)
    }
}
