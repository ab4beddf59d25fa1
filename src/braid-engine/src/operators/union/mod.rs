//! Distinct union of two child operators.
//!
//! Both children are opened with the same partition count, repartitioned by
//! element hash so equal elements meet in one partition, and then combined
//! partition by partition:
//!
//! - if neither child is ordered, each partition streams distinct elements
//!   through an [`UnorderedUnionEnumerator`];
//! - otherwise each partition accumulates the smallest [`CompoundKey`] per
//!   element through an [`OrderedUnionEnumerator`].
//!
//! When the query runs without partitions, [`SequentialUnion`] yields the
//! distinct elements of left then right in first-occurrence order.

mod ordered;
mod sequential;
mod unordered;

pub use ordered::OrderedUnionEnumerator;
pub use sequential::SequentialUnion;
pub use unordered::UnorderedUnionEnumerator;

use std::hash::Hash;
use std::sync::Arc;

use log::debug;

use braid_core::{
    BoxedEnumerator, CancellationToken, CompoundKey, CompoundKeyComparer, Element,
    ElementComparer, KeyComparer, NaturalOrder, OrderKey, OrdinalIndexState, PartitionedStream,
    QuerySettings, default_element_comparer,
};
use braid_exchange::{hash_repartition, hash_repartition_ordered};
use common_error::{BraidResult, ensure};

use crate::operators::traits::{QueryOperator, QueryResults, SequentialQuery, StreamRecipient};

// ============================================================================
// UnionStrategy
// ============================================================================

/// Per-partition enumerator family chosen by a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionStrategy {
    /// Neither input is ordered.
    Unordered,
    /// At least one input is ordered.
    Ordered,
}

impl UnionStrategy {
    pub const fn for_inputs(left_ordered: bool, right_ordered: bool) -> Self {
        if left_ordered || right_ordered {
            Self::Ordered
        } else {
            Self::Unordered
        }
    }
}

impl std::fmt::Display for UnionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unordered => write!(f, "Unordered"),
            Self::Ordered => write!(f, "Ordered"),
        }
    }
}

// ============================================================================
// UnionExec
// ============================================================================

/// Distinct union operator.
///
/// Output contains each equivalence class of either input exactly once.
/// Equality is decided by the element comparer, which defaults to the
/// element type's own `Eq` and `Hash`.
pub struct UnionExec<T, L, R> {
    left: L,
    right: R,
    comparer: Arc<dyn ElementComparer<T>>,
}

impl<T: Element + Eq + Hash, L: QueryOperator<T>, R: QueryOperator<T>> UnionExec<T, L, R> {
    /// Create a union, falling back to the default comparer when none is given.
    pub fn new(left: L, right: R, comparer: Option<Arc<dyn ElementComparer<T>>>) -> Self {
        Self::with_comparer(
            left,
            right,
            comparer.unwrap_or_else(default_element_comparer::<T>),
        )
    }
}

impl<T: Element, L: QueryOperator<T>, R: QueryOperator<T>> UnionExec<T, L, R> {
    /// Create a union under an explicit element comparer.
    pub fn with_comparer(left: L, right: R, comparer: Arc<dyn ElementComparer<T>>) -> Self {
        Self {
            left,
            right,
            comparer,
        }
    }

    pub fn left(&self) -> &L {
        &self.left
    }

    pub fn right(&self) -> &R {
        &self.right
    }

    pub fn comparer(&self) -> &Arc<dyn ElementComparer<T>> {
        &self.comparer
    }

    /// Enumerator family this union builds for its current children.
    pub fn strategy(&self) -> UnionStrategy {
        UnionStrategy::for_inputs(self.left.output_ordered(), self.right.output_ordered())
    }

    /// Combine two already-open partitioned streams and hand the result to
    /// `recipient`.
    ///
    /// Fails with a precondition violation if the streams have different
    /// partition counts; nothing is pulled from either stream in that case.
    pub fn wrap<LK, RK, Rc>(
        &self,
        left: PartitionedStream<T, LK>,
        right: PartitionedStream<T, RK>,
        settings: &QuerySettings,
        recipient: Rc,
    ) -> BraidResult<Rc::Output>
    where
        LK: OrderKey,
        RK: OrderKey,
        Rc: StreamRecipient<T>,
    {
        self.wrapper(settings).wrap(left, right, recipient)
    }

    fn wrapper(&self, settings: &QuerySettings) -> UnionWrap<T> {
        UnionWrap {
            comparer: Arc::clone(&self.comparer),
            left_ordered: self.left.output_ordered(),
            right_ordered: self.right.output_ordered(),
            token: settings.token().clone(),
        }
    }
}

impl<T: Element, L: QueryOperator<T>, R: QueryOperator<T>> QueryOperator<T>
    for UnionExec<T, L, R>
{
    type Results = UnionResults<T, L::Results, R::Results>;

    fn name(&self) -> &'static str {
        "UnionExec"
    }

    fn open(&self, settings: &QuerySettings, _prefer_striping: bool) -> BraidResult<Self::Results> {
        let left = self.left.open(settings, false)?;
        let right = self.right.open(settings, false)?;
        Ok(UnionResults {
            left,
            right,
            wrap: self.wrapper(settings),
        })
    }

    fn as_sequential_query(&self, token: &CancellationToken) -> SequentialQuery<T> {
        Box::new(SequentialUnion::new(
            self.left.as_sequential_query(token),
            self.right.as_sequential_query(token),
            Arc::clone(&self.comparer),
            token.clone(),
        ))
    }

    fn output_ordered(&self) -> bool {
        self.left.output_ordered() || self.right.output_ordered()
    }

    fn limits_parallelism(&self) -> bool {
        false
    }

    fn display(&self) -> String {
        format!("UnionExec(strategy={})", self.strategy())
    }

    fn explain(&self, indent: usize) -> String {
        let mut output = format!("{}{}\n", "  ".repeat(indent), self.display());
        output.push_str(&self.left.explain(indent + 1));
        output.push_str(&self.right.explain(indent + 1));
        output
    }
}

// ============================================================================
// UnionResults
// ============================================================================

/// Opened union whose children have not yet handed over their streams.
pub struct UnionResults<T, LR, RR> {
    left: LR,
    right: RR,
    wrap: UnionWrap<T>,
}

impl<T: Element, LR: QueryResults<T>, RR: QueryResults<T>> QueryResults<T>
    for UnionResults<T, LR, RR>
{
    fn partition_count(&self) -> usize {
        self.left.partition_count()
    }

    fn give_partitioned_stream<Rc: StreamRecipient<T>>(
        self,
        recipient: Rc,
    ) -> BraidResult<Rc::Output> {
        self.left.give_partitioned_stream(LeftRecipient {
            right: self.right,
            wrap: self.wrap,
            recipient,
        })
    }
}

/// Receives the left stream, then asks the right child for its stream.
struct LeftRecipient<T, RR, Rc> {
    right: RR,
    wrap: UnionWrap<T>,
    recipient: Rc,
}

impl<T: Element, RR: QueryResults<T>, Rc: StreamRecipient<T>> StreamRecipient<T>
    for LeftRecipient<T, RR, Rc>
{
    type Output = Rc::Output;

    fn receive<LK: OrderKey>(self, left: PartitionedStream<T, LK>) -> BraidResult<Rc::Output> {
        self.right.give_partitioned_stream(RightRecipient {
            left,
            wrap: self.wrap,
            recipient: self.recipient,
        })
    }
}

/// Holds the left stream until the right one arrives, then wraps both.
struct RightRecipient<T, LK, Rc> {
    left: PartitionedStream<T, LK>,
    wrap: UnionWrap<T>,
    recipient: Rc,
}

impl<T: Element, LK: OrderKey, Rc: StreamRecipient<T>> StreamRecipient<T>
    for RightRecipient<T, LK, Rc>
{
    type Output = Rc::Output;

    fn receive<RK: OrderKey>(self, right: PartitionedStream<T, RK>) -> BraidResult<Rc::Output> {
        self.wrap.wrap(self.left, right, self.recipient)
    }
}

// ============================================================================
// UnionWrap
// ============================================================================

/// Everything needed to combine two streams once both key types are known.
struct UnionWrap<T> {
    comparer: Arc<dyn ElementComparer<T>>,
    left_ordered: bool,
    right_ordered: bool,
    token: CancellationToken,
}

impl<T: Element> UnionWrap<T> {
    fn wrap<LK, RK, Rc>(
        &self,
        left: PartitionedStream<T, LK>,
        right: PartitionedStream<T, RK>,
        recipient: Rc,
    ) -> BraidResult<Rc::Output>
    where
        LK: OrderKey,
        RK: OrderKey,
        Rc: StreamRecipient<T>,
    {
        ensure!(
            left.partition_count() == right.partition_count(),
            PreconditionViolation: "union inputs have {} and {} partitions",
            left.partition_count(),
            right.partition_count()
        );

        if self.left_ordered {
            let left = hash_repartition_ordered(left, Arc::clone(&self.comparer), &self.token);
            self.wrap_right(left, right, recipient)
        } else {
            let left = hash_repartition(left, Arc::clone(&self.comparer), &self.token);
            self.wrap_right(left, right, recipient)
        }
    }

    fn wrap_right<LK, RK, Rc>(
        &self,
        left: PartitionedStream<T, LK>,
        right: PartitionedStream<T, RK>,
        recipient: Rc,
    ) -> BraidResult<Rc::Output>
    where
        LK: OrderKey,
        RK: OrderKey,
        Rc: StreamRecipient<T>,
    {
        if self.right_ordered {
            let right = hash_repartition_ordered(right, Arc::clone(&self.comparer), &self.token);
            self.wrap_partitioned(left, right, recipient)
        } else {
            let right = hash_repartition(right, Arc::clone(&self.comparer), &self.token);
            self.wrap_partitioned(left, right, recipient)
        }
    }

    fn wrap_partitioned<LK, RK, Rc>(
        &self,
        left: PartitionedStream<T, LK>,
        right: PartitionedStream<T, RK>,
        recipient: Rc,
    ) -> BraidResult<Rc::Output>
    where
        LK: OrderKey,
        RK: OrderKey,
        Rc: StreamRecipient<T>,
    {
        let strategy = UnionStrategy::for_inputs(self.left_ordered, self.right_ordered);
        debug!(
            "union: strategy={strategy}, partitions={}, left_ordered={}, right_ordered={}",
            left.partition_count(),
            self.left_ordered,
            self.right_ordered
        );

        match strategy {
            UnionStrategy::Ordered => {
                let key_comparer: Arc<dyn KeyComparer<CompoundKey<LK, RK>>> =
                    Arc::new(CompoundKeyComparer::new(
                        Arc::clone(left.key_comparer()),
                        Arc::clone(right.key_comparer()),
                    ));
                let partitions = left
                    .into_partitions()
                    .into_iter()
                    .zip(right.into_partitions())
                    .map(|(l, r)| {
                        Box::new(OrderedUnionEnumerator::new(
                            l,
                            r,
                            self.left_ordered,
                            self.right_ordered,
                            Arc::clone(&self.comparer),
                            Arc::clone(&key_comparer),
                            self.token.clone(),
                        )) as BoxedEnumerator<T, CompoundKey<LK, RK>>
                    })
                    .collect();
                recipient.receive(PartitionedStream::new(
                    partitions,
                    key_comparer,
                    OrdinalIndexState::Shuffled,
                ))
            }
            UnionStrategy::Unordered => {
                let partitions = left
                    .into_partitions()
                    .into_iter()
                    .zip(right.into_partitions())
                    .enumerate()
                    .map(|(partition, (l, r))| {
                        Box::new(UnorderedUnionEnumerator::new(
                            l,
                            r,
                            Arc::clone(&self.comparer),
                            partition,
                            self.token.clone(),
                        )) as BoxedEnumerator<T, usize>
                    })
                    .collect();
                recipient.receive(PartitionedStream::new(
                    partitions,
                    Arc::new(NaturalOrder),
                    OrdinalIndexState::Shuffled,
                ))
            }
        }
    }
}
