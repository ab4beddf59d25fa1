//! Hash repartitioning of partitioned streams.
//!
//! Two flavors share one implementation:
//!
//! - [`hash_repartition`] drops the input keys; each output element is keyed
//!   by its output partition index.
//! - [`hash_repartition_ordered`] carries every element's original key and
//!   the input key comparer through unchanged.

use std::sync::{Arc, Mutex};

use log::debug;

use braid_core::{
    BoxedEnumerator, CancellationToken, Element, ElementComparer, NaturalOrder, OrderKey,
    OrdinalIndexState, POLL_INTERVAL, PartitionEnumerator, PartitionedStream,
};
use common_error::{BraidError, BraidResult};

use crate::partitioning::HashPartitioner;

/// Whether a repartition keeps the original ordering keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepartitionMode {
    /// Keys are replaced by the output partition index.
    Unordered,
    /// Original keys are preserved.
    OrderPreserving,
}

impl std::fmt::Display for RepartitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unordered => write!(f, "Unordered"),
            Self::OrderPreserving => write!(f, "OrderPreserving"),
        }
    }
}

/// Repartition `stream` by element hash, keying output by partition index.
pub fn hash_repartition<T: Element, K: OrderKey>(
    stream: PartitionedStream<T, K>,
    comparer: Arc<dyn ElementComparer<T>>,
    token: &CancellationToken,
) -> PartitionedStream<T, usize> {
    let count = stream.partition_count();
    let shared = Arc::new(ExchangeShared::new(
        stream.into_partitions(),
        HashPartitioner::new(comparer, count),
        token.clone(),
        RepartitionMode::Unordered,
    ));

    let partitions = (0..count)
        .map(|partition| {
            Box::new(RepartitionEnumerator {
                shared: Arc::clone(&shared),
                partition,
                rekey: |_: K, partition: usize| partition,
                buffer: None,
            }) as BoxedEnumerator<T, usize>
        })
        .collect();

    PartitionedStream::new(partitions, Arc::new(NaturalOrder), OrdinalIndexState::Shuffled)
}

/// Repartition `stream` by element hash, preserving each element's key.
pub fn hash_repartition_ordered<T: Element, K: OrderKey>(
    stream: PartitionedStream<T, K>,
    comparer: Arc<dyn ElementComparer<T>>,
    token: &CancellationToken,
) -> PartitionedStream<T, K> {
    let count = stream.partition_count();
    let (sources, key_comparer, _) = stream.into_parts();
    let shared = Arc::new(ExchangeShared::new(
        sources,
        HashPartitioner::new(comparer, count),
        token.clone(),
        RepartitionMode::OrderPreserving,
    ));

    let partitions = (0..count)
        .map(|partition| {
            Box::new(RepartitionEnumerator {
                shared: Arc::clone(&shared),
                partition,
                rekey: |key: K, _: usize| key,
                buffer: None,
            }) as BoxedEnumerator<T, K>
        })
        .collect();

    PartitionedStream::new(partitions, key_comparer, OrdinalIndexState::Shuffled)
}

// ============================================================================
// Exchange Stats
// ============================================================================

/// Rows routed to each output partition by one exchange.
#[derive(Debug, Clone, Default)]
pub struct ExchangeStats {
    /// Rows routed per output partition.
    pub rows_routed: Vec<u64>,
}

impl ExchangeStats {
    /// Create new stats for given number of partitions.
    pub fn new(num_partitions: usize) -> Self {
        Self {
            rows_routed: vec![0; num_partitions],
        }
    }

    /// Record one row routed to a partition.
    pub fn record_routed(&mut self, partition: usize) {
        if let Some(rows) = self.rows_routed.get_mut(partition) {
            *rows += 1;
        }
    }

    /// Get total rows routed.
    pub fn total_routed(&self) -> u64 {
        self.rows_routed.iter().sum()
    }
}

// ============================================================================
// Shared Exchange State
// ============================================================================

type Buckets<T, K> = Vec<Option<Vec<(T, K)>>>;

enum ExchangeState<T, K> {
    /// No output partition has been pulled yet.
    Pending(Vec<BoxedEnumerator<T, K>>),
    /// Inputs drained; each bucket is taken by its output partition.
    Ready(Buckets<T, K>),
    /// Draining failed; every later pull fails too.
    Failed { cancelled: bool, message: String },
}

struct ExchangeShared<T, K> {
    state: Mutex<ExchangeState<T, K>>,
    partitioner: HashPartitioner<T>,
    token: CancellationToken,
    mode: RepartitionMode,
}

impl<T: Element, K: OrderKey> ExchangeShared<T, K> {
    fn new(
        sources: Vec<BoxedEnumerator<T, K>>,
        partitioner: HashPartitioner<T>,
        token: CancellationToken,
        mode: RepartitionMode,
    ) -> Self {
        Self {
            state: Mutex::new(ExchangeState::Pending(sources)),
            partitioner,
            token,
            mode,
        }
    }

    /// Take the bucket for `partition`, draining all inputs on first use.
    fn take_partition(&self, partition: usize) -> BraidResult<Vec<(T, K)>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| BraidError::internal("exchange state lock poisoned"))?;

        if let ExchangeState::Pending(sources) = &mut *state {
            let sources = std::mem::take(sources);
            match self.drain(sources) {
                Ok(buckets) => *state = ExchangeState::Ready(buckets),
                Err(err) => {
                    *state = ExchangeState::Failed {
                        cancelled: err.is_cancelled(),
                        message: err.to_string(),
                    };
                    return Err(err);
                }
            }
        }

        match &mut *state {
            ExchangeState::Ready(buckets) => buckets
                .get_mut(partition)
                .and_then(Option::take)
                .ok_or_else(|| {
                    BraidError::internal(format!("exchange partition {partition} already consumed"))
                }),
            ExchangeState::Failed { cancelled, message } => Err(if *cancelled {
                BraidError::cancelled(format!("exchange aborted: {message}"))
            } else {
                BraidError::execution(format!("exchange failed: {message}"))
            }),
            ExchangeState::Pending(_) => Err(BraidError::internal("exchange not materialized")),
        }
    }

    fn drain(&self, sources: Vec<BoxedEnumerator<T, K>>) -> BraidResult<Buckets<T, K>> {
        let count = sources.len();
        let mut buckets: Vec<Vec<(T, K)>> = (0..count).map(|_| Vec::new()).collect();
        let mut stats = ExchangeStats::new(count);
        let mut polls = 0usize;

        for mut source in sources {
            while let Some((element, key)) = source.move_next()? {
                if polls & POLL_INTERVAL == 0 {
                    self.token.check()?;
                }
                polls += 1;

                let partition = self.partitioner.partition_for(&element);
                stats.record_routed(partition);
                buckets[partition].push((element, key));
            }
            source.dispose();
        }

        debug!(
            "{} hash exchange ({}) routed {} rows: {:?}",
            self.mode,
            self.partitioner,
            stats.total_routed(),
            stats.rows_routed
        );
        Ok(buckets.into_iter().map(Some).collect())
    }
}

// ============================================================================
// Output Enumerator
// ============================================================================

struct RepartitionEnumerator<T, K, O> {
    shared: Arc<ExchangeShared<T, K>>,
    partition: usize,
    rekey: fn(K, usize) -> O,
    buffer: Option<std::vec::IntoIter<(T, K)>>,
}

impl<T: Element, K: OrderKey, O: Send> PartitionEnumerator<T, O> for RepartitionEnumerator<T, K, O> {
    fn name(&self) -> &'static str {
        match self.shared.mode {
            RepartitionMode::Unordered => "HashRepartitionEnumerator",
            RepartitionMode::OrderPreserving => "OrderedHashRepartitionEnumerator",
        }
    }

    fn move_next(&mut self) -> BraidResult<Option<(T, O)>> {
        if self.buffer.is_none() {
            let bucket = self.shared.take_partition(self.partition)?;
            self.buffer = Some(bucket.into_iter());
        }

        let next = self.buffer.as_mut().and_then(Iterator::next);
        Ok(next.map(|(element, key)| (element, (self.rekey)(key, self.partition))))
    }

    fn dispose(&mut self) {
        self.buffer = Some(Vec::new().into_iter());
    }
}
