//! Partitioned streams and the per-partition enumerator contract.

use std::fmt::Debug;
use std::sync::Arc;

use common_error::BraidResult;

use crate::comparer::KeyComparer;

/// Values that flow through partitioned streams.
pub trait Element: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Element for T {}

/// Ordering keys carried beside elements.
///
/// `Default` supplies the neutral key used when a side is not ordered.
pub trait OrderKey: Clone + Default + Debug + Send + Sync + 'static {}

impl<K: Clone + Default + Debug + Send + Sync + 'static> OrderKey for K {}

/// How strongly a stream's keys reflect original sequence position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrdinalIndexState {
    /// Keys are the exact original positions.
    Exact,
    /// Keys increase with original position but may have gaps.
    Increasing,
    /// Key values carry order only through the key comparer.
    #[default]
    Shuffled,
}

impl std::fmt::Display for OrdinalIndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "Exact"),
            Self::Increasing => write!(f, "Increasing"),
            Self::Shuffled => write!(f, "Shuffled"),
        }
    }
}

/// Pull-based enumerator over one partition.
///
/// # Lifecycle
///
/// ```text
/// create → move_next* → dispose
/// ```
///
/// - `move_next()` returns `Ok(Some((element, key)))` while data is available,
///   `Ok(None)` when exhausted and `Err(_)` on failure.
/// - `dispose()` releases upstream enumerators. It MUST be idempotent and is
///   safe to call after a failure.
pub trait PartitionEnumerator<T, K>: Send {
    /// Enumerator name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Advance to the next element/key pair.
    fn move_next(&mut self) -> BraidResult<Option<(T, K)>>;

    /// Release resources held by this enumerator.
    fn dispose(&mut self) {}
}

/// Boxed partition enumerator.
pub type BoxedEnumerator<T, K> = Box<dyn PartitionEnumerator<T, K>>;

/// Enumerator replaying an in-memory list of pairs.
#[derive(Debug)]
pub struct VecEnumerator<T, K> {
    items: std::vec::IntoIter<(T, K)>,
}

impl<T, K> VecEnumerator<T, K> {
    /// Create an enumerator over `items`.
    pub fn new(items: Vec<(T, K)>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl<T: Send, K: Send> PartitionEnumerator<T, K> for VecEnumerator<T, K> {
    fn name(&self) -> &'static str {
        "VecEnumerator"
    }

    fn move_next(&mut self) -> BraidResult<Option<(T, K)>> {
        Ok(self.items.next())
    }

    fn dispose(&mut self) {
        self.items = Vec::new().into_iter();
    }
}

/// A fixed-size array of partition enumerators sharing one key type.
pub struct PartitionedStream<T, K> {
    partitions: Vec<BoxedEnumerator<T, K>>,
    key_comparer: Arc<dyn KeyComparer<K>>,
    ordinal_index_state: OrdinalIndexState,
}

impl<T, K> PartitionedStream<T, K> {
    /// Create a stream from its partitions.
    pub fn new(
        partitions: Vec<BoxedEnumerator<T, K>>,
        key_comparer: Arc<dyn KeyComparer<K>>,
        ordinal_index_state: OrdinalIndexState,
    ) -> Self {
        Self {
            partitions,
            key_comparer,
            ordinal_index_state,
        }
    }

    /// Number of partitions.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Comparer ordering this stream's keys.
    pub fn key_comparer(&self) -> &Arc<dyn KeyComparer<K>> {
        &self.key_comparer
    }

    /// Ordering guarantee honored by the key values.
    pub const fn ordinal_index_state(&self) -> OrdinalIndexState {
        self.ordinal_index_state
    }

    /// Names of the partition enumerators, in partition order.
    pub fn enumerator_names(&self) -> Vec<&'static str> {
        self.partitions.iter().map(|p| p.name()).collect()
    }

    /// Take ownership of the partition enumerators.
    pub fn into_partitions(self) -> Vec<BoxedEnumerator<T, K>> {
        self.partitions
    }

    /// Split into partitions, key comparer and ordinal index state.
    pub fn into_parts(
        self,
    ) -> (
        Vec<BoxedEnumerator<T, K>>,
        Arc<dyn KeyComparer<K>>,
        OrdinalIndexState,
    ) {
        (self.partitions, self.key_comparer, self.ordinal_index_state)
    }
}

impl<T, K> Debug for PartitionedStream<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionedStream")
            .field("partitions", &self.enumerator_names())
            .field("ordinal_index_state", &self.ordinal_index_state)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static, K: Send + 'static> PartitionedStream<T, K> {
    /// Build a stream whose partitions replay the given lists.
    pub fn from_partitions(
        partitions: Vec<Vec<(T, K)>>,
        key_comparer: Arc<dyn KeyComparer<K>>,
        ordinal_index_state: OrdinalIndexState,
    ) -> Self {
        let partitions = partitions
            .into_iter()
            .map(|items| Box::new(VecEnumerator::new(items)) as BoxedEnumerator<T, K>)
            .collect();
        Self::new(partitions, key_comparer, ordinal_index_state)
    }
}
