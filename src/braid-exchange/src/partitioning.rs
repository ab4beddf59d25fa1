//! Hash partitioning of elements.

use std::sync::Arc;

use braid_core::ElementComparer;

/// Routes elements to partitions by the hash their comparer assigns.
///
/// Two elements the comparer considers equal always route to the same
/// partition for a given partition count.
pub struct HashPartitioner<T> {
    comparer: Arc<dyn ElementComparer<T>>,
    num_partitions: usize,
}

impl<T> HashPartitioner<T> {
    /// Create a partitioner over `num_partitions` partitions (at least one).
    pub fn new(comparer: Arc<dyn ElementComparer<T>>, num_partitions: usize) -> Self {
        Self {
            comparer,
            num_partitions: num_partitions.max(1),
        }
    }

    /// Get the number of partitions.
    pub const fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    /// Calculate which partition an element belongs to.
    #[allow(clippy::cast_possible_truncation)] // the remainder is below num_partitions
    pub fn partition_for(&self, element: &T) -> usize {
        (self.comparer.hash(element) % self.num_partitions as u64) as usize
    }
}

impl<T> std::fmt::Debug for HashPartitioner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashPartitioner")
            .field("num_partitions", &self.num_partitions)
            .finish_non_exhaustive()
    }
}

impl<T> std::fmt::Display for HashPartitioner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash({})", self.num_partitions)
    }
}
