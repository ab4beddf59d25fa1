//! Execution settings handed to operators when they are opened.

use crate::cancellation::CancellationToken;

/// Settings shared by every operator of one query execution.
#[derive(Debug, Clone)]
pub struct QuerySettings {
    partition_count: usize,
    token: CancellationToken,
}

impl QuerySettings {
    /// Create settings for `partition_count` partitions (at least one).
    pub fn new(partition_count: usize, token: CancellationToken) -> Self {
        Self {
            partition_count: partition_count.max(1),
            token,
        }
    }

    /// Number of partitions every partitioned stream of the query carries.
    pub const fn partition_count(&self) -> usize {
        self.partition_count
    }

    /// The shared cancellation token.
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self::new(1, CancellationToken::none())
    }
}
