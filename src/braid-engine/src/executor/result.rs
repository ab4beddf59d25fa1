//! Execution result type.

use std::fmt::Write;
use std::time::Duration;

use crate::metrics::MetricsSink;

/// Output of one query execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult<T> {
    elements: Vec<T>,
    partition_rows: Vec<usize>,
    metrics: MetricsSink,
    elapsed: Duration,
    sequential: bool,
}

impl<T> ExecutionResult<T> {
    pub fn new(
        elements: Vec<T>,
        partition_rows: Vec<usize>,
        metrics: MetricsSink,
        elapsed: Duration,
        sequential: bool,
    ) -> Self {
        Self {
            elements,
            partition_rows,
            metrics,
            elapsed,
            sequential,
        }
    }

    /// Gathered elements.
    ///
    /// Ordered queries yield elements sorted by their ordering keys;
    /// unordered ones concatenate partitions in partition order.
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<T> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements produced by each partition, in partition order.
    pub fn partition_rows(&self) -> &[usize] {
        &self.partition_rows
    }

    pub fn num_partitions(&self) -> usize {
        self.partition_rows.len()
    }

    pub fn metrics(&self) -> &MetricsSink {
        &self.metrics
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the sequential fallback produced this result.
    pub fn was_sequential(&self) -> bool {
        self.sequential
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Elements per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.elements.len() as f64 / secs
        }
    }

    /// Format as EXPLAIN ANALYZE output.
    pub fn explain_analyze(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Execution Time: {:?}", self.elapsed);
        let _ = writeln!(output, "Total Rows: {}", self.len());
        let _ = writeln!(
            output,
            "Mode: {}",
            if self.sequential { "sequential" } else { "partitioned" }
        );
        let _ = writeln!(output, "Partition Rows: {:?}", self.partition_rows);
        output.push_str("\nMetrics:\n");
        output.push_str(&self.metrics.format_analyze());
        output
    }
}

impl<T> IntoIterator for ExecutionResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ExecutionResult<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
