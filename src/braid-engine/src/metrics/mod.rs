//! Metrics collection for query execution.
//!
//! The executor records one entry for the root operator and one per driven
//! partition (`partition-0`, `partition-1`, ...).

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Metrics for one operator or partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorMetrics {
    /// Number of elements produced.
    pub rows_out: u64,
    /// Wall-clock time spent producing them.
    pub exec_time: Duration,
    /// Number of partition workers that contributed.
    pub partitions: u64,
}

impl OperatorMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows_out: 0,
            exec_time: Duration::new(0, 0),
            partitions: 0,
        }
    }

    pub fn add_rows_out(&mut self, count: usize) {
        self.rows_out += count as u64;
    }

    pub fn add_time(&mut self, duration: Duration) {
        self.exec_time += duration;
    }

    pub fn add_partition(&mut self) {
        self.partitions += 1;
    }

    /// Elements produced per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.exec_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.rows_out as f64 / secs
        }
    }
}

impl std::fmt::Display for OperatorMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rows_out={}, time={:?}, partitions={}",
            self.rows_out, self.exec_time, self.partitions
        )
    }
}

/// Shared sink for collecting metrics from partition workers.
#[derive(Debug, Clone, Default)]
pub struct MetricsSink {
    metrics: Arc<RwLock<HashMap<String, OperatorMetrics>>>,
}

impl MetricsSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the metrics recorded under `id` using a closure.
    pub fn update<F>(&self, id: &str, f: F)
    where
        F: FnOnce(&mut OperatorMetrics),
    {
        let mut guard = self.metrics.write().unwrap_or_else(PoisonError::into_inner);
        f(guard.entry(id.to_string()).or_default());
    }

    pub fn get(&self, id: &str) -> Option<OperatorMetrics> {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn all(&self) -> HashMap<String, OperatorMetrics> {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Format metrics for EXPLAIN ANALYZE, sorted by id.
    pub fn format_analyze(&self) -> String {
        let metrics = self.all();
        let mut ids: Vec<_> = metrics.keys().collect();
        ids.sort();

        let mut output = String::new();
        for id in ids {
            let _ = writeln!(output, "{id}: {}", metrics[id]);
        }
        if output.is_empty() {
            output.push_str("No metrics collected.\n");
        }
        output
    }
}

/// Timer for measuring execution time.
#[derive(Debug)]
pub struct ExecutionTimer {
    start: Instant,
}

impl ExecutionTimer {
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    #[must_use]
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for ExecutionTimer {
    fn default() -> Self {
        Self::start()
    }
}
