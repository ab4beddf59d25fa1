//! Local executor implementation.

use log::debug;

use braid_core::{CancellationHandle, CancellationToken, Element, QuerySettings};
use common_config::{ExecutionConfig, ExecutionMode};
use common_error::BraidResult;

use crate::executor::ExecutionResult;
use crate::executor::driver::PartitionDriver;
use crate::metrics::{ExecutionTimer, MetricsSink};
use crate::operators::{QueryOperator, QueryResults};

/// Local multi-partition executor.
///
/// Opens the operator tree with the configured partition count, drives every
/// output partition on its own worker and gathers the results. Operators
/// that limit parallelism, and every query under
/// [`ExecutionMode::Sequential`], run through the sequential fallback.
#[derive(Debug, Clone, Default)]
pub struct LocalExecutor {
    config: ExecutionConfig,
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExecutionConfig) -> Self {
        Self { config }
    }

    /// Create with a fixed partition count.
    pub fn with_parallelism(parallelism: usize) -> Self {
        Self {
            config: ExecutionConfig::default().with_parallelism(parallelism),
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Execute `operator` to completion.
    pub fn execute<T, Op>(&self, operator: &Op) -> BraidResult<ExecutionResult<T>>
    where
        T: Element,
        Op: QueryOperator<T>,
    {
        self.execute_with_cancellation(operator, None)
    }

    /// Execute `operator`, observing `cancel_handle` at every poll point.
    pub fn execute_with_cancellation<T, Op>(
        &self,
        operator: &Op,
        cancel_handle: Option<&CancellationHandle>,
    ) -> BraidResult<ExecutionResult<T>>
    where
        T: Element,
        Op: QueryOperator<T>,
    {
        self.config.validate()?;

        let token = cancel_handle.map_or_else(CancellationToken::none, CancellationHandle::token);
        token.check()?;

        let metrics = self.config.collect_metrics.then(MetricsSink::new);
        let sequential = match self.config.execution_mode {
            ExecutionMode::Sequential => true,
            ExecutionMode::Default => operator.limits_parallelism(),
            ExecutionMode::ForceParallelism => false,
        };
        let timer = ExecutionTimer::start();

        let (elements, partition_rows) = if sequential {
            let elements = operator
                .as_sequential_query(&token)
                .collect::<BraidResult<Vec<T>>>()?;
            let rows = vec![elements.len()];
            (elements, rows)
        } else {
            let settings = QuerySettings::new(self.config.partition_count(), token);
            let results = operator.open(&settings, false)?;
            let driven = results.give_partitioned_stream(PartitionDriver::new(
                operator.output_ordered(),
                metrics.clone(),
            ))?;
            (driven.elements, driven.partition_rows)
        };

        let elapsed = timer.stop();
        if let Some(metrics) = &metrics {
            metrics.update(operator.name(), |m| {
                m.add_rows_out(elements.len());
                m.add_time(elapsed);
                m.partitions = partition_rows.len() as u64;
            });
        }
        debug!(
            "executor: operator={}, mode={}, partitions={}, rows={}, elapsed={elapsed:?}",
            operator.name(),
            if sequential { "sequential" } else { "partitioned" },
            partition_rows.len(),
            elements.len()
        );

        Ok(ExecutionResult::new(
            elements,
            partition_rows,
            metrics.unwrap_or_default(),
            elapsed,
            sequential,
        ))
    }
}
