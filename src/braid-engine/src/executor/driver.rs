//! Drives every partition of a stream on its own blocking worker.

use std::panic;

use log::debug;

use braid_core::{BoxedEnumerator, Element, OrderKey, PartitionedStream};
use common_error::{BraidError, BraidResult};
use common_runtime::JoinSet;

use crate::metrics::{ExecutionTimer, MetricsSink};
use crate::operators::StreamRecipient;

/// Elements gathered from all partitions.
pub(crate) struct DrivenOutput<T> {
    pub elements: Vec<T>,
    pub partition_rows: Vec<usize>,
}

/// Recipient that pulls every partition to completion.
///
/// Panics raised inside a partition, such as a faulting comparer, are
/// re-raised on the calling thread.
pub(crate) struct PartitionDriver {
    ordered: bool,
    metrics: Option<MetricsSink>,
}

impl PartitionDriver {
    pub fn new(ordered: bool, metrics: Option<MetricsSink>) -> Self {
        Self { ordered, metrics }
    }
}

impl<T: Element> StreamRecipient<T> for PartitionDriver {
    type Output = DrivenOutput<T>;

    fn receive<K: OrderKey>(self, stream: PartitionedStream<T, K>) -> BraidResult<DrivenOutput<T>> {
        let (partitions, key_comparer, _) = stream.into_parts();
        let count = partitions.len();
        let metrics = self.metrics;

        let joined = common_runtime::block_on(async move {
            let mut workers = JoinSet::new();
            for (index, partition) in partitions.into_iter().enumerate() {
                let metrics = metrics.clone();
                workers.spawn_blocking(move || (index, drive(index, partition, metrics.as_ref())));
            }

            let mut results: Vec<Option<BraidResult<Vec<(T, K)>>>> =
                (0..count).map(|_| None).collect();
            while let Some(next) = workers.join_next().await {
                match next {
                    Ok((index, result)) => results[index] = Some(result),
                    Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
                    Err(err) => {
                        return Err(BraidError::internal(format!(
                            "partition worker failed: {err}"
                        )));
                    }
                }
            }
            Ok(results)
        })??;

        let mut pairs = Vec::new();
        let mut partition_rows = Vec::with_capacity(count);
        for result in joined {
            let rows = result
                .ok_or_else(|| BraidError::internal("partition worker produced no result"))??;
            partition_rows.push(rows.len());
            pairs.extend(rows);
        }

        if self.ordered {
            pairs.sort_by(|a, b| key_comparer.compare(&a.1, &b.1));
        }
        debug!(
            "driver: partitions={count}, rows={}, ordered={}",
            pairs.len(),
            self.ordered
        );

        Ok(DrivenOutput {
            elements: pairs.into_iter().map(|(element, _)| element).collect(),
            partition_rows,
        })
    }
}

/// Pull one partition to exhaustion, then dispose it.
fn drive<T, K>(
    index: usize,
    mut partition: BoxedEnumerator<T, K>,
    metrics: Option<&MetricsSink>,
) -> BraidResult<Vec<(T, K)>> {
    let timer = ExecutionTimer::start();
    let mut rows = Vec::new();
    let outcome = loop {
        match partition.move_next() {
            Ok(Some(pair)) => rows.push(pair),
            Ok(None) => break Ok(()),
            Err(err) => break Err(err),
        }
    };
    partition.dispose();

    if let Some(metrics) = metrics {
        metrics.update(&format!("partition-{index}"), |m| {
            m.add_rows_out(rows.len());
            m.add_time(timer.stop());
            m.add_partition();
        });
    }
    outcome.map(|()| rows)
}
