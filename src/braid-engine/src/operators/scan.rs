//! In-memory scan operator.

use std::sync::Arc;

use braid_core::{
    BoxedEnumerator, CancellationToken, Element, NaturalOrder, OrdinalIndexState,
    PartitionEnumerator, PartitionedStream, QuerySettings,
};
use common_error::BraidResult;

use crate::operators::traits::{QueryOperator, SequentialQuery, StreamResults};

/// Leaf operator producing the elements of an in-memory list.
///
/// Every element is keyed by its original position, so the output carries
/// exact ordinal keys whether or not the scan is marked ordered.
#[derive(Debug, Clone)]
pub struct ScanExec<T> {
    data: Arc<Vec<T>>,
    ordered: bool,
}

impl<T: Element> ScanExec<T> {
    pub fn new(data: Vec<T>, ordered: bool) -> Self {
        Self {
            data: Arc::new(data),
            ordered,
        }
    }

    /// Scan whose consumers observe source order.
    pub fn ordered(data: Vec<T>) -> Self {
        Self::new(data, true)
    }

    /// Scan with no order guarantee.
    pub fn unordered(data: Vec<T>) -> Self {
        Self::new(data, false)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn partition(&self, partition: usize, count: usize, striped: bool) -> ScanEnumerator<T> {
        let len = self.data.len();
        if striped {
            ScanEnumerator {
                data: Arc::clone(&self.data),
                next: partition,
                end: len,
                step: count,
            }
        } else {
            let chunk = len.div_ceil(count).max(1);
            ScanEnumerator {
                data: Arc::clone(&self.data),
                next: (partition * chunk).min(len),
                end: ((partition + 1) * chunk).min(len),
                step: 1,
            }
        }
    }
}

impl<T: Element> QueryOperator<T> for ScanExec<T> {
    type Results = StreamResults<T, usize>;

    fn name(&self) -> &'static str {
        "ScanExec"
    }

    fn open(&self, settings: &QuerySettings, prefer_striping: bool) -> BraidResult<Self::Results> {
        let count = settings.partition_count();
        let partitions = (0..count)
            .map(|p| Box::new(self.partition(p, count, prefer_striping)) as BoxedEnumerator<T, usize>)
            .collect();

        Ok(StreamResults::new(PartitionedStream::new(
            partitions,
            Arc::new(NaturalOrder),
            OrdinalIndexState::Exact,
        )))
    }

    fn as_sequential_query(&self, _token: &CancellationToken) -> SequentialQuery<T> {
        let data = Arc::clone(&self.data);
        Box::new((0..data.len()).map(move |i| BraidResult::Ok(data[i].clone())))
    }

    fn output_ordered(&self) -> bool {
        self.ordered
    }

    fn limits_parallelism(&self) -> bool {
        false
    }

    fn display(&self) -> String {
        format!("ScanExec(rows={}, ordered={})", self.data.len(), self.ordered)
    }
}

/// Enumerator over positions `next, next + step, ...` below `end`.
struct ScanEnumerator<T> {
    data: Arc<Vec<T>>,
    next: usize,
    end: usize,
    step: usize,
}

impl<T: Element> PartitionEnumerator<T, usize> for ScanEnumerator<T> {
    fn name(&self) -> &'static str {
        "ScanEnumerator"
    }

    fn move_next(&mut self) -> BraidResult<Option<(T, usize)>> {
        if self.next >= self.end {
            return Ok(None);
        }
        let position = self.next;
        self.next += self.step;
        Ok(Some((self.data[position].clone(), position)))
    }

    fn dispose(&mut self) {
        self.next = self.end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(stream: PartitionedStream<i32, usize>) -> Vec<Vec<(i32, usize)>> {
        stream
            .into_partitions()
            .into_iter()
            .map(|mut p| {
                let mut out = Vec::new();
                while let Some(pair) = p.move_next().unwrap() {
                    out.push(pair);
                }
                out
            })
            .collect()
    }

    fn open(scan: &ScanExec<i32>, partitions: usize, striped: bool) -> Vec<Vec<(i32, usize)>> {
        let settings = QuerySettings::new(partitions, CancellationToken::none());
        let results = scan.open(&settings, striped).unwrap();
        drain(results.into_stream())
    }

    #[test]
    fn test_contiguous_partitions() {
        let scan = ScanExec::ordered(vec![10, 11, 12, 13, 14]);
        let parts = open(&scan, 2, false);
        assert_eq!(parts[0], vec![(10, 0), (11, 1), (12, 2)]);
        assert_eq!(parts[1], vec![(13, 3), (14, 4)]);
    }

    #[test]
    fn test_striped_partitions() {
        let scan = ScanExec::unordered(vec![10, 11, 12, 13, 14]);
        let parts = open(&scan, 2, true);
        assert_eq!(parts[0], vec![(10, 0), (12, 2), (14, 4)]);
        assert_eq!(parts[1], vec![(11, 1), (13, 3)]);
    }

    #[test]
    fn test_more_partitions_than_rows() {
        let scan = ScanExec::ordered(vec![1, 2]);
        let parts = open(&scan, 4, false);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts.iter().map(Vec::len).sum::<usize>(), 2);
        assert!(parts[3].is_empty());
    }

    #[test]
    fn test_sequential_query() {
        let scan = ScanExec::ordered(vec![3, 1, 2]);
        let out: Vec<i32> = scan
            .as_sequential_query(&CancellationToken::none())
            .collect::<BraidResult<_>>()
            .unwrap();
        assert_eq!(out, vec![3, 1, 2]);
    }

    #[test]
    fn test_explain() {
        let scan = ScanExec::ordered(vec![1, 2, 3]);
        assert_eq!(scan.explain(1), "  ScanExec(rows=3, ordered=true)\n");
    }
}
