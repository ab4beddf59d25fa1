//! Sequential union used when the query runs without partitions.

use std::sync::Arc;

use braid_core::{CancellationToken, Element, ElementComparer, POLL_INTERVAL};
use common_error::{BraidError, BraidResult};

use crate::collections::ElementSet;
use crate::operators::traits::SequentialQuery;

/// Distinct union of two sequential inputs in first-occurrence order.
///
/// Yields every element of `left` then of `right`, skipping any element
/// equal to one already yielded. Iteration stops after the first error.
pub struct SequentialUnion<T> {
    left: Option<SequentialQuery<T>>,
    right: Option<SequentialQuery<T>>,
    seen: ElementSet<T>,
    token: CancellationToken,
    polls: usize,
}

impl<T: Element> SequentialUnion<T> {
    pub fn new(
        left: SequentialQuery<T>,
        right: SequentialQuery<T>,
        comparer: Arc<dyn ElementComparer<T>>,
        token: CancellationToken,
    ) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            seen: ElementSet::new(comparer),
            token,
            polls: 0,
        }
    }

    fn fail(&mut self, err: BraidError) -> Option<BraidResult<T>> {
        self.left = None;
        self.right = None;
        Some(Err(err))
    }

    fn pull(&mut self) -> Option<BraidResult<T>> {
        if let Some(left) = self.left.as_mut() {
            if let Some(item) = left.next() {
                return Some(item);
            }
            self.left = None;
        }
        self.right.as_mut()?.next()
    }
}

impl<T: Element> Iterator for SequentialUnion<T> {
    type Item = BraidResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.pull()?;
            if self.polls & POLL_INTERVAL == 0 {
                if let Err(err) = self.token.check() {
                    return self.fail(err);
                }
            }
            self.polls += 1;
            match item {
                Ok(element) => {
                    if self.seen.add(&element) {
                        return Some(Ok(element));
                    }
                }
                Err(err) => return self.fail(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_core::{CancellationHandle, default_element_comparer};

    fn source(values: Vec<i32>) -> SequentialQuery<i32> {
        Box::new(values.into_iter().map(BraidResult::Ok))
    }

    #[test]
    fn test_first_occurrence_order() {
        let union = SequentialUnion::new(
            source(vec![1, 2, 2, 3]),
            source(vec![3, 4]),
            default_element_comparer(),
            CancellationToken::none(),
        );
        let out: Vec<i32> = union.collect::<BraidResult<_>>().unwrap();
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_error_stops_iteration() {
        let failing: SequentialQuery<i32> = Box::new(
            vec![Ok(1), Err(BraidError::execution("source failed")), Ok(2)].into_iter(),
        );
        let mut union = SequentialUnion::new(
            failing,
            source(vec![5]),
            default_element_comparer(),
            CancellationToken::none(),
        );
        assert_eq!(union.next().unwrap().unwrap(), 1);
        assert!(union.next().unwrap().is_err());
        assert!(union.next().is_none());
    }

    #[test]
    fn test_cancelled() {
        let (handle, token) = CancellationHandle::new();
        handle.cancel();
        let mut union = SequentialUnion::new(
            source(vec![1]),
            source(vec![2]),
            default_element_comparer(),
            token,
        );
        assert!(union.next().unwrap().unwrap_err().is_cancelled());
        assert!(union.next().is_none());
    }
}
