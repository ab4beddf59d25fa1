//! Streaming union for partitions whose output order does not matter.

use std::sync::Arc;

use braid_core::{
    BoxedEnumerator, CancellationToken, Element, ElementComparer, OrderKey, POLL_INTERVAL,
    PartitionEnumerator,
};
use common_error::BraidResult;

use crate::collections::ElementSet;

/// Yields each distinct element of one left and one right partition.
///
/// The left partition is drained before the right one is touched, and every
/// output element is keyed by the partition index. An element is emitted the
/// first time its equivalence class is seen.
pub struct UnorderedUnionEnumerator<T, LK, RK> {
    left: Option<BoxedEnumerator<T, LK>>,
    right: Option<BoxedEnumerator<T, RK>>,
    comparer: Arc<dyn ElementComparer<T>>,
    seen: Option<ElementSet<T>>,
    partition: usize,
    token: CancellationToken,
}

impl<T, LK, RK> UnorderedUnionEnumerator<T, LK, RK> {
    pub fn new(
        left: BoxedEnumerator<T, LK>,
        right: BoxedEnumerator<T, RK>,
        comparer: Arc<dyn ElementComparer<T>>,
        partition: usize,
        token: CancellationToken,
    ) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            comparer,
            seen: None,
            partition,
            token,
        }
    }

    fn release(&mut self) {
        if let Some(mut left) = self.left.take() {
            left.dispose();
        }
        if let Some(mut right) = self.right.take() {
            right.dispose();
        }
        self.seen = None;
    }
}

impl<T: Element, LK: OrderKey, RK: OrderKey> PartitionEnumerator<T, usize>
    for UnorderedUnionEnumerator<T, LK, RK>
{
    fn name(&self) -> &'static str {
        "UnorderedUnionEnumerator"
    }

    fn move_next(&mut self) -> BraidResult<Option<(T, usize)>> {
        if self.seen.is_none() {
            self.token.check()?;
        }
        let seen = self
            .seen
            .get_or_insert_with(|| ElementSet::new(Arc::clone(&self.comparer)));

        if let Some(left) = self.left.as_mut() {
            let mut polls = 0usize;
            while let Some((element, _)) = left.move_next()? {
                if polls & POLL_INTERVAL == 0 {
                    self.token.check()?;
                }
                polls += 1;
                if seen.add(&element) {
                    return Ok(Some((element, self.partition)));
                }
            }
            left.dispose();
            self.left = None;
        }

        if let Some(right) = self.right.as_mut() {
            let mut polls = 0usize;
            while let Some((element, _)) = right.move_next()? {
                if polls & POLL_INTERVAL == 0 {
                    self.token.check()?;
                }
                polls += 1;
                if seen.add(&element) {
                    return Ok(Some((element, self.partition)));
                }
            }
            right.dispose();
            self.right = None;
        }

        Ok(None)
    }

    fn dispose(&mut self) {
        self.release();
    }
}

impl<T, LK, RK> Drop for UnorderedUnionEnumerator<T, LK, RK> {
    fn drop(&mut self) {
        self.release();
    }
}
