//! Order-preserving union over compound keys.

use std::sync::Arc;

use braid_core::{
    BoxedEnumerator, CancellationToken, CompoundKey, Element, ElementComparer, KeyComparer,
    OrderKey, POLL_INTERVAL, PartitionEnumerator,
};
use common_error::BraidResult;
use hashbrown::HashTable;
use hashbrown::hash_table::IntoIter;

use crate::collections::UnionAccumulationMap;

/// Union of one left and one right partition that keeps the smallest
/// compound key for each distinct element.
///
/// The first `move_next` drains both inputs into a [`UnionAccumulationMap`];
/// later calls replay the accumulated entries in unspecified order. A side
/// that is not ordered contributes the neutral key `K::default()`.
///
/// If accumulation fails, both sources are released and every later call
/// returns `Ok(None)`.
pub struct OrderedUnionEnumerator<T, LK, RK> {
    left: Option<BoxedEnumerator<T, LK>>,
    right: Option<BoxedEnumerator<T, RK>>,
    left_ordered: bool,
    right_ordered: bool,
    comparer: Arc<dyn ElementComparer<T>>,
    key_comparer: Arc<dyn KeyComparer<CompoundKey<LK, RK>>>,
    output: Option<IntoIter<(T, CompoundKey<LK, RK>)>>,
    token: CancellationToken,
}

impl<T, LK, RK> OrderedUnionEnumerator<T, LK, RK> {
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn new(
        left: BoxedEnumerator<T, LK>,
        right: BoxedEnumerator<T, RK>,
        left_ordered: bool,
        right_ordered: bool,
        comparer: Arc<dyn ElementComparer<T>>,
        key_comparer: Arc<dyn KeyComparer<CompoundKey<LK, RK>>>,
        token: CancellationToken,
    ) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            left_ordered,
            right_ordered,
            comparer,
            key_comparer,
            output: None,
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
        self.output = None;
    }
}

impl<T: Element, LK: OrderKey, RK: OrderKey> OrderedUnionEnumerator<T, LK, RK> {
    /// Drain both sides, polling cancellation on one shared counter.
    fn accumulate(&mut self) -> BraidResult<UnionAccumulationMap<T, CompoundKey<LK, RK>>> {
        let mut map =
            UnionAccumulationMap::new(Arc::clone(&self.comparer), Arc::clone(&self.key_comparer));
        self.token.check()?;
        let mut polls = 0usize;

        if let Some(left) = self.left.as_mut() {
            while let Some((element, key)) = left.move_next()? {
                if polls & POLL_INTERVAL == 0 {
                    self.token.check()?;
                }
                polls += 1;
                let key = if self.left_ordered { key } else { LK::default() };
                map.offer(element, CompoundKey::FromLeft(key));
            }
            left.dispose();
            self.left = None;
        }

        if let Some(right) = self.right.as_mut() {
            while let Some((element, key)) = right.move_next()? {
                if polls & POLL_INTERVAL == 0 {
                    self.token.check()?;
                }
                polls += 1;
                let key = if self.right_ordered { key } else { RK::default() };
                map.offer(element, CompoundKey::FromRight(key));
            }
            right.dispose();
            self.right = None;
        }

        Ok(map)
    }
}

impl<T: Element, LK: OrderKey, RK: OrderKey> PartitionEnumerator<T, CompoundKey<LK, RK>>
    for OrderedUnionEnumerator<T, LK, RK>
{
    fn name(&self) -> &'static str {
        "OrderedUnionEnumerator"
    }

    fn move_next(&mut self) -> BraidResult<Option<(T, CompoundKey<LK, RK>)>> {
        if self.output.is_none() {
            match self.accumulate() {
                Ok(map) => self.output = Some(map.into_entries()),
                Err(err) => {
                    self.release();
                    self.output = Some(HashTable::new().into_iter());
                    return Err(err);
                }
            }
        }
        Ok(self.output.as_mut().and_then(Iterator::next))
    }

    fn dispose(&mut self) {
        self.release();
    }
}

impl<T, LK, RK> Drop for OrderedUnionEnumerator<T, LK, RK> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use braid_core::{
        CancellationHandle, CompoundKeyComparer, NaturalOrder, ProjectionComparer, VecEnumerator,
        default_element_comparer,
    };
    use common_error::BraidError;

    /// What a [`CountingSource`] does once the shared pull count reaches its trigger.
    enum Trigger {
        Cancel(CancellationHandle),
        Fail,
    }

    /// Yields `0..len` offset by `base`, counting every pull on a counter
    /// shared with the other side.
    struct CountingSource {
        base: i32,
        positions: std::ops::Range<usize>,
        pulled: Arc<AtomicUsize>,
        trigger_at: usize,
        trigger: Trigger,
        disposed: Arc<AtomicBool>,
    }

    impl CountingSource {
        fn boxed(
            base: i32,
            len: usize,
            pulled: &Arc<AtomicUsize>,
            trigger_at: usize,
            trigger: Trigger,
        ) -> (BoxedEnumerator<i32, usize>, Arc<AtomicBool>) {
            let disposed = Arc::new(AtomicBool::new(false));
            let source = Self {
                base,
                positions: 0..len,
                pulled: Arc::clone(pulled),
                trigger_at,
                trigger,
                disposed: Arc::clone(&disposed),
            };
            (Box::new(source), disposed)
        }
    }

    impl PartitionEnumerator<i32, usize> for CountingSource {
        fn name(&self) -> &'static str {
            "CountingSource"
        }

        fn move_next(&mut self) -> BraidResult<Option<(i32, usize)>> {
            let Some(position) = self.positions.next() else {
                return Ok(None);
            };
            let pulled = self.pulled.fetch_add(1, Ordering::SeqCst) + 1;
            if pulled == self.trigger_at {
                match &self.trigger {
                    Trigger::Cancel(handle) => handle.cancel(),
                    Trigger::Fail => return Err(BraidError::execution("source failed")),
                }
            }
            Ok(Some((self.base + i32::try_from(position).unwrap(), position)))
        }

        fn dispose(&mut self) {
            self.disposed.store(true, Ordering::SeqCst);
        }
    }

    fn side<T: Element>(values: &[T]) -> BoxedEnumerator<T, usize> {
        Box::new(VecEnumerator::new(
            values.iter().cloned().enumerate().map(|(i, v)| (v, i)).collect(),
        ))
    }

    fn key_comparer() -> Arc<dyn KeyComparer<CompoundKey<usize, usize>>> {
        Arc::new(CompoundKeyComparer::new(
            Arc::new(NaturalOrder),
            Arc::new(NaturalOrder),
        ))
    }

    fn sorted<T: Element>(
        e: &mut OrderedUnionEnumerator<T, usize, usize>,
    ) -> Vec<(T, CompoundKey<usize, usize>)> {
        let comparer = key_comparer();
        let mut out = Vec::new();
        while let Some(pair) = e.move_next().unwrap() {
            out.push(pair);
        }
        out.sort_by(|a, b| comparer.compare(&a.1, &b.1));
        out
    }

    #[test]
    fn test_min_key_per_element() {
        let mut e = OrderedUnionEnumerator::new(
            side(&[1, 2, 2, 3]),
            side(&[3, 4]),
            true,
            true,
            default_element_comparer(),
            key_comparer(),
            CancellationToken::none(),
        );
        assert_eq!(
            sorted(&mut e),
            vec![
                (1, CompoundKey::FromLeft(0)),
                (2, CompoundKey::FromLeft(1)),
                (3, CompoundKey::FromLeft(3)),
                (4, CompoundKey::FromRight(1)),
            ]
        );
    }

    #[test]
    fn test_unordered_side_uses_neutral_key() {
        let mut e = OrderedUnionEnumerator::new(
            side(&[5, 6]),
            side(&[7, 8]),
            true,
            false,
            default_element_comparer(),
            key_comparer(),
            CancellationToken::none(),
        );
        let keys: Vec<_> = sorted(&mut e).into_iter().map(|(_, k)| k).collect();
        assert_eq!(
            keys,
            vec![
                CompoundKey::FromLeft(0),
                CompoundKey::FromLeft(1),
                CompoundKey::FromRight(0),
                CompoundKey::FromRight(0),
            ]
        );
    }

    #[test]
    fn test_left_representative_wins() {
        let comparer: Arc<dyn ElementComparer<String>> =
            Arc::new(ProjectionComparer::new(|s: &String| s.to_lowercase()));
        let mut e = OrderedUnionEnumerator::new(
            side(&["a".to_string(), "B".to_string()]),
            side(&["b".to_string(), "c".to_string()]),
            true,
            true,
            comparer,
            key_comparer(),
            CancellationToken::none(),
        );
        let values: Vec<String> = sorted(&mut e).into_iter().map(|(v, _)| v).collect();
        assert_eq!(values, vec!["a", "B", "c"]);
    }

    #[test]
    fn test_cancelled_before_first_pull() {
        let (handle, token) = CancellationHandle::new();
        handle.cancel();
        let mut e = OrderedUnionEnumerator::new(
            side(&[1]),
            side(&[2]),
            true,
            true,
            default_element_comparer(),
            key_comparer(),
            token,
        );
        assert!(e.move_next().unwrap_err().is_cancelled());
        e.dispose();
        e.dispose();
    }

    #[test]
    fn test_cancelled_with_empty_inputs() {
        let (handle, token) = CancellationHandle::new();
        handle.cancel();
        let mut e = OrderedUnionEnumerator::new(
            side::<i32>(&[]),
            side::<i32>(&[]),
            true,
            true,
            default_element_comparer(),
            key_comparer(),
            token,
        );
        assert!(e.move_next().unwrap_err().is_cancelled());
    }

    #[test]
    fn test_cancellation_observed_mid_left_scan() {
        let (handle, token) = CancellationHandle::new();
        let pulled = Arc::new(AtomicUsize::new(0));
        let cancel_at = 10;
        let (left, _) = CountingSource::boxed(0, 500, &pulled, cancel_at, Trigger::Cancel(handle));
        let (right, right_disposed) =
            CountingSource::boxed(1000, 500, &pulled, usize::MAX, Trigger::Fail);
        let mut e = OrderedUnionEnumerator::new(
            left,
            right,
            true,
            true,
            default_element_comparer(),
            key_comparer(),
            token,
        );

        assert!(e.move_next().unwrap_err().is_cancelled());
        let pulled = pulled.load(Ordering::SeqCst);
        assert!(pulled > cancel_at);
        assert!(pulled <= cancel_at + POLL_INTERVAL + 1);
        assert!(right_disposed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_poll_counter_carries_into_right_scan() {
        let (handle, token) = CancellationHandle::new();
        let pulled = Arc::new(AtomicUsize::new(0));
        // The left side ends between two checks; the right side must not
        // restart the count.
        let cancel_at = 100;
        let (left, _) = CountingSource::boxed(0, 97, &pulled, usize::MAX, Trigger::Fail);
        let (right, _) =
            CountingSource::boxed(1000, 500, &pulled, cancel_at, Trigger::Cancel(handle));
        let mut e = OrderedUnionEnumerator::new(
            left,
            right,
            true,
            false,
            default_element_comparer(),
            key_comparer(),
            token,
        );

        assert!(e.move_next().unwrap_err().is_cancelled());
        let pulled = pulled.load(Ordering::SeqCst);
        assert_eq!(pulled, 2 * (POLL_INTERVAL + 1) + 1);
        assert!(pulled <= cancel_at + POLL_INTERVAL + 1);
    }

    #[test]
    fn test_failed_accumulation_releases_sources() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let (left, left_disposed) =
            CountingSource::boxed(0, 5, &pulled, usize::MAX, Trigger::Fail);
        let (right, right_disposed) = CountingSource::boxed(1000, 5, &pulled, 7, Trigger::Fail);
        let mut e = OrderedUnionEnumerator::new(
            left,
            right,
            true,
            true,
            default_element_comparer(),
            key_comparer(),
            CancellationToken::none(),
        );

        let err = e.move_next().unwrap_err();
        assert!(matches!(err, BraidError::ExecutionError(_)));
        assert!(left_disposed.load(Ordering::SeqCst));
        assert!(right_disposed.load(Ordering::SeqCst));

        assert_eq!(e.move_next().unwrap(), None);
        assert_eq!(e.move_next().unwrap(), None);
        assert_eq!(pulled.load(Ordering::SeqCst), 7);
    }
}
