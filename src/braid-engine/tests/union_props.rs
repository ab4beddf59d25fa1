//! Property tests: partitioned unions agree with the sequential union and
//! keep the first-occurrence order of their ordered inputs.

use std::collections::HashSet;

use braid_engine::{LocalExecutor, ScanExec, UnionExec};
use common_config::{ExecutionConfig, ExecutionMode};
use proptest::prelude::*;

fn sequential_union(left: &[u8], right: &[u8]) -> Vec<u8> {
    let mut seen = HashSet::new();
    left.iter()
        .chain(right)
        .copied()
        .filter(|v| seen.insert(*v))
        .collect()
}

fn distinct(values: &[u8]) -> Vec<u8> {
    sequential_union(values, &[])
}

fn sorted(mut values: Vec<u8>) -> Vec<u8> {
    values.sort_unstable();
    values
}

fn is_distinct(values: &[u8]) -> bool {
    let mut seen = HashSet::new();
    values.iter().all(|v| seen.insert(*v))
}

proptest! {
    #[test]
    fn ordered_union_matches_sequential(
        left in prop::collection::vec(0u8..32, 0..60),
        right in prop::collection::vec(0u8..32, 0..60),
        partitions in 1usize..6,
    ) {
        let union = UnionExec::new(
            ScanExec::ordered(left.clone()),
            ScanExec::ordered(right.clone()),
            None,
        );
        let result = LocalExecutor::with_parallelism(partitions).execute(&union).unwrap();
        prop_assert_eq!(result.into_elements(), sequential_union(&left, &right));
    }

    #[test]
    fn unordered_union_is_distinct_set(
        left in prop::collection::vec(0u8..32, 0..60),
        right in prop::collection::vec(0u8..32, 0..60),
        partitions in 1usize..6,
    ) {
        let union = UnionExec::new(
            ScanExec::unordered(left.clone()),
            ScanExec::unordered(right.clone()),
            None,
        );
        let mut actual = LocalExecutor::with_parallelism(partitions)
            .execute(&union)
            .unwrap()
            .into_elements();
        actual.sort_unstable();

        let mut expected = sequential_union(&left, &right);
        expected.sort_unstable();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn sequential_mode_matches_reference(
        left in prop::collection::vec(0u8..32, 0..60),
        right in prop::collection::vec(0u8..32, 0..60),
    ) {
        let union = UnionExec::new(
            ScanExec::unordered(left.clone()),
            ScanExec::unordered(right.clone()),
            None,
        );
        let config = ExecutionConfig::default().with_execution_mode(ExecutionMode::Sequential);
        let result = LocalExecutor::with_config(config).execute(&union).unwrap();
        prop_assert_eq!(result.into_elements(), sequential_union(&left, &right));
    }

    #[test]
    fn ordered_left_leads_in_first_occurrence_order(
        left in prop::collection::vec(0u8..32, 0..60),
        right in prop::collection::vec(0u8..32, 0..60),
        partitions in 1usize..6,
    ) {
        let union = UnionExec::new(
            ScanExec::ordered(left.clone()),
            ScanExec::unordered(right.clone()),
            None,
        );
        let actual = LocalExecutor::with_parallelism(partitions)
            .execute(&union)
            .unwrap()
            .into_elements();

        prop_assert!(is_distinct(&actual));
        prop_assert_eq!(sorted(actual.clone()), sorted(sequential_union(&left, &right)));

        let left_distinct = distinct(&left);
        prop_assert_eq!(&actual[..left_distinct.len()], left_distinct.as_slice());
    }

    #[test]
    fn ordered_right_keeps_first_occurrence_order(
        left in prop::collection::vec(0u8..32, 0..60),
        right in prop::collection::vec(0u8..32, 0..60),
        partitions in 1usize..6,
    ) {
        let union = UnionExec::new(
            ScanExec::unordered(left.clone()),
            ScanExec::ordered(right.clone()),
            None,
        );
        let actual = LocalExecutor::with_parallelism(partitions)
            .execute(&union)
            .unwrap()
            .into_elements();

        prop_assert!(is_distinct(&actual));
        prop_assert_eq!(sorted(actual.clone()), sorted(sequential_union(&left, &right)));

        // Elements present on the left all share one key and come first.
        let left_distinct = distinct(&left);
        let (head, tail) = actual.split_at(left_distinct.len());
        prop_assert_eq!(sorted(head.to_vec()), sorted(left_distinct.clone()));

        let right_only: Vec<u8> = distinct(&right)
            .into_iter()
            .filter(|v| !left_distinct.contains(v))
            .collect();
        prop_assert_eq!(tail, right_only.as_slice());
    }
}
