//! Compound ordering key for binary operators.
//!
//! Elements that reach a binary operator from two sources carry keys of two
//! unrelated types. [`CompoundKey`] tags each key with its side so both can
//! live in one total order: keys from the same side compare with that side's
//! comparer, and every left key precedes every right key.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::comparer::KeyComparer;

/// A side-tagged ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompoundKey<L, R> {
    /// Key of an element produced by the left source.
    FromLeft(L),
    /// Key of an element produced by the right source.
    FromRight(R),
}

impl<L, R> CompoundKey<L, R> {
    /// Whether the key originates from the left source.
    pub const fn is_left(&self) -> bool {
        matches!(self, Self::FromLeft(_))
    }

    /// Whether the key originates from the right source.
    pub const fn is_right(&self) -> bool {
        matches!(self, Self::FromRight(_))
    }
}

impl<L: Default, R> Default for CompoundKey<L, R> {
    fn default() -> Self {
        Self::FromLeft(L::default())
    }
}

/// Total order over [`CompoundKey`]s built from the two per-side comparers.
pub struct CompoundKeyComparer<L, R> {
    left: Arc<dyn KeyComparer<L>>,
    right: Arc<dyn KeyComparer<R>>,
}

impl<L, R> CompoundKeyComparer<L, R> {
    /// Combine the left and right key comparers.
    pub fn new(left: Arc<dyn KeyComparer<L>>, right: Arc<dyn KeyComparer<R>>) -> Self {
        Self { left, right }
    }
}

impl<L, R> Clone for CompoundKeyComparer<L, R> {
    fn clone(&self) -> Self {
        Self {
            left: Arc::clone(&self.left),
            right: Arc::clone(&self.right),
        }
    }
}

impl<L, R> std::fmt::Debug for CompoundKeyComparer<L, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompoundKeyComparer").finish_non_exhaustive()
    }
}

impl<L, R> KeyComparer<CompoundKey<L, R>> for CompoundKeyComparer<L, R> {
    fn compare(&self, a: &CompoundKey<L, R>, b: &CompoundKey<L, R>) -> Ordering {
        match (a, b) {
            (CompoundKey::FromLeft(x), CompoundKey::FromLeft(y)) => self.left.compare(x, y),
            (CompoundKey::FromRight(x), CompoundKey::FromRight(y)) => self.right.compare(x, y),
            (CompoundKey::FromLeft(_), CompoundKey::FromRight(_)) => Ordering::Less,
            (CompoundKey::FromRight(_), CompoundKey::FromLeft(_)) => Ordering::Greater,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::comparer::{NaturalOrder, ReverseOrder};

    type Key = CompoundKey<i64, String>;

    fn comparer() -> CompoundKeyComparer<i64, String> {
        CompoundKeyComparer::new(Arc::new(NaturalOrder), Arc::new(NaturalOrder))
    }

    #[test]
    fn test_same_side_uses_side_comparer() {
        let cmp = comparer();
        assert_eq!(
            cmp.compare(&Key::FromLeft(1), &Key::FromLeft(2)),
            Ordering::Less
        );
        assert_eq!(
            cmp.compare(
                &Key::FromRight("b".to_string()),
                &Key::FromRight("a".to_string())
            ),
            Ordering::Greater
        );

        let reversed: CompoundKeyComparer<i64, String> =
            CompoundKeyComparer::new(Arc::new(ReverseOrder), Arc::new(NaturalOrder));
        assert_eq!(
            reversed.compare(&Key::FromLeft(1), &Key::FromLeft(2)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_left_precedes_right() {
        let cmp = comparer();
        let left = Key::FromLeft(i64::MAX);
        let right = Key::FromRight(String::new());

        assert_eq!(cmp.compare(&left, &right), Ordering::Less);
        assert_eq!(cmp.compare(&right, &left), Ordering::Greater);
        assert!(left.is_left());
        assert!(right.is_right());
    }

    #[test]
    fn test_default_is_left() {
        assert_eq!(Key::default(), Key::FromLeft(0));
    }

    fn arb_key() -> impl Strategy<Value = Key> {
        prop_oneof![
            any::<i64>().prop_map(Key::FromLeft),
            "[a-z]{0,4}".prop_map(Key::FromRight),
        ]
    }

    proptest! {
        #[test]
        fn prop_compare_is_antisymmetric(a in arb_key(), b in arb_key()) {
            let cmp = comparer();
            prop_assert_eq!(cmp.compare(&a, &b), cmp.compare(&b, &a).reverse());
        }

        #[test]
        fn prop_compare_is_transitive(a in arb_key(), b in arb_key(), c in arb_key()) {
            let cmp = comparer();
            if cmp.compare(&a, &b) != Ordering::Greater && cmp.compare(&b, &c) != Ordering::Greater {
                prop_assert_ne!(cmp.compare(&a, &c), Ordering::Greater);
            }
        }
    }
}
