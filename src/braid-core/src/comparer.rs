//! Injected equality and ordering capabilities.
//!
//! Operators never inline their comparison logic. Element equality is an
//! [`ElementComparer`] (equality plus a hash consistent with it, so equal
//! elements can be routed to the same partition), and key ordering is a
//! [`KeyComparer`]. Both are shared as trait objects.
//!
//! A comparer that faults does so by panicking; the panic propagates
//! unmodified to whoever is driving the enumerator.

use std::cmp::Ordering;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

/// Equality capability over elements.
///
/// Implementations must keep `hash` consistent with `equals`: two elements
/// that compare equal must hash to the same value.
pub trait ElementComparer<T: ?Sized>: Send + Sync {
    /// Whether `a` and `b` are the same element.
    fn equals(&self, a: &T, b: &T) -> bool;

    /// Hash code used by sets, maps and partition routing.
    fn hash(&self, value: &T) -> u64;
}

/// Comparer using the element's own `Eq` and `Hash`.
///
/// Hashes with SipHash under fixed keys, so the same element always routes to
/// the same partition within and across queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComparer;

impl<T: Eq + Hash + ?Sized> ElementComparer<T> for DefaultComparer {
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }

    fn hash(&self, value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }
}

/// Shared default comparer for `T`.
pub fn default_element_comparer<T: Eq + Hash + 'static>() -> Arc<dyn ElementComparer<T>> {
    Arc::new(DefaultComparer)
}

/// Comparer that treats elements as equal when their projections are equal.
///
/// ```rust,ignore
/// let case_insensitive = ProjectionComparer::new(|s: &String| s.to_lowercase());
/// ```
#[derive(Clone, Copy)]
pub struct ProjectionComparer<F> {
    projection: F,
}

impl<F> ProjectionComparer<F> {
    /// Create a comparer from a projection function.
    pub const fn new(projection: F) -> Self {
        Self { projection }
    }
}

impl<F> std::fmt::Debug for ProjectionComparer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionComparer").finish_non_exhaustive()
    }
}

impl<T, P, F> ElementComparer<T> for ProjectionComparer<F>
where
    F: Fn(&T) -> P + Send + Sync,
    P: Eq + Hash,
{
    fn equals(&self, a: &T, b: &T) -> bool {
        (self.projection)(a) == (self.projection)(b)
    }

    fn hash(&self, value: &T) -> u64 {
        DefaultComparer.hash(&(self.projection)(value))
    }
}

/// Ordering capability over keys.
///
/// Implementations must be a total order.
pub trait KeyComparer<K: ?Sized>: Send + Sync {
    /// Compare two keys.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Ascending order by the key's own `Ord`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> KeyComparer<K> for NaturalOrder {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Descending order by the key's own `Ord`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReverseOrder;

impl<K: Ord + ?Sized> KeyComparer<K> for ReverseOrder {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        b.cmp(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_comparer() {
        let comparer = default_element_comparer::<i64>();
        assert!(comparer.equals(&3, &3));
        assert!(!comparer.equals(&3, &4));
        assert_eq!(comparer.hash(&3), comparer.hash(&3));
        assert_eq!(comparer.hash(&42), DefaultComparer.hash(&42i64));
    }

    #[test]
    fn test_projection_comparer_case_insensitive() {
        let comparer = ProjectionComparer::new(|s: &String| s.to_lowercase());
        let upper = "Braid".to_string();
        let lower = "braid".to_string();

        assert!(comparer.equals(&upper, &lower));
        assert_eq!(comparer.hash(&upper), comparer.hash(&lower));
        assert!(!comparer.equals(&upper, &"brain".to_string()));
    }

    #[test]
    fn test_key_comparers() {
        assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
        assert_eq!(ReverseOrder.compare(&1, &2), Ordering::Greater);
        assert_eq!(NaturalOrder.compare("b", "b"), Ordering::Equal);
    }
}
