use std::cmp::Ordering;
use std::fmt;

use crate::average::Average;

/// Total order over a value domain.
pub type Comparator<V> = fn(&V, &V) -> Ordering;

/// Midpoint of two values of a domain.
pub type Averager<V> = fn(&V, &V) -> V;

/// Domain operations bound to a median heap at creation.
pub struct MedianConfig<V> {
    /// Domain name used in error messages.
    pub domain: &'static str,
    pub compare: Comparator<V>,
    /// `None` for domains without a midpoint. Such heaps can still answer
    /// queries while the number of values is odd.
    pub average: Option<Averager<V>>,
}

impl<V> MedianConfig<V> {
    pub fn new(domain: &'static str, compare: Comparator<V>) -> Self {
        Self {
            domain,
            compare,
            average: None,
        }
    }

    pub fn with_averager(mut self, average: Averager<V>) -> Self {
        self.average = Some(average);
        self
    }
}

impl<V: Ord> MedianConfig<V> {
    /// Natural order, no midpoint.
    pub fn ordered() -> Self {
        Self::new(std::any::type_name::<V>(), V::cmp)
    }
}

impl<V: Ord + Average> MedianConfig<V> {
    /// Natural order with [`Average`] as the midpoint.
    pub fn averaged() -> Self {
        Self::ordered().with_averager(V::average)
    }
}

impl MedianConfig<f32> {
    /// IEEE 754 total order (NaN sorts last) with arithmetic mean.
    pub fn float32() -> Self {
        Self::new("f32", f32::total_cmp).with_averager(f32::average)
    }
}

impl MedianConfig<f64> {
    /// IEEE 754 total order (NaN sorts last) with arithmetic mean.
    pub fn float64() -> Self {
        Self::new("f64", f64::total_cmp).with_averager(f64::average)
    }
}

impl<V> Clone for MedianConfig<V> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for MedianConfig<V> {}

impl<V> fmt::Debug for MedianConfig<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MedianConfig")
            .field("domain", &self.domain)
            .field("has_average", &self.average.is_some())
            .finish()
    }
}
