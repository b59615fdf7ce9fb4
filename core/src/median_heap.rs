use std::cmp::Ordering;
use std::fmt;

use crate::config::MedianConfig;
use crate::error::MedianError;
use crate::partition::Partition;
use crate::registry::{ItemId, Registry, Side};

/// Exact running median with removal of arbitrary previously inserted values.
///
/// Values are split between a max-ordered lower half and a min-ordered upper
/// half. After every mutation the lower half holds either as many values as
/// the upper one or exactly one more, and no lower value is greater than any
/// upper value. The median is then read from the two roots.
///
/// Insertion and removal are `O(log n)`, median queries are `O(1)`.
///
/// ```
/// use runmed_core::{MedianConfig, MedianHeap};
///
/// let mut heap = MedianHeap::new(MedianConfig::<i64>::averaged());
/// let first = heap.insert(5);
/// heap.insert(1);
/// heap.insert(9);
/// assert_eq!(heap.median().unwrap(), Some(5));
///
/// heap.remove(first).unwrap();
/// assert_eq!(heap.median().unwrap(), Some(5));
/// ```
pub struct MedianHeap<V> {
    config: MedianConfig<V>,
    items: Registry<V>,
    lower: Partition,
    upper: Partition,
}

impl<V> MedianHeap<V> {
    pub fn new(config: MedianConfig<V>) -> Self {
        tracing::trace!(domain = config.domain, "created median heap");
        Self {
            config,
            items: Registry::new(),
            lower: Partition::new(Side::Lower),
            upper: Partition::new(Side::Upper),
        }
    }

    pub fn with_capacity(config: MedianConfig<V>, capacity: usize) -> Self {
        Self {
            items: Registry::with_capacity(capacity),
            ..Self::new(config)
        }
    }

    #[inline]
    pub fn config(&self) -> &MedianConfig<V> {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.len() == 0
    }

    /// Number of values in the lower (max-ordered) half.
    #[inline]
    pub fn lower_len(&self) -> usize {
        self.lower.len()
    }

    /// Number of values in the upper (min-ordered) half.
    #[inline]
    pub fn upper_len(&self) -> usize {
        self.upper.len()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.get(id).is_some()
    }

    pub fn get(&self, id: ItemId) -> Option<&V> {
        self.items.get(id).map(|item| &item.value)
    }

    /// Iterates over live values in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &V)> {
        self.items.iter().map(|(id, item)| (id, &item.value))
    }

    /// Inserts a value and returns the handle required to remove it later.
    pub fn insert(&mut self, value: V) -> ItemId {
        let compare = self.config.compare;

        // Ties go to the lower half.
        let side = match self.lower.peek() {
            Some(top) if compare(&value, &self.items.live(top).value).is_gt() => Side::Upper,
            _ => Side::Lower,
        };

        let id = self.items.insert(value, side);
        match side {
            Side::Lower => self.lower.push(&mut self.items, compare, id),
            Side::Upper => self.upper.push(&mut self.items, compare, id),
        }

        self.rebalance();
        id
    }

    /// Removes the exact value inserted under `id` and returns it.
    pub fn remove(&mut self, id: ItemId) -> Result<V, MedianError> {
        let compare = self.config.compare;
        let side = match self.items.get(id) {
            Some(item) => item.side,
            None => return Err(MedianError::NotFound(id)),
        };

        let unlinked = match side {
            Side::Lower => self.lower.remove(&mut self.items, compare, id),
            Side::Upper => self.upper.remove(&mut self.items, compare, id),
        };
        if !unlinked {
            return Err(MedianError::InternalInvariant(
                "item is missing from its partition",
            ));
        }

        let Some(item) = self.items.remove(id) else {
            return Err(MedianError::InternalInvariant("item vanished during removal"));
        };

        self.rebalance();
        tracing::trace!(%id, "removed item");
        Ok(item.value)
    }

    /// Returns the current median, or `None` if the heap is empty.
    ///
    /// For an even number of values the two middle ones are combined with the
    /// configured averager, which fails with
    /// [`MedianError::UnsupportedAverage`] if the domain has none.
    pub fn median(&self) -> Result<Option<V>, MedianError>
    where
        V: Clone,
    {
        match self.middle()? {
            Middle::Empty => Ok(None),
            Middle::One(value) => Ok(Some(value.clone())),
            Middle::Two(low, high) => match self.config.average {
                Some(average) => Ok(Some(average(low, high))),
                None => Err(MedianError::UnsupportedAverage(self.config.domain)),
            },
        }
    }

    /// Returns references to the middle value(s) without averaging.
    pub fn middle(&self) -> Result<Middle<'_, V>, MedianError> {
        match self.lower.len().cmp(&self.upper.len()) {
            Ordering::Greater => match self.lower.peek() {
                Some(top) => Ok(Middle::One(self.value(top))),
                None => Err(MedianError::InternalInvariant("lower half has no root")),
            },
            Ordering::Equal => match (self.lower.peek(), self.upper.peek()) {
                (Some(low), Some(high)) => Ok(Middle::Two(self.value(low), self.value(high))),
                _ => Ok(Middle::Empty),
            },
            Ordering::Less => Err(MedianError::InternalInvariant(
                "upper half outgrew lower half",
            )),
        }
    }

    /// Drops all values. Handles issued before the call become invalid.
    pub fn clear(&mut self) {
        self.lower.clear();
        self.upper.clear();
        self.items.clear();
    }

    /// Verifies the partition invariants. Intended for tests and debugging.
    pub fn check_invariants(&self) -> Result<(), MedianError> {
        let compare = self.config.compare;

        let (lower, upper) = (self.lower.len(), self.upper.len());
        if lower != upper && lower != upper + 1 {
            return Err(MedianError::InternalInvariant("halves are unbalanced"));
        }
        if lower + upper != self.items.len() {
            return Err(MedianError::InternalInvariant(
                "partitions disagree with the registry",
            ));
        }
        if !self.lower.is_consistent(&self.items, compare)
            || !self.upper.is_consistent(&self.items, compare)
        {
            return Err(MedianError::InternalInvariant("heap order is broken"));
        }

        // With valid heap order the roots are the extremes of each half.
        if let (Some(low), Some(high)) = (self.lower.peek(), self.upper.peek()) {
            if compare(self.value(low), self.value(high)).is_gt() {
                return Err(MedianError::InternalInvariant("halves overlap"));
            }
        }

        Ok(())
    }

    #[inline]
    fn value(&self, id: ItemId) -> &V {
        &self.items.live(id).value
    }

    fn rebalance(&mut self) {
        let compare = self.config.compare;

        while self.upper.len() > self.lower.len() {
            let Some(id) = self.upper.pop(&mut self.items, compare) else {
                break;
            };
            self.lower.push(&mut self.items, compare, id);
            tracing::trace!(%id, "moved upper root to lower half");
        }

        while self.lower.len() > self.upper.len() + 1 {
            let Some(id) = self.lower.pop(&mut self.items, compare) else {
                break;
            };
            self.upper.push(&mut self.items, compare, id);
            tracing::trace!(%id, "moved lower root to upper half");
        }

        debug_assert!(self.lower.len() >= self.upper.len());
        debug_assert!(self.lower.len() <= self.upper.len() + 1);
    }
}

impl<V: fmt::Debug> fmt::Debug for MedianHeap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lower = self.lower.ids().iter().map(|id| self.value(*id));
        let upper = self.upper.ids().iter().map(|id| self.value(*id));

        f.debug_struct("MedianHeap")
            .field("config", &self.config)
            .field("lower", &lower.collect::<Vec<_>>())
            .field("upper", &upper.collect::<Vec<_>>())
            .finish()
    }
}

/// Middle order statistics of a non-averaged query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Middle<'a, V> {
    Empty,
    /// Odd number of values.
    One(&'a V),
    /// Even number of values: lower root and upper root.
    Two(&'a V, &'a V),
}
