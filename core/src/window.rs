use std::collections::VecDeque;
use std::num::NonZeroUsize;

use crate::config::MedianConfig;
use crate::error::MedianError;
use crate::median_heap::MedianHeap;
use crate::registry::ItemId;

/// Median of the last `capacity` pushed values.
pub struct MovingMedian<V> {
    heap: MedianHeap<V>,
    order: VecDeque<ItemId>,
    capacity: NonZeroUsize,
}

impl<V> MovingMedian<V> {
    pub fn new(capacity: NonZeroUsize, config: MedianConfig<V>) -> Self {
        Self {
            heap: MedianHeap::with_capacity(config, capacity.get()),
            order: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Appends a value, evicting and returning the oldest one if the window
    /// is full.
    pub fn push(&mut self, value: V) -> Result<Option<V>, MedianError> {
        let evicted = if self.is_full() {
            self.pop_oldest()?
        } else {
            None
        };

        let id = self.heap.insert(value);
        self.order.push_back(id);
        Ok(evicted)
    }

    /// Removes the oldest value of the window.
    pub fn pop_oldest(&mut self) -> Result<Option<V>, MedianError> {
        match self.order.pop_front() {
            Some(id) => self.heap.remove(id).map(Some),
            None => Ok(None),
        }
    }

    pub fn median(&self) -> Result<Option<V>, MedianError>
    where
        V: Clone,
    {
        self.heap.median()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.order.len() >= self.capacity.get()
    }

    pub fn heap(&self) -> &MedianHeap<V> {
        &self.heap
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.heap.clear();
    }
}
