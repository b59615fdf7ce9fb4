//! Generational arena owning every live item of a median heap.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Opaque handle of an inserted value.
///
/// A handle stays valid until the value is removed. Slots are reused, but the
/// generation is bumped on every removal so a stale handle never resolves to
/// a newer item. Handles also carry the id of the issuing registry and are
/// never accepted by another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
    owner: u32,
    slot: u32,
    generation: u32,
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}v{}", self.owner, self.slot, self.generation)
    }
}

static NEXT_OWNER: AtomicU32 = AtomicU32::new(0);

/// Partition an item currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    /// Smaller half, max-ordered.
    Lower,
    /// Larger half, min-ordered.
    Upper,
}

pub(crate) struct Item<V> {
    pub value: V,
    pub side: Side,
    /// Position inside the partition heap.
    pub heap_pos: usize,
}

enum Slot<V> {
    Occupied { generation: u32, item: Item<V> },
    Vacant { generation: u32, next_free: Option<u32> },
}

pub(crate) struct Registry<V> {
    owner: u32,
    slots: Vec<Slot<V>>,
    free_head: Option<u32>,
    len: usize,
}

impl<V> Registry<V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// # Panics
    ///
    /// Panics if more than `u32::MAX` slots are needed.
    pub fn insert(&mut self, value: V, side: Side) -> ItemId {
        let item = Item {
            value,
            side,
            heap_pos: 0,
        };

        self.len += 1;
        match self.free_head {
            Some(slot) => {
                let cell = &mut self.slots[slot as usize];
                let (generation, next_free) = match cell {
                    Slot::Vacant {
                        generation,
                        next_free,
                    } => (*generation, *next_free),
                    Slot::Occupied { .. } => unreachable!("free list points to an occupied slot"),
                };
                *cell = Slot::Occupied { generation, item };
                self.free_head = next_free;
                ItemId {
                    owner: self.owner,
                    slot,
                    generation,
                }
            }
            None => {
                let slot = u32::try_from(self.slots.len()).expect("too many items");
                self.slots.push(Slot::Occupied {
                    generation: 0,
                    item,
                });
                ItemId {
                    owner: self.owner,
                    slot,
                    generation: 0,
                }
            }
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&Item<V>> {
        if id.owner != self.owner {
            return None;
        }
        match self.slots.get(id.slot as usize)? {
            Slot::Occupied { generation, item } if *generation == id.generation => Some(item),
            _ => None,
        }
    }

    pub fn remove(&mut self, id: ItemId) -> Option<Item<V>> {
        if id.owner != self.owner {
            return None;
        }
        let cell = self.slots.get_mut(id.slot as usize)?;
        match cell {
            Slot::Occupied { generation, .. } if *generation == id.generation => {}
            _ => return None,
        }

        let vacant = Slot::Vacant {
            generation: id.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let Slot::Occupied { item, .. } = std::mem::replace(cell, vacant) else {
            unreachable!("slot was checked to be occupied");
        };

        self.free_head = Some(id.slot);
        self.len -= 1;
        Some(item)
    }

    /// Drops all items, keeping slot generations so that old handles stay invalid.
    pub fn clear(&mut self) {
        let mut next_free = None;
        for (slot, cell) in self.slots.iter_mut().enumerate().rev() {
            let generation = match cell {
                Slot::Occupied { generation, .. } => generation.wrapping_add(1),
                Slot::Vacant { generation, .. } => *generation,
            };
            *cell = Slot::Vacant {
                generation,
                next_free,
            };
            next_free = Some(slot as u32);
        }
        self.free_head = next_free;
        self.len = 0;
    }

    /// Returns a live item referenced by a partition.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale. Partitions only ever hold live ids.
    #[inline]
    pub fn live(&self, id: ItemId) -> &Item<V> {
        match &self.slots[id.slot as usize] {
            Slot::Occupied { item, .. } => item,
            Slot::Vacant { .. } => unreachable!("partition references a removed item"),
        }
    }

    #[inline]
    pub fn live_mut(&mut self, id: ItemId) -> &mut Item<V> {
        match &mut self.slots[id.slot as usize] {
            Slot::Occupied { item, .. } => item,
            Slot::Vacant { .. } => unreachable!("partition references a removed item"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item<V>)> {
        self.slots.iter().enumerate().filter_map(|(slot, cell)| match cell {
            Slot::Occupied { generation, item } => Some((
                ItemId {
                    owner: self.owner,
                    slot: slot as u32,
                    generation: *generation,
                },
                item,
            )),
            Slot::Vacant { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_reused_with_new_generation() {
        let mut registry = Registry::new();
        let a = registry.insert("a", Side::Lower);
        let b = registry.insert("b", Side::Upper);
        assert_eq!(registry.len(), 2);

        let removed = registry.remove(a).unwrap();
        assert_eq!(removed.value, "a");
        assert!(registry.get(a).is_none());
        assert!(registry.remove(a).is_none());

        let c = registry.insert("c", Side::Lower);
        assert_ne!(a, c);
        assert!(registry.get(a).is_none());
        assert_eq!(registry.get(c).unwrap().value, "c");
        assert_eq!(registry.get(b).unwrap().side, Side::Upper);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn iter_skips_vacant_slots() {
        let mut registry = Registry::with_capacity(4);
        let ids = (0..4).map(|i| registry.insert(i, Side::Lower)).collect::<Vec<_>>();
        registry.remove(ids[1]).unwrap();
        registry.remove(ids[3]).unwrap();

        let values = registry.iter().map(|(_, item)| item.value).collect::<Vec<_>>();
        assert_eq!(values, [0, 2]);

        registry.clear();
        assert_eq!(registry.len(), 0);
        assert!(registry.get(ids[0]).is_none());

        let reused = registry.insert(10, Side::Upper);
        assert!(ids.iter().all(|id| *id != reused));
        assert!(registry.get(ids[0]).is_none());
    }

    #[test]
    fn foreign_ids_never_resolve() {
        let mut first = Registry::new();
        let mut second = Registry::new();
        let a = first.insert(1, Side::Lower);
        let b = second.insert(2, Side::Lower);

        assert!(first.get(b).is_none());
        assert!(second.remove(a).is_none());
        assert_eq!(first.get(a).unwrap().value, 1);
        assert_eq!(second.get(b).unwrap().value, 2);
    }
}
