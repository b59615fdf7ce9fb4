//! Median state as seen by a host aggregation engine.

use crate::domain::{self, Collation, Datum, DomainKind};
use crate::error::MedianError;
use crate::median_heap::MedianHeap;
use crate::registry::ItemId;

/// Median heap bound to a single value domain.
pub struct MedianState {
    kind: DomainKind,
    heap: MedianHeap<Datum>,
}

impl MedianState {
    /// Fails with [`MedianError::UnsupportedType`] if the domain has no order.
    pub fn new(kind: DomainKind) -> Result<Self, MedianError> {
        Self::with_collation(kind, Collation::C)
    }

    pub fn with_collation(kind: DomainKind, collation: Collation) -> Result<Self, MedianError> {
        let config = domain::collated_config_for(kind, collation)?;
        tracing::debug!(
            %kind,
            %collation,
            averaged = config.average.is_some(),
            "created median state"
        );
        Ok(Self {
            kind,
            heap: MedianHeap::new(config),
        })
    }

    #[inline]
    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Fails with [`MedianError::UnsupportedType`] for values of another domain.
    pub fn insert(&mut self, value: Datum) -> Result<ItemId, MedianError> {
        let kind = value.kind();
        if kind != self.kind {
            tracing::debug!(expected = %self.kind, got = %kind, "rejected value");
            return Err(MedianError::UnsupportedType(kind.name()));
        }
        Ok(self.heap.insert(value))
    }

    pub fn remove(&mut self, id: ItemId) -> Result<Datum, MedianError> {
        self.heap.remove(id)
    }

    pub fn median(&self) -> Result<Option<Datum>, MedianError> {
        self.heap.median()
    }
}

/// Transition/final lifecycle of a median aggregate.
///
/// The domain is bound by the first non-NULL input. NULL inputs are skipped
/// and a state that saw only NULLs finalizes to `None`.
#[derive(Default)]
pub struct MedianAggregate {
    state: Option<MedianState>,
    collation: Collation,
}

impl MedianAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the domain upfront, like an aggregate with a declared input type.
    pub fn with_kind(kind: DomainKind) -> Result<Self, MedianError> {
        Self::with_collation(kind, Collation::C)
    }

    pub fn with_collation(kind: DomainKind, collation: Collation) -> Result<Self, MedianError> {
        Ok(Self {
            state: Some(MedianState::with_collation(kind, collation)?),
            collation,
        })
    }

    pub fn state(&self) -> Option<&MedianState> {
        self.state.as_ref()
    }

    /// Transition step. Returns the handle of the accumulated value, if any.
    pub fn accum(&mut self, value: Option<Datum>) -> Result<Option<ItemId>, MedianError> {
        let Some(value) = value else {
            return Ok(None);
        };

        let state = match &mut self.state {
            Some(state) => state,
            state @ None => {
                state.insert(MedianState::with_collation(value.kind(), self.collation)?)
            }
        };
        state.insert(value).map(Some)
    }

    /// Inverse transition step of a moving aggregate.
    pub fn retract(&mut self, id: ItemId) -> Result<Datum, MedianError> {
        match &mut self.state {
            Some(state) => state.remove(id),
            None => Err(MedianError::NotFound(id)),
        }
    }

    /// Final step.
    pub fn finalize(&self) -> Result<Option<Datum>, MedianError> {
        match &self.state {
            Some(state) => state.median(),
            None => Ok(None),
        }
    }
}
