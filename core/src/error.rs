use crate::registry::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MedianError {
    #[error("no ordering is defined for values of type `{0}`")]
    UnsupportedType(&'static str),
    #[error("no midpoint is defined for values of type `{0}`")]
    UnsupportedAverage(&'static str),
    #[error("item {0} is not present")]
    NotFound(ItemId),
    #[error("internal invariant violated: {0}")]
    InternalInvariant(&'static str),
}
