use std::collections::HashMap;

pub mod serde_helpers;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "test")]
pub mod test;

pub type FastHashMap<K, V> = HashMap<K, V, ahash::RandomState>;
