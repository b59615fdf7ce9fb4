//! Sort-once fallback for inputs that never shrink.

use crate::config::{Comparator, MedianConfig};
use crate::error::MedianError;

/// Returns the value at `rank` (0-based) of the sorted input.
pub fn select_rank<V>(mut values: Vec<V>, rank: usize, compare: Comparator<V>) -> Option<V> {
    if rank >= values.len() {
        return None;
    }
    values.sort_by(compare);
    Some(values.swap_remove(rank))
}

/// Median of the whole input, same semantics as [`MedianHeap::median`].
///
/// [`MedianHeap::median`]: crate::MedianHeap::median
pub fn median<V>(mut values: Vec<V>, config: &MedianConfig<V>) -> Result<Option<V>, MedianError> {
    let len = values.len();
    if len == 0 {
        return Ok(None);
    }

    values.sort_by(config.compare);
    if len % 2 == 1 {
        return Ok(Some(values.swap_remove(len / 2)));
    }

    match config.average {
        Some(average) => Ok(Some(average(&values[len / 2 - 1], &values[len / 2]))),
        None => Err(MedianError::UnsupportedAverage(config.domain)),
    }
}
