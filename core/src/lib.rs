pub use self::average::Average;
pub use self::config::{Averager, Comparator, MedianConfig};
pub use self::error::MedianError;
pub use self::median_heap::{MedianHeap, Middle};
pub use self::registry::ItemId;
pub use self::window::MovingMedian;

pub mod aggregate;
pub mod average;
pub mod batch;
pub mod domain;

mod config;
mod error;
mod median_heap;
mod partition;
mod registry;
mod window;
