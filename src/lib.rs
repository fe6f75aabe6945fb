/*!
 * Sync Slice Library
 * Thread-safe dynamic array behind a reader-writer lock
 */

pub mod core;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{SliceError, SliceResult};
pub use crate::core::sync::{Iter, LockedIter, SliceConfig, SyncSlice};
pub use monitoring::init_tracing;
