/*!
 * Core Module
 * Synchronized container and error handling
 */

pub mod errors;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use sync::{Iter, LockedIter, SliceConfig, SyncSlice};
