/*!
 * Synchronized Containers
 *
 * Reader-writer locked sequence with:
 * - Shared-lock reads, exclusive-lock writes
 * - Snapshot traversal that never runs caller code under the lock
 * - Lock-holding traversal for callers that cannot afford a copy
 * - Copy-on-create sub-slices with their own lock
 *
 * # Lock Lifetime
 *
 * Every operation releases its lock before returning, except
 * `range_locked`/`with_raw` (released when the callback returns) and
 * `LockedIter` (released when exhausted or dropped).
 */

mod config;
mod iter;
mod slice;

pub use config::SliceConfig;
pub use iter::{Iter, LockedIter};
pub use slice::SyncSlice;
