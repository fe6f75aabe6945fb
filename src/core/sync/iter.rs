/*!
 * Slice Iterators
 *
 * Two ways to walk a `SyncSlice`:
 * - `Iter`: owns a snapshot, holds no lock
 * - `LockedIter`: holds the shared lock until exhausted or dropped
 */

use parking_lot::RwLockReadGuard;
use std::iter::{Enumerate, FusedIterator};
use tracing::trace;

/// Snapshot iterator over `(index, value)` pairs
///
/// The snapshot is taken when the iterator is created. Writers are never
/// blocked by it and the slice may be freely mutated during iteration.
pub struct Iter<T> {
    inner: Enumerate<std::vec::IntoIter<T>>,
}

impl<T> Iter<T> {
    pub(crate) fn new(snapshot: Vec<T>) -> Self {
        Self {
            inner: snapshot.into_iter().enumerate(),
        }
    }
}

impl<T> Iterator for Iter<T> {
    type Item = (usize, T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<T> {}
impl<T> FusedIterator for Iter<T> {}

/// Lazy iterator that reads through the shared lock
///
/// The read guard is released as soon as the last element is produced, or
/// when the iterator is dropped, whichever comes first. Abandoning it early
/// never leaks the lock.
///
/// Calling an exclusive operation on the same slice while this iterator is
/// alive on the current thread deadlocks.
pub struct LockedIter<'a, T> {
    guard: Option<RwLockReadGuard<'a, Vec<T>>>,
    position: usize,
}

impl<'a, T> LockedIter<'a, T> {
    pub(crate) fn new(guard: RwLockReadGuard<'a, Vec<T>>) -> Self {
        // Nothing to produce: do not hold the lock at all
        let guard = (!guard.is_empty()).then_some(guard);
        Self { guard, position: 0 }
    }

    /// Whether the shared lock is still held
    pub fn holds_lock(&self) -> bool {
        self.guard.is_some()
    }

    fn remaining(&self) -> usize {
        self.guard
            .as_ref()
            .map_or(0, |items| items.len().saturating_sub(self.position))
    }
}

impl<T: Clone> Iterator for LockedIter<'_, T> {
    type Item = (usize, T);

    fn next(&mut self) -> Option<Self::Item> {
        let items = self.guard.as_ref()?;
        let item = (self.position, items.get(self.position)?.clone());
        self.position += 1;

        // Last element produced: release before handing it out
        if self.position >= items.len() {
            self.guard = None;
        }
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for LockedIter<'_, T> {}
impl<T: Clone> FusedIterator for LockedIter<'_, T> {}

impl<T> Drop for LockedIter<'_, T> {
    fn drop(&mut self) {
        if self.guard.is_some() {
            trace!(
                position = self.position,
                remaining = self.remaining(),
                "Locked iterator dropped before exhaustion, releasing read lock"
            );
        }
    }
}
