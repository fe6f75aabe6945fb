/*!
 * Synchronized Slice
 * Growable sequence guarded by a reader-writer lock
 */

use super::config::SliceConfig;
use super::iter::{Iter, LockedIter};
use crate::core::errors::{SliceError, SliceResult};
use parking_lot::{RwLock, RwLockReadGuard};
use std::fmt;
use tracing::{debug, instrument, trace, warn};

/// Thread-safe dynamic array
///
/// Reads take the shared lock, writes take the exclusive lock. Share it
/// between threads with `Arc<SyncSlice<T>>`.
///
/// # Lock discipline
///
/// - `get`, `len`, `slice`, `snapshot`, `with_raw`: shared, for the call only
/// - `append`, `extend`, `set`, `with_raw_mut`: exclusive, for the call only
/// - `range`, `iter`: shared only while the snapshot is copied, then released
///   before any caller code runs
/// - `range_locked`, `with_raw`: shared for the whole callback
/// - `iter_locked`: shared until the iterator is exhausted or dropped
///
/// Read operations are recursive-safe, so they may be called from inside a
/// lock-holding callback. Write operations from inside one deadlock.
///
/// # Example
///
/// ```
/// use sync_slice::SyncSlice;
///
/// let names = SyncSlice::<String>::make(2, 3);
/// names.set(0, "hello".into()).unwrap();
/// names.set(1, "world".into()).unwrap();
/// names.append("!".into());
///
/// assert_eq!(names.len(), 3);
/// assert_eq!(names.get(1).unwrap(), "world");
/// assert!(names.get(3).is_err());
/// ```
pub struct SyncSlice<T> {
    items: RwLock<Vec<T>>,
    label: Option<String>,
}

impl<T> SyncSlice<T> {
    /// Empty slice
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Empty slice with reserved capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: RwLock::new(Vec::with_capacity(capacity)),
            label: None,
        }
    }

    /// `len` default-valued elements with room for at least `capacity`
    pub fn make(len: usize, capacity: usize) -> Self
    where
        T: Default,
    {
        Self::with_config(SliceConfig::sized(len, capacity))
    }

    /// Build from a [`SliceConfig`]
    #[instrument(
        level = "debug",
        skip(config),
        fields(label = config.label.as_deref().unwrap_or("-"))
    )]
    pub fn with_config(config: SliceConfig) -> Self
    where
        T: Default,
    {
        let mut items = Vec::with_capacity(config.effective_capacity());
        items.resize_with(config.length, T::default);

        debug!(
            len = items.len(),
            capacity = items.capacity(),
            "Created sync slice"
        );

        Self {
            items: RwLock::new(items),
            label: config.label,
        }
    }

    /// Label attached at construction, if any
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[inline]
    fn tag(&self) -> &str {
        self.label.as_deref().unwrap_or("-")
    }

    // Recursive so that reads nested in a lock-holding callback cannot
    // queue behind a waiting writer
    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.items.read_recursive()
    }

    /// Append one element
    pub fn append(&self, item: T) {
        let mut items = self.items.write();
        items.push(item);
        trace!(label = self.tag(), len = items.len(), "Appended 1 item");
    }

    /// Append every element of `items`, in order, as one write
    ///
    /// The iterator is drained before the lock is taken, so it may read
    /// from this same slice.
    pub fn extend<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let incoming: Vec<T> = items.into_iter().collect();
        let count = incoming.len();

        let mut items = self.items.write();
        items.extend(incoming);
        trace!(label = self.tag(), len = items.len(), count, "Appended items");
    }

    /// Replace the element at `index`
    pub fn set(&self, index: usize, value: T) -> SliceResult<()> {
        let mut items = self.items.write();
        let len = items.len();
        match items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                trace!(label = self.tag(), index, "Set item");
                Ok(())
            }
            None => {
                drop(items);
                warn!(label = self.tag(), index, len, "Set out of bounds");
                Err(SliceError::IndexOutOfBounds { index, len })
            }
        }
    }

    /// Clone out the element at `index`
    pub fn get(&self, index: usize) -> SliceResult<T>
    where
        T: Clone,
    {
        let items = self.read();
        match items.get(index) {
            Some(value) => Ok(value.clone()),
            None => {
                let len = items.len();
                drop(items);
                warn!(label = self.tag(), index, len, "Get out of bounds");
                Err(SliceError::IndexOutOfBounds { index, len })
            }
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether there are no elements
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Reserved capacity (a hint only)
    pub fn capacity(&self) -> usize {
        self.read().capacity()
    }

    /// Copy `[from, to)` into a new, independent slice
    ///
    /// The new slice has its own storage and its own lock. Writes to either
    /// one are never visible through the other. The source's unused
    /// capacity is carried over as a hint.
    #[instrument(level = "debug", skip(self), fields(label = self.tag()))]
    pub fn slice(&self, from: usize, to: usize) -> SliceResult<Self>
    where
        T: Clone,
    {
        let items = self.read();
        let len = items.len();
        let Some(part) = items.get(from..to) else {
            drop(items);
            warn!(label = self.tag(), from, to, len, "Slice out of bounds");
            return Err(SliceError::RangeOutOfBounds { from, to, len });
        };

        let spare = items.capacity() - len;
        let mut view = Vec::with_capacity(part.len() + spare);
        view.extend_from_slice(part);
        drop(items);

        debug!(len = view.len(), capacity = view.capacity(), "Created slice view");

        Ok(Self {
            items: RwLock::new(view),
            label: self.label.clone(),
        })
    }

    /// Visit `(index, &value)` in ascending order until `visit` returns false
    ///
    /// Runs over a snapshot: the lock is released before `visit` is first
    /// called, so `visit` may read or write this slice.
    pub fn range<F>(&self, visit: F)
    where
        T: Clone,
        F: FnMut(usize, &T) -> bool,
    {
        let snapshot = self.snapshot();
        visit_until(&snapshot, visit);
    }

    /// Like [`range`](Self::range) but holds the shared lock for the whole
    /// traversal instead of copying
    ///
    /// `visit` may call read operations on this slice. Calling a write
    /// operation on this slice from `visit` deadlocks.
    pub fn range_locked<F>(&self, visit: F)
    where
        F: FnMut(usize, &T) -> bool,
    {
        let items = self.read();
        visit_until(&items, visit);
    }

    /// Snapshot iterator over `(index, value)` pairs
    pub fn iter(&self) -> Iter<T>
    where
        T: Clone,
    {
        Iter::new(self.snapshot())
    }

    /// Lazy iterator holding the shared lock until exhausted or dropped
    pub fn iter_locked(&self) -> LockedIter<'_, T> {
        LockedIter::new(self.read())
    }

    /// Run `op` on the raw contents under the shared lock
    ///
    /// `op` must not call write operations on this slice.
    pub fn with_raw<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&[T]) -> R,
    {
        let items = self.read();
        op(&items)
    }

    /// Run `op` on the raw vector under the exclusive lock
    ///
    /// `op` must not call any operation on this slice.
    pub fn with_raw_mut<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let mut items = self.items.write();
        let before = items.len();
        let result = op(&mut items);
        trace!(
            label = self.tag(),
            before,
            after = items.len(),
            "Raw mutable access"
        );
        result
    }

    /// Owned copy of the current contents
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.read().clone()
    }

    /// Consume the slice, returning the underlying vector
    pub fn into_inner(self) -> Vec<T> {
        self.items.into_inner()
    }
}

fn visit_until<T, F>(items: &[T], mut visit: F)
where
    F: FnMut(usize, &T) -> bool,
{
    for (index, value) in items.iter().enumerate() {
        if !visit(index, value) {
            break;
        }
    }
}

impl<T> Default for SyncSlice<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SyncSlice<T> {
    fn clone(&self) -> Self {
        Self {
            items: RwLock::new(self.snapshot()),
            label: self.label.clone(),
        }
    }
}

impl<T> From<Vec<T>> for SyncSlice<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            label: None,
        }
    }
}

impl<T> FromIterator<T> for SyncSlice<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a, T: Clone> IntoIterator for &'a SyncSlice<T> {
    type Item = (usize, T);
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for SyncSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("SyncSlice");
        out.field("label", &self.label);
        match self.items.try_read_recursive() {
            Some(items) => out.field("items", &*items),
            None => out.field("items", &format_args!("<locked>")),
        };
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_make() {
        let slice = SyncSlice::<u32>::make(2, 3);
        assert_eq!(slice.len(), 2);
        assert!(slice.capacity() >= 3);
        assert_eq!(slice.get(0), Ok(0));
        assert_eq!(slice.get(1), Ok(0));
    }

    #[test]
    fn test_make_raises_capacity() {
        let slice = SyncSlice::<u8>::make(4, 1);
        assert_eq!(slice.len(), 4);
        assert!(slice.capacity() >= 4);
    }

    #[test]
    fn test_set_get() {
        let slice = SyncSlice::make(3, 3);
        slice.set(1, "b").unwrap();
        assert_eq!(slice.get(1), Ok("b"));
        assert_eq!(slice.get(0), Ok(""));
    }

    #[test]
    fn test_out_of_bounds_leaves_state() {
        let slice = SyncSlice::from(vec![1, 2]);

        assert_eq!(
            slice.set(2, 9),
            Err(SliceError::IndexOutOfBounds { index: 2, len: 2 })
        );
        assert_eq!(
            slice.get(5),
            Err(SliceError::IndexOutOfBounds { index: 5, len: 2 })
        );
        assert_eq!(slice.snapshot(), vec![1, 2]);
    }

    #[test]
    fn test_append_extend() {
        let slice = SyncSlice::new();
        assert!(slice.is_empty());

        slice.append(1);
        slice.extend([2, 3, 4]);
        assert_eq!(slice.len(), 4);
        assert_eq!(slice.snapshot(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_extend_from_self() {
        let slice = SyncSlice::from(vec![1, 2]);
        slice.extend(slice.iter_locked().map(|(_, v)| v * 10));
        assert_eq!(slice.snapshot(), vec![1, 2, 10, 20]);
    }

    #[test]
    fn test_slice_bounds() {
        let slice = SyncSlice::from(vec!['a', 'b', 'c']);

        assert_eq!(slice.slice(0, 3).unwrap().len(), 3);
        assert_eq!(slice.slice(3, 3).unwrap().len(), 0);
        assert_eq!(
            slice.slice(2, 1).unwrap_err(),
            SliceError::RangeOutOfBounds {
                from: 2,
                to: 1,
                len: 3
            }
        );
        assert!(slice.slice(0, 4).is_err());
        assert!(slice.slice(4, 4).is_err());
    }

    #[test]
    fn test_slice_is_independent() {
        let parent = SyncSlice::from(vec![1, 2, 3]);
        let view = parent.slice(0, 1).unwrap();

        view.append(9);
        view.set(0, 7).unwrap();
        parent.set(1, 5).unwrap();

        assert_eq!(parent.snapshot(), vec![1, 5, 3]);
        assert_eq!(view.snapshot(), vec![7, 9]);
    }

    #[test]
    fn test_slice_reserves_only_view_and_spare() {
        let parent = SyncSlice::from(vec![0u64; 100_000]);
        let view = parent.slice(0, 1).unwrap();
        assert_eq!(view.len(), 1);
        assert!(view.capacity() < 1_000, "View reserved {}", view.capacity());

        let roomy: SyncSlice<u64> = SyncSlice::make(10, 16);
        let view = roomy.slice(2, 4).unwrap();
        assert!(view.capacity() >= 2 + 6);
        assert!(view.capacity() < 16);
    }

    #[test]
    fn test_slice_keeps_label() {
        let parent: SyncSlice<u8> =
            SyncSlice::with_config(SliceConfig::sized(3, 3).with_label("src"));
        let view = parent.slice(1, 2).unwrap();
        assert_eq!(view.label(), Some("src"));
    }

    #[test]
    fn test_range_stops() {
        let slice = SyncSlice::from(vec![1, 2, 3, 4]);
        let mut seen = Vec::new();
        slice.range(|index, value| {
            seen.push(index);
            *value < 2
        });
        assert_eq!(seen, vec![0, 1]);
    }

    #[test]
    fn test_range_allows_writes() {
        let slice = SyncSlice::from(vec![1, 2]);
        slice.range(|_, value| {
            slice.append(*value);
            true
        });
        assert_eq!(slice.snapshot(), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_range_locked_allows_reads() {
        let slice = SyncSlice::from(vec![3, 4]);
        let mut total = 0;
        slice.range_locked(|index, value| {
            total += slice.get(index).unwrap() + value + slice.len() as i32;
            true
        });
        assert_eq!(total, 3 + 3 + 2 + 4 + 4 + 2);
    }

    #[test]
    fn test_with_raw() {
        let slice = SyncSlice::from(vec![5, 1, 4]);
        let max = slice.with_raw(|items| items.iter().copied().max());
        assert_eq!(max, Some(5));

        slice.with_raw_mut(|items| items.sort_unstable());
        assert_eq!(slice.snapshot(), vec![1, 4, 5]);
    }

    #[test]
    fn test_clone_is_deep() {
        let original = SyncSlice::from(vec![1]);
        let copy = original.clone();
        copy.append(2);
        assert_eq!(original.len(), 1);
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn test_debug() {
        let slice = SyncSlice::from(vec![1, 2]);
        assert_eq!(
            format!("{:?}", slice),
            "SyncSlice { label: None, items: [1, 2] }"
        );

        // Debug never blocks, even under the write lock
        let shown = slice.with_raw_mut(|_| format!("{:?}", slice));
        assert_eq!(shown, "SyncSlice { label: None, items: <locked> }");
    }

    #[test]
    fn test_into_iterator() {
        let slice: SyncSlice<_> = "xyz".chars().collect();
        let pairs: Vec<_> = (&slice).into_iter().collect();
        assert_eq!(pairs, vec![(0, 'x'), (1, 'y'), (2, 'z')]);
        assert_eq!(slice.into_inner(), vec!['x', 'y', 'z']);
    }

    #[test]
    fn test_concurrent_append() {
        let slice = Arc::new(SyncSlice::new());
        let mut handles = vec![];

        for i in 0..8 {
            let slice = slice.clone();
            handles.push(thread::spawn(move || {
                for j in 0..500 {
                    slice.append(i * 500 + j);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let mut items = slice.snapshot();
        items.sort_unstable();
        assert_eq!(items, (0..4000).collect::<Vec<_>>());
    }
}
