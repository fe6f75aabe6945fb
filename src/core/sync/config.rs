/*!
 * Slice Configuration
 *
 * Construction parameters for `SyncSlice`
 */

/// Construction configuration
///
/// `capacity` is a hint: it is raised to `length` when smaller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceConfig {
    /// Initial number of default-valued elements
    pub length: usize,
    /// Reserved capacity
    pub capacity: usize,
    /// Name attached to tracing events
    pub label: Option<String>,
}

impl SliceConfig {
    /// Empty sequence, no reservation
    pub const fn empty() -> Self {
        Self {
            length: 0,
            capacity: 0,
            label: None,
        }
    }

    /// `length` default elements with room for `capacity`
    pub const fn sized(length: usize, capacity: usize) -> Self {
        Self {
            length,
            capacity,
            label: None,
        }
    }

    /// Attach a label for log correlation
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Capacity actually reserved at construction
    pub fn effective_capacity(&self) -> usize {
        self.capacity.max(self.length)
    }
}
