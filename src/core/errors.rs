/*!
 * Error Types
 * Boundary-violation errors with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for fallible slice operations
pub type SliceResult<T> = Result<T, SliceError>;

/// Out-of-bounds access on a [`SyncSlice`](crate::SyncSlice)
///
/// Both variants leave the container untouched.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SliceError {
    /// Raised by `get` and `set`
    #[error("Index {index} out of bounds for length {len}")]
    #[diagnostic(
        code(slice::index_out_of_bounds),
        help("Valid indices are 0..len. The length may have changed since it was last read.")
    )]
    IndexOutOfBounds { index: usize, len: usize },

    /// Raised by `slice`
    #[error("Range {from}..{to} out of bounds for length {len}")]
    #[diagnostic(
        code(slice::range_out_of_bounds),
        help("Slice bounds must satisfy from <= to <= len.")
    )]
    RangeOutOfBounds { from: usize, to: usize, len: usize },
}

impl SliceError {
    /// Length of the container when the access failed
    pub fn observed_len(&self) -> usize {
        match self {
            Self::IndexOutOfBounds { len, .. } | Self::RangeOutOfBounds { len, .. } => *len,
        }
    }
}
