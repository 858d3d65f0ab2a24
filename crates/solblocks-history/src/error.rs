//! History error types.

use solblocks_core::error::CoreError;

/// Errors from edits routed through the component store.
///
/// Undo and redo never fail: stepping past either end is a no-op reported
/// through their boolean return.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HistoryError {
    /// The edit was rejected by the component model.
    #[error(transparent)]
    Core(#[from] CoreError),
}
