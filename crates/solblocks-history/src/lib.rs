//! Component collection state and linear undo/redo history.
//!
//! # Modules
//!
//! - [`store`] -- The shared collection snapshot and its change notifications
//! - [`history`] -- Past/present/future snapshot stacks driven by the store
//! - [`workspace`] -- Store plus history behind one edit API
//! - [`error`] -- Errors from edits routed through the store

pub mod error;
pub mod history;
pub mod store;
pub mod workspace;

pub use error::HistoryError;
pub use history::HistoryManager;
pub use store::{ChangeOrigin, ComponentStore, Listener, Snapshot, SubscriptionId};
pub use workspace::{SharedWorkspace, Workspace, WorkspaceOp};
