//! Core error types for solblocks-core.
//!
//! Uses `thiserror` for structured, matchable error variants. These are the
//! hard failures of the model layer: they are returned to the direct caller
//! of an edit and never swallowed.

use crate::id::{ComponentId, ContractId};
use thiserror::Error;

/// Core errors produced by the solblocks-core crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The factory was asked for a component kind outside the closed set.
    #[error("unsupported component variant: '{name}'")]
    UnsupportedVariant { name: String },

    /// A component with this id already exists in the collection.
    #[error("duplicate component id: '{id}'")]
    DuplicateComponentId { id: ComponentId },

    /// No component with this id exists in the collection.
    #[error("component not found: '{id}'")]
    ComponentNotFound { id: ComponentId },

    /// A contract id was not found in the project.
    #[error("contract not found: '{id}'")]
    ContractNotFound { id: ContractId },

    /// A contract with this id is already registered in the project.
    #[error("duplicate contract id: '{id}'")]
    DuplicateContractId { id: ContractId },
}
