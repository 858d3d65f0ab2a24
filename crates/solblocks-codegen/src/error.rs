//! Codegen error types.

use solblocks_core::id::ContractId;

/// Errors surfaced by the project-level generation entry points.
///
/// Rendering a component collection never fails; these cover lookups and
/// option loading around it.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// The requested contract is not registered in the project.
    #[error("contract not found: {0}")]
    ContractNotFound(ContractId),

    /// A generator options document could not be parsed.
    #[error("invalid generator options: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
