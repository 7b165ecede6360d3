//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violated tree invariants or failed lookups.
/// All of them are recoverable: the tree is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("tag not found: {0}")]
    NotFound(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("cannot move <{node}> under its own descendant <{new_parent}>")]
    CyclicMove { node: String, new_parent: String },
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
