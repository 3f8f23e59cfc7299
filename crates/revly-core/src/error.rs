//! Error types for the Revly system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevlyError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A re-parent was rejected because it would make the group its own
    /// ancestor. Nothing is mutated when this is returned.
    #[error("Cycle detected: group {group_id} cannot be moved under its own subtree")]
    Cycle { group_id: String },

    #[error("Group {group_id} still has child groups or locations")]
    GroupNotEmpty { group_id: String },

    /// Stored hierarchy data violates a structural invariant (broken
    /// parent chain, level mismatch). Indicates corruption, not bad input.
    #[error("Hierarchy corrupt: {message}")]
    HierarchyCorrupt { message: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store operation timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RevlyResult<T> = Result<T, RevlyError>;
