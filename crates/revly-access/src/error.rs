//! Access engine error types.

use revly_core::error::RevlyError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("location group {0} not found")]
    GroupNotFound(Uuid),

    #[error("group {0} cannot be moved under its own subtree")]
    Cycle(Uuid),

    #[error("group {0} still has child groups or locations")]
    GroupNotEmpty(Uuid),

    #[error("operation would push group {0} past the depth limit")]
    DepthLimit(Uuid),

    #[error("hierarchy corrupt: {0}")]
    Corrupt(String),
}

impl From<AccessError> for RevlyError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::GroupNotFound(id) => RevlyError::NotFound {
                entity: "location_group".into(),
                id: id.to_string(),
            },
            AccessError::Cycle(id) => RevlyError::Cycle {
                group_id: id.to_string(),
            },
            AccessError::GroupNotEmpty(id) => RevlyError::GroupNotEmpty {
                group_id: id.to_string(),
            },
            AccessError::DepthLimit(id) => RevlyError::Validation {
                message: format!("group {id} would exceed the hierarchy depth limit"),
            },
            AccessError::Corrupt(msg) => RevlyError::HierarchyCorrupt { message: msg },
        }
    }
}
