//! Database-layer errors and their mapping into [`RevlyError`].

use revly_core::error::RevlyError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A stored row cannot be mapped back to a domain value (invalid
    /// UUID string, unknown enum value, contradictory scope columns).
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<DbError> for RevlyError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RevlyError::NotFound { entity, id },
            DbError::Corrupt(msg) => RevlyError::Internal(msg),
            other => RevlyError::StoreUnavailable(other.to_string()),
        }
    }
}
