use crate::types::DbId;
use crate::validation::PayloadErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Lookup by a client-chosen key rather than a storage id.
    #[error("Entity not found: {entity} '{key}'")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Field-addressable payload errors, keyed by collection, item index and
    /// wire field name.
    #[error("Validation failed: {} invalid field(s)", .0.error_count())]
    InvalidFields(PayloadErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
