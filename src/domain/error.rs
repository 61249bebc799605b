use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexingError {
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Object not found: s3://{bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("Metadata lookup failed for s3://{bucket}/{key}: {message}")]
    Lookup {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to write catalog entry to table {table}: {message}")]
    Persistence { table: String, message: String },
}

impl IndexingError {
    /// Stable name of the error kind, reported as the invocation's error type.
    pub fn kind(&self) -> &'static str {
        match self {
            IndexingError::MalformedEvent(_) => "MalformedEvent",
            IndexingError::ObjectNotFound { .. } => "ObjectNotFound",
            IndexingError::Lookup { .. } => "LookupError",
            IndexingError::Persistence { .. } => "PersistenceError",
        }
    }
}
