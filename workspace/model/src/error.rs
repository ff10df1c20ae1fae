use thiserror::Error;

/// Error types for the storage layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// The underlying database failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored document could not be read or written as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Result with StoreError
pub type Result<T> = std::result::Result<T, StoreError>;
