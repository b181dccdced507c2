//! Error types for trackvault.

use thiserror::Error;

/// Common error type for trackvault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Metadata store error.
    ///
    /// This is a generic database error that wraps errors from any metadata
    /// backend. Database errors from sqlx are automatically converted.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// Blob write failed for the named file.
    #[error("storage write failed for \"{name}\": {detail}")]
    StorageWrite { name: String, detail: String },

    /// Blob removal failed.
    #[error("storage removal failed: {0}")]
    StorageRemove(String),

    /// An upload batch was started with no accepted files.
    #[error("no files to upload")]
    NoFiles,

    /// A mutation was attempted without an authenticated owner.
    #[error("sign in required")]
    AuthRequired,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for VaultError {
    fn from(e: sqlx::Error) -> Self {
        VaultError::Metadata(e.to_string())
    }
}

/// Result type alias for trackvault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
