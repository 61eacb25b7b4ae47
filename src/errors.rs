/*!
 * Error types for the translatable-field engine.
 *
 * All engine and store operations return `FieldError`, defined with the
 * thiserror crate. Setup code that works with `anyhow` converts through the
 * transparent `Other` variant.
 */

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, FieldError>;

/// Errors raised while reading or writing translated fields
#[derive(Error, Debug)]
pub enum FieldError {
    /// The record type's identifier spans more than one column
    #[error("Record type '{record_type}' has a composite identifier ({}); only single-column identifiers are supported", .columns.join(", "))]
    UnsupportedIdentifier {
        /// Registered record type name
        record_type: String,
        /// Identifier columns declared for the type
        columns: Vec<String>,
    },

    /// No translation entity is declared anywhere in the type's parent chain
    #[error("No translation entity declared for record type '{record_type}' or its parents")]
    MetadataResolution {
        /// Record type the lookup started from
        record_type: String,
    },

    /// The record type was never registered
    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),

    /// The operation needs a persisted identifier
    #[error("Record of type '{record_type}' has no identifier yet; persist it before storing translations")]
    UnsavedRecord {
        /// Record type of the unsaved record
        record_type: String,
    },

    /// The record exposes personal translations for reading but not for writing
    #[error("Record of type '{record_type}' does not expose mutable personal translations")]
    StrategyMismatch {
        /// Record type of the inconsistent record
        record_type: String,
    },

    /// A table or column name is not a plain SQL identifier
    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    /// A locale code failed validation
    #[error("Invalid locale code: {0}")]
    InvalidLocale(String),

    /// Invalid configuration or registration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reported by SQLite
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for FieldError {
    fn from(error: std::io::Error) -> Self {
        Self::Other(error.into())
    }
}

impl From<serde_json::Error> for FieldError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
