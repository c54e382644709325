//! Schema error model.

use thiserror::Error;

/// Result type for schema validation.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Fatal schema failure.
///
/// Raised only when a required column is absent from an input table; the
/// missing column name is carried verbatim so callers can surface it
/// unchanged. Cell-level problems are never schema errors; they degrade to
/// safe defaults and are counted in [`crate::Diagnostics`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required column was not found under any accepted header name.
    #[error("required column missing: {0}")]
    MissingColumn(String),
}

impl SchemaError {
    pub fn missing(column: impl Into<String>) -> Self {
        Self::MissingColumn(column.into())
    }
}
