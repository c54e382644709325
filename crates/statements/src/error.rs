//! Renderer error model.

use provitool_core::SchemaError;
use thiserror::Error;

/// Failure while rendering one employee's statement.
///
/// Collected per employee in [`crate::RenderOutcome::failures`] instead of
/// aborting the batch.
#[derive(Debug, Error)]
pub enum StatementError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// PDF backend failure.
    #[error("pdf generation failed: {0}")]
    Pdf(String),
}
