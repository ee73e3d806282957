//! Schema extraction errors.

use std::io;
use thiserror::Error;

/// Result type for schema source operations.
pub type SourceResult<T> = Result<T, SchemaError>;

/// A schema extraction failure.
///
/// Every variant is fatal to the rebuild in progress and never touches the
/// index that is already published. Callers retry at their own cadence.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The backing store could not be queried.
    #[error("schema extraction failed: {0}")]
    Source(String),

    /// A per-table query failed.
    #[error("schema extraction failed for table '{table}': {message}")]
    Table {
        /// Table being introspected.
        table: String,
        /// Error reported by the backing store.
        message: String,
    },

    /// The extracted data cannot form a valid snapshot.
    #[error("malformed schema snapshot: {0}")]
    Malformed(String),

    /// Extraction did not finish within the configured bound.
    #[error("schema extraction timed out after {0} seconds")]
    Timeout(u64),

    /// A snapshot file could not be read.
    #[error("failed to read schema snapshot: {0}")]
    Io(#[from] io::Error),

    /// A snapshot could not be encoded or decoded.
    #[error("failed to decode schema snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Create a source error from any displayable cause.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }

    /// Create a per-table error.
    pub fn table(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Table {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Check if retrying the extraction might succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Source(_) | Self::Table { .. } | Self::Timeout(_) | Self::Io(_)
        )
    }
}
