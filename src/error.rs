//! Crate-level error type.

use thiserror::Error;

use crate::config::SettingsError;
use crate::metadata::SchemaError;
use crate::validation::{Rejection, SanitizeError};

/// Result type for service-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure surfaced by [`SqlGate`](crate::SqlGate).
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Sanitize(#[from] SanitizeError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl Error {
    /// The rejection behind this error, if the input SQL was refused.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Error::Rejected(rejection) | Error::Sanitize(SanitizeError::Rejected(rejection)) => {
                Some(rejection)
            }
            _ => None,
        }
    }
}
