//! Data source errors.

use ipm_core::IpmError;
use thiserror::Error;

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SourceError {
    /// Source could not be reached or dropped the request.
    #[error("{source_name} unavailable: {message}")]
    Unavailable {
        source_name: &'static str,
        message: String,
    },

    /// Source answered but the request itself was rejected.
    #[error("{source_name} rejected query: {message}")]
    Query {
        source_name: &'static str,
        message: String,
    },

    #[error("Invalid time window: {what}")]
    InvalidWindow { what: String },

    #[error(transparent)]
    Core(#[from] IpmError),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
