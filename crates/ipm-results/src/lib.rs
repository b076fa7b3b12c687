//! ipm-results: append-only batch output.
//!
//! Contains:
//! - types (batch manifests and table rows)
//! - store (JSON-lines tables and manifest files)
//! - hash (content-hashed batch ids)

pub mod hash;
pub mod store;
pub mod types;

pub use hash::compute_batch_id;
pub use store::ResultStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Batch not found: {batch_id}")]
    BatchNotFound { batch_id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("Malformed row {line} in {table}: {source}")]
    MalformedRow {
        table: &'static str,
        line: usize,
        source: serde_json::Error,
    },
}
