use authmatch_core::{ReconcileError, SchemaError};
use thiserror::Error;

/// Failure of a single extraction oracle call.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("oracle returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("oracle returned no content")]
    EmptyResponse,

    #[error("oracle output is not a field object: {0}")]
    Malformed(String),

    #[error("oracle did not respond within {ms}ms")]
    Timeout { ms: u64 },
}

/// Uploaded bytes that cannot be sent to the oracle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("image is empty")]
    Empty,

    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported image format (expected JPEG, PNG or PDF)")]
    UnsupportedFormat,
}

/// Request-level failure of a document comparison. No partial results
/// accompany any of these.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("document {index}: invalid image data: {source}")]
    InvalidImage { index: usize, source: ImageError },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("document {index} ({document_type}): extraction failed: {source}")]
    Oracle {
        index: usize,
        document_type: String,
        source: OracleError,
    },
}

impl CompareError {
    /// Whether the failure came from the oracle timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Oracle {
                source: OracleError::Timeout { .. },
                ..
            }
        )
    }
}
