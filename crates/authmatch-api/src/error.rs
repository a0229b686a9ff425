//! API errors with structured JSON responses.

use authmatch_ai::CompareError;
use authmatch_core::SchemaError;
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Error response body: `{ "error": { "code": ..., "message": ... } }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),
    #[error("Insufficient inputs: {0}")]
    InsufficientInputs(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("Extraction timed out: {0}")]
    ExtractionTimeout(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidImage(_)
            | Self::UnknownDocumentType(_)
            | Self::InsufficientInputs(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ExtractionFailed(_) => StatusCode::BAD_GATEWAY,
            Self::ExtractionTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidImage(_) => "INVALID_IMAGE",
            Self::UnknownDocumentType(_) => "UNKNOWN_DOCUMENT_TYPE",
            Self::InsufficientInputs(_) => "INSUFFICIENT_INPUTS",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::ExtractionFailed(_) => "EXTRACTION_FAILED",
            Self::ExtractionTimeout(_) => "EXTRACTION_TIMEOUT",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match self {
            Self::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                "An internal error occurred".to_string()
            }
            Self::ExtractionFailed(detail) | Self::ExtractionTimeout(detail) => {
                tracing::warn!(code, detail = %detail, "extraction error");
                detail
            }
            Self::InvalidImage(detail)
            | Self::UnknownDocumentType(detail)
            | Self::InsufficientInputs(detail)
            | Self::BadRequest(detail)
            | Self::PayloadTooLarge(detail) => detail,
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<CompareError> for ApiError {
    fn from(err: CompareError) -> Self {
        let message = err.to_string();
        match err {
            CompareError::InvalidImage { .. } => Self::InvalidImage(message),
            CompareError::Schema(SchemaError::UnknownDocumentType(_)) => {
                Self::UnknownDocumentType(message)
            }
            CompareError::Schema(_) => Self::Internal(message),
            CompareError::Reconcile(_) => Self::InsufficientInputs(message),
            CompareError::Oracle { .. } if err.is_timeout() => Self::ExtractionTimeout(message),
            CompareError::Oracle { .. } => Self::ExtractionFailed(message),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}
