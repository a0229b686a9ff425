//! HTTP surface of the comparison pipeline.
//!
//! Routes:
//! - `GET /health`
//! - `POST /compare-documents` (multipart: document images plus their types)

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{ApiServer, ServerError, start_server};
pub use types::{AppState, DEFAULT_BODY_LIMIT};
