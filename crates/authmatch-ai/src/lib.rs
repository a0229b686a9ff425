//! Field extraction from document images and the comparison pipeline.
//!
//! An [`ExtractionOracle`] turns one image into raw label/value pairs; the
//! [`ComparePipeline`] fans documents out to it concurrently, maps each raw
//! map onto canonical fields and reconciles the results.

pub mod error;
pub mod gemini;
pub mod image;
pub mod oracle;
pub mod parse;
pub mod pipeline;
pub mod prompt;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::{CompareError, ImageError, OracleError};
pub use gemini::{GeminiConfig, GeminiOracle};
pub use image::{DocumentImage, ImageKind, MAX_IMAGE_BYTES};
pub use oracle::{ExtractionOracle, OracleRequest};
pub use pipeline::{
    ComparePipeline, Comparison, DEFAULT_ORACLE_TIMEOUT, DocumentExtraction, DocumentInput,
};
