//! The extraction oracle seam.

use async_trait::async_trait;
use authmatch_core::{DocumentTemplate, RawFieldMap};

use crate::error::OracleError;
use crate::image::DocumentImage;

/// Everything an oracle needs to extract one document.
#[derive(Debug, Clone, Copy)]
pub struct OracleRequest<'a> {
    pub document_type: &'a str,
    pub template: &'a DocumentTemplate,
    pub image: &'a DocumentImage,
}

/// External field extractor: one image in, one raw field map out.
///
/// Output is untrusted. It may omit labels, add labels no template knows, or
/// format values inconsistently; callers never assume a label is present.
#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    /// Model or backend name, for logs.
    fn name(&self) -> &str;

    async fn extract(&self, request: OracleRequest<'_>) -> Result<RawFieldMap, OracleError>;
}
