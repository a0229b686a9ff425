//! Multi-document comparison: validate, extract concurrently, map, reconcile.

use std::sync::Arc;
use std::time::{Duration, Instant};

use authmatch_core::{
    CanonicalFieldMap, DocumentTemplate, MIN_DOCUMENTS, RawFieldMap, ReconcileError,
    ReconciliationResult, RequestContext, SchemaRegistry, reconcile_in,
};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::{CompareError, OracleError};
use crate::image::{DocumentImage, MAX_IMAGE_BYTES};
use crate::oracle::{ExtractionOracle, OracleRequest};

pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(60);

/// One uploaded document: its declared type and raw file bytes.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub document_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentInput {
    pub fn new(document_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            document_type: document_type.into(),
            bytes,
        }
    }
}

/// Canonical fields extracted from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentExtraction {
    pub document_type: String,
    pub fields: CanonicalFieldMap,
}

/// Outcome of one comparison request.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub request_id: Uuid,
    pub per_document_extractions: Vec<DocumentExtraction>,
    pub result: ReconciliationResult,
}

/// Shared, immutable comparison pipeline.
#[derive(Clone)]
pub struct ComparePipeline {
    oracle: Arc<dyn ExtractionOracle>,
    registry: Arc<SchemaRegistry>,
    timeout: Duration,
    max_image_bytes: usize,
}

impl ComparePipeline {
    pub fn new(oracle: Arc<dyn ExtractionOracle>, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            oracle,
            registry,
            timeout: DEFAULT_ORACLE_TIMEOUT,
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }

    /// Bound on each oracle call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_image_bytes(mut self, limit: usize) -> Self {
        self.max_image_bytes = limit;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Compare two or more documents.
    ///
    /// Document types and images are all checked before the oracle is
    /// called. Oracle calls run concurrently; the first failure fails the
    /// whole request and drops the calls still in flight.
    pub async fn compare(
        &self,
        ctx: &RequestContext,
        inputs: Vec<DocumentInput>,
    ) -> Result<Comparison, CompareError> {
        self.run(ctx, inputs).instrument(ctx.span()).await
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        inputs: Vec<DocumentInput>,
    ) -> Result<Comparison, CompareError> {
        if inputs.len() < MIN_DOCUMENTS {
            return Err(ReconcileError::InsufficientInputs {
                provided: inputs.len(),
            }
            .into());
        }

        let templates = inputs
            .iter()
            .map(|input| self.registry.template(&input.document_type))
            .collect::<Result<Vec<_>, _>>()?;

        let mut documents = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            let image = DocumentImage::with_limit(input.bytes, self.max_image_bytes)
                .map_err(|source| CompareError::InvalidImage { index, source })?;
            documents.push((input.document_type, image));
        }

        info!(
            documents = documents.len(),
            oracle = self.oracle.name(),
            "extracting documents"
        );
        let calls = documents
            .iter()
            .zip(&templates)
            .enumerate()
            .map(|(index, ((document_type, image), template))| {
                self.extract_one(index, document_type, template, image)
            });
        let raw_maps = try_join_all(calls).await?;

        let mut extractions = Vec::with_capacity(documents.len());
        for ((document_type, _), raw) in documents.into_iter().zip(&raw_maps) {
            let fields = self.registry.map_to_canonical(raw, &document_type)?;
            extractions.push(DocumentExtraction {
                document_type,
                fields,
            });
        }

        let maps: Vec<CanonicalFieldMap> = extractions.iter().map(|e| e.fields.clone()).collect();
        let result = reconcile_in(ctx, &maps)?;

        Ok(Comparison {
            request_id: ctx.request_id,
            per_document_extractions: extractions,
            result,
        })
    }

    async fn extract_one(
        &self,
        index: usize,
        document_type: &str,
        template: &DocumentTemplate,
        image: &DocumentImage,
    ) -> Result<RawFieldMap, CompareError> {
        let span = info_span!("extract", document_index = index, document_type);
        async move {
            let started = Instant::now();
            let request = OracleRequest {
                document_type,
                template,
                image,
            };
            let outcome = match tokio::time::timeout(self.timeout, self.oracle.extract(request))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(OracleError::Timeout {
                    ms: self.timeout.as_millis() as u64,
                }),
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(raw) => {
                    debug!(labels = raw.len(), elapsed_ms, "extraction finished");
                    Ok(raw)
                }
                Err(source) => {
                    warn!(error = %source, elapsed_ms, "extraction failed");
                    Err(CompareError::Oracle {
                        index,
                        document_type: document_type.to_string(),
                        source,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }
}
