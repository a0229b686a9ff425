//! Gemini `generateContent` client used as the extraction oracle.

use async_trait::async_trait;
use authmatch_core::RawFieldMap;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::OracleError;
use crate::oracle::{ExtractionOracle, OracleRequest};
use crate::parse::parse_fields;
use crate::prompt::build_prompt;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

impl GeminiConfig {
    /// Public endpoint and default model for the given key.
    pub fn new(api_key: String) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key,
        }
    }
}

/// Extraction oracle backed by a Gemini vision model.
pub struct GeminiOracle {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 2],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiOracle {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
            api_key: config.api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl ExtractionOracle for GeminiOracle {
    fn name(&self) -> &str {
        &self.model
    }

    async fn extract(&self, request: OracleRequest<'_>) -> Result<RawFieldMap, OracleError> {
        let prompt = build_prompt(request.document_type, request.template);
        let body = GenerateRequest {
            contents: [Content {
                parts: [
                    Part::Text(&prompt),
                    Part::InlineData(InlineData {
                        mime_type: request.image.kind().mime_type(),
                        data: base64::engine::general_purpose::STANDARD
                            .encode(request.image.bytes()),
                    }),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.0,
            },
        };

        let url = self.endpoint();
        info!(
            model = %self.model,
            document_type = request.document_type,
            image_bytes = request.image.len(),
            "requesting field extraction"
        );
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|e| {
            if e.is_decode() {
                OracleError::Malformed(e.to_string())
            } else {
                OracleError::Http(e)
            }
        })?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or(OracleError::EmptyResponse)?;

        let fields = parse_fields(&text)?;
        debug!(labels = fields.len(), "parsed oracle output");
        Ok(fields)
    }
}
