//! Command-line configuration shared by the subcommands.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use authmatch_ai::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use authmatch_ai::{ComparePipeline, GeminiConfig, GeminiOracle};
use authmatch_core::SchemaRegistry;
use clap::Args;

const MIB: u64 = 1024 * 1024;

/// Convert a size option in MiB to bytes.
pub fn mib_to_bytes(mb: u64) -> anyhow::Result<usize> {
    mb.checked_mul(MIB)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .with_context(|| format!("{mb} MiB is too large"))
}

/// Extraction oracle and upload limits.
#[derive(Args, Debug, Clone)]
pub struct OracleArgs {
    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Vision model used for extraction.
    #[arg(long, env = "AUTHMATCH_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the generateContent API.
    #[arg(long, env = "AUTHMATCH_ORACLE_URL", default_value = DEFAULT_BASE_URL)]
    pub oracle_url: String,

    /// Per-document extraction timeout.
    #[arg(
        long,
        env = "AUTHMATCH_ORACLE_TIMEOUT_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub oracle_timeout_secs: u64,

    /// Largest accepted document image, in MiB.
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_upload_mb: u64,
}

impl OracleArgs {
    pub fn pipeline(&self, registry: Arc<SchemaRegistry>) -> anyhow::Result<ComparePipeline> {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .context("no API key: pass --api-key or set GEMINI_API_KEY")?;

        let oracle = GeminiOracle::new(GeminiConfig {
            base_url: self.oracle_url.clone(),
            model: self.model.clone(),
            api_key,
        });
        Ok(ComparePipeline::new(Arc::new(oracle), registry)
            .with_timeout(Duration::from_secs(self.oracle_timeout_secs))
            .with_max_image_bytes(mib_to_bytes(self.max_upload_mb)?))
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Address to listen on.
    #[arg(long, env = "AUTHMATCH_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Largest accepted multipart request, in MiB.
    #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_body_mb: u64,
}

/// A `TYPE=PATH` pair naming a document and its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocArg {
    pub document_type: String,
    pub path: PathBuf,
}

pub fn parse_doc_arg(s: &str) -> Result<DocArg, String> {
    let (document_type, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TYPE=PATH, got '{s}'"))?;
    let document_type = document_type.trim();
    if document_type.is_empty() || path.is_empty() {
        return Err(format!("expected TYPE=PATH, got '{s}'"));
    }
    Ok(DocArg {
        document_type: document_type.to_string(),
        path: PathBuf::from(path),
    })
}

/// Built-in tables unless a replacement file is given.
pub fn load_registry(tables: Option<&Path>) -> anyhow::Result<SchemaRegistry> {
    match tables {
        Some(path) => SchemaRegistry::from_path(path)
            .with_context(|| format!("loading translation tables from {}", path.display())),
        None => SchemaRegistry::builtin().context("loading built-in translation tables"),
    }
}
