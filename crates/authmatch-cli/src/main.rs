mod config;
mod display;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use authmatch_ai::parse::parse_fields;
use authmatch_ai::{Comparison, DocumentExtraction, DocumentInput};
use authmatch_api::{AppState, start_server};
use authmatch_core::{CanonicalFieldMap, RequestContext, SchemaRegistry, reconcile_in};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{DocArg, OracleArgs, ServerArgs, load_registry, mib_to_bytes, parse_doc_arg};

#[derive(Parser)]
#[command(name = "authmatch")]
#[command(about = "Reconcile fields across transaction negotiation authority documents")]
#[command(version)]
struct Cli {
    /// JSON translation tables replacing the built-in ones.
    #[arg(long, global = true, env = "AUTHMATCH_TABLES")]
    tables: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        #[command(flatten)]
        oracle: OracleArgs,
        #[command(flatten)]
        server: ServerArgs,
    },
    /// Extract and compare local document scans.
    Compare {
        /// Document to compare, repeated for each document.
        #[arg(long = "doc", value_name = "TYPE=PATH", required = true, value_parser = parse_doc_arg)]
        docs: Vec<DocArg>,
        /// Print the comparison as JSON.
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        oracle: OracleArgs,
    },
    /// Map and reconcile already-extracted raw field maps, without the oracle.
    Reconcile {
        /// JSON object of label to value, repeated for each document.
        #[arg(long = "raw", value_name = "TYPE=PATH", required = true, value_parser = parse_doc_arg)]
        raws: Vec<DocArg>,
        /// Print the comparison as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the loaded translation tables.
    Tables,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let registry = Arc::new(load_registry(cli.tables.as_deref())?);

    match cli.command {
        Command::Serve { oracle, server } => serve(registry, oracle, server).await,
        Command::Compare { docs, json, oracle } => {
            let pipeline = oracle.pipeline(registry)?;
            let mut inputs = Vec::with_capacity(docs.len());
            for doc in docs {
                let bytes = std::fs::read(&doc.path)
                    .with_context(|| format!("reading {}", doc.path.display()))?;
                inputs.push(DocumentInput::new(doc.document_type, bytes));
            }
            let comparison = pipeline.compare(&RequestContext::new(), inputs).await?;
            report(&comparison, json)
        }
        Command::Reconcile { raws, json } => {
            let comparison = reconcile_raw(&registry, &raws)?;
            report(&comparison, json)
        }
        Command::Tables => {
            display::print_tables(&registry)?;
            Ok(())
        }
    }
}

async fn serve(
    registry: Arc<SchemaRegistry>,
    oracle: OracleArgs,
    server: ServerArgs,
) -> anyhow::Result<()> {
    let pipeline = oracle.pipeline(registry)?;
    let model = pipeline.oracle_name().to_string();
    let state = AppState::new(pipeline).with_body_limit(mib_to_bytes(server.max_body_mb)?);

    let mut handle = start_server(server.bind, state).await?;
    tracing::info!(
        addr = %handle.addr(),
        model = %model,
        "authmatch v{} listening",
        env!("CARGO_PKG_VERSION")
    );

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    handle.shutdown();
    handle.wait().await;
    Ok(())
}

fn reconcile_raw(registry: &SchemaRegistry, raws: &[DocArg]) -> anyhow::Result<Comparison> {
    let ctx = RequestContext::new();
    let mut extractions = Vec::with_capacity(raws.len());
    for raw in raws {
        let text = std::fs::read_to_string(&raw.path)
            .with_context(|| format!("reading {}", raw.path.display()))?;
        let fields = parse_fields(&text)
            .with_context(|| format!("parsing raw fields in {}", raw.path.display()))?;
        let fields = registry.map_to_canonical(&fields, &raw.document_type)?;
        extractions.push(DocumentExtraction {
            document_type: raw.document_type.clone(),
            fields,
        });
    }

    let maps: Vec<CanonicalFieldMap> = extractions.iter().map(|e| e.fields.clone()).collect();
    let result = reconcile_in(&ctx, &maps)?;
    Ok(Comparison {
        request_id: ctx.request_id,
        per_document_extractions: extractions,
        result,
    })
}

fn report(comparison: &Comparison, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(comparison)?);
    } else {
        display::print_comparison(comparison)?;
    }
    Ok(())
}
