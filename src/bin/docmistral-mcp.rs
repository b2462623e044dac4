//! MCP tool server for docmistral over stdio.
//!
//! stdout carries protocol traffic only; all logs go to stderr.

use anyhow::{Context, Result};
use docmistral::mcp;
use docmistral::{Converter, ConverterConfig, DocumentTools};
use std::io;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let api_key = std::env::var("MISTRAL_API_KEY").ok();
    if api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        warn!("MISTRAL_API_KEY is not set; process_document calls will fail until it is");
    }

    let config = ConverterConfig::builder()
        .maybe_api_key(api_key)
        .build()
        .context("Invalid configuration")?;
    let converter = Converter::new(config).context("Failed to initialize Mistral OCR client")?;
    let tools = DocumentTools::new(converter);

    info!("DocMistral MCP Server starting...");
    mcp::serve(&tools, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("MCP transport failed")?;
    Ok(())
}
