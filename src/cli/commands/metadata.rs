//! Metadata update command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::{OutputFormat, get_formatter};
use crate::models::{Config, parse_metadata};
use crate::services::Uploader;

#[derive(Debug, Args)]
pub struct MetadataArgs {
    /// Document ID whose chunk metadata should be patched
    pub doc_id: String,

    /// Fields to set, as a flat JSON object
    #[arg(long)]
    pub set: String,
}

pub async fn handle_metadata(args: MetadataArgs, format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::from_env()?;
    let formatter = get_formatter(format);

    let delta = parse_metadata(&args.set).context("invalid --set")?;

    let uploader = Uploader::connect(&config).await?;
    let updated = uploader
        .update_document_metadata(&args.doc_id, &delta)
        .await?;

    print!(
        "{}",
        formatter.format_message(&format!(
            "Updated metadata on {} chunks of document {}",
            updated, args.doc_id
        ))
    );
    Ok(())
}
