//! Upload command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::output::{OutputFormat, get_formatter};
use crate::models::{Config, Metadata, parse_metadata};
use crate::services::Uploader;

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("input").required(true).multiple(false)))]
pub struct UploadArgs {
    /// File to upload
    #[arg(long, group = "input")]
    pub file: Option<PathBuf>,

    /// Directory to upload recursively
    #[arg(long, group = "input")]
    pub dir: Option<PathBuf>,

    /// Raw text to upload
    #[arg(long, group = "input")]
    pub text: Option<String>,

    /// Document ID (generated if not provided; not allowed with --dir)
    #[arg(long, conflicts_with = "dir")]
    pub doc_id: Option<String>,

    /// Metadata to attach to all chunks, as a flat JSON object
    #[arg(long)]
    pub metadata: Option<String>,

    /// Override the configured chunk size (characters)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Override the configured chunk overlap (characters)
    #[arg(long)]
    pub overlap: Option<usize>,

    /// File extensions to include for directory uploads (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub extensions: Vec<String>,
}

pub async fn handle_upload(args: UploadArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(chunk_size) = args.chunk_size {
        config.chunking.chunk_size = chunk_size;
    }
    if let Some(overlap) = args.overlap {
        config.chunking.chunk_overlap = overlap;
    }
    config.validate()?;

    let metadata: Metadata = match &args.metadata {
        Some(json) => parse_metadata(json).context("invalid --metadata")?,
        None => Metadata::new(),
    };

    let formatter = get_formatter(format);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner.set_message(format!(
        "Connecting to index {}...",
        config.vector_store.index
    ));

    let uploader = Uploader::connect(&config).await?;

    if let Some(text) = &args.text {
        spinner.set_message("Uploading text...");
        let receipt = uploader
            .upload_text(text, args.doc_id.clone(), metadata)
            .await?;
        spinner.finish_and_clear();
        print!("{}", formatter.format_receipt(&receipt));
        return Ok(());
    }

    if let Some(file) = &args.file {
        spinner.set_message(format!("Uploading {}...", file.display()));
        let receipt = uploader
            .upload_file(file, args.doc_id.clone(), metadata)
            .await?;
        spinner.finish_and_clear();
        print!("{}", formatter.format_receipt(&receipt));
        return Ok(());
    }

    let dir = args.dir.as_ref().expect("clap enforces one input");
    let extensions = if args.extensions.is_empty() {
        None
    } else {
        Some(args.extensions.as_slice())
    };

    spinner.set_message(format!("Uploading directory {}...", dir.display()));
    let summary = uploader.upload_directory(dir, extensions, metadata).await?;
    spinner.finish_and_clear();

    if verbose {
        for failure in &summary.failures {
            eprintln!("failed: {}: {}", failure.path.display(), failure.error);
        }
    }
    print!("{}", formatter.format_summary(&summary));

    Ok(())
}
