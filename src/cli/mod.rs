//! CLI module for the document uploader.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

/// Upload documents into a vector index for retrieval-augmented generation.
#[derive(Debug, Parser)]
#[command(name = "ragup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(long, short = 'f', global = true, help = "Output format: text or json")]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload text, a file, or a directory
    Upload(commands::UploadArgs),

    /// Delete a document's chunk vectors
    Delete(commands::DeleteArgs),

    /// Patch a document's stored metadata
    Metadata(commands::MetadataArgs),

    /// Check index reachability and vector counts
    Status,
}
