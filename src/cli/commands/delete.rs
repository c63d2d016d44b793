//! Delete command implementation.

use anyhow::Result;
use clap::Args;

use crate::cli::output::{OutputFormat, get_formatter};
use crate::models::Config;
use crate::services::Uploader;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Document ID whose chunks should be removed
    pub doc_id: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub force: bool,
}

pub async fn handle_delete(args: DeleteArgs, format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::from_env()?;
    let formatter = get_formatter(format);

    if !args.force {
        eprint!(
            "Delete all chunks of document {} from namespace {}? [y/N] ",
            args.doc_id, config.vector_store.namespace
        );
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.format_message("Aborted."));
            return Ok(());
        }
    }

    let uploader = Uploader::connect(&config).await?;
    let deleted = uploader.delete_document(&args.doc_id).await?;

    print!(
        "{}",
        formatter.format_message(&format!(
            "Deleted {} chunks of document {}",
            deleted, args.doc_id
        ))
    );
    Ok(())
}
