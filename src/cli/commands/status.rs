//! Status command implementation.

use anyhow::Result;

use crate::cli::output::{OutputFormat, StatusInfo, get_formatter};
use crate::models::Config;
use crate::services::VectorStoreClient;

pub async fn handle_status(format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::from_env()?;
    let formatter = get_formatter(format);

    let status = match VectorStoreClient::connect(&config.vector_store).await {
        Ok(store) => {
            let stats = store.stats().await;
            let (dimension, total, in_namespace) = match stats {
                Ok(stats) => (stats.dimension, stats.total_vectors, stats.namespace_vectors),
                Err(_) => (0, 0, 0),
            };
            StatusInfo {
                index: config.vector_store.index.clone(),
                namespace: config.vector_store.namespace.clone(),
                reachable: true,
                host: Some(store.host().to_string()),
                dimension,
                total_vectors: total,
                namespace_vectors: in_namespace,
            }
        }
        Err(_) => StatusInfo {
            index: config.vector_store.index.clone(),
            namespace: config.vector_store.namespace.clone(),
            reachable: false,
            host: None,
            dimension: 0,
            total_vectors: 0,
            namespace_vectors: 0,
        },
    };

    print!("{}", formatter.format_status(&status));

    if !status.reachable {
        eprintln!();
        eprintln!("Hint: check PINECONE_API_KEY and PINECONE_INDEX_NAME.");
    }

    Ok(())
}
