use tracing_subscriber::EnvFilter;

use ragdb_core::config::{expand_path, RagConfig};
use ragdb_core::error::ErrorBody;
use ragdb_generate::{default_generator, GenerationService};
use ragdb_vector::ChunkStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let config = RagConfig::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    println!("ragdb status\n============");

    match ChunkStore::open(
        &expand_path(&config.storage.db_dir),
        &config.storage.table,
        config.embedding.dim,
    )
    .await
    {
        Ok(store) => {
            let health = serde_json::json!({"status": "healthy", "service": "retrieval"});
            println!("retrieval: {}", health);
            println!("chunks stored: {}", store.count().await?);
        }
        Err(err) => {
            println!("retrieval: {}", serde_json::to_string(&ErrorBody::from(&err))?);
        }
    }

    match default_generator(&config.generation) {
        Ok(generator) => {
            let service = GenerationService::new(generator);
            println!("generation: {}", serde_json::to_string(&service.health())?);
            println!("model_info: {}", serde_json::to_string(&service.model_info())?);
        }
        Err(err) => {
            println!("generation: {}", serde_json::to_string(&ErrorBody::from(&err))?);
        }
    }
    Ok(())
}
