use std::env;

use tracing_subscriber::EnvFilter;

use ragdb_core::config::{expand_path, RagConfig};
use ragdb_embed::default_embedder;
use ragdb_generate::default_generator;
use ragdb_pipeline::service::QueryRequest;
use ragdb_pipeline::{QueryOptions, RetrievalOrchestrator, RetrievalService};
use ragdb_vector::ChunkStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let config = RagConfig::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: ragdb-query <question> [--top-k N]");
        eprintln!("Example: ragdb-query 'What does LangChain do?' --top-k 2");
        std::process::exit(1);
    }
    let question = args[0].clone();
    let mut top_k = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--top-k" => {
                if let Some(k) = args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) {
                    top_k = Some(k);
                    i += 1;
                } else {
                    eprintln!("Error: --top-k requires a number");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Usage: ragdb-query <question> [--top-k N]");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let embedder = default_embedder(&config.embedding)?;
    let generator = default_generator(&config.generation)?;
    let store = ChunkStore::open(
        &expand_path(&config.storage.db_dir),
        &config.storage.table,
        config.embedding.dim,
    )
    .await?;
    let orchestrator = RetrievalOrchestrator::new(
        embedder,
        store,
        generator,
        QueryOptions::from_config(&config),
    );
    let service = RetrievalService::new(orchestrator, config.ingest.mode);

    let reply = service.query(&QueryRequest { question, top_k }).await;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
