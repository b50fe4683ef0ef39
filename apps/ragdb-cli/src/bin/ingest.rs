use std::env;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use ragdb_core::config::{expand_path, IngestMode, RagConfig};
use ragdb_core::ingest::ParagraphSplitter;
use ragdb_embed::default_embedder;
use ragdb_vector::ChunkStore;

const BATCH_SIZE: usize = 32;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let config = RagConfig::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut data_dir = None;
    let mut limit = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" => {
                if let Some(l) = args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) {
                    limit = Some(l);
                    i += 1;
                } else {
                    eprintln!("Error: --limit requires a number");
                    std::process::exit(1);
                }
            }
            _ if !args[i].starts_with('-') => data_dir = Some(PathBuf::from(&args[i])),
            _ => {
                eprintln!("Usage: ragdb-ingest [data_dir] [--limit N]");
                std::process::exit(1);
            }
        }
        i += 1;
    }
    let data_dir = data_dir.unwrap_or_else(|| expand_path(&config.ingest.data_dir));

    println!("ragdb ingest\n============");
    println!("Data directory: {}", data_dir.display());

    let mut contents = ParagraphSplitter::default().read_directory(&data_dir)?;
    if let Some(limit) = limit {
        if contents.len() > limit {
            contents.truncate(limit);
            println!("Limited to first {} chunks", limit);
        }
    }
    if contents.is_empty() {
        println!("Nothing to ingest.");
        return Ok(());
    }

    let embedder = default_embedder(&config.embedding)?;
    let store = ChunkStore::open(
        &expand_path(&config.storage.db_dir),
        &config.storage.table,
        config.embedding.dim,
    )
    .await?;

    println!("Ingesting {} chunks into table '{}'", contents.len(), config.storage.table);
    let pb = ProgressBar::new(contents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );

    let mut added = 0usize;
    let mut failed = 0usize;
    for batch in contents.chunks(BATCH_SIZE) {
        let report =
            ragdb_pipeline::add_documents(embedder.as_ref(), &store, batch, config.ingest.mode)
                .await?;
        added += report.added;
        failed += report.failed;
        pb.inc(report.items.len() as u64);
        if config.ingest.mode == IngestMode::FailFast && report.failed > 0 {
            break;
        }
    }
    pb.finish_with_message("done");

    println!("\n✅ Ingest complete: {} added, {} failed", added, failed);
    println!("📊 Store now holds {} chunks", store.count().await?);
    Ok(())
}
