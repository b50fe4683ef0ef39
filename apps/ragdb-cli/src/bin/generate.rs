use std::env;

use tracing_subscriber::EnvFilter;

use ragdb_core::config::RagConfig;
use ragdb_core::types::GenerationRequest;
use ragdb_generate::{default_generator, GenerationService};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let config = RagConfig::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() != 2 {
        eprintln!("Usage: ragdb-generate <context> <question>");
        eprintln!("Example: ragdb-generate 'LangChain is a framework.' 'What is LangChain?'");
        std::process::exit(1);
    }

    let service = GenerationService::new(default_generator(&config.generation)?);
    let reply = service.generate(&GenerationRequest {
        context: args[0].clone(),
        question: args[1].clone(),
    });
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
