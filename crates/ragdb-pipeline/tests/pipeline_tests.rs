use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use ragdb_core::config::IngestMode;
use ragdb_core::error::Error;
use ragdb_core::traits::{Embedder, Generator};
use ragdb_embed::HashEmbedder;
use ragdb_generate::EchoGenerator;
use ragdb_pipeline::service::{AddDocumentReply, AddDocumentRequest, QueryReply, QueryRequest};
use ragdb_pipeline::{QueryOptions, QueryOutcome, RetrievalOrchestrator, RetrievalService};
use ragdb_vector::ChunkStore;

const DIM: usize = 64;

fn opts() -> QueryOptions {
    QueryOptions {
        default_top_k: 2,
        threshold: 1.0,
        generation_budget: Duration::from_secs(30),
    }
}

async fn orchestrator_with(
    tmp: &TempDir,
    generator: Arc<EchoGenerator>,
    opts: QueryOptions,
) -> RetrievalOrchestrator {
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(DIM));
    let store = ChunkStore::open(tmp.path(), "chunks", DIM).await.expect("open store");
    let generator: Arc<dyn Generator> = generator;
    RetrievalOrchestrator::new(embedder, store, generator, opts)
}

#[tokio::test]
async fn stored_chunk_is_retrieved_and_answered() {
    let tmp = TempDir::new().expect("tmp");
    let generator = Arc::new(EchoGenerator::new("test-model"));
    let orchestrator = orchestrator_with(&tmp, generator.clone(), opts()).await;

    let contents = vec!["LangChain connects LLMs with external data sources.".to_string()];
    let report = orchestrator
        .add_documents(&contents, IngestMode::BestEffort)
        .await
        .expect("ingest");
    assert_eq!(report.added, 1);
    assert_eq!(report.failed, 0);

    match orchestrator.query("What does LangChain do?", Some(1)).await.expect("query") {
        QueryOutcome::Success { question, answer, context_chunks, generation_time } => {
            assert_eq!(question, "What does LangChain do?");
            assert_eq!(answer, "Echo: What does LangChain do?");
            assert_eq!(context_chunks, 1);
            assert!(generation_time >= 0.0);
        }
        QueryOutcome::NoContext { .. } => panic!("expected the stored chunk to be within threshold"),
    }
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn empty_store_yields_no_context_and_skips_generation() {
    let tmp = TempDir::new().expect("tmp");
    let generator = Arc::new(EchoGenerator::new("test-model"));
    let orchestrator = orchestrator_with(&tmp, generator.clone(), opts()).await;

    match orchestrator.query("anything", None).await.expect("query") {
        QueryOutcome::NoContext { question } => assert_eq!(question, "anything"),
        QueryOutcome::Success { .. } => panic!("empty store cannot produce context"),
    }
    assert_eq!(generator.calls(), 0, "generator must never run without context");
}

#[tokio::test]
async fn context_joins_ranked_chunks_with_blank_lines() {
    let tmp = TempDir::new().expect("tmp");
    let generator = Arc::new(EchoGenerator::new("test-model"));
    let orchestrator = orchestrator_with(&tmp, generator.clone(), opts()).await;

    let contents = vec![
        "LangChain connects LLMs with external data sources.".to_string(),
        "LangChain builds chains of prompts and actions.".to_string(),
    ];
    orchestrator.add_documents(&contents, IngestMode::BestEffort).await.expect("ingest");

    match orchestrator.query("What does LangChain do?", Some(2)).await.expect("query") {
        QueryOutcome::Success { context_chunks, .. } => assert_eq!(context_chunks, 2),
        QueryOutcome::NoContext { .. } => panic!("both chunks share tokens with the query"),
    }
}

#[tokio::test]
async fn slow_generation_times_out_with_distinct_classification() {
    let tmp = TempDir::new().expect("tmp");
    let generator = Arc::new(EchoGenerator::with_delay("test-model", Duration::from_millis(300)));
    let mut options = opts();
    options.generation_budget = Duration::from_millis(50);
    let orchestrator = orchestrator_with(&tmp, generator, options).await;

    let contents = vec!["LangChain connects LLMs with external data sources.".to_string()];
    orchestrator.add_documents(&contents, IngestMode::BestEffort).await.expect("ingest");

    let err = orchestrator
        .query("What does LangChain do?", Some(1))
        .await
        .expect_err("must time out");
    assert!(matches!(err, Error::GenerationTimeout { .. }));
    assert_eq!(err.classification(), "generation_timeout");
    assert_ne!(err.classification(), Error::StorageReadFailed(String::new()).classification());
}

#[tokio::test]
async fn blank_question_rejected_before_any_backend_call() {
    let tmp = TempDir::new().expect("tmp");
    let generator = Arc::new(EchoGenerator::new("test-model"));
    let orchestrator = orchestrator_with(&tmp, generator.clone(), opts()).await;

    let err = orchestrator.query("   ", None).await.expect_err("must fail");
    assert_eq!(err.classification(), "validation_error");
    let err = orchestrator.query("q", Some(0)).await.expect_err("must fail");
    assert_eq!(err.classification(), "validation_error");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn best_effort_ingest_reports_every_item() {
    let tmp = TempDir::new().expect("tmp");
    let generator = Arc::new(EchoGenerator::new("test-model"));
    let orchestrator = orchestrator_with(&tmp, generator, opts()).await;

    let contents = vec!["alpha bravo".to_string(), "   ".to_string(), "charlie delta".to_string()];
    let report = orchestrator
        .add_documents(&contents, IngestMode::BestEffort)
        .await
        .expect("ingest");
    assert_eq!(report.added, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.items.len(), 3);
    assert!(report.items[1].error.is_some());
    assert!(report.items[2].chunk_id.is_some(), "items after a failure are still attempted");

    // Committed items survived the failed one
    assert_eq!(orchestrator.store().count().await.expect("count"), 2);
}

#[tokio::test]
async fn fail_fast_ingest_stops_at_first_failure() {
    let tmp = TempDir::new().expect("tmp");
    let generator = Arc::new(EchoGenerator::new("test-model"));
    let orchestrator = orchestrator_with(&tmp, generator, opts()).await;

    let contents = vec!["alpha bravo".to_string(), "   ".to_string(), "charlie delta".to_string()];
    let report = orchestrator
        .add_documents(&contents, IngestMode::FailFast)
        .await
        .expect("ingest");
    assert_eq!(report.added, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.items.len(), 2, "third item is never attempted");
    assert_eq!(orchestrator.store().count().await.expect("count"), 1);
}

#[tokio::test]
async fn service_replies_are_structured_payloads() {
    let tmp = TempDir::new().expect("tmp");
    let generator = Arc::new(EchoGenerator::new("test-model"));
    let orchestrator = orchestrator_with(&tmp, generator, opts()).await;
    let service = RetrievalService::new(orchestrator, IngestMode::BestEffort);

    // Validation failure carries classification + details
    let reply = service
        .query(&QueryRequest { question: String::new(), top_k: None })
        .await;
    let json = serde_json::to_value(&reply).expect("json");
    assert_eq!(json["error"], "validation_error");
    assert!(json["details"].as_str().expect("details").contains("question"));

    // Empty batch is rejected up front
    let reply = service.add_document(&AddDocumentRequest { content: vec![] }).await;
    match reply {
        AddDocumentReply::Failure(body) => assert_eq!(body.error, "validation_error"),
        AddDocumentReply::Success { .. } => panic!("empty batch must be rejected"),
    }

    // Ingest then query end to end through the facade
    let reply = service
        .add_document(&AddDocumentRequest {
            content: vec!["LangChain connects LLMs with external data sources.".to_string()],
        })
        .await;
    let json = serde_json::to_value(&reply).expect("json");
    assert_eq!(json["added"], 1);
    assert_eq!(json["results"][0]["chunk_id"], 1);

    let reply = service
        .query(&QueryRequest { question: "What does LangChain do?".to_string(), top_k: Some(1) })
        .await;
    let json = serde_json::to_value(&reply).expect("json");
    assert_eq!(json["context_chunks"], 1);
    assert_eq!(json["answer"], "Echo: What does LangChain do?");

    let health = serde_json::to_value(service.health()).expect("json");
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "retrieval");
}

#[tokio::test]
async fn concurrent_queries_share_the_pipeline_safely() {
    let tmp = TempDir::new().expect("tmp");
    let generator = Arc::new(EchoGenerator::new("test-model"));
    let orchestrator = orchestrator_with(&tmp, generator, opts()).await;

    let contents = vec!["LangChain connects LLMs with external data sources.".to_string()];
    orchestrator.add_documents(&contents, IngestMode::BestEffort).await.expect("ingest");

    let (a, b) = tokio::join!(
        orchestrator.query("What does LangChain do?", Some(1)),
        orchestrator.query("What does LangChain do?", Some(1)),
    );
    for outcome in [a.expect("query"), b.expect("query")] {
        match outcome {
            QueryOutcome::Success { context_chunks, .. } => assert_eq!(context_chunks, 1),
            QueryOutcome::NoContext { .. } => panic!("chunk shares a token with the query"),
        }
    }
}

#[tokio::test]
async fn no_context_reply_is_success_shaped_not_an_error_body() {
    let tmp = TempDir::new().expect("tmp");
    let generator = Arc::new(EchoGenerator::new("test-model"));
    let orchestrator = orchestrator_with(&tmp, generator, opts()).await;
    let service = RetrievalService::new(orchestrator, IngestMode::BestEffort);

    let reply = service
        .query(&QueryRequest { question: "anything at all".to_string(), top_k: None })
        .await;
    match &reply {
        QueryReply::NoContext { question, message } => {
            assert_eq!(question, "anything at all");
            assert_eq!(message, "no relevant context found");
        }
        other => panic!("expected NoContext, got {other:?}"),
    }
    let json = serde_json::to_value(&reply).expect("json");
    assert!(json.get("error").is_none());
}
