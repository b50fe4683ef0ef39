use std::sync::Arc;
use std::time::Duration;

use ragdb_core::config::{IngestMode, RagConfig};
use ragdb_core::error::{Error, Result};
use ragdb_core::traits::{Embedder, Generator};
use ragdb_vector::ChunkStore;

use crate::context::assemble_context;
use crate::ingest::IngestReport;

/// Per-query knobs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub default_top_k: usize,
    pub threshold: f32,
    pub generation_budget: Duration,
}

impl QueryOptions {
    pub fn from_config(cfg: &RagConfig) -> Self {
        Self {
            default_top_k: cfg.retrieval.default_top_k,
            threshold: cfg.retrieval.threshold,
            generation_budget: Duration::from_secs(cfg.generation.timeout_secs),
        }
    }
}

/// The two non-error terminal states of a query. Upstream failures are the
/// third terminal and travel as `Err`.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Success {
        question: String,
        answer: String,
        context_chunks: usize,
        generation_time: f64,
    },
    /// Embedding succeeded and the search came back empty: nothing stored
    /// is within the threshold. A defined outcome, not a fault; the
    /// generator is never invoked.
    NoContext { question: String },
}

/// Pipeline controller. Owns the stage sequence embed -> search ->
/// assemble -> prompt -> generate; any stage failure aborts the stages
/// after it.
pub struct RetrievalOrchestrator {
    embedder: Arc<dyn Embedder>,
    store: ChunkStore,
    generator: Arc<dyn Generator>,
    opts: QueryOptions,
}

impl RetrievalOrchestrator {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: ChunkStore,
        generator: Arc<dyn Generator>,
        opts: QueryOptions,
    ) -> Self {
        Self { embedder, store, generator, opts }
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub async fn query(&self, question: &str, top_k: Option<usize>) -> Result<QueryOutcome> {
        if question.trim().is_empty() {
            return Err(Error::Validation("missing 'question' in request".to_string()));
        }
        let top_k = top_k.unwrap_or(self.opts.default_top_k);
        if top_k == 0 {
            return Err(Error::Validation("top_k must be a positive integer".to_string()));
        }

        tracing::info!(question, top_k, "embedding question");
        let query_embedding = self.embedder.embed(question)?;

        tracing::info!(top_k, threshold = self.opts.threshold, "searching for similar chunks");
        let hits = self
            .store
            .search(&query_embedding, top_k, self.opts.threshold)
            .await?;
        if hits.is_empty() {
            tracing::info!("no relevant context found");
            return Ok(QueryOutcome::NoContext { question: question.to_string() });
        }

        let context = assemble_context(&hits);
        tracing::info!(chunks = hits.len(), context_length = context.len(), "assembled context");
        let prompt = ragdb_generate::prompt::build_prompt(&context, question);

        let generation = self.generate_with_budget(prompt).await?;
        Ok(QueryOutcome::Success {
            question: question.to_string(),
            answer: generation.answer,
            context_chunks: hits.len(),
            generation_time: generation.elapsed_secs,
        })
    }

    /// Run the blocking generator off the async executor, bounded by the
    /// configured wall-clock budget. On expiry the query fails with
    /// `GenerationTimeout` instead of hanging.
    async fn generate_with_budget(&self, prompt: String) -> Result<ragdb_core::types::Generation> {
        let generator = Arc::clone(&self.generator);
        let budget = self.opts.generation_budget;
        let task = tokio::task::spawn_blocking(move || generator.generate(&prompt));
        match tokio::time::timeout(budget, task).await {
            Err(_) => Err(Error::GenerationTimeout { budget_secs: budget.as_secs() }),
            Ok(Err(join_err)) => Err(Error::ModelUnavailable(format!(
                "generation task aborted: {join_err}"
            ))),
            Ok(Ok(result)) => result,
        }
    }

    /// Sibling operation to `query`: batch ingestion through the same
    /// embedder and store.
    pub async fn add_documents(&self, contents: &[String], mode: IngestMode) -> Result<IngestReport> {
        crate::ingest::add_documents(self.embedder.as_ref(), &self.store, contents, mode).await
    }
}
