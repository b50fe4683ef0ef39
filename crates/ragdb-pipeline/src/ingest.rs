use serde::Serialize;

use ragdb_core::config::IngestMode;
use ragdb_core::error::{Error, Result};
use ragdb_core::traits::Embedder;
use ragdb_vector::ChunkStore;

/// Outcome of one content item in a batch. Exactly one of `chunk_id` and
/// `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct IngestItem {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-item manifest for a batch ingestion. In fail-fast mode the manifest
/// covers only the items attempted before the first failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub added: usize,
    pub failed: usize,
    pub items: Vec<IngestItem>,
}

impl IngestReport {
    fn push_ok(&mut self, index: usize, chunk_id: i64) {
        self.added += 1;
        self.items.push(IngestItem { index, chunk_id: Some(chunk_id), error: None });
    }

    fn push_err(&mut self, index: usize, error: String) {
        self.failed += 1;
        self.items.push(IngestItem { index, chunk_id: None, error: Some(error) });
    }
}

/// Ingest a batch of content strings: each is validated, embedded and
/// stored independently (one atomic add per item), so a failed item never
/// disturbs items already committed. The generation model plays no part
/// here; ingestion only needs the embedder and the store.
pub async fn add_documents(
    embedder: &dyn Embedder,
    store: &ChunkStore,
    contents: &[String],
    mode: IngestMode,
) -> Result<IngestReport> {
    if contents.is_empty() {
        return Err(Error::Validation("missing 'content' in request".to_string()));
    }
    let mut report = IngestReport::default();
    for (index, content) in contents.iter().enumerate() {
        match add_one(embedder, store, content).await {
            Ok(id) => report.push_ok(index, id),
            Err(err) => {
                tracing::warn!(index, error = %err, "failed to ingest chunk");
                report.push_err(index, err.to_string());
                if mode == IngestMode::FailFast {
                    break;
                }
            }
        }
    }
    tracing::info!(added = report.added, failed = report.failed, "ingest batch finished");
    Ok(report)
}

async fn add_one(embedder: &dyn Embedder, store: &ChunkStore, content: &str) -> Result<i64> {
    if content.trim().is_empty() {
        return Err(Error::Validation("content item must not be empty".to_string()));
    }
    let embedding = embedder.embed(content)?;
    let chunk = store.add_chunk(content, &embedding).await?;
    Ok(chunk.id)
}
