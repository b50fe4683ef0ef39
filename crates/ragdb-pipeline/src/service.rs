//! Retrieval service facade: the outward query/ingest/health contract.
//! Typed errors stop here; everything leaving this module is a
//! serde-serializable payload with a short classification and details.

use serde::{Deserialize, Serialize};

use ragdb_core::config::IngestMode;
use ragdb_core::error::ErrorBody;

use crate::ingest::IngestItem;
use crate::orchestrator::{QueryOutcome, RetrievalOrchestrator};

pub struct RetrievalService {
    orchestrator: RetrievalOrchestrator,
    ingest_mode: IngestMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddDocumentRequest {
    pub content: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QueryReply {
    Success {
        question: String,
        answer: String,
        context_chunks: usize,
        generation_time: f64,
    },
    NoContext {
        question: String,
        message: String,
    },
    Failure(ErrorBody),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AddDocumentReply {
    Success {
        message: String,
        added: usize,
        failed: usize,
        results: Vec<IngestItem>,
    },
    Failure(ErrorBody),
}

#[derive(Debug, Serialize)]
pub struct RetrievalHealth {
    pub status: String,
    pub service: String,
}

impl RetrievalService {
    pub fn new(orchestrator: RetrievalOrchestrator, ingest_mode: IngestMode) -> Self {
        Self { orchestrator, ingest_mode }
    }

    pub async fn query(&self, req: &QueryRequest) -> QueryReply {
        match self.orchestrator.query(&req.question, req.top_k).await {
            Ok(QueryOutcome::Success { question, answer, context_chunks, generation_time }) => {
                QueryReply::Success { question, answer, context_chunks, generation_time }
            }
            Ok(QueryOutcome::NoContext { question }) => QueryReply::NoContext {
                question,
                message: "no relevant context found".to_string(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "query failed");
                QueryReply::Failure(ErrorBody::from(&err))
            }
        }
    }

    pub async fn add_document(&self, req: &AddDocumentRequest) -> AddDocumentReply {
        match self.orchestrator.add_documents(&req.content, self.ingest_mode).await {
            Ok(report) => AddDocumentReply::Success {
                message: if report.failed == 0 {
                    "document chunks added successfully".to_string()
                } else {
                    format!("{} of {} chunks failed", report.failed, report.items.len())
                },
                added: report.added,
                failed: report.failed,
                results: report.items,
            },
            Err(err) => {
                tracing::warn!(error = %err, "ingest failed");
                AddDocumentReply::Failure(ErrorBody::from(&err))
            }
        }
    }

    pub fn health(&self) -> RetrievalHealth {
        RetrievalHealth { status: "healthy".to_string(), service: "retrieval".to_string() }
    }
}
